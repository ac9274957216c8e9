//! Named handler registry.
//!
//! Chain segments are resolved against this map when a route is registered,
//! so a misspelled segment fails at registration instead of at navigation.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::error::ChainError;
use crate::handler::{shared, FnHandler, Handler, IntoHandlerResult, RouteContext, SharedHandler};

/// Maps handler names to handler references.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, SharedHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under `name`, replacing any previous one.
    ///
    /// Chains already built keep the reference they resolved.
    pub fn register<H: Handler + 'static>(
        &mut self,
        name: impl Into<String>,
        handler: H,
    ) -> &mut Self {
        self.register_shared(name, shared(handler))
    }

    /// Registers an existing handler reference under `name`.
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        handler: SharedHandler,
    ) -> &mut Self {
        let name = name.into();
        log::debug!("registering handler '{}'", name);
        self.handlers.insert(name, handler);
        self
    }

    /// Registers a closure under `name`.
    ///
    /// ```rust
    /// use chainroute::{HandlerRegistry, RouteContext};
    /// use serde_json::Value;
    ///
    /// let mut registry = HandlerRegistry::new();
    /// registry.register_fn("posts", |_args: &[Value], _ctx: &RouteContext| {
    ///     Ok::<_, anyhow::Error>(vec!["somestring"])
    /// });
    /// assert!(registry.contains("posts"));
    /// ```
    pub fn register_fn<F, R>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: FnMut(&[Value], &RouteContext) -> R + 'static,
        R: IntoHandlerResult + 'static,
    {
        self.register(name, FnHandler::new(f))
    }

    pub fn get(&self, name: &str) -> Option<SharedHandler> {
        self.handlers.get(name).cloned()
    }

    /// Looks up the handler for one segment of `chain`.
    pub fn resolve(&self, segment: &str, chain: &str) -> Result<SharedHandler, ChainError> {
        self.get(segment).ok_or_else(|| ChainError::MissingHandler {
            segment: segment.to_string(),
            chain: chain.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("names", &self.names())
            .finish()
    }
}
