//! Hooks around route execution.
//!
//! ```text
//! fragment matched, params extracted
//!   → PRE-EXECUTE HOOKS ← (guards, state injection; may cancel)
//!   → handler chain
//!   → POST-EXECUTE HOOKS ← (inspect or replace the final value)
//!   → route events
//! ```
//!
//! A pre-execute hook returning [`Flow::Cancel`] is the only way to stop a
//! navigation before its chain starts. Once started, a chain runs to the end
//! or to the first handler error.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

use crate::handler::RouteContext;

/// Whether execution continues after the pre-execute hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Skip the chain and its route events
    Cancel,
}

/// The phase at which a hook error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    PreExecute,
    PostExecute,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::PreExecute => write!(f, "pre-execute"),
            HookPhase::PostExecute => write!(f, "post-execute"),
        }
    }
}

/// Error returned by a hook.
#[derive(Debug, Error)]
#[error("hook error ({phase}): {message}")]
pub struct HookError {
    pub message: String,
    pub phase: HookPhase,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HookError {
    pub fn pre_execute(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: HookPhase::PreExecute,
            source: None,
        }
    }

    pub fn post_execute(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: HookPhase::PostExecute,
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }
}

/// Pre-execute hooks see the extracted parameters and may write into
/// `ctx.extensions`.
pub type PreExecuteFn = Rc<dyn Fn(&[Value], &mut RouteContext) -> Result<Flow, HookError>>;

/// Post-execute hooks receive the chain's final value and return the value
/// the router reports.
pub type PostExecuteFn = Rc<dyn Fn(&[Value], &RouteContext, Value) -> Result<Value, HookError>>;

/// Hooks shared by every route of a router, run in registration order.
#[derive(Clone, Default)]
pub struct Hooks {
    pre_execute: Vec<PreExecuteFn>,
    post_execute: Vec<PostExecuteFn>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pre_execute.is_empty() && self.post_execute.is_empty()
    }

    /// Adds a pre-execute hook.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chainroute::{Flow, Hooks};
    ///
    /// struct Visitor(&'static str);
    ///
    /// let hooks = Hooks::new()
    ///     .pre_execute(|_params, ctx| {
    ///         ctx.extensions.insert(Visitor("guest"));
    ///         Ok(Flow::Continue)
    ///     })
    ///     .pre_execute(|_params, ctx| {
    ///         if ctx.route.starts_with("admin") {
    ///             return Ok(Flow::Cancel);
    ///         }
    ///         Ok(Flow::Continue)
    ///     });
    /// assert!(!hooks.is_empty());
    /// ```
    pub fn pre_execute<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value], &mut RouteContext) -> Result<Flow, HookError> + 'static,
    {
        self.pre_execute.push(Rc::new(f));
        self
    }

    pub fn post_execute<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value], &RouteContext, Value) -> Result<Value, HookError> + 'static,
    {
        self.post_execute.push(Rc::new(f));
        self
    }

    /// Runs pre-execute hooks until one cancels or fails.
    pub fn run_pre_execute(
        &self,
        params: &[Value],
        ctx: &mut RouteContext,
    ) -> Result<Flow, HookError> {
        for hook in &self.pre_execute {
            if hook(params, ctx)? == Flow::Cancel {
                return Ok(Flow::Cancel);
            }
        }
        Ok(Flow::Continue)
    }

    /// Runs post-execute hooks, chaining transformations.
    pub fn run_post_execute(
        &self,
        params: &[Value],
        ctx: &RouteContext,
        value: Value,
    ) -> Result<Value, HookError> {
        let mut current = value;
        for hook in &self.post_execute {
            current = hook(params, ctx, current)?;
        }
        Ok(current)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("pre_execute_count", &self.pre_execute.len())
            .field("post_execute_count", &self.post_execute.len())
            .finish()
    }
}
