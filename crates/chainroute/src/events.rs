//! Route events.
//!
//! After a route's chain completes, the router announces it twice: first to
//! listeners of that route name (`route:<name>`), then to listeners of every
//! route (`route`). Nothing is announced for cancelled navigations or when
//! the chain's final value is `false`.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// A completed navigation.
#[derive(Debug, Clone, Copy)]
pub struct RouteEvent<'a> {
    /// The route name as declared
    pub name: &'a str,
    /// The extracted URL parameters, unchanged by the chain
    pub args: &'a [Value],
}

impl RouteEvent<'_> {
    /// The name listeners of this specific route subscribe under.
    pub fn event_name(&self) -> String {
        format!("route:{}", self.name)
    }
}

pub type RouteListener = Rc<dyn Fn(&RouteEvent<'_>)>;

/// Listener lists for one router.
#[derive(Clone, Default)]
pub struct RouteEvents {
    named: Vec<(String, RouteListener)>,
    any: Vec<RouteListener>,
}

impl RouteEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to completions of the route declared as `name`.
    pub fn on_route<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&RouteEvent<'_>) + 'static,
    {
        self.named.push((name.into(), Rc::new(f)));
    }

    /// Subscribes to completions of every route.
    pub fn on_any_route<F>(&mut self, f: F)
    where
        F: Fn(&RouteEvent<'_>) + 'static,
    {
        self.any.push(Rc::new(f));
    }

    pub fn emit(&self, event: &RouteEvent<'_>) {
        log::debug!("announcing {}", event.event_name());
        for (_, listener) in self.named.iter().filter(|(name, _)| name == event.name) {
            listener(event);
        }
        for listener in &self.any {
            listener(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.any.is_empty()
    }
}

impl fmt::Debug for RouteEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEvents")
            .field("named_count", &self.named.len())
            .field("any_count", &self.any.len())
            .finish()
    }
}
