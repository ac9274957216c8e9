//! The router: route table, execution and events.
//!
//! Each route pairs a compiled [`RoutePattern`] with the [`Chain`] built from
//! its name when the route was registered. Dispatching a fragment finds the
//! first matching route, extracts its parameters, runs the pre-execute hooks,
//! the chain and the post-execute hooks, and finally announces the route.
//!
//! # Example
//!
//! ```rust
//! use chainroute::{Dispatch, Router, RouteContext};
//! use serde_json::{json, Value};
//!
//! let mut router = Router::new();
//! router
//!     .handler_fn("posts", |_args: &[Value], _ctx: &RouteContext| {
//!         Ok::<_, anyhow::Error>(json!(["somestring", {"foo": "bar"}, true]))
//!     })
//!     .handler_fn("post", |args: &[Value], _ctx: &RouteContext| {
//!         Ok::<_, anyhow::Error>(json!(args))
//!     });
//! router.route("posts/:post_id", "[posts].post")?;
//!
//! let Dispatch::Completed { result, .. } = router.dispatch("posts/15")? else {
//!     panic!("route should match");
//! };
//! assert_eq!(result, json!(["15", "somestring", {"foo": "bar"}, true, null]));
//! # Ok::<(), chainroute::RouterError>(())
//! ```

use std::fmt;
use std::rc::Rc;

use chainroute_pattern::RoutePattern;
use regex::Regex;
use serde_json::Value;

use crate::chain::Chain;
use crate::config::{RouteEntry, RouterConfig};
use crate::error::RouterError;
use crate::events::{RouteEvent, RouteEvents};
use crate::handler::{Extensions, Handler, IntoHandlerResult, RouteContext, SharedHandler};
use crate::hooks::{Flow, Hooks};
use crate::registry::HandlerRegistry;

/// One registered route.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: RoutePattern,
    name: String,
    chain: Option<Chain>,
}

impl Route {
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The chain this route runs; `None` for event-only routes.
    pub fn chain(&self) -> Option<&Chain> {
        self.chain.as_ref()
    }
}

/// The outcome of dispatching one fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// No route matched the fragment
    NoMatch,
    /// A pre-execute hook cancelled; no handler ran
    Cancelled { name: String },
    /// The chain ran to completion
    Completed {
        name: String,
        args: Vec<Value>,
        result: Value,
    },
}

impl Dispatch {
    /// Returns true if a route matched, whether or not it ran.
    pub fn is_match(&self) -> bool {
        !matches!(self, Dispatch::NoMatch)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Dispatch::Completed { .. })
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            Dispatch::Completed { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Returns true if route events fire for this dispatch.
    ///
    /// A completed chain whose final value is exactly `false` stays silent.
    pub fn is_announced(&self) -> bool {
        match self {
            Dispatch::Completed { result, .. } => *result != Value::Bool(false),
            _ => false,
        }
    }
}

/// A table of chained routes over a handler registry.
#[derive(Default)]
pub struct Router {
    registry: HandlerRegistry,
    routes: Vec<Route>,
    hooks: Hooks,
    events: RouteEvents,
    app_state: Rc<Extensions>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router whose chains resolve against `registry`.
    pub fn with_registry(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    /// Creates a router and binds the route table of `config`.
    pub fn from_config(
        config: &RouterConfig,
        registry: HandlerRegistry,
    ) -> Result<Self, RouterError> {
        let mut router = Self::with_registry(registry);
        router.bind_routes(&config.routes)?;
        Ok(router)
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Mutable access to the registry. Routes already registered keep the
    /// handlers they resolved.
    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// Registers a handler by name.
    pub fn handler<H: Handler + 'static>(
        &mut self,
        name: impl Into<String>,
        handler: H,
    ) -> &mut Self {
        self.registry.register(name, handler);
        self
    }

    /// Registers a closure by name.
    pub fn handler_fn<F, R>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: FnMut(&[Value], &RouteContext) -> R + 'static,
        R: IntoHandlerResult + 'static,
    {
        self.registry.register_fn(name, f);
        self
    }

    /// Replaces the state every [`RouteContext`] shares.
    pub fn set_app_state(&mut self, state: Extensions) -> &mut Self {
        self.app_state = Rc::new(state);
        self
    }

    pub fn set_hooks(&mut self, hooks: Hooks) -> &mut Self {
        self.hooks = hooks;
        self
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Subscribes to the `route:<name>` event.
    pub fn on_route<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&RouteEvent<'_>) + 'static,
    {
        self.events.on_route(name, f);
        self
    }

    /// Subscribes to the `route` event of every route.
    pub fn on_any_route<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&RouteEvent<'_>) + 'static,
    {
        self.events.on_any_route(f);
        self
    }

    /// Registers `route` to run the chain declared by `name`.
    ///
    /// `name` may be a single handler (`"posts"`) or a chain
    /// (`"[posts].post"`). Every segment must already be registered.
    pub fn route(&mut self, route: &str, name: &str) -> Result<&mut Self, RouterError> {
        let pattern = RoutePattern::compile(route)?;
        let chain = Chain::resolve(name, &self.registry)?;
        Ok(self.add(pattern, name, Some(chain)))
    }

    /// Registers `route` to run an explicit handler list.
    ///
    /// Bracket flags are read positionally from `name`.
    pub fn route_with(
        &mut self,
        route: &str,
        name: &str,
        handlers: Vec<SharedHandler>,
    ) -> Result<&mut Self, RouterError> {
        let pattern = RoutePattern::compile(route)?;
        let chain = Chain::from_handlers(name, handlers)?;
        Ok(self.add(pattern, name, Some(chain)))
    }

    /// Registers a hand-written expression to run the chain declared by `name`.
    pub fn route_regex(&mut self, regex: Regex, name: &str) -> Result<&mut Self, RouterError> {
        let chain = Chain::resolve(name, &self.registry)?;
        Ok(self.add(RoutePattern::from_regex(regex), name, Some(chain)))
    }

    /// Registers a route that runs no handler but still announces `name`.
    pub fn route_event(&mut self, route: &str, name: &str) -> Result<&mut Self, RouterError> {
        let pattern = RoutePattern::compile(route)?;
        Ok(self.add(pattern, name, None))
    }

    /// Registers a route table. Earlier entries take precedence over later
    /// ones, and the whole table over routes registered before it.
    pub fn bind_routes(&mut self, entries: &[RouteEntry]) -> Result<&mut Self, RouterError> {
        for entry in entries.iter().rev() {
            self.route(&entry.pattern, &entry.chain)?;
        }
        Ok(self)
    }

    fn add(&mut self, pattern: RoutePattern, name: &str, chain: Option<Chain>) -> &mut Self {
        log::debug!("route '{}' -> '{}'", pattern, name);
        // Most recent registration is matched first.
        self.routes.insert(
            0,
            Route {
                pattern,
                name: name.to_string(),
                chain,
            },
        );
        self
    }

    /// Routes in match order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Finds the route for `fragment` and its extracted parameters.
    pub fn recognize(&self, fragment: &str) -> Option<(&Route, Vec<Value>)> {
        self.routes.iter().find_map(|route| {
            route.pattern.extract(fragment).map(|params| {
                let args = params
                    .into_iter()
                    .map(|param| param.map(Value::String).unwrap_or(Value::Null))
                    .collect();
                (route, args)
            })
        })
    }

    /// Dispatches `fragment` to the first matching route.
    ///
    /// # Errors
    ///
    /// Hook and handler errors propagate; a failed navigation announces
    /// nothing.
    pub fn dispatch(&self, fragment: &str) -> Result<Dispatch, RouterError> {
        match self.recognize(fragment) {
            Some((route, args)) => self.execute(route, fragment, args),
            None => {
                log::debug!("'{}' did not match any route", fragment);
                Ok(Dispatch::NoMatch)
            }
        }
    }

    /// Runs one matched route with its extracted parameters.
    pub fn execute(
        &self,
        route: &Route,
        fragment: &str,
        args: Vec<Value>,
    ) -> Result<Dispatch, RouterError> {
        log::debug!("running '{}': {}", route.pattern, route.name);
        let mut ctx = RouteContext::new(&route.name, fragment, Rc::clone(&self.app_state));

        if self.hooks.run_pre_execute(&args, &mut ctx)? == Flow::Cancel {
            log::debug!("'{}' cancelled by pre-execute hook", route.name);
            return Ok(Dispatch::Cancelled {
                name: route.name.clone(),
            });
        }

        let value = match &route.chain {
            Some(chain) => chain.invoke(&args, &mut ctx)?,
            None => Value::Null,
        };
        let result = self.hooks.run_post_execute(&args, &ctx, value)?;

        if result != Value::Bool(false) {
            self.events.emit(&RouteEvent {
                name: &route.name,
                args: &args,
            });
        }

        Ok(Dispatch::Completed {
            name: route.name.clone(),
            args,
            result,
        })
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field(
                "routes",
                &self.routes.iter().map(|r| r.pattern.as_str()).collect::<Vec<_>>(),
            )
            .field("registry", &self.registry)
            .field("hooks", &self.hooks)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChainError;
    use crate::hooks::HookError;
    use serde_json::json;
    use std::cell::RefCell;

    fn echo_router() -> Router {
        let mut router = Router::new();
        router
            .handler_fn("posts", |args: &[Value], _: &RouteContext| {
                Ok::<_, anyhow::Error>(json!({ "posts": args }))
            })
            .handler_fn("post", |args: &[Value], _: &RouteContext| {
                Ok::<_, anyhow::Error>(json!({ "post": args }))
            });
        router
    }

    #[test]
    fn test_route_rejects_unknown_segment() {
        let mut router = echo_router();
        let err = router.route("posts/:id", "posts.missing").unwrap_err();
        assert!(matches!(
            err,
            RouterError::Chain(ChainError::MissingHandler { .. })
        ));
        assert!(router.routes().is_empty());
    }

    #[test]
    fn test_route_rejects_bad_pattern() {
        let mut router = echo_router();
        let err = router.route("posts(/:id", "posts").unwrap_err();
        assert!(matches!(err, RouterError::Pattern(_)));
    }

    #[test]
    fn test_latest_route_matches_first() {
        let mut router = echo_router();
        router.route("posts/*rest", "posts").unwrap();
        router.route("posts/:id", "post").unwrap();

        let dispatch = router.dispatch("posts/3").unwrap();
        assert!(matches!(dispatch, Dispatch::Completed { ref name, .. } if name == "post"));
    }

    #[test]
    fn test_bind_routes_first_entry_wins() {
        let mut router = echo_router();
        router
            .bind_routes(&[
                RouteEntry::new("posts/:id", "post"),
                RouteEntry::new("posts/*rest", "posts"),
            ])
            .unwrap();

        let names: Vec<_> = router.routes().iter().map(Route::name).collect();
        assert_eq!(names, vec!["post", "posts"]);
        let dispatch = router.dispatch("posts/3").unwrap();
        assert!(matches!(dispatch, Dispatch::Completed { ref name, .. } if name == "post"));
    }

    #[test]
    fn test_no_match() {
        let router = echo_router();
        assert_eq!(router.dispatch("nowhere").unwrap(), Dispatch::NoMatch);
    }

    #[test]
    fn test_recognize_converts_params() {
        let mut router = echo_router();
        router.route("posts/:id", "post").unwrap();
        let (route, args) = router.recognize("posts/a%2Fb?x=1").unwrap();
        assert_eq!(route.name(), "post");
        assert_eq!(args, vec![json!("a/b"), json!("x=1")]);
    }

    #[test]
    fn test_cancelled_navigation_runs_nothing_and_announces_nothing() {
        let mut router = echo_router();
        let ran = Rc::new(RefCell::new(false));
        let r = ran.clone();
        router
            .handler_fn("guarded", move |_: &[Value], _: &RouteContext| {
                *r.borrow_mut() = true;
                Ok::<_, anyhow::Error>(())
            })
            .route("admin", "guarded")
            .unwrap();
        router.set_hooks(Hooks::new().pre_execute(|_, _| Ok(Flow::Cancel)));
        let announced = Rc::new(RefCell::new(0));
        let a = announced.clone();
        router.on_any_route(move |_| *a.borrow_mut() += 1);

        let dispatch = router.dispatch("admin").unwrap();
        assert_eq!(
            dispatch,
            Dispatch::Cancelled {
                name: "guarded".into()
            }
        );
        assert!(!*ran.borrow());
        assert_eq!(*announced.borrow(), 0);
    }

    #[test]
    fn test_false_result_is_not_announced() {
        let mut router = Router::new();
        router
            .handler_fn("deny", |_: &[Value], _: &RouteContext| {
                Ok::<_, anyhow::Error>(false)
            })
            .route("deny", "deny")
            .unwrap();
        let announced = Rc::new(RefCell::new(0));
        let a = announced.clone();
        router.on_route("deny", move |_| *a.borrow_mut() += 1);

        let dispatch = router.dispatch("deny").unwrap();
        assert!(dispatch.is_completed());
        assert!(!dispatch.is_announced());
        assert_eq!(*announced.borrow(), 0);
    }

    #[test]
    fn test_event_only_route_announces() {
        let mut router = Router::new();
        router.route_event("help", "help").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        router.on_route("help", move |e| s.borrow_mut().push(e.args.to_vec()));

        let dispatch = router.dispatch("help").unwrap();
        assert_eq!(dispatch.result(), Some(&Value::Null));
        assert_eq!(*seen.borrow(), vec![vec![Value::Null]]);
    }

    #[test]
    fn test_hook_error_propagates() {
        let mut router = echo_router();
        router.route("posts", "posts").unwrap();
        router.set_hooks(
            Hooks::new().pre_execute(|_, _| Err(HookError::pre_execute("not signed in"))),
        );

        let err = router.dispatch("posts").unwrap_err();
        assert!(matches!(err, RouterError::Hook(_)));
    }

    #[test]
    fn test_post_execute_replaces_result() {
        let mut router = echo_router();
        router.route("posts", "posts").unwrap();
        router.set_hooks(Hooks::new().post_execute(|_, ctx, _| Ok(json!(ctx.route))));

        let dispatch = router.dispatch("posts").unwrap();
        assert_eq!(dispatch.result(), Some(&json!("posts")));
    }

    #[test]
    fn test_app_state_reaches_handlers() {
        struct Greeting(&'static str);

        let mut state = Extensions::new();
        state.insert(Greeting("hello"));

        let mut router = Router::new();
        router
            .set_app_state(state)
            .handler_fn("greet", |_: &[Value], ctx: &RouteContext| {
                let greeting = ctx.app_state.get_required::<Greeting>()?;
                Ok::<_, anyhow::Error>(greeting.0)
            })
            .route("greet", "greet")
            .unwrap();

        assert_eq!(
            router.dispatch("greet").unwrap().result(),
            Some(&json!("hello"))
        );
    }

    #[test]
    fn test_route_regex() {
        let mut router = echo_router();
        router
            .route_regex(Regex::new(r"^archive/(\d{4})/(.*)$").unwrap(), "post")
            .unwrap();

        let dispatch = router.dispatch("archive/2015/x").unwrap();
        assert_eq!(
            dispatch.result(),
            Some(&json!({ "post": ["2015", "x"] }))
        );
    }
}
