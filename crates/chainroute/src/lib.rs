//! Chained route dispatch for fragment-based routers.
//!
//! `chainroute` lets one route run several handlers in sequence. The route's
//! name declares the chain, and each handler receives either the next URL
//! parameter or the previous handler's result.
//!
//! # Features
//!
//! - **Chain names**: `"posts.post"`, `"[posts].post"`, `"post.[comments].comment"`
//! - **Bracketed links**: run for their side effect, receive `[null]`, consume no parameter
//! - **Argument threading**: results are spread into the next link's arguments
//! - **Host router**: route patterns, hooks, route events and navigation history
//! - **Route tables**: declare routes in YAML or JSON
//!
//! # Quick Start
//!
//! ```rust
//! use chainroute::{Router, RouteContext};
//! use serde_json::{json, Value};
//!
//! let mut router = Router::new();
//! router
//!     .handler_fn("post", |args: &[Value], _ctx: &RouteContext| {
//!         Ok::<_, anyhow::Error>(json!({ "id": args[0] }))
//!     })
//!     .handler_fn("comments", |_args: &[Value], _ctx: &RouteContext| {
//!         Ok::<_, anyhow::Error>(())
//!     })
//!     .handler_fn("comment", |args: &[Value], _ctx: &RouteContext| {
//!         Ok::<_, anyhow::Error>(json!(args))
//!     });
//! router.route("post/:post_id/comments/:comment_id", "post.[comments].comment")?;
//!
//! let dispatch = router.dispatch("post/1/comments/2")?;
//! assert_eq!(dispatch.result(), Some(&json!(["2", null])));
//! # Ok::<(), chainroute::RouterError>(())
//! ```
//!
//! # Route Tables
//!
//! ```rust
//! use chainroute::{HandlerRegistry, RouteContext, Router, RouterConfig};
//! use serde_json::Value;
//!
//! let config = RouterConfig::from_yaml_str(r#"
//! routes:
//!   - pattern: "posts/new"
//!     chain: "posts.new"
//!   - pattern: "posts/:post_id"
//!     chain: "[posts].post"
//! "#)?;
//!
//! let mut registry = HandlerRegistry::new();
//! for name in ["posts", "new", "post"] {
//!     registry.register_fn(name, |args: &[Value], _: &RouteContext| {
//!         Ok::<_, anyhow::Error>(args.len())
//!     });
//! }
//! let router = Router::from_config(&config, registry)?;
//! assert_eq!(router.routes()[0].name(), "posts.new");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod args;
mod chain;
mod config;
mod error;
mod events;
mod handler;
mod history;
mod hooks;
mod registry;
mod router;

pub use args::{bracketed_args, entry_args, next_args, param_args, threaded_args};

pub use chain::{is_chained, parse_chain, Chain, ChainSegment, SegmentName};

pub use config::{RouteEntry, RouterConfig};

pub use error::{ChainError, ConfigError, RouterError};

pub use events::{RouteEvent, RouteEvents, RouteListener};

pub use handler::{
    shared, Extensions, FnHandler, Handler, HandlerResult, IntoHandlerResult, Outcome,
    RouteContext, SharedHandler, SimpleFnHandler,
};

pub use history::{
    History, HistoryEvent, HistoryListener, NavigateOptions, Navigation, RouterId, StartOptions,
};

pub use hooks::{Flow, HookError, HookPhase, Hooks, PostExecuteFn, PreExecuteFn};

pub use registry::HandlerRegistry;

pub use router::{Dispatch, Route, Router};

pub use chainroute_pattern::{
    fragment_from_url, normalize_fragment, ParamKind, ParamSpec, PatternError, RoutePattern,
};
