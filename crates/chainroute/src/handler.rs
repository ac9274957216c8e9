//! Route handler types.
//!
//! A handler is one link of a route chain. It receives the argument list the
//! chain built for it and returns a JSON value, which the chain normalizes into
//! an [`Outcome`] to decide what the next handler receives.
//!
//! # State Management: App State vs Extensions
//!
//! [`RouteContext`] carries two containers:
//!
//! | Field | Mutability | Lifetime | Purpose |
//! |-------|------------|----------|---------|
//! | `app_state` | Immutable (`&`) | Router lifetime (shared via Rc) | Stores, clients, settings |
//! | `extensions` | Mutable (`&mut`) in hooks | One navigation | Per-navigation state |
//!
//! Pre-execute hooks write into `extensions`; handlers read from both.
//!
//! # Core Types
//!
//! - [`Handler`]: trait for chain links (`&mut self`)
//! - [`FnHandler`] / [`SimpleFnHandler`]: closure adapters
//! - [`SharedHandler`]: a handler reference that chains hold
//! - [`Outcome`]: the tagged view of a handler's return value

use serde::Serialize;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Type-keyed container for injecting state into handlers.
///
/// # Example
///
/// ```rust
/// use chainroute::Extensions;
///
/// struct Session { user: String }
///
/// let mut ext = Extensions::new();
/// ext.insert(Session { user: "ada".into() });
/// assert_eq!(ext.get_required::<Session>()?.user, "ada");
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any>>,
}

impl Extensions {
    /// Creates a new empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value of the same type.
    pub fn insert<T: 'static>(&mut self, val: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(val))
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut())
    }

    /// Like [`Extensions::get`], but a missing value is an error.
    pub fn get_required<T: 'static>(&self) -> Result<&T, anyhow::Error> {
        self.get::<T>().ok_or_else(|| {
            anyhow::anyhow!(
                "Extension missing: type {} not found in route context",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}

/// Context passed to every handler of a chain.
///
/// One context is built per navigation. `segment` is updated by the chain
/// before each handler runs, so a handler shared between chains can tell
/// which link it is playing.
#[derive(Debug)]
pub struct RouteContext {
    /// The route name as declared (e.g. `"[posts].post"`)
    pub route: String,

    /// The fragment that matched
    pub fragment: String,

    /// Name of the segment currently executing (brackets stripped)
    pub segment: String,

    /// Immutable router-level state.
    pub app_state: Rc<Extensions>,

    /// Per-navigation state, usually filled by pre-execute hooks.
    pub extensions: Extensions,
}

impl RouteContext {
    /// Creates a context for one navigation of `route`.
    pub fn new(
        route: impl Into<String>,
        fragment: impl Into<String>,
        app_state: Rc<Extensions>,
    ) -> Self {
        Self {
            route: route.into(),
            fragment: fragment.into(),
            segment: String::new(),
            app_state,
            extensions: Extensions::new(),
        }
    }
}

impl Default for RouteContext {
    fn default() -> Self {
        Self::new("", "", Rc::new(Extensions::new()))
    }
}

/// What a handler produced, as far as the next link is concerned.
///
/// `Null`, `false`, numeric zero and the empty string all count as no result:
/// the next handler then receives the next URL parameter instead. Arrays are
/// spread into the next argument list, even when empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to thread forward
    NoResult,
    /// One value, appended to the next argument list
    Single(Value),
    /// Several values, spread into the next argument list
    Multiple(Vec<Value>),
}

impl Outcome {
    /// Normalizes a handler's return value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => Outcome::NoResult,
            Value::String(ref s) if s.is_empty() => Outcome::NoResult,
            Value::Number(ref n) if n.as_f64() == Some(0.0) => Outcome::NoResult,
            Value::Array(values) => Outcome::Multiple(values),
            other => Outcome::Single(other),
        }
    }

    /// Returns true if there is something to thread forward.
    pub fn is_present(&self) -> bool {
        !matches!(self, Outcome::NoResult)
    }
}

/// The result type for handlers.
pub type HandlerResult = Result<Value, anyhow::Error>;

/// Conversion into a [`HandlerResult`].
///
/// Implemented for any `Result<T, E>` whose `T` serializes to JSON, so
/// closures can return domain types, `()` (which becomes `null`), or a
/// `serde_json::Value` directly.
///
/// ```rust
/// use chainroute::IntoHandlerResult;
/// use serde_json::json;
///
/// let unit = Ok::<_, anyhow::Error>(()).into_handler_result().unwrap();
/// assert!(unit.is_null());
///
/// let list = Ok::<_, anyhow::Error>(vec!["a", "b"]).into_handler_result().unwrap();
/// assert_eq!(list, json!(["a", "b"]));
/// ```
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> HandlerResult;
}

impl<T, E> IntoHandlerResult for Result<T, E>
where
    T: Serialize,
    E: Into<anyhow::Error>,
{
    fn into_handler_result(self) -> HandlerResult {
        let value = self.map_err(Into::into)?;
        Ok(serde_json::to_value(value)?)
    }
}

/// Trait for chain links.
///
/// Handlers take `&mut self`, so they may keep state between navigations.
///
/// # Example
///
/// ```rust
/// use chainroute::{Handler, HandlerResult, RouteContext};
/// use serde_json::{json, Value};
///
/// struct Visits { count: u64 }
///
/// impl Handler for Visits {
///     fn handle(&mut self, _args: &[Value], _ctx: &RouteContext) -> HandlerResult {
///         self.count += 1;
///         Ok(json!(self.count))
///     }
/// }
/// ```
pub trait Handler {
    /// Runs the handler with the argument list the chain built for it.
    fn handle(&mut self, args: &[Value], ctx: &RouteContext) -> HandlerResult;
}

/// A handler reference. Chains and registries hold these; the same reference
/// may appear in several chains.
pub type SharedHandler = Rc<RefCell<dyn Handler>>;

/// Wraps a handler into a [`SharedHandler`].
pub fn shared<H: Handler + 'static>(handler: H) -> SharedHandler {
    Rc::new(RefCell::new(handler))
}

/// Adapter implementing [`Handler`] for `FnMut` closures.
///
/// ```rust
/// use chainroute::{FnHandler, Handler, RouteContext};
/// use serde_json::Value;
///
/// let mut handler = FnHandler::new(|args: &[Value], ctx: &RouteContext| {
///     Ok::<_, anyhow::Error>(format!("{} got {} args", ctx.segment, args.len()))
/// });
/// let out = handler.handle(&[Value::Null], &RouteContext::default()).unwrap();
/// assert_eq!(out, " got 1 args");
/// ```
pub struct FnHandler<F, R> {
    f: F,
    _phantom: std::marker::PhantomData<fn() -> R>,
}

impl<F, R> FnHandler<F, R>
where
    F: FnMut(&[Value], &RouteContext) -> R,
    R: IntoHandlerResult,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<F, R> Handler for FnHandler<F, R>
where
    F: FnMut(&[Value], &RouteContext) -> R,
    R: IntoHandlerResult,
{
    fn handle(&mut self, args: &[Value], ctx: &RouteContext) -> HandlerResult {
        (self.f)(args, ctx).into_handler_result()
    }
}

/// A handler adapter for closures that ignore the [`RouteContext`].
pub struct SimpleFnHandler<F, R> {
    f: F,
    _phantom: std::marker::PhantomData<fn() -> R>,
}

impl<F, R> SimpleFnHandler<F, R>
where
    F: FnMut(&[Value]) -> R,
    R: IntoHandlerResult,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<F, R> Handler for SimpleFnHandler<F, R>
where
    F: FnMut(&[Value]) -> R,
    R: IntoHandlerResult,
{
    fn handle(&mut self, args: &[Value], _ctx: &RouteContext) -> HandlerResult {
        (self.f)(args).into_handler_result()
    }
}
