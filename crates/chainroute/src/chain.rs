//! Handler chains.
//!
//! A chain name such as `"post.[comments].comment"` declares, left to right,
//! the handlers one route runs. Each link receives either the next URL
//! parameter or the previous link's result; a link written in brackets
//! receives only `[null]` and leaves the parameters for later links.
//!
//! ```text
//! post/1/comments/2   →   params ["1", "2", null]
//!
//!   post      ("1", null)          consumes "1"
//!   comments  (null)               bracketed, consumes nothing
//!   comment   ("2", null)          consumes "2"
//! ```
//!
//! When a link returns a value, the next unbracketed link receives the
//! remaining parameters followed by that value (arrays are spread):
//!
//! ```text
//! posts/15 → "[posts].post", posts() returns ["somestring", {"foo": "bar"}, true]
//!
//!   posts  (null)
//!   post   ("15", "somestring", {"foo": "bar"}, true, null)
//! ```
//!
//! Bracket flags live on the chain's segments, never on the handler, so one
//! handler reference can be bracketed in one chain and plain in another.

use std::fmt;

use serde_json::Value;

use crate::args::{entry_args, next_args};
use crate::error::ChainError;
use crate::handler::{Outcome, RouteContext, SharedHandler};
use crate::registry::HandlerRegistry;

/// One parsed segment of a chain name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentName {
    /// Handler name with brackets stripped
    pub name: String,
    /// True when written as `[name]`
    pub bracketed: bool,
}

/// Returns true if `name` declares more than one link.
pub fn is_chained(name: &str) -> bool {
    name.contains('.')
}

/// Parses a chain name into its segments.
///
/// ```text
/// segment   ::= plainName | "[" plainName "]"
/// chainName ::= segment ("." segment)*
/// ```
///
/// # Example
///
/// ```rust
/// use chainroute::parse_chain;
///
/// let segments = parse_chain("post.[comments].comment").unwrap();
/// let flags: Vec<_> = segments.iter().map(|s| (s.name.as_str(), s.bracketed)).collect();
/// assert_eq!(flags, vec![("post", false), ("comments", true), ("comment", false)]);
/// ```
pub fn parse_chain(chain: &str) -> Result<Vec<SegmentName>, ChainError> {
    chain
        .split('.')
        .map(|raw| parse_segment(raw, chain))
        .collect()
}

fn parse_segment(raw: &str, chain: &str) -> Result<SegmentName, ChainError> {
    let malformed = || ChainError::MalformedSegment {
        segment: raw.to_string(),
        chain: chain.to_string(),
    };

    let (name, bracketed) = match raw.strip_prefix('[') {
        Some(inner) => (inner.strip_suffix(']').ok_or_else(malformed)?, true),
        None => (raw, false),
    };

    if name.is_empty() || name.contains(|c| c == '[' || c == ']') {
        return Err(malformed());
    }

    Ok(SegmentName {
        name: name.to_string(),
        bracketed,
    })
}

/// A resolved link: a handler reference plus its bracket flag.
#[derive(Clone)]
pub struct ChainSegment {
    pub name: String,
    pub handler: SharedHandler,
    pub bracketed: bool,
}

impl ChainSegment {
    pub fn new(name: impl Into<String>, handler: SharedHandler) -> Self {
        Self {
            name: name.into(),
            handler,
            bracketed: false,
        }
    }

    /// A link that receives only `[null]`.
    pub fn bracketed(name: impl Into<String>, handler: SharedHandler) -> Self {
        Self {
            name: name.into(),
            handler,
            bracketed: true,
        }
    }
}

impl fmt::Debug for ChainSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainSegment")
            .field("name", &self.name)
            .field("bracketed", &self.bracketed)
            .finish_non_exhaustive()
    }
}

/// The composite callback of one route.
///
/// Built once when the route is registered and immutable afterwards; each
/// [`Chain::invoke`] works on its own argument lists.
#[derive(Clone, Debug)]
pub struct Chain {
    name: String,
    segments: Vec<ChainSegment>,
}

impl Chain {
    /// Resolves every segment of `name` against the registry.
    ///
    /// # Errors
    ///
    /// [`ChainError::MalformedSegment`] for names outside the chain grammar and
    /// [`ChainError::MissingHandler`] for the first segment with no handler.
    pub fn resolve(name: &str, registry: &HandlerRegistry) -> Result<Self, ChainError> {
        let segments = parse_chain(name)?
            .into_iter()
            .map(|segment| {
                let handler = registry.resolve(&segment.name, name)?;
                Ok(ChainSegment {
                    name: segment.name,
                    handler,
                    bracketed: segment.bracketed,
                })
            })
            .collect::<Result<Vec<_>, ChainError>>()?;

        Self::from_segments(name, segments)
    }

    /// Builds a chain from an explicit handler list.
    ///
    /// Bracket flags are read positionally from `name`: in `"[a].b"` the first
    /// handler is bracketed. An empty name brackets nothing.
    ///
    /// # Errors
    ///
    /// [`ChainError::ArityMismatch`] when a non-empty name has a different
    /// number of segments than there are handlers.
    pub fn from_handlers(name: &str, handlers: Vec<SharedHandler>) -> Result<Self, ChainError> {
        if handlers.is_empty() {
            return Err(ChainError::EmptyChain {
                chain: name.to_string(),
            });
        }

        let segments = if name.is_empty() {
            handlers
                .into_iter()
                .enumerate()
                .map(|(i, handler)| ChainSegment::new(format!("#{i}"), handler))
                .collect()
        } else {
            let names = parse_chain(name)?;
            if names.len() != handlers.len() {
                return Err(ChainError::ArityMismatch {
                    chain: name.to_string(),
                    segments: names.len(),
                    handlers: handlers.len(),
                });
            }
            names
                .into_iter()
                .zip(handlers)
                .map(|(segment, handler)| ChainSegment {
                    name: segment.name,
                    handler,
                    bracketed: segment.bracketed,
                })
                .collect()
        };

        Self::from_segments(name, segments)
    }

    /// Builds a chain from fully specified segments.
    pub fn from_segments(name: &str, segments: Vec<ChainSegment>) -> Result<Self, ChainError> {
        if segments.is_empty() {
            return Err(ChainError::EmptyChain {
                chain: name.to_string(),
            });
        }
        log::debug!(
            "built chain '{}': [{}]",
            name,
            segments
                .iter()
                .map(|s| if s.bracketed {
                    format!("[{}]", s.name)
                } else {
                    s.name.clone()
                })
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Links in execution order.
    pub fn segments(&self) -> &[ChainSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; chains are never empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Runs every link left to right and returns the last link's value.
    ///
    /// `params` is the ordered parameter list extracted from the URL. A chain
    /// of one unbracketed link receives it unchanged.
    ///
    /// # Errors
    ///
    /// The first failing handler stops the chain with
    /// [`ChainError::Handler`]; later links do not run.
    pub fn invoke(&self, params: &[Value], ctx: &mut RouteContext) -> Result<Value, ChainError> {
        let Some((first, rest)) = self.segments.split_first() else {
            return Ok(Value::Null);
        };

        if rest.is_empty() && !first.bracketed {
            return self.call(0, first, params, ctx);
        }

        let mut cursor = 0;
        let mut result = self.call(0, first, &entry_args(params, first.bracketed), ctx)?;
        if !first.bracketed {
            cursor += 1;
        }

        for (offset, segment) in rest.iter().enumerate() {
            let pending = params.get(cursor..).unwrap_or(&[]);
            let outcome = Outcome::from_value(result);
            let args = next_args(pending, &outcome, segment.bracketed);
            result = self.call(offset + 1, segment, &args, ctx)?;
            if !segment.bracketed {
                cursor += 1;
            }
        }

        Ok(result)
    }

    fn call(
        &self,
        position: usize,
        segment: &ChainSegment,
        args: &[Value],
        ctx: &mut RouteContext,
    ) -> Result<Value, ChainError> {
        log::trace!(
            "chain '{}' link {} '{}' with {} args",
            self.name,
            position,
            segment.name,
            args.len()
        );
        ctx.segment.clone_from(&segment.name);

        let mut handler =
            segment
                .handler
                .try_borrow_mut()
                .map_err(|_| ChainError::Reentrant {
                    segment: segment.name.clone(),
                })?;

        handler
            .handle(args, ctx)
            .map_err(|source| ChainError::Handler {
                segment: segment.name.clone(),
                position,
                source,
            })
    }
}
