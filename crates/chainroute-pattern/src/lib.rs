//! Route patterns for fragment-based routers.
//!
//! This crate turns route declarations such as `"posts/:post_id"` or
//! `"docs/*path(/v:version)"` into anchored regular expressions and extracts
//! the ordered parameter list a matching URL fragment carries.
//!
//! # Route Syntax
//!
//! | Token | Meaning | Expression |
//! |-------|---------|------------|
//! | `:name` | one path segment | `([^/?]+)` |
//! | `*name` | splat, may span `/` | `([^?]*?)` |
//! | `( … )` | optional group | `(?: … )?` |
//! | anything else | literal text | escaped |
//!
//! Every compiled pattern accepts a trailing `?query`, captured as the last
//! parameter.
//!
//! # Quick Start
//!
//! ```rust
//! use chainroute_pattern::RoutePattern;
//!
//! let pattern = RoutePattern::compile("post/:post_id/comments/:comment_id").unwrap();
//! let params = pattern.extract("post/1/comments/2").unwrap();
//! assert_eq!(params, vec![Some("1".into()), Some("2".into()), None]);
//!
//! let with_query = pattern.extract("post/1/comments/2?sort=asc").unwrap();
//! assert_eq!(with_query[2].as_deref(), Some("sort=asc"));
//! ```
//!
//! # Fragments
//!
//! [`normalize_fragment`] and [`fragment_from_url`] reduce a raw location to
//! the fragment patterns are matched against.

mod error;
mod fragment;
mod pattern;

pub use error::{PatternError, Result};
pub use fragment::{fragment_from_url, normalize_fragment, strip_root};
pub use pattern::{ParamKind, ParamSpec, RoutePattern};
