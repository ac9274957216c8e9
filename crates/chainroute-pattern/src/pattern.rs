//! Route pattern compilation and parameter extraction.

use std::borrow::Cow;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use regex::Regex;

use crate::error::{PatternError, Result};

/// Expression for a `:name` parameter: one path segment, no query.
const NAMED_PARAM: &str = "([^/?]+)";
/// Expression for a `*name` splat: anything up to the query string.
const SPLAT_PARAM: &str = "([^?]*?)";
/// Every route accepts an optional trailing query, captured last.
const QUERY_SUFFIX: &str = r"(?:\?([\s\S]*))?$";

/// How a declared parameter matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// `:name`, a single path segment
    Named,
    /// `*name`, may span several segments
    Splat,
}

/// A parameter declared in a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name without its `:` or `*` marker
    pub name: String,
    /// Matching behavior
    pub kind: ParamKind,
    /// True when declared inside an optional `( … )` group
    pub optional: bool,
}

/// A compiled route.
///
/// Created either from route syntax with [`RoutePattern::compile`] or from a
/// hand-written expression with [`RoutePattern::from_regex`].
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
    params: Vec<ParamSpec>,
}

impl RoutePattern {
    /// Compiles route syntax into an anchored expression.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::UnbalancedParen`] when optional groups are not
    /// balanced.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chainroute_pattern::{ParamKind, RoutePattern};
    ///
    /// let pattern = RoutePattern::compile("docs/*path(/v:version)").unwrap();
    /// assert_eq!(pattern.param_names(), vec!["path", "version"]);
    /// assert_eq!(pattern.params()[0].kind, ParamKind::Splat);
    /// assert!(pattern.params()[1].optional);
    /// ```
    pub fn compile(route: &str) -> Result<Self> {
        let mut expr = String::with_capacity(route.len() * 2 + QUERY_SUFFIX.len() + 1);
        let mut params = Vec::new();
        let mut open_groups: Vec<usize> = Vec::new();
        let mut chars = route.char_indices().peekable();

        expr.push('^');
        while let Some((position, c)) = chars.next() {
            match c {
                '(' => {
                    open_groups.push(position);
                    expr.push_str("(?:");
                }
                ')' => {
                    if open_groups.pop().is_none() {
                        return Err(PatternError::UnbalancedParen {
                            route: route.to_string(),
                            position,
                        });
                    }
                    expr.push_str(")?");
                }
                ':' | '*' => {
                    let name = take_word(&mut chars);
                    if name.is_empty() {
                        push_literal(&mut expr, c);
                        continue;
                    }
                    let kind = if c == ':' {
                        ParamKind::Named
                    } else {
                        ParamKind::Splat
                    };
                    expr.push_str(match kind {
                        ParamKind::Named => NAMED_PARAM,
                        ParamKind::Splat => SPLAT_PARAM,
                    });
                    params.push(ParamSpec {
                        name,
                        kind,
                        optional: !open_groups.is_empty(),
                    });
                }
                other => push_literal(&mut expr, other),
            }
        }

        if let Some(position) = open_groups.pop() {
            return Err(PatternError::UnbalancedParen {
                route: route.to_string(),
                position,
            });
        }
        expr.push_str(QUERY_SUFFIX);

        let regex = Regex::new(&expr)?;
        log::trace!("compiled route '{}' to {}", route, regex.as_str());

        Ok(Self {
            source: route.to_string(),
            regex,
            params,
        })
    }

    /// Wraps an expression written by hand.
    ///
    /// Capture groups are extracted in order; the last group is treated as the
    /// query string and left undecoded, like compiled routes.
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            source: regex.as_str().to_string(),
            regex,
            params: Vec::new(),
        }
    }

    /// The declaration this pattern was built from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled expression.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Parameters declared in the route, in order.
    ///
    /// Empty for patterns built with [`RoutePattern::from_regex`].
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Names of the declared parameters, in order.
    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    /// Returns true if the fragment matches this route.
    pub fn is_match(&self, fragment: &str) -> bool {
        self.regex.is_match(fragment)
    }

    /// Extracts the ordered parameter list from a matching fragment.
    ///
    /// Returns `None` when the fragment does not match. Otherwise there is one
    /// entry per capture group: empty or missing captures are `None`, path
    /// parameters are percent-decoded, and the final entry (the query string)
    /// is returned as written.
    pub fn extract(&self, fragment: &str) -> Option<Vec<Option<String>>> {
        let captures = self.regex.captures(fragment)?;
        let last = captures.len().saturating_sub(1);

        let params = (1..captures.len())
            .map(|i| {
                let raw = captures
                    .get(i)
                    .map(|m| m.as_str())
                    .filter(|s| !s.is_empty());
                if i == last {
                    raw.map(String::from)
                } else {
                    raw.map(decode_param)
                }
            })
            .collect();

        Some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn take_word(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut word = String::new();
    while let Some((_, c)) = chars.next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '_') {
        word.push(c);
    }
    word
}

fn push_literal(expr: &mut String, c: char) {
    let mut buf = [0u8; 4];
    expr.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

fn decode_param(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(err) => {
            log::warn!("keeping undecodable parameter '{}': {}", raw, err);
            raw.to_string()
        }
    }
}
