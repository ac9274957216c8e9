//! Argument lists for chain links.
//!
//! Every list is built fresh from a read-only view of the pending URL
//! parameters and the previous link's [`Outcome`]. Lists end in a single
//! `null` sentinel unless their last value already is `null`.

use serde_json::Value;

use crate::handler::Outcome;

/// The argument list of a bracketed link: `[null]`.
pub fn bracketed_args() -> Vec<Value> {
    vec![Value::Null]
}

/// The argument list carrying one URL parameter: `[param, null]`.
///
/// A `null` or absent parameter yields `[null]`, never two nulls.
pub fn param_args(param: Option<&Value>) -> Vec<Value> {
    match param {
        None | Some(Value::Null) => vec![Value::Null],
        Some(value) => vec![value.clone(), Value::Null],
    }
}

/// The argument list threading a previous outcome.
///
/// Remaining parameters come first, unless the next one is `null` or absent,
/// in which case none are kept. A `null` closing the kept parameters is
/// dropped so the outcome values follow the last real parameter. The outcome
/// is spread one level.
pub fn threaded_args(pending: &[Value], outcome: &Outcome) -> Vec<Value> {
    let mut args = match pending.first() {
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            let end = if pending.len() > 1 && pending.last() == Some(&Value::Null) {
                pending.len() - 1
            } else {
                pending.len()
            };
            pending[..end].to_vec()
        }
    };

    match outcome {
        Outcome::NoResult => {}
        Outcome::Single(value) => args.push(value.clone()),
        Outcome::Multiple(values) => args.extend(values.iter().cloned()),
    }

    if args.last() != Some(&Value::Null) {
        args.push(Value::Null);
    }
    args
}

/// Arguments for the first link of a chain.
pub fn entry_args(pending: &[Value], bracketed: bool) -> Vec<Value> {
    if bracketed {
        bracketed_args()
    } else {
        param_args(pending.first())
    }
}

/// Arguments for any link after the first.
pub fn next_args(pending: &[Value], outcome: &Outcome, bracketed: bool) -> Vec<Value> {
    if bracketed {
        bracketed_args()
    } else if outcome.is_present() {
        threaded_args(pending, outcome)
    } else {
        param_args(pending.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_args_never_double_null() {
        assert_eq!(param_args(Some(&json!("15"))), vec![json!("15"), Value::Null]);
        assert_eq!(param_args(Some(&Value::Null)), vec![Value::Null]);
        assert_eq!(param_args(None), vec![Value::Null]);
    }

    #[test]
    fn test_threaded_single_after_query_slot() {
        // Only the query slot is left: it is dropped, the value leads.
        let args = threaded_args(&[Value::Null], &Outcome::Single(json!("somestring")));
        assert_eq!(args, vec![json!("somestring"), Value::Null]);
    }

    #[test]
    fn test_threaded_with_no_pending() {
        let args = threaded_args(&[], &Outcome::Single(json!(3)));
        assert_eq!(args, vec![json!(3), Value::Null]);
    }

    #[test]
    fn test_threaded_multiple_follows_parameter() {
        let pending = [json!("15"), Value::Null];
        let outcome = Outcome::Multiple(vec![json!("somestring"), json!({"foo": "bar"}), json!(true)]);
        assert_eq!(
            threaded_args(&pending, &outcome),
            vec![
                json!("15"),
                json!("somestring"),
                json!({"foo": "bar"}),
                json!(true),
                Value::Null
            ]
        );
    }

    #[test]
    fn test_threaded_keeps_all_remaining_parameters() {
        let pending = [json!("1"), json!("2"), Value::Null];
        let args = threaded_args(&pending, &Outcome::Single(json!("r")));
        assert_eq!(args, vec![json!("1"), json!("2"), json!("r"), Value::Null]);
    }

    #[test]
    fn test_threaded_single_parameter_without_sentinel() {
        let args = threaded_args(&[json!("q=1")], &Outcome::Single(json!("r")));
        assert_eq!(args, vec![json!("q=1"), json!("r"), Value::Null]);
    }

    #[test]
    fn test_threaded_spreads_one_level_only() {
        let outcome = Outcome::Multiple(vec![json!([1, 2]), json!(3)]);
        assert_eq!(
            threaded_args(&[], &outcome),
            vec![json!([1, 2]), json!(3), Value::Null]
        );
    }

    #[test]
    fn test_threaded_no_extra_sentinel_when_result_ends_null() {
        let outcome = Outcome::Multiple(vec![json!("a"), Value::Null]);
        assert_eq!(threaded_args(&[], &outcome), vec![json!("a"), Value::Null]);
    }

    #[test]
    fn test_threaded_empty_list_result() {
        assert_eq!(threaded_args(&[], &Outcome::Multiple(vec![])), vec![Value::Null]);
    }

    #[test]
    fn test_next_args_bracketed_ignores_everything() {
        let pending = [json!("2"), Value::Null];
        assert_eq!(
            next_args(&pending, &Outcome::Single(json!("x")), true),
            vec![Value::Null]
        );
        assert_eq!(next_args(&pending, &Outcome::NoResult, true), vec![Value::Null]);
    }

    #[test]
    fn test_next_args_without_outcome_takes_next_param() {
        let pending = [json!("2"), Value::Null];
        assert_eq!(
            next_args(&pending, &Outcome::NoResult, false),
            vec![json!("2"), Value::Null]
        );
        assert_eq!(next_args(&[], &Outcome::NoResult, false), vec![Value::Null]);
    }

    #[test]
    fn test_entry_args() {
        let pending = [json!("15"), Value::Null];
        assert_eq!(entry_args(&pending, false), vec![json!("15"), Value::Null]);
        assert_eq!(entry_args(&pending, true), vec![Value::Null]);
        assert_eq!(entry_args(&[Value::Null], false), vec![Value::Null]);
    }
}
