//! Property-based tests for chain argument threading.

use std::cell::RefCell;
use std::rc::Rc;

use chainroute::{
    shared, threaded_args, Chain, ChainSegment, HandlerRegistry, Outcome, RouteContext,
    SimpleFnHandler,
};
use proptest::prelude::*;
use serde_json::Value;

// ============================================================================
// Strategies
// ============================================================================

/// Values a handler may return that count as a present result.
fn present_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(Value::from),
        (1i64..1000).prop_map(Value::from),
        Just(Value::Bool(true)),
    ]
}

fn url_params() -> impl Strategy<Value = Vec<Value>> {
    (prop::collection::vec("[a-z0-9]{1,6}", 0..4), any::<bool>()).prop_map(|(params, query)| {
        let mut values: Vec<Value> = params.into_iter().map(Value::from).collect();
        values.push(if query {
            Value::from("q=1")
        } else {
            Value::Null
        });
        values
    })
}

/// Chain shape: one flag per link, `true` meaning bracketed.
fn chain_shape() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 2..5)
}

type Log = Rc<RefCell<Vec<(usize, Vec<Value>)>>>;

fn recording_chain(shape: &[bool], returns: Value, log: &Log) -> Chain {
    let segments = shape
        .iter()
        .enumerate()
        .map(|(index, &bracketed)| {
            let log = log.clone();
            let returns = returns.clone();
            let handler = shared(SimpleFnHandler::new(move |args: &[Value]| {
                log.borrow_mut().push((index, args.to_vec()));
                Ok::<_, anyhow::Error>(returns.clone())
            }));
            let name = format!("link{}", index);
            if bracketed {
                ChainSegment::bracketed(name, handler)
            } else {
                ChainSegment::new(name, handler)
            }
        })
        .collect();
    Chain::from_segments("generated", segments).unwrap()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn bracketed_links_always_receive_single_null(
        shape in chain_shape(),
        params in url_params(),
        returns in present_scalar(),
    ) {
        let log = Log::default();
        let chain = recording_chain(&shape, returns, &log);
        chain.invoke(&params, &mut RouteContext::default()).unwrap();

        for (index, args) in log.borrow().iter() {
            if shape[*index] {
                prop_assert_eq!(args, &vec![Value::Null]);
            }
        }
    }

    #[test]
    fn every_argument_list_ends_in_one_null(
        shape in chain_shape(),
        params in url_params(),
        returns in present_scalar(),
    ) {
        let log = Log::default();
        let chain = recording_chain(&shape, returns, &log);
        chain.invoke(&params, &mut RouteContext::default()).unwrap();

        prop_assert_eq!(log.borrow().len(), shape.len());
        for (_, args) in log.borrow().iter() {
            prop_assert_eq!(args.last(), Some(&Value::Null));
            let nulls_at_end = args.iter().rev().take_while(|v| v.is_null()).count();
            prop_assert_eq!(nulls_at_end, 1);
        }
    }

    #[test]
    fn scalar_result_follows_remaining_params(
        pending in prop::collection::vec("[a-z]{1,4}".prop_map(Value::from), 1..4),
        value in present_scalar(),
    ) {
        let args = threaded_args(&pending, &Outcome::Single(value.clone()));

        let mut expected = pending.clone();
        expected.push(value);
        expected.push(Value::Null);
        prop_assert_eq!(args, expected);
    }

    #[test]
    fn list_result_is_spread_one_level(
        values in prop::collection::vec(present_scalar(), 0..4),
    ) {
        let nested = Value::Array(vec![Value::from("inner")]);
        let mut result = values.clone();
        result.push(nested.clone());

        let args = threaded_args(&[Value::Null], &Outcome::Multiple(result));

        let mut expected = values;
        expected.push(nested);
        expected.push(Value::Null);
        prop_assert_eq!(args, expected);
    }

    #[test]
    fn resolving_a_chain_is_idempotent(
        shape in chain_shape(),
    ) {
        let mut registry = HandlerRegistry::new();
        let name = shape
            .iter()
            .enumerate()
            .map(|(index, &bracketed)| {
                let segment = format!("h{}", index);
                registry.register_fn(segment.clone(), |_: &[Value], _: &RouteContext| {
                    Ok::<_, anyhow::Error>(())
                });
                if bracketed { format!("[{}]", segment) } else { segment }
            })
            .collect::<Vec<_>>()
            .join(".");

        let first = Chain::resolve(&name, &registry).unwrap();
        let second = Chain::resolve(&name, &registry).unwrap();

        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.segments().iter().zip(second.segments()) {
            prop_assert_eq!(&a.name, &b.name);
            prop_assert_eq!(a.bracketed, b.bracketed);
            prop_assert!(Rc::ptr_eq(&a.handler, &b.handler));
        }
    }
}
