//! Integration tests for cooperative cancellation

#[path = "common/mod.rs"]
mod common;
#[allow(unused_imports)]
use common::{sample_engine, CancelToken, Value};

use std::time::Duration;

#[test]
fn test_cancelled_before_start() {
    let engine = sample_engine();
    let cancel = CancelToken::new();
    cancel.cancel();
    assert_eq!(engine.eval_single(&cancel, "2 + 2").unwrap(), None);
}

#[test]
fn test_expired_deadline_yields_nothing() {
    let engine = sample_engine();
    let cancel = CancelToken::with_deadline(Duration::from_secs(0));
    assert_eq!(engine.eval_single(&cancel, "2 + 2").unwrap(), None);
}

#[test]
fn test_future_deadline_completes() {
    let engine = sample_engine();
    let cancel = CancelToken::with_deadline(Duration::from_secs(3600));
    assert_eq!(
        engine.eval_single(&cancel, "2 + 2").unwrap(),
        Some(Value::Int(4))
    );
}

#[test]
fn test_cancel_mid_stream() {
    let engine = sample_engine();
    let cancel = CancelToken::new();
    let mut results = engine.eval(&cancel, "1 2 3");
    assert_eq!(results.next(), Some(Ok(Value::Int(1))));
    cancel.cancel();
    assert_eq!(results.next(), None);
}

#[test]
fn test_cancel_from_another_thread() {
    let engine = sample_engine();
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    std::thread::spawn(move || remote.cancel())
        .join()
        .expect("cancel thread");
    assert_eq!(engine.eval_single(&cancel, "2 + 2").unwrap(), None);
}

#[test]
fn test_cancellation_is_not_an_error() {
    let engine = sample_engine();
    let cancel = CancelToken::new();
    cancel.cancel();
    // A token already fired yields no item at all, not an Err.
    let results: Vec<_> = engine.eval(&cancel, "1 / 0").collect();
    assert_eq!(results, vec![]);
    assert!(cancel.is_cancelled());
}
