//! Common test utilities for shunt integration tests

pub use shunt::{CancelToken, Engine, EvalError, Token, TokenStack, Value};

/// Engine with the default tables and the sample variable bindings.
pub fn sample_engine() -> Engine {
    let mut engine = Engine::with_defaults();
    engine
        .set_variable("svar", "test")
        .set_variable("ivar", 123)
        .set_variable("fvar", 321.0)
        .set_variable("j", r#"{"one": {"two": 3, "four": [5, "six", 7]}}"#)
        .set_variable("key1", "one")
        .set_variable("key2", 1);
    engine
}

/// Helper to evaluate input and return the first result.
pub fn eval(input: &str) -> Result<Option<Value>, EvalError> {
    sample_engine().eval_single(&CancelToken::new(), input)
}

/// Helper to evaluate input and collect every result.
#[allow(dead_code)]
pub fn eval_all(input: &str) -> Vec<Result<Value, EvalError>> {
    let engine = sample_engine();
    let cancel = CancelToken::new();
    engine.eval(&cancel, input).collect()
}
