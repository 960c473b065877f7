//! Error type shared by every pipeline stage.

use thiserror::Error;

/// Errors produced while evaluating an expression.
///
/// A failing stage emits one error and the whole pipeline shuts down;
/// downstream stages forward it without adding noise of their own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The expression could not be read: an unrecognized character, an
    /// unterminated string, an unknown operator, or unbalanced brackets.
    #[error("invalid expression: {0}")]
    Invalid(String),
    #[error("type error: {0}")]
    Type(String),
    #[error("division by zero")]
    DivideByZero,
    /// JSON navigation failed in the `.` operator.
    #[error("json error: {0}")]
    Json(String),
    #[error("not an integer: {0}")]
    NotInteger(String),
    /// A user-registered handler reported a failure of its own.
    #[error("handler error: {0}")]
    Handler(String),
}
