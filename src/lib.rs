//! shunt - streaming infix expression evaluation
//!
//! # Overview
//!
//! shunt evaluates textual expressions like `2 + 2 * 2` or
//! `price.amount >= limit` against pluggable operator, function, and
//! variable tables. An expression flows through four lazy stages:
//! the scanner cuts text into lexemes, the classifier resolves them
//! into typed tokens, the converter reorders infix to postfix, and
//! the executor reduces the postfix stream on a value stack.
//!
//! # Core Concepts
//!
//! ## Streaming Stages
//!
//! ```text
//! "2 + 3 * 4"                          input text
//!   | scanner                          2, +, 3, *, 4
//!   | classifier                       Number(2), Op(+), ...
//!   | converter                        2 3 4 * +
//!   | executor                         Int(14)
//! ```
//!
//! Every stage checks a shared [`CancelToken`] between items, so a
//! long evaluation can be stopped from another thread or by deadline.
//! A failure anywhere travels down the pipeline as a single in-band
//! error and surfaces once.
//!
//! ## Registries
//!
//! Operators (`+`, `==`, `.`) and functions (`min`, `len`) are named
//! handlers that pop operands from the value stack and push a result.
//! Variables bind names to integers, floats, booleans, or text, and
//! are substituted when a bare word executes.
//!
//! # Example
//!
//! ```rust
//! use shunt::{CancelToken, Engine, Value};
//!
//! let mut engine = Engine::with_defaults();
//! engine.set_variable("price", 120);
//! let result = engine
//!     .eval_single(&CancelToken::new(), "price * 2 + 1")
//!     .unwrap();
//! assert_eq!(result, Some(Value::Int(241)));
//! ```

pub mod builtins;
pub mod cancel;
pub mod classify;
pub mod engine;
pub mod error;
pub mod executor;
pub mod postfix;
pub mod scanner;
pub mod token;

// Re-export commonly used items
pub use builtins::{default_functions, default_operators};
pub use cancel::CancelToken;
pub use classify::Classify;
pub use engine::{
    Engine, EngineConfig, FunctionTable, Handler, Operator, OperatorTable, Results, Variables,
};
pub use error::EvalError;
pub use executor::Execute;
pub use postfix::ToPostfix;
pub use scanner::Scanner;
pub use token::{Lexeme, LexemeKind, Token, TokenKind, TokenStack, Value, VarValue};

/// Convenience function to evaluate one expression with the default
/// tables and no variables.
pub fn eval(input: &str) -> Result<Option<Value>, EvalError> {
    Engine::with_defaults().eval_single(&CancelToken::new(), input)
}
