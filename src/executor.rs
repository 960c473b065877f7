//! Postfix execution over a value stack.
//!
//! Values push themselves; operators and functions pop their operands
//! and push one result. Words resolve through the variable table at
//! execution time and unbound words push themselves, acting as plain
//! text. When the input ends, whatever the expression left on the
//! stack is emitted bottom to top, numbers and strings only.

use tracing::debug;

use crate::cancel::CancelToken;
use crate::engine::{FunctionTable, OperatorTable, Variables};
use crate::error::EvalError;
use crate::token::{Token, TokenKind, TokenStack, Value};

/// Strip one layer of surrounding double quotes, if present.
fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}

/// Convert a leftover stack entry into a result, if it carries one.
fn result_value(token: &Token) -> Option<Value> {
    match token.kind() {
        TokenKind::Number => token.as_int().map(Value::Int),
        TokenKind::Str => Some(Value::Text(token.raw().to_string())),
        _ => None,
    }
}

/// Adapter executing postfix tokens and yielding evaluation results.
pub struct Execute<'e, I> {
    upstream: I,
    operators: &'e OperatorTable,
    functions: &'e FunctionTable,
    variables: &'e Variables,
    stack: TokenStack,
    leftovers: Option<std::vec::IntoIter<Token>>,
    done: bool,
    cancel: CancelToken,
}

impl<'e, I> Execute<'e, I>
where
    I: Iterator<Item = Token>,
{
    pub fn new(
        upstream: I,
        operators: &'e OperatorTable,
        functions: &'e FunctionTable,
        variables: &'e Variables,
        cancel: CancelToken,
    ) -> Self {
        Execute {
            upstream,
            operators,
            functions,
            variables,
            stack: TokenStack::new(),
            leftovers: None,
            done: false,
            cancel,
        }
    }

    fn execute(&mut self, token: Token) -> Result<(), EvalError> {
        match token.kind() {
            TokenKind::Number => {
                self.stack.push(token);
                Ok(())
            }
            TokenKind::Str => {
                self.stack.push(Token::str(unquote(token.raw())));
                Ok(())
            }
            TokenKind::Word => {
                match self.variables.get(&token.raw().to_lowercase()) {
                    Some(value) => self.stack.push(Token::from(value)),
                    None => self.stack.push(token),
                }
                Ok(())
            }
            TokenKind::Operator => match self.operators.get(token.raw()) {
                Some(op) => (op.handler)(&mut self.stack),
                None => Err(EvalError::Invalid(format!(
                    "no handler for operator '{}'",
                    token.raw()
                ))),
            },
            TokenKind::Function => match self.functions.get(token.raw()) {
                Some(handler) => handler(&mut self.stack),
                None => Err(EvalError::Invalid(format!(
                    "no handler for function '{}'",
                    token.raw()
                ))),
            },
            TokenKind::Error => Err(EvalError::Invalid(token.raw().to_string())),
            // Brackets and separators never leave the converter; in a
            // hand-built stream they are inert.
            TokenKind::LeftParen
            | TokenKind::RightParen
            | TokenKind::Separator
            | TokenKind::Nil => Ok(()),
        }
    }
}

impl<'e, I> Iterator for Execute<'e, I>
where
    I: Iterator<Item = Token>,
{
    type Item = Result<Value, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.cancel.is_cancelled() {
                return None;
            }
            if let Some(rest) = self.leftovers.as_mut() {
                match rest.next() {
                    Some(token) => {
                        if let Some(value) = result_value(&token) {
                            return Some(Ok(value));
                        }
                    }
                    None => self.done = true,
                }
                continue;
            }
            match self.upstream.next() {
                Some(token) => {
                    if let Err(err) = self.execute(token) {
                        debug!(error = %err, "evaluation failed");
                        self.done = true;
                        return Some(Err(err));
                    }
                }
                None => {
                    // Clean end of input; emit leftovers bottom to top.
                    let stack = std::mem::take(&mut self.stack);
                    self.leftovers = Some(stack.into_tokens().into_iter());
                }
            }
        }
    }
}
