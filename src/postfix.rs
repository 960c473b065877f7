//! Infix to postfix reordering (shunting yard).
//!
//! Values pass straight through. Operators wait on an auxiliary stack
//! until an incoming operator of lower precedence, a bracket boundary,
//! or the end of input flushes them. The precedence comparison is `>=`
//! for every operator, so equal-precedence chains always group left to
//! right; the declared associativity flag rides along as data only.

use std::collections::VecDeque;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::token::{Token, TokenKind, TokenStack};

/// Adapter reordering classified tokens into postfix order.
pub struct ToPostfix<I> {
    upstream: I,
    pending: TokenStack,
    out: VecDeque<Token>,
    done: bool,
    cancel: CancelToken,
}

impl<I> ToPostfix<I>
where
    I: Iterator<Item = Token>,
{
    pub fn new(upstream: I, cancel: CancelToken) -> Self {
        ToPostfix {
            upstream,
            pending: TokenStack::new(),
            out: VecDeque::new(),
            done: false,
            cancel,
        }
    }

    fn emit_error(&mut self, message: &str) {
        debug!(message, "conversion failed");
        self.out.push_back(Token::error(message));
        self.done = true;
    }

    fn take(&mut self, token: Token) {
        match token.kind() {
            TokenKind::Number | TokenKind::Str | TokenKind::Word => self.out.push_back(token),
            TokenKind::Error => {
                self.out.push_back(token);
                self.done = true;
            }
            TokenKind::Function => self.pending.push(token),
            TokenKind::LeftParen => self.pending.push(token),
            TokenKind::Operator => {
                while let Some(top) = self.pending.last() {
                    if top.kind() != TokenKind::Operator
                        || top.precedence() < token.precedence()
                    {
                        break;
                    }
                    let top = self.pending.pop();
                    self.out.push_back(top);
                }
                self.pending.push(token);
            }
            TokenKind::Separator => loop {
                match self.pending.last() {
                    // The bracket stays for its closing paren.
                    Some(top) if top.kind() == TokenKind::LeftParen => break,
                    Some(_) => {
                        let top = self.pending.pop();
                        self.out.push_back(top);
                    }
                    None => {
                        self.emit_error("no arg separator or opening bracket");
                        break;
                    }
                }
            },
            TokenKind::RightParen => loop {
                match self.pending.last() {
                    Some(top) if top.kind() == TokenKind::LeftParen => {
                        self.pending.pop();
                        // A call ends here; emit the function name.
                        if self.pending.last().map(Token::kind) == Some(TokenKind::Function) {
                            let func = self.pending.pop();
                            self.out.push_back(func);
                        }
                        break;
                    }
                    Some(_) => {
                        let top = self.pending.pop();
                        self.out.push_back(top);
                    }
                    None => {
                        self.emit_error("no opening bracket");
                        break;
                    }
                }
            },
            TokenKind::Nil => {}
        }
    }

    /// Flush the auxiliary stack at end of input. An opening bracket
    /// still pending means the expression never closed it.
    fn drain(&mut self) {
        while !self.pending.is_empty() {
            let top = self.pending.pop();
            if top.kind() == TokenKind::LeftParen {
                self.emit_error("invalid brackets");
                return;
            }
            self.out.push_back(top);
        }
    }
}

impl<I> Iterator for ToPostfix<I>
where
    I: Iterator<Item = Token>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            if let Some(token) = self.out.pop_front() {
                return Some(token);
            }
            if self.done {
                return None;
            }
            match self.upstream.next() {
                Some(token) => self.take(token),
                None => {
                    self.done = true;
                    self.drain();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{default_functions, default_operators};
    use crate::classify::Classify;
    use crate::scanner::Scanner;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn convert(input: &str) -> Vec<Token> {
        let operators = default_operators();
        let functions = default_functions();
        let cancel = CancelToken::new();
        ToPostfix::new(
            Classify::new(
                Scanner::new(input, cancel.clone()),
                &operators,
                &functions,
                cancel.clone(),
            ),
            cancel,
        )
        .collect()
    }

    fn rendered(input: &str) -> String {
        convert(input)
            .iter()
            .map(Token::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn values_pass_through() {
        assert_eq!(rendered("1 2 three"), "1 2 three");
    }

    #[test]
    fn precedence_orders_operators() {
        assert_eq!(rendered("2 + 2 * 2"), "2 2 2 * +");
        assert_eq!(rendered("2 * 2 + 2"), "2 2 * 2 +");
    }

    #[test]
    fn brackets_group_subexpressions() {
        assert_eq!(rendered("(2 + 3) * 4"), "2 3 + 4 *");
    }

    #[test]
    fn equal_precedence_flushes_left_to_right() {
        assert_eq!(rendered("8 - 3 - 2"), "8 3 - 2 -");
        assert_eq!(rendered("2 ** 3 ** 2"), "2 3 ** 2 **");
    }

    #[test]
    fn call_arguments_stay_grouped() {
        assert_eq!(rendered("min(3 + 1, 2)"), "3 1 + 2 min");
        assert_eq!(rendered("max(1, min(2, 3))"), "1 2 3 min max");
    }

    #[test]
    fn stray_closing_bracket() {
        let tokens = convert(")(");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind(), TokenKind::Error);
        assert_eq!(tokens[0].raw(), "no opening bracket");
    }

    #[test]
    fn unclosed_bracket() {
        let tokens = convert("(2 + 3");
        let last = tokens.last().map(Token::kind);
        assert_eq!(last, Some(TokenKind::Error));
        assert_eq!(tokens.last().map(Token::raw), Some("invalid brackets"));
    }

    #[test]
    fn unclosed_call() {
        let tokens = convert("min(1, 2");
        assert_eq!(tokens.last().map(Token::raw), Some("invalid brackets"));
    }

    #[test]
    fn stray_separator() {
        let tokens = convert("1, 2");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind(), TokenKind::Error);
        assert_eq!(tokens[1].raw(), "no arg separator or opening bracket");
    }

    #[test]
    fn errors_fuse_the_stream() {
        let tokens = convert(")( 5");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind(), TokenKind::Error);
    }

    fn expr_strategy() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            (0i64..1000).prop_map(|n| n.to_string()),
            // Long enough to miss every registered function name.
            "[a-z]{5,8}",
        ];
        leaf.prop_recursive(3, 24, 2, |inner| {
            let op = prop_oneof![
                Just("+"),
                Just("-"),
                Just("*"),
                Just("/"),
                Just("%"),
                Just("**"),
                Just("=="),
                Just("&&"),
            ];
            prop_oneof![
                (inner.clone(), op, inner.clone())
                    .prop_map(|(lhs, op, rhs)| format!("{} {} {}", lhs, op, rhs)),
                inner.prop_map(|e| format!("({})", e)),
            ]
        })
    }

    fn tagged(token: &Token) -> String {
        format!("{:?}:{}", token.kind(), token)
    }

    proptest! {
        #[test]
        fn conversion_preserves_the_token_multiset(expr in expr_strategy()) {
            let operators = default_operators();
            let functions = default_functions();
            let cancel = CancelToken::new();

            let mut classified: Vec<String> = Classify::new(
                Scanner::new(&expr, cancel.clone()),
                &operators,
                &functions,
                cancel.clone(),
            )
            .filter(|t| {
                !matches!(
                    t.kind(),
                    TokenKind::LeftParen | TokenKind::RightParen | TokenKind::Separator
                )
            })
            .map(|t| tagged(&t))
            .collect();

            let converted = convert(&expr);
            prop_assert!(converted.iter().all(|t| t.kind() != TokenKind::Error));
            let mut reordered: Vec<String> = converted.iter().map(tagged).collect();

            classified.sort();
            reordered.sort();
            prop_assert_eq!(classified, reordered);
        }
    }
}
