//! Token classification: lexemes resolved against the registries.
//!
//! Glyph runs must name a registered operator. Words resolve in order
//! against the operator table, then the function table, and otherwise
//! stay bare words for the executor to bind. Lookups are exact; table
//! keys are stored lowercase, so `MAX` is a word, not the function.

use tracing::debug;

use crate::cancel::CancelToken;
use crate::engine::{FunctionTable, OperatorTable};
use crate::token::{Lexeme, LexemeKind, Token, TokenKind};

/// Integer value of a number lexeme: the digits before any decimal
/// point. Unparseable or overflowing text degrades to zero.
fn integer_part(text: &str) -> i64 {
    let digits = text.split('.').next().unwrap_or(text);
    digits.parse().unwrap_or(0)
}

/// Adapter resolving scanner lexemes into typed tokens.
pub struct Classify<'e, I> {
    upstream: I,
    operators: &'e OperatorTable,
    functions: &'e FunctionTable,
    done: bool,
    cancel: CancelToken,
}

impl<'e, I> Classify<'e, I>
where
    I: Iterator<Item = Lexeme>,
{
    pub fn new(
        upstream: I,
        operators: &'e OperatorTable,
        functions: &'e FunctionTable,
        cancel: CancelToken,
    ) -> Self {
        Classify {
            upstream,
            operators,
            functions,
            done: false,
            cancel,
        }
    }

    fn classify(&mut self, lexeme: Lexeme) -> Token {
        match lexeme.kind {
            LexemeKind::LeftParen => Token::structural(TokenKind::LeftParen),
            LexemeKind::RightParen => Token::structural(TokenKind::RightParen),
            LexemeKind::Separator => Token::structural(TokenKind::Separator),
            LexemeKind::Number => Token::int(integer_part(&lexeme.text)),
            // Quotes stay on until execution.
            LexemeKind::Str => Token::str(lexeme.text),
            LexemeKind::Operator => match self.operators.get(lexeme.text.as_str()) {
                Some(op) => Token::operator(lexeme.text, op.precedence, op.left_assoc),
                None => {
                    debug!(operator = %lexeme.text, "unknown operator");
                    self.done = true;
                    Token::error(format!("unknown operator: {}", lexeme.text))
                }
            },
            LexemeKind::Word => {
                if let Some(op) = self.operators.get(lexeme.text.as_str()) {
                    Token::operator(lexeme.text, op.precedence, op.left_assoc)
                } else if self.functions.contains_key(lexeme.text.as_str()) {
                    Token::function(lexeme.text)
                } else {
                    Token::word(lexeme.text)
                }
            }
            LexemeKind::Error => {
                self.done = true;
                Token::error(lexeme.text)
            }
        }
    }
}

impl<'e, I> Iterator for Classify<'e, I>
where
    I: Iterator<Item = Lexeme>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done || self.cancel.is_cancelled() {
            return None;
        }
        let lexeme = self.upstream.next()?;
        Some(self.classify(lexeme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{default_functions, default_operators};
    use crate::scanner::Scanner;

    fn classify_all(input: &str) -> Vec<Token> {
        let operators = default_operators();
        let functions = default_functions();
        let cancel = CancelToken::new();
        Classify::new(
            Scanner::new(input, cancel.clone()),
            &operators,
            &functions,
            cancel,
        )
        .collect()
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        classify_all(input).iter().map(Token::kind).collect()
    }

    #[test]
    fn classifies_call_expression() {
        assert_eq!(
            kinds("min(1, len(svar))"),
            vec![
                TokenKind::Function,
                TokenKind::LeftParen,
                TokenKind::Number,
                TokenKind::Separator,
                TokenKind::Function,
                TokenKind::LeftParen,
                TokenKind::Word,
                TokenKind::RightParen,
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn numbers_truncate_and_drop_text() {
        let tokens = classify_all("2.9");
        assert_eq!(tokens[0].as_int(), Some(2));
        assert_eq!(tokens[0].raw(), "");
    }

    #[test]
    fn overflowing_number_degrades_to_zero() {
        let tokens = classify_all("99999999999999999999");
        assert_eq!(tokens[0].as_int(), Some(0));
    }

    #[test]
    fn operators_carry_table_precedence() {
        let tokens = classify_all("1 + 2 * 3");
        assert_eq!(tokens[1].kind(), TokenKind::Operator);
        assert_eq!(tokens[1].raw(), "+");
        assert_eq!(tokens[3].raw(), "*");
        assert!(tokens[3].precedence() > tokens[1].precedence());
    }

    #[test]
    fn operators_carry_table_associativity() {
        let tokens = classify_all("2 ** 3 + 4");
        assert!(tokens[1].is_left_assoc());
        assert!(!tokens[3].is_left_assoc());
    }

    #[test]
    fn unknown_operator_stops_the_stream() {
        let tokens = classify_all("3 @ 4");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind(), TokenKind::Error);
        assert_eq!(tokens[1].raw(), "unknown operator: @");
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let tokens = classify_all("MAX(1, 2)");
        assert_eq!(tokens[0].kind(), TokenKind::Word);
        assert_eq!(tokens[0].as_word(), Some("MAX"));
    }

    #[test]
    fn strings_keep_their_quotes() {
        let tokens = classify_all(r#""test""#);
        assert_eq!(tokens[0].kind(), TokenKind::Str);
        assert_eq!(tokens[0].as_str(), Some(r#""test""#));
    }

    #[test]
    fn word_operators_resolve_before_functions() {
        use crate::engine::Operator;
        use crate::error::EvalError;
        use crate::token::TokenStack;

        // "and" registered as both; the operator table wins.
        let mut operators = default_operators();
        operators.insert(
            "and".into(),
            Operator::new(10, false, |_: &mut TokenStack| -> Result<(), EvalError> {
                Ok(())
            }),
        );
        let mut functions = default_functions();
        functions.insert(
            "and".into(),
            Box::new(|_: &mut TokenStack| -> Result<(), EvalError> { Ok(()) }),
        );
        let cancel = CancelToken::new();
        let tokens: Vec<Token> = Classify::new(
            Scanner::new("1 and 1", cancel.clone()),
            &operators,
            &functions,
            cancel,
        )
        .collect();
        assert_eq!(tokens[1].kind(), TokenKind::Operator);
        assert_eq!(tokens[1].raw(), "and");
        assert_eq!(tokens[1].precedence(), 10);
    }

    #[test]
    fn scan_errors_pass_through() {
        let tokens = classify_all(r#""abc"#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind(), TokenKind::Error);
        assert_eq!(tokens[0].raw(), "unterminated string");
    }
}
