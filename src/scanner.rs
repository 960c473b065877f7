//! Lexical scanning: raw text to a stream of positioned lexemes.
//!
//! The scanner is a single left-to-right pass. At each position the
//! rules below are tried in order and the first match wins; when none
//! matches, one error lexeme is emitted and the stream ends.

use nom::{
    branch::alt,
    bytes::complete::{escaped, take_while1},
    character::complete::{alpha1, alphanumeric0, anychar, char, digit0, digit1, none_of},
    combinator::{map, opt, recognize},
    sequence::{delimited, pair},
    IResult,
};

use tracing::debug;

use crate::cancel::CancelToken;
use crate::token::{Lexeme, LexemeKind};

/// Glyphs an operator lexeme is built from.
const OPERATOR_CHARS: &str = "+-*/=<>@&|:!.";

/// Parse a number: a digit run with an optional fractional part.
fn number(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit1, opt(pair(char('.'), digit0))))(input)
}

/// Parse the longest run of operator glyphs.
fn glyph_run(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| OPERATOR_CHARS.contains(c))(input)
}

/// Parse a word: a letter followed by letters and digits.
fn word(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, alphanumeric0))(input)
}

/// Parse a double-quoted string, quotes retained. A backslash escapes
/// any character, so an escaped quote does not end the literal.
fn string_literal(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('"'),
        opt(escaped(none_of("\"\\"), '\\', anychar)),
        char('"'),
    ))(input)
}

/// Try every lexeme rule in priority order.
fn lexeme(input: &str) -> IResult<&str, (LexemeKind, &str)> {
    alt((
        map(recognize(char('(')), |s| (LexemeKind::LeftParen, s)),
        map(recognize(char(')')), |s| (LexemeKind::RightParen, s)),
        map(recognize(char(',')), |s| (LexemeKind::Separator, s)),
        map(number, |s| (LexemeKind::Number, s)),
        map(glyph_run, |s| (LexemeKind::Operator, s)),
        map(word, |s| (LexemeKind::Word, s)),
        map(string_literal, |s| (LexemeKind::Str, s)),
    ))(input)
}

/// Streaming lexer over one input expression.
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    done: bool,
    cancel: CancelToken,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str, cancel: CancelToken) -> Self {
        Scanner {
            input,
            pos: 0,
            done: false,
            cancel,
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '\n'));
        self.pos += rest.len() - trimmed.len();
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Lexeme;

    fn next(&mut self) -> Option<Lexeme> {
        if self.done || self.cancel.is_cancelled() {
            return None;
        }
        self.skip_whitespace();
        let start = self.pos;
        let rest = &self.input[start..];
        let first = match rest.chars().next() {
            Some(c) => c,
            None => {
                self.done = true;
                return None;
            }
        };
        match lexeme(rest) {
            Ok((_, (kind, text))) => {
                self.pos += text.len();
                Some(Lexeme::new(kind, text, start, self.pos))
            }
            Err(_) => {
                // No rule matched; report and stop scanning.
                self.done = true;
                if first == '"' {
                    debug!(start, "unterminated string");
                    Some(Lexeme::new(
                        LexemeKind::Error,
                        "unterminated string",
                        start,
                        self.input.len(),
                    ))
                } else {
                    debug!(character = %first, start, "unexpected character");
                    let end = start + first.len_utf8();
                    Some(Lexeme::new(
                        LexemeKind::Error,
                        format!("unexpected character '{}' at byte {}", first, start),
                        start,
                        end,
                    ))
                }
            }
        }
    }
}
