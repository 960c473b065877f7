//! Data model for the evaluation pipeline.
//!
//! The scanner produces [`Lexeme`]s, the classifier turns them into
//! [`Token`]s, and the executor reduces tokens on a [`TokenStack`].
//! Handlers pop their operands from the stack and push one result;
//! popping an empty stack returns the nil token, so an underflowing
//! handler fails its own kind check instead of panicking.

use std::fmt;

/// Classification of a raw lexeme produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexemeKind {
    /// A digit run, optionally with a fractional part.
    Number,
    /// A double-quoted string, quotes included.
    Str,
    /// A letter followed by letters and digits.
    Word,
    /// A run of operator glyphs.
    Operator,
    LeftParen,
    RightParen,
    /// The `,` between function arguments.
    Separator,
    /// A scan failure; the text carries the diagnostic.
    Error,
}

/// A positioned slice of the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: LexemeKind,
    pub text: String,
    /// Byte offset where the lexeme starts.
    pub start: usize,
    /// Byte offset one past the lexeme's end.
    pub end: usize,
}

impl Lexeme {
    pub fn new(kind: LexemeKind, text: impl Into<String>, start: usize, end: usize) -> Self {
        Lexeme {
            kind,
            text: text.into(),
            start,
            end,
        }
    }
}

/// Classification of a token flowing between the pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Str,
    Word,
    Operator,
    Function,
    LeftParen,
    RightParen,
    Separator,
    /// An in-band failure; downstream stages forward it and stop.
    Error,
    /// The zero token, returned when popping an empty stack.
    Nil,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "number",
            TokenKind::Str => "string",
            TokenKind::Word => "word",
            TokenKind::Operator => "operator",
            TokenKind::Function => "function",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::Separator => "separator",
            TokenKind::Error => "error",
            TokenKind::Nil => "nil",
        };
        write!(f, "{}", name)
    }
}

/// A typed token.
///
/// Numbers carry their value in `ivalue` and leave `text` empty.
/// Operators carry the precedence and associativity recorded in the
/// table they were resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
    ivalue: i64,
    precedence: i32,
    left_assoc: bool,
}

impl Default for Token {
    fn default() -> Self {
        Token {
            kind: TokenKind::Nil,
            text: String::new(),
            ivalue: 0,
            precedence: 0,
            left_assoc: false,
        }
    }
}

impl Token {
    /// A number token carrying `value`.
    pub fn int(value: i64) -> Self {
        Token {
            kind: TokenKind::Number,
            ivalue: value,
            ..Token::default()
        }
    }

    /// A string token carrying `text` without quotes.
    pub fn str(text: impl Into<String>) -> Self {
        Token {
            kind: TokenKind::Str,
            text: text.into(),
            ..Token::default()
        }
    }

    /// A bare word token.
    pub fn word(text: impl Into<String>) -> Self {
        Token {
            kind: TokenKind::Word,
            text: text.into(),
            ..Token::default()
        }
    }

    pub(crate) fn operator(text: impl Into<String>, precedence: i32, left_assoc: bool) -> Self {
        Token {
            kind: TokenKind::Operator,
            text: text.into(),
            precedence,
            left_assoc,
            ..Token::default()
        }
    }

    pub(crate) fn function(name: impl Into<String>) -> Self {
        Token {
            kind: TokenKind::Function,
            text: name.into(),
            ..Token::default()
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Token {
            kind: TokenKind::Error,
            text: message.into(),
            ..Token::default()
        }
    }

    pub(crate) fn structural(kind: TokenKind) -> Self {
        Token {
            kind,
            ..Token::default()
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The integer value, for number tokens.
    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            TokenKind::Number => Some(self.ivalue),
            _ => None,
        }
    }

    /// The string content, for string tokens.
    pub fn as_str(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Str => Some(&self.text),
            _ => None,
        }
    }

    /// The identifier, for word tokens.
    pub fn as_word(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Word => Some(&self.text),
            _ => None,
        }
    }

    /// The raw text regardless of kind. Empty for numbers.
    pub fn raw(&self) -> &str {
        &self.text
    }

    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    pub fn is_left_assoc(&self) -> bool {
        self.left_assoc
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Number => write!(f, "{}", self.ivalue),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Separator => write!(f, ","),
            TokenKind::Nil => write!(f, "<nil>"),
            _ => write!(f, "{}", self.text),
        }
    }
}

/// The value stack tokens are reduced on.
///
/// `pop` on an empty stack returns [`Token::default`] rather than
/// failing, so handlers report underflow as an ordinary type error.
#[derive(Debug, Default)]
pub struct TokenStack(Vec<Token>);

impl TokenStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }

    /// Remove and return the top token, or the nil token when empty.
    pub fn pop(&mut self) -> Token {
        self.0.pop().unwrap_or_default()
    }

    /// Peek at the top token.
    pub fn last(&self) -> Option<&Token> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The tokens in stack order, bottom first.
    pub fn into_tokens(self) -> Vec<Token> {
        self.0
    }
}

/// A result produced by an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Int(_) => None,
            Value::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A value bound to a variable name.
///
/// Floats and booleans fold into numbers when the variable is looked
/// up: floats truncate toward zero, booleans become 0 or 1.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl From<i64> for VarValue {
    fn from(value: i64) -> Self {
        VarValue::Int(value)
    }
}

impl From<i32> for VarValue {
    fn from(value: i32) -> Self {
        VarValue::Int(value.into())
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        VarValue::Float(value)
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        VarValue::Bool(value)
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        VarValue::Text(value.to_string())
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        VarValue::Text(value)
    }
}

impl From<&VarValue> for Token {
    fn from(value: &VarValue) -> Self {
        match value {
            VarValue::Int(n) => Token::int(*n),
            VarValue::Float(x) => Token::int(*x as i64),
            VarValue::Bool(b) => Token::int(i64::from(*b)),
            VarValue::Text(s) => Token::str(s.clone()),
        }
    }
}
