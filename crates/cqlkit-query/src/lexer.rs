//! CQL lexer using logos
//!
//! Lexing runs in two steps. logos splits the input into lexemes (keywords,
//! parentheses, operators, quoted strings, words), then adjacent
//! `word operator value` lexemes are folded into one [`Comparison`] token.
//! Whatever is not claimed by a token is the residual; any non-whitespace
//! residual fails the query with a classified [`SyntaxError`].

use cqlkit_core::{Error, Result, SyntaxError};
use logos::Logos;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use tracing::debug;

/// Logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    /// Binding strength; higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            LogicalOp::Not => 3,
            LogicalOp::And => 2,
            LogicalOp::Or => 1,
        }
    }

    /// Number of operands consumed
    pub fn arity(self) -> usize {
        match self {
            LogicalOp::Not => 1,
            LogicalOp::And | LogicalOp::Or => 2,
        }
    }

    /// Returns true for left-associative operators
    pub fn is_left_associative(self) -> bool {
        !matches!(self, LogicalOp::Not)
    }
}

/// Parenthesis direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Paren {
    Open,
    Close,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    GreaterEquals,
    LessEquals,
}

impl ComparisonOp {
    /// Source spelling
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Equals => "=",
            ComparisonOp::NotEquals => "!=",
            ComparisonOp::Contains => "~",
            ComparisonOp::NotContains => "!~",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::LessThan => "<",
            ComparisonOp::GreaterEquals => ">=",
            ComparisonOp::LessEquals => "<=",
        }
    }

    /// Returns true for `>`, `<`, `>=`, `<=`
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            ComparisonOp::GreaterThan
                | ComparisonOp::LessThan
                | ComparisonOp::GreaterEquals
                | ComparisonOp::LessEquals
        )
    }
}

/// Bare keyword literals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Null,
    True,
    False,
}

impl Keyword {
    fn parse(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("null") {
            Some(Keyword::Null)
        } else if word.eq_ignore_ascii_case("true") {
            Some(Keyword::True)
        } else if word.eq_ignore_ascii_case("false") {
            Some(Keyword::False)
        } else {
            None
        }
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Single- or double-quoted string, quotes removed
    String(String),
    /// Unsigned decimal number, with its source text
    Number { value: f64, raw: String },
    Keyword(Keyword),
}

impl Literal {
    /// Returns true for the `null` keyword
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Keyword(Keyword::Null))
    }

    /// Text used for string comparisons
    pub fn as_text(&self) -> &str {
        match self {
            Literal::String(s) => s,
            Literal::Number { raw, .. } => raw,
            Literal::Keyword(Keyword::Null) => "null",
            Literal::Keyword(Keyword::True) => "true",
            Literal::Keyword(Keyword::False) => "false",
        }
    }
}

/// One atomic `field operator value` test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub field: String,
    pub op: ComparisonOp,
    pub value: Literal,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Literal::String(s) => write!(f, "{}{}'{}'", self.field, self.op.symbol(), s),
            other => write!(f, "{}{}{}", self.field, self.op.symbol(), other.as_text()),
        }
    }
}

/// CQL tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    Logical(LogicalOp),
    Paren(Paren),
    Comparison(Comparison),
}

/// Raw lexemes recognised by logos
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Lexeme {
    #[token("AND", ignore(ascii_case))]
    And,

    #[token("OR", ignore(ascii_case))]
    Or,

    #[token("NOT", ignore(ascii_case))]
    Not,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(">=", |_| ComparisonOp::GreaterEquals)]
    #[token("<=", |_| ComparisonOp::LessEquals)]
    #[token("!=", |_| ComparisonOp::NotEquals)]
    #[token("!~", |_| ComparisonOp::NotContains)]
    #[token(">", |_| ComparisonOp::GreaterThan)]
    #[token("<", |_| ComparisonOp::LessThan)]
    #[token("=", |_| ComparisonOp::Equals)]
    #[token("~", |_| ComparisonOp::Contains)]
    Operator(ComparisonOp),

    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    StringSingle(String),

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    StringDouble(String),

    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().to_string())]
    Decimal(String),

    #[regex(r"[a-zA-Z0-9_]+", |lex| lex.slice().to_string())]
    Word(String),
}

type Spanned = (Option<Lexeme>, Range<usize>);

/// Tokenize a preprocessed CQL query
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let lexemes: Vec<Spanned> = Lexeme::lexer(input)
        .spanned()
        .map(|(lexeme, span)| (lexeme.ok(), span))
        .collect();

    let mut tokens = Vec::new();
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut i = 0;

    while i < lexemes.len() {
        let (lexeme, span) = &lexemes[i];
        let token = match lexeme {
            Some(Lexeme::And) => Some(Token::Logical(LogicalOp::And)),
            Some(Lexeme::Or) => Some(Token::Logical(LogicalOp::Or)),
            Some(Lexeme::Not) => Some(Token::Logical(LogicalOp::Not)),
            Some(Lexeme::LParen) => Some(Token::Paren(Paren::Open)),
            Some(Lexeme::RParen) => Some(Token::Paren(Paren::Close)),
            Some(Lexeme::Word(_)) => {
                if let Some((comparison, end)) = comparison_at(input, &lexemes, i)? {
                    tokens.push(Token::Comparison(comparison));
                    claimed.push(span.start..end);
                    i += 3;
                    continue;
                }
                None
            }
            _ => None,
        };
        if let Some(token) = token {
            tokens.push(token);
            claimed.push(span.clone());
        }
        i += 1;
    }

    let residual = residual(input, &claimed);
    let remaining = residual.trim();
    if !remaining.is_empty() {
        debug!(residual = remaining, "CQL query did not tokenize cleanly");
        return Err(classify_residual(remaining).into());
    }

    debug!(tokens = tokens.len(), "Tokenized CQL query");
    Ok(tokens)
}

/// Fold `word operator value` starting at lexeme `i` into a comparison.
///
/// Returns the comparison and the byte offset where it ends.
fn comparison_at(
    input: &str,
    lexemes: &[Spanned],
    i: usize,
) -> Result<Option<(Comparison, usize)>> {
    let (Some((Some(Lexeme::Word(field)), _)), Some((Some(Lexeme::Operator(op)), _))) =
        (lexemes.get(i), lexemes.get(i + 1))
    else {
        return Ok(None);
    };
    let Some((Some(value), value_span)) = lexemes.get(i + 2) else {
        return Ok(None);
    };

    let literal = match value {
        Lexeme::StringSingle(s) | Lexeme::StringDouble(s) => Literal::String(s.clone()),
        Lexeme::Decimal(raw) => number(raw),
        Lexeme::Word(word) => {
            let called = matches!(
                lexemes.get(i + 3),
                Some((Some(Lexeme::LParen), paren)) if paren.start == value_span.end
            );
            if called {
                if let Some(close) = input[value_span.end..].find(')') {
                    let call = &input[value_span.start..=value_span.end + close];
                    return Err(Error::FunctionEvaluation(format!(
                        "Unsupported function '{call}'. Supported functions: now()."
                    )));
                }
                return Ok(None);
            }
            if let Some(keyword) = Keyword::parse(word) {
                Literal::Keyword(keyword)
            } else if word.bytes().all(|b| b.is_ascii_digit()) {
                number(word)
            } else {
                return Ok(None);
            }
        }
        _ => return Ok(None),
    };

    Ok(Some((
        Comparison {
            field: field.clone(),
            op: *op,
            value: literal,
        },
        value_span.end,
    )))
}

fn number(raw: &str) -> Literal {
    match raw.parse() {
        Ok(value) => Literal::Number {
            value,
            raw: raw.to_string(),
        },
        Err(_) => Literal::String(raw.to_string()),
    }
}

/// Text of `input` not covered by any claimed span
fn residual(input: &str, claimed: &[Range<usize>]) -> String {
    let mut out = String::new();
    let mut cursor = 0;
    for span in claimed {
        out.push_str(&input[cursor..span.start]);
        cursor = span.end;
    }
    out.push_str(&input[cursor..]);
    out
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_operator_char(b: u8) -> bool {
    matches!(b, b'>' | b'<' | b'=' | b'!' | b'~')
}

fn skip_while(bytes: &[u8], mut pos: usize, pred: impl Fn(u8) -> bool) -> usize {
    while pos < bytes.len() && pred(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// `word op word` where the value was not quoted
fn has_unquoted_value(text: &str) -> bool {
    let bytes = text.as_bytes();
    (0..bytes.len()).filter(|&s| is_word(bytes[s])).any(|s| {
        let pos = skip_while(bytes, s, is_word);
        let pos = skip_while(bytes, pos, |b| b.is_ascii_whitespace());
        let op_end = skip_while(bytes, pos, is_operator_char);
        if op_end == pos {
            return false;
        }
        let value_start = skip_while(bytes, op_end, |b| b.is_ascii_whitespace());
        let value_end = skip_while(bytes, value_start, is_word);
        let quoted_after = matches!(bytes.get(value_end), Some(b'\'' | b'"'));
        value_end - value_start >= 2 || (value_end > value_start && !quoted_after)
    })
}

/// A quote opened but never closed
fn has_unclosed_quote(text: &str) -> bool {
    let mut open: Option<char> = None;
    for c in text.chars() {
        match open {
            Some(q) if c == q => open = None,
            None if c == '\'' || c == '"' => open = Some(c),
            _ => {}
        }
    }
    open.is_some()
}

/// A word followed by something that cannot start an operator or value
fn has_unsupported_operator(text: &str) -> bool {
    let bytes = text.as_bytes();
    (0..bytes.len()).filter(|&s| is_word(bytes[s])).any(|s| {
        if bytes.get(s + 1).is_some_and(|b| is_word(*b)) {
            return true;
        }
        let next = skip_while(bytes, s + 1, |b| b.is_ascii_whitespace());
        bytes.get(next).is_some_and(|&b| {
            !is_operator_char(b) && !matches!(b, b'\'' | b'"' | b'(' | b')')
        })
    })
}

/// Pick the most helpful explanation for text the lexer could not consume
fn classify_residual(remaining: &str) -> SyntaxError {
    if remaining.contains("==") {
        SyntaxError::DoubleEquals
    } else if has_unquoted_value(remaining) {
        SyntaxError::UnquotedValue(remaining.to_string())
    } else if has_unclosed_quote(remaining) {
        SyntaxError::UnclosedQuote
    } else if has_unsupported_operator(remaining) {
        SyntaxError::UnsupportedOperator
    } else {
        SyntaxError::Unrecognized(remaining.to_string())
    }
}
