//! Lexer shared by the standard and extended constraint formats, using logos

use std::fmt;

use logos::Logos;

use super::ast::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r" +")]
pub enum Token {
    // Format tags (longer than an identifier's first letter, so they win)
    #[token("X:")]
    Extended,
    #[token("H:")]
    Horizontal,
    #[token("V:")]
    Vertical,

    // Standard-format punctuation
    #[token("|")]
    Pipe,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,
    #[token("@")]
    At,

    // Extended-format punctuation
    #[token(".")]
    Dot,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("+")]
    Plus,

    // Connection dash in the standard format, negation in the extended one
    #[token("-")]
    Minus,

    /// Any run of `=`, `<`, `>`; checked against the relation vocabulary later
    #[regex(r"[=<>]+", |lex| lex.slice().to_string())]
    Relation(String),

    #[regex(r"[_a-zA-Z][_a-zA-Z0-9]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// Kept as text so that value resolution decides how to read it
    #[regex(r"[0-9]+(\.[0-9]*)?", |lex| lex.slice().to_string())]
    Number(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Extended => f.write_str("'X:'"),
            Token::Horizontal => f.write_str("'H:'"),
            Token::Vertical => f.write_str("'V:'"),
            Token::Pipe => f.write_str("'|'"),
            Token::BracketOpen => f.write_str("'['"),
            Token::BracketClose => f.write_str("']'"),
            Token::ParenOpen => f.write_str("'('"),
            Token::ParenClose => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
            Token::At => f.write_str("'@'"),
            Token::Dot => f.write_str("'.'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Relation(s) => write!(f, "relation '{}'", s),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::Number(s) => write!(f, "number {}", s),
        }
    }
}

/// Lex constraint text into tokens with spans.
///
/// Fails with the span of the first character no token accepts.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Span> {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| tok.map(|t| (t, span.clone())).map_err(|_| span))
        .collect()
}
