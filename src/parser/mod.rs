//! Parsers for the constraint formats

pub mod ast;
mod extended;
pub mod lexer;
mod visual;

pub(crate) use extended::group as extended_groups;
pub use extended::{parse_extended, XtMatch, GROUP_COUNT, MAX_IDENTIFIER_LEN};
pub use visual::parse_visual;

use chumsky::error::{Rich, RichReason};

use ast::Span;
use lexer::Token;

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> Span {
    e.start()..e.end()
}

/// First grammar error as a message and a span
fn describe_errors(errs: Vec<Rich<'_, Token>>, input_len: usize) -> (String, Span) {
    match errs.into_iter().next() {
        Some(err) => {
            let message = match (err.reason(), err.found()) {
                (RichReason::Custom(msg), _) => msg.to_string(),
                (_, Some(tok)) => format!("unexpected {}", tok),
                (_, None) => "unexpected end of input".to_string(),
            };
            (message, err.span().into_range())
        }
        None => ("no match".to_string(), 0..input_len),
    }
}
