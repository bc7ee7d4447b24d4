//! Grammar for the extended (`X:`) constraint format using chumsky
//!
//! ```text
//! X: key1.attr1 relation key2.attr2 [(*|/) value] [(+|-) value]
//! ```

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::ast::{CapturedGroup, Spanned};
use super::lexer::{lex, Token};
use super::{describe_errors, span_range};
use crate::error::CompileError;

/// Captured groups of a full match: the whole text plus nine clauses
pub const GROUP_COUNT: usize = 10;

/// Longest accepted key or attribute name
pub const MAX_IDENTIFIER_LEN: usize = 31;

/// Group indices within an [`XtMatch`]
pub(crate) mod group {
    pub const ITEM1: usize = 1;
    pub const ATTR1: usize = 2;
    pub const RELATION: usize = 3;
    pub const ITEM2: usize = 4;
    pub const ATTR2: usize = 5;
    pub const MUL_OP: usize = 6;
    pub const MUL_VALUE: usize = 7;
    pub const ADD_OP: usize = 8;
    pub const ADD_VALUE: usize = 9;
}

/// The single whole-string match of an extended constraint
#[derive(Debug, Clone, PartialEq)]
pub struct XtMatch {
    pub groups: Vec<CapturedGroup>,
}

impl XtMatch {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Spanned<&str>> {
        self.groups.get(index).and_then(CapturedGroup::as_spanned)
    }
}

type Clause = Option<Spanned<String>>;

/// Match extended constraint text against the grammar.
///
/// Exactly one match spanning the entire input is accepted; anything else is
/// `InvalidConstraintSyntax`.
pub fn parse_extended(raw: &str) -> Result<XtMatch, CompileError> {
    let syntax_error = |reason: String, span| CompileError::InvalidConstraintSyntax {
        raw: raw.to_string(),
        reason,
        span: Some(span),
        groups: Vec::new(),
    };

    let tokens = lex(raw)
        .map_err(|span| syntax_error(format!("unexpected character `{}`", &raw[span.clone()]), span))?;

    let len = raw.len();
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    let clauses = extended_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            let (reason, span) = describe_errors(errs, len);
            syntax_error(reason, span)
        })?;

    let mut groups = Vec::with_capacity(GROUP_COUNT);
    groups.push(CapturedGroup::found(0, raw, 0..len));
    groups.extend(
        clauses
            .into_iter()
            .enumerate()
            .map(|(i, clause)| match clause {
                Some(c) => CapturedGroup::found(i + 1, c.node, c.span),
                None => CapturedGroup::missing(i + 1),
            }),
    );

    let matched = XtMatch { groups };
    check_identifier_lengths(raw, &matched)?;
    tracing::trace!(raw, groups = %crate::error::dump_groups(&matched.groups), "extended match");
    Ok(matched)
}

fn check_identifier_lengths(raw: &str, matched: &XtMatch) -> Result<(), CompileError> {
    let too_long = matched.groups.iter().skip(1).find(|g| {
        g.text
            .as_deref()
            .is_some_and(|t| crate::metrics::starts_like_identifier(t) && t.len() > MAX_IDENTIFIER_LEN)
    });
    match too_long {
        Some(group) => Err(CompileError::InvalidConstraintSyntax {
            raw: raw.to_string(),
            reason: format!(
                "identifier in group {} is longer than {} characters",
                group.index, MAX_IDENTIFIER_LEN
            ),
            span: group.span.clone(),
            groups: matched.groups.clone(),
        }),
        None => Ok(()),
    }
}

fn extended_parser<'a, I>() -> impl Parser<'a, I, Vec<Clause>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Ident(s) => s,
    }
    .map_with(|s, e| Spanned::new(s, span_range(&e.span())));

    let relation = select! {
        Token::Relation(r) => r,
    }
    .map_with(|r, e| Spanned::new(r, span_range(&e.span())));

    // Metric name or decimal literal
    let value = select! {
        Token::Ident(s) => s,
        Token::Number(n) => n,
    }
    .map_with(|v, e| Spanned::new(v, span_range(&e.span())));

    let mul_op = select! {
        Token::Star => "*".to_string(),
        Token::Slash => "/".to_string(),
    }
    .map_with(|op, e| Spanned::new(op, span_range(&e.span())));

    let add_op = select! {
        Token::Plus => "+".to_string(),
        Token::Minus => "-".to_string(),
    }
    .map_with(|op, e| Spanned::new(op, span_range(&e.span())));

    // key.attr, written without spaces around the dot
    let dot = just(Token::Dot).map_with(|_, e| span_range(&e.span()));
    let operand = identifier
        .clone()
        .then(dot)
        .then(identifier)
        .try_map(|((key, dot), attr), span: SimpleSpan| {
            if key.span.end == dot.start && dot.end == attr.span.start {
                Ok((key, attr))
            } else {
                Err(Rich::custom(span, "no spaces allowed around '.'"))
            }
        });

    just(Token::Extended)
        .ignore_then(operand.clone())
        .then(relation)
        .then(operand)
        .then(mul_op.then(value.clone()).or_not())
        .then(add_op.then(value).or_not())
        .then_ignore(end())
        .map(
            |(((((item1, attr1), relation), (item2, attr2)), multiplier), constant)| {
                let (mul_op, mul_value) = split_clause(multiplier);
                let (add_op, add_value) = split_clause(constant);
                vec![
                    Some(item1),
                    Some(attr1),
                    Some(relation),
                    Some(item2),
                    Some(attr2),
                    mul_op,
                    mul_value,
                    add_op,
                    add_value,
                ]
            },
        )
}

fn split_clause(clause: Option<(Spanned<String>, Spanned<String>)>) -> (Clause, Clause) {
    match clause {
        Some((op, value)) => (Some(op), Some(value)),
        None => (None, None),
    }
}
