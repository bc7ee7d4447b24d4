//! Grammar for the standard (`H:`/`V:`) visual format using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::ast::*;
use super::lexer::{lex, Token};
use super::{describe_errors, span_range};
use crate::vocab::Axis;

/// Parse a standard-format string into its chain structure.
///
/// Errors carry a message and the span of the offending text.
pub fn parse_visual(input: &str) -> Result<VisualFormat, (String, Span)> {
    let tokens = lex(input)
        .map_err(|span| (format!("unexpected character `{}`", &input[span.clone()]), span))?;

    let len = input.len();
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    visual_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| describe_errors(errs, len))
}

fn visual_parser<'a, I>() -> impl Parser<'a, I, VisualFormat, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let name = select! {
        Token::Ident(s) => s,
    }
    .map_with(|s, e| Spanned::new(s, span_range(&e.span())));

    let relation = select! {
        Token::Relation(r) => r,
    }
    .map_with(|r, e| Spanned::new(r, span_range(&e.span())));

    // Bare metric name or unsigned number, as in `-20-` or `@750`
    let simple_object = select! {
        Token::Ident(s) => PredicateObject::Name(s),
        Token::Number(n) => PredicateObject::Number(n),
    }
    .map_with(|o, e| Spanned::new(o, span_range(&e.span())));

    // Inside parentheses numbers may be negative
    let signed_number = just(Token::Minus)
        .or_not()
        .then(select! { Token::Number(n) => n })
        .map_with(|(neg, n), e| {
            let text = if neg.is_some() { format!("-{}", n) } else { n };
            Spanned::new(PredicateObject::Number(text), span_range(&e.span()))
        });

    let object = choice((simple_object.clone(), signed_number));

    let predicate = relation
        .or_not()
        .then(object)
        .then(just(Token::At).ignore_then(simple_object.clone()).or_not())
        .map(|((relation, object), priority)| Predicate {
            relation,
            object,
            priority,
        });

    let predicate_group = predicate
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>()
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

    let predicate_list = choice((
        predicate_group.clone(),
        simple_object.map(|object| vec![Predicate::simple(object)]),
    ));

    // `-preds-`, `-`, or nothing at all
    let connection = choice((
        just(Token::Minus)
            .ignore_then(predicate_list)
            .then_ignore(just(Token::Minus))
            .map(Connection::Explicit),
        just(Token::Minus).to(Connection::Standard),
    ))
    .or_not()
    .map(|c| c.unwrap_or(Connection::Flush));

    let view = name
        .then(predicate_group.or_not())
        .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
        .map(|(name, predicates)| ViewSpec {
            name,
            predicates: predicates.unwrap_or_default(),
        });

    let orientation = select! {
        Token::Horizontal => Axis::Horizontal,
        Token::Vertical => Axis::Vertical,
    };

    orientation
        .or_not()
        .then(just(Token::Pipe).ignore_then(connection.clone()).or_not())
        .then(view.clone())
        .then(connection.clone().then(view).repeated().collect::<Vec<_>>())
        .then(connection.then_ignore(just(Token::Pipe)).or_not())
        .then_ignore(end())
        .map(
            |((((orientation, leading), first), rest), trailing)| VisualFormat {
                orientation,
                leading,
                first,
                rest,
                trailing,
            },
        )
}
