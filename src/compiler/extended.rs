//! Semantics of extended (`X:`) constraints

use crate::descriptor::ConstraintDescriptor;
use crate::error::CompileError;
use crate::metrics::MetricSet;
use crate::parser::ast::Spanned;
use crate::parser::{extended_groups as group, parse_extended, XtMatch, GROUP_COUNT};
use crate::registry::Registry;
use crate::vocab::{Attribute, Relation};

/// Compile one extended constraint into exactly one descriptor
pub fn compile_extended(
    raw: &str,
    registry: &Registry,
    metrics: &MetricSet,
) -> Result<ConstraintDescriptor, CompileError> {
    let matched = parse_extended(raw)?;
    if matched.len() != GROUP_COUNT {
        return Err(malformed_match(
            raw,
            &matched,
            format!("expected {} groups, matched {}", GROUP_COUNT, matched.len()),
        ));
    }

    let item1 = required(raw, &matched, group::ITEM1)?;
    let attr1 = required(raw, &matched, group::ATTR1)?;
    let relation = required(raw, &matched, group::RELATION)?;
    let item2 = required(raw, &matched, group::ITEM2)?;
    let attr2 = required(raw, &matched, group::ATTR2)?;

    let in_group = |g: &Spanned<&str>| {
        let span = Some(g.span.clone());
        move |e: CompileError| e.in_constraint(raw, span)
    };

    registry.resolve(item1.node).map_err(in_group(&item1))?;
    registry.resolve(item2.node).map_err(in_group(&item2))?;
    let attr1_tag = Attribute::from_keyword(attr1.node).map_err(in_group(&attr1))?;
    let attr2_tag = Attribute::from_keyword(attr2.node).map_err(in_group(&attr2))?;
    let relation_tag = Relation::from_symbol(relation.node).map_err(in_group(&relation))?;

    let mut multiplier = 1.0;
    if let (Some(op), Some(value)) = (matched.get(group::MUL_OP), matched.get(group::MUL_VALUE)) {
        multiplier = metrics.resolve(value.node).map_err(in_group(&value))?;
        if op.node == "/" {
            // Kept for compatibility with older layouts; `*` is preferred
            if multiplier == 0.0 {
                return Err(malformed_match(raw, &matched, "division by zero".to_string()));
            }
            multiplier = 1.0 / multiplier;
        }
    }

    let mut constant = 0.0;
    if let (Some(op), Some(value)) = (matched.get(group::ADD_OP), matched.get(group::ADD_VALUE)) {
        constant = metrics.resolve(value.node).map_err(in_group(&value))?;
        if op.node == "-" {
            constant = -constant;
        }
    }

    Ok(
        ConstraintDescriptor::new(item1.node, attr1_tag, relation_tag, item2.node, attr2_tag)
            .with_multiplier(multiplier)
            .with_constant(constant),
    )
}

fn required<'m>(
    raw: &str,
    matched: &'m XtMatch,
    index: usize,
) -> Result<Spanned<&'m str>, CompileError> {
    matched
        .get(index)
        .ok_or_else(|| malformed_match(raw, matched, format!("group {} did not match", index)))
}

fn malformed_match(raw: &str, matched: &XtMatch, reason: String) -> CompileError {
    CompileError::InvalidConstraintSyntax {
        raw: raw.to_string(),
        reason,
        span: None,
        groups: matched.groups.clone(),
    }
}
