//! Built-in compiler for standard-format (`H:`/`V:`) strings

use crate::config::LayoutConfig;
use crate::descriptor::{ConstraintDescriptor, Priority};
use crate::error::CompileError;
use crate::metrics::MetricSet;
use crate::parser::ast::{Connection, Predicate, PredicateObject, Span, Spanned, ViewSpec};
use crate::parser::parse_visual;
use crate::registry::Registry;
use crate::vocab::{Attribute, Axis, Relation};

use super::{FormatFailure, VisualFormatCompiler};

/// Standard-format compiler used when the host has none of its own.
///
/// Horizontal chains run leading to trailing, vertical chains top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinVisualFormat {
    /// Gap for `[a]-[b]`
    pub sibling_spacing: f64,
    /// Gap for `|-[a]` and `[a]-|`
    pub superview_spacing: f64,
}

impl Default for BuiltinVisualFormat {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl BuiltinVisualFormat {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            sibling_spacing: config.sibling_spacing,
            superview_spacing: config.superview_spacing,
        }
    }
}

impl VisualFormatCompiler for BuiltinVisualFormat {
    fn compile_visual_format(
        &self,
        format: &str,
        registry: &Registry,
        metrics: &MetricSet,
    ) -> Result<Vec<ConstraintDescriptor>, FormatFailure> {
        let chain = parse_visual(format).map_err(|(message, span)| FormatFailure {
            message,
            span: Some(span),
        })?;

        for view in chain.views() {
            registry
                .resolve(&view.name.node)
                .map_err(|e| FormatFailure::at(e, &view.name.span))?;
        }

        let axis = chain.orientation.unwrap_or(Axis::Horizontal);
        let (lead, trail) = axis.edges();
        let parent = registry.parent_key();
        let ctx = Lowering {
            axis,
            registry,
            metrics,
        };
        let mut out = Vec::new();

        if let Some(connection) = &chain.leading {
            // |-c-[first]: first.lead = parent.lead + c
            ctx.connect(
                &mut out,
                connection,
                self.superview_spacing,
                (&chain.first.name.node, lead),
                (parent, lead),
            )?;
        }
        ctx.size_predicates(&mut out, &chain.first)?;

        let mut previous = &chain.first;
        for (connection, view) in &chain.rest {
            // [prev]-c-[view]: view.lead = prev.trail + c
            ctx.connect(
                &mut out,
                connection,
                self.sibling_spacing,
                (&view.name.node, lead),
                (&previous.name.node, trail),
            )?;
            ctx.size_predicates(&mut out, view)?;
            previous = view;
        }

        if let Some(connection) = &chain.trailing {
            // [last]-c-|: parent.trail = last.trail + c
            ctx.connect(
                &mut out,
                connection,
                self.superview_spacing,
                (parent, trail),
                (&previous.name.node, trail),
            )?;
        }

        Ok(out)
    }
}

struct Lowering<'a> {
    axis: Axis,
    registry: &'a Registry,
    metrics: &'a MetricSet,
}

impl Lowering<'_> {
    /// One descriptor per predicate of a connection between two edges
    fn connect(
        &self,
        out: &mut Vec<ConstraintDescriptor>,
        connection: &Connection,
        standard: f64,
        first: (&str, Attribute),
        second: (&str, Attribute),
    ) -> Result<(), FormatFailure> {
        let base = ConstraintDescriptor::new(first.0, first.1, Relation::Equal, second.0, second.1);
        match connection {
            Connection::Flush => out.push(base),
            Connection::Standard => out.push(base.with_constant(standard)),
            Connection::Explicit(predicates) => {
                for predicate in predicates {
                    let mut descriptor = base.clone();
                    descriptor.relation = self.relation(predicate)?;
                    descriptor.constant = self.value(&predicate.object)?;
                    descriptor.priority = self.priority(predicate)?;
                    out.push(descriptor);
                }
            }
        }
        Ok(())
    }

    /// `[view(==100)]` or `[view(==other)]` along the chain's axis
    fn size_predicates(
        &self,
        out: &mut Vec<ConstraintDescriptor>,
        view: &ViewSpec,
    ) -> Result<(), FormatFailure> {
        let size = self.axis.size();
        for predicate in &view.predicates {
            let relation = self.relation(predicate)?;
            let mut descriptor = match &predicate.object.node {
                PredicateObject::Name(other) if self.registry.contains(other) => {
                    ConstraintDescriptor::new(&view.name.node, size, relation, other, size)
                }
                _ => ConstraintDescriptor::constant(
                    &view.name.node,
                    size,
                    relation,
                    self.value(&predicate.object)?,
                ),
            };
            descriptor.priority = self.priority(predicate)?;
            out.push(descriptor);
        }
        Ok(())
    }

    fn relation(&self, predicate: &Predicate) -> Result<Relation, FormatFailure> {
        match &predicate.relation {
            Some(symbol) => {
                Relation::from_symbol(&symbol.node).map_err(|e| FormatFailure::at(e, &symbol.span))
            }
            None => Ok(Relation::Equal),
        }
    }

    fn value(&self, object: &Spanned<PredicateObject>) -> Result<f64, FormatFailure> {
        self.metrics
            .resolve(object.node.text())
            .map_err(|e| FormatFailure::at(e, &object.span))
    }

    fn priority(&self, predicate: &Predicate) -> Result<Option<Priority>, FormatFailure> {
        let Some(object) = &predicate.priority else {
            return Ok(None);
        };
        let value = self.value(object)?;
        if !(0.0..=Priority::REQUIRED.value() as f64).contains(&value) {
            return Err(FormatFailure {
                message: format!("priority {} is outside 0..=1000", value),
                span: Some(object.span.clone()),
            });
        }
        Ok(Some(Priority(value as f32)))
    }
}

impl FormatFailure {
    fn at(error: CompileError, span: &Span) -> Self {
        Self {
            message: error.to_string(),
            span: Some(span.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{GuideNode, Node, ViewNode};
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        let mut registry = Registry::new("parent", ViewNode::from_raw(0));
        for (i, key) in ["v1", "v2", "a", "b"].iter().enumerate() {
            registry
                .register(*key, Node::View(ViewNode::from_raw(i as u32 + 1)))
                .unwrap();
        }
        registry
            .register("TOP_GUIDE", Node::Guide(GuideNode::from_raw(0)))
            .unwrap();
        registry
    }

    fn compile(format: &str, metrics: &MetricSet) -> Result<Vec<ConstraintDescriptor>, FormatFailure> {
        BuiltinVisualFormat::default().compile_visual_format(format, &registry(), metrics)
    }

    #[test]
    fn test_vertical_chain() {
        let metrics = MetricSet::new().with("e", 20.0).with("b", 10.0);
        let cs = compile("V:|-(e)-[v1]-(b)-[v2]", &metrics).unwrap();
        assert_eq!(
            cs,
            vec![
                ConstraintDescriptor::new("v1", Attribute::Top, Relation::Equal, "parent", Attribute::Top)
                    .with_constant(20.0),
                ConstraintDescriptor::new("v2", Attribute::Top, Relation::Equal, "v1", Attribute::Bottom)
                    .with_constant(10.0),
            ]
        );
    }

    #[test]
    fn test_pinning_both_edges() {
        let metrics = MetricSet::new().with("s", 16.0);
        let cs = compile("H:|-(s)-[v1]-(s)-|", &metrics).unwrap();
        assert_eq!(cs.len(), 2);
        assert_eq!(cs[0].item1, "v1");
        assert_eq!(cs[0].attr1, Attribute::Leading);
        assert_eq!(cs[1].item1, "parent");
        assert_eq!(cs[1].attr1, Attribute::Trailing);
        assert_eq!(cs[1].item2.as_deref(), Some("v1"));
        assert_eq!(cs[1].constant, 16.0);
    }

    #[test]
    fn test_standard_and_flush_spacing() {
        let cs = compile("|-[a]-[b][v1]|", &MetricSet::new()).unwrap();
        let constants: Vec<f64> = cs.iter().map(|c| c.constant).collect();
        assert_eq!(constants, vec![20.0, 8.0, 0.0, 0.0]);
    }

    #[test]
    fn test_inequalities_with_priority() {
        let cs = compile("H:[a]-(>=8,<=40@250)-[b]", &MetricSet::new()).unwrap();
        assert_eq!(cs[0].relation, Relation::GreaterOrEqual);
        assert_eq!(cs[0].priority, None);
        assert_eq!(cs[1].relation, Relation::LessOrEqual);
        assert_eq!(cs[1].constant, 40.0);
        assert_eq!(cs[1].priority, Some(Priority(250.0)));
    }

    #[test]
    fn test_size_predicates() {
        let metrics = MetricSet::new().with("min", 44.0);
        let cs = compile("V:[a(>=min,==b)]", &metrics).unwrap();
        assert_eq!(
            cs,
            vec![
                ConstraintDescriptor::constant("a", Attribute::Height, Relation::GreaterOrEqual, 44.0),
                ConstraintDescriptor::new("a", Attribute::Height, Relation::Equal, "b", Attribute::Height),
            ]
        );
    }

    #[test]
    fn test_guides_can_anchor_chains() {
        let metrics = MetricSet::new().with("top", 5.0);
        let cs = compile("V:[TOP_GUIDE]-(top)-[v1]", &metrics).unwrap();
        assert_eq!(cs[0].item2.as_deref(), Some("TOP_GUIDE"));
        assert_eq!(cs[0].attr2, Some(Attribute::Bottom));
    }

    #[test]
    fn test_failures_carry_spans() {
        let input = "H:|-(gap)-[v1]";
        let err = compile(input, &MetricSet::new()).unwrap_err();
        assert!(err.message.contains("gap"));
        assert_eq!(&input[err.span.clone().unwrap()], "gap");

        let input = "H:|[nope]|";
        let err = compile(input, &MetricSet::new()).unwrap_err();
        assert_eq!(&input[err.span.clone().unwrap()], "nope");

        let err = compile("H:[a]-(8@2000)-[b]", &MetricSet::new()).unwrap_err();
        assert!(err.message.contains("priority"));
    }
}
