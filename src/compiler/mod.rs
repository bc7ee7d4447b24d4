//! Constraint compiler: the single entry point for constraint text
//!
//! Text starting with [`EXTENDED_PREFIX`] is compiled by the extended
//! grammar into exactly one descriptor; anything else is handed to a
//! [`VisualFormatCompiler`], which may produce several.

mod extended;
mod visual;

pub use extended::compile_extended;
pub use visual::BuiltinVisualFormat;

use crate::descriptor::{ConstraintDescriptor, Priority};
use crate::error::CompileError;
use crate::metrics::MetricSet;
use crate::parser::ast::Span;
use crate::registry::Registry;

/// Tag that selects the extended grammar
pub const EXTENDED_PREFIX: &str = "X";

/// Why a standard-format string was rejected
#[derive(Debug, Clone, PartialEq)]
pub struct FormatFailure {
    pub message: String,
    pub span: Option<Span>,
}

/// A compiler for standard-format (`H:`/`V:`) strings, normally provided by
/// the host layout engine
pub trait VisualFormatCompiler {
    fn compile_visual_format(
        &self,
        format: &str,
        registry: &Registry,
        metrics: &MetricSet,
    ) -> Result<Vec<ConstraintDescriptor>, FormatFailure>;
}

/// Compiles constraint text against a registry
pub struct Compiler<'a, F: ?Sized> {
    registry: &'a Registry,
    format: &'a F,
}

impl<'a, F: VisualFormatCompiler + ?Sized> Compiler<'a, F> {
    pub fn new(registry: &'a Registry, format: &'a F) -> Self {
        Self { registry, format }
    }

    /// Compile `raw` with the given metrics.
    ///
    /// A priority override, when given, is applied to every descriptor.
    pub fn compile(
        &self,
        raw: &str,
        metrics: &MetricSet,
        priority: Option<Priority>,
    ) -> Result<Vec<ConstraintDescriptor>, CompileError> {
        let (grammar, mut descriptors) = if raw.starts_with(EXTENDED_PREFIX) {
            let descriptor = compile_extended(raw, self.registry, metrics)?;
            ("extended", vec![descriptor])
        } else {
            let descriptors = self
                .format
                .compile_visual_format(raw, self.registry, metrics)
                .map_err(|failure| CompileError::HostFormatError {
                    raw: raw.to_string(),
                    message: failure.message,
                    span: failure.span,
                })?;
            ("standard", descriptors)
        };

        if let Some(priority) = priority {
            for descriptor in &mut descriptors {
                descriptor.priority = Some(priority);
            }
        }

        tracing::debug!(raw, grammar, count = descriptors.len(), "compiled constraint");
        Ok(descriptors)
    }
}

/// Compile one constraint with the built-in standard-format compiler
pub fn compile(
    raw: &str,
    registry: &Registry,
    metrics: &MetricSet,
    priority: Option<Priority>,
) -> Result<Vec<ConstraintDescriptor>, CompileError> {
    Compiler::new(registry, &BuiltinVisualFormat::default()).compile(raw, metrics, priority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Node, ViewNode};
    use crate::vocab::{Attribute, Relation};

    fn registry() -> Registry {
        let mut registry = Registry::new("parent", ViewNode::from_raw(0));
        registry
            .register("v1", Node::View(ViewNode::from_raw(1)))
            .unwrap();
        registry
            .register("v2", Node::View(ViewNode::from_raw(2)))
            .unwrap();
        registry
    }

    /// Records what it was asked to compile and returns nothing
    struct Recording(std::cell::RefCell<Vec<String>>);

    impl VisualFormatCompiler for Recording {
        fn compile_visual_format(
            &self,
            format: &str,
            _registry: &Registry,
            _metrics: &MetricSet,
        ) -> Result<Vec<ConstraintDescriptor>, FormatFailure> {
            self.0.borrow_mut().push(format.to_string());
            if format.contains('!') {
                return Err(FormatFailure {
                    message: "bang".to_string(),
                    span: None,
                });
            }
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_dispatch_on_prefix() {
        let registry = registry();
        let host = Recording(Default::default());
        let compiler = Compiler::new(&registry, &host);

        let extended = compiler
            .compile("X: parent.centerX == v1.centerX", &MetricSet::new(), None)
            .unwrap();
        assert_eq!(extended.len(), 1);
        assert!(host.0.borrow().is_empty());

        compiler.compile("V:|[v1]|", &MetricSet::new(), None).unwrap();
        assert_eq!(*host.0.borrow(), vec!["V:|[v1]|".to_string()]);
    }

    #[test]
    fn test_host_failures_are_wrapped() {
        let registry = registry();
        let host = Recording(Default::default());
        let err = Compiler::new(&registry, &host)
            .compile("H:!", &MetricSet::new(), None)
            .unwrap_err();
        match err {
            CompileError::HostFormatError { raw, message, .. } => {
                assert_eq!(raw, "H:!");
                assert_eq!(message, "bang");
            }
            other => panic!("expected HostFormatError, got {:?}", other),
        }
    }

    #[test]
    fn test_priority_override_applies_to_every_descriptor() {
        let metrics = MetricSet::new().with("b", 4.0);
        let cs = compile(
            "H:|-(b@250)-[v1]-(b)-[v2]-|",
            &registry(),
            &metrics,
            Some(Priority::DEFAULT_HIGH),
        )
        .unwrap();
        assert_eq!(cs.len(), 3);
        assert!(cs.iter().all(|c| c.priority == Some(Priority::DEFAULT_HIGH)));
    }

    #[test]
    fn test_no_override_keeps_descriptor_priorities() {
        let cs = compile("H:|-(8@250)-[v1]", &registry(), &MetricSet::new(), None).unwrap();
        assert_eq!(cs[0].priority, Some(Priority::DEFAULT_LOW));
    }

    #[test]
    fn test_extended_yields_exactly_one_descriptor() {
        let cs = compile(
            "X: v1.width == v2.width * 2 + 3",
            &registry(),
            &MetricSet::new(),
            None,
        )
        .unwrap();
        assert_eq!(cs.len(), 1);
        assert_eq!(cs[0].attr1, Attribute::Width);
        assert_eq!(cs[0].relation, Relation::Equal);
        assert_eq!(cs[0].multiplier, 2.0);
        assert_eq!(cs[0].constant, 3.0);
    }

    #[test]
    fn test_display_compiles_back() {
        let registry = registry();
        let first = compile(
            "X: v1.left >= v2.right * 0.5 - 12",
            &registry,
            &MetricSet::new(),
            None,
        )
        .unwrap();
        let again = compile(&first[0].to_string(), &registry, &MetricSet::new(), None).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_negative_multiplier_does_not_compile_back() {
        let registry = registry();
        let metrics = MetricSet::new().with("flip", -2.0);
        let compiled = compile("X: v1.width == parent.width * flip", &registry, &metrics, None).unwrap();
        assert_eq!(compiled[0].multiplier, -2.0);

        let text = compiled[0].to_string();
        assert_eq!(text, "X: v1.width == parent.width * -2");
        let err = compile(&text, &registry, &metrics, None).unwrap_err();
        assert!(matches!(err, CompileError::InvalidConstraintSyntax { .. }));
    }
}
