//! Integration tests for compiling constraint text

use constraint_dsl::{
    compile, Attribute, CompileError, ConstraintDescriptor, GuideNode, MetricSet, Node, Priority,
    Registry, Relation, ViewNode,
};
use pretty_assertions::assert_eq;

fn registry() -> Registry {
    let mut registry = Registry::new("parent", ViewNode::from_raw(0));
    for (i, key) in ["v1", "v2", "title", "body"].iter().enumerate() {
        registry
            .register(*key, Node::View(ViewNode::from_raw(i as u32 + 1)))
            .unwrap();
    }
    registry
        .register("TOP_GUIDE", Node::Guide(GuideNode::from_raw(0)))
        .unwrap();
    registry
}

fn compile_one(raw: &str, metrics: &MetricSet) -> Result<ConstraintDescriptor, CompileError> {
    let mut descriptors = compile(raw, &registry(), metrics, None)?;
    assert_eq!(descriptors.len(), 1, "extended constraints compile to one descriptor");
    Ok(descriptors.remove(0))
}

#[test]
fn test_centering_round_trip() {
    let descriptor = compile_one("X: parent.centerX == v1.centerX", &MetricSet::new()).unwrap();
    assert_eq!(
        descriptor,
        ConstraintDescriptor {
            item1: "parent".to_string(),
            attr1: Attribute::CenterX,
            relation: Relation::Equal,
            item2: Some("v1".to_string()),
            attr2: Some(Attribute::CenterX),
            multiplier: 1.0,
            constant: 0.0,
            priority: None,
        }
    );
}

#[test]
fn test_omitted_clauses_default() {
    for raw in [
        "X: v1.top == v2.bottom",
        "X: title.width <= body.width",
        "X: body.baseline >= TOP_GUIDE.bottom",
    ] {
        let descriptor = compile_one(raw, &MetricSet::new()).unwrap();
        assert_eq!(descriptor.multiplier, 1.0, "{}", raw);
        assert_eq!(descriptor.constant, 0.0, "{}", raw);
    }
}

#[test]
fn test_division_inverts() {
    let metrics = MetricSet::new().with("cols", 3.0);
    for (raw, expected) in [
        ("X: v1.width == parent.width / 2", 0.5),
        ("X: v1.width == parent.width / 8", 0.125),
        ("X: v1.width == parent.width / cols", 1.0 / 3.0),
    ] {
        let descriptor = compile_one(raw, &metrics).unwrap();
        assert!((descriptor.multiplier - expected).abs() < 1e-12, "{}", raw);
    }
}

#[test]
fn test_minus_negates() {
    let metrics = MetricSet::new().with("gap", 12.5);
    let descriptor = compile_one("X: v1.left == v2.right * 2 - gap", &metrics).unwrap();
    assert_eq!(descriptor.multiplier, 2.0);
    assert_eq!(descriptor.constant, -12.5);
}

#[test]
fn test_metrics_never_default_to_zero() {
    let err = compile_one("X: v1.left == v2.right + gap", &MetricSet::new()).unwrap_err();
    assert!(matches!(err.root(), CompileError::UnknownMetric { name } if name == "gap"));

    let err = compile("H:|-(gap)-[v1]", &registry(), &MetricSet::new(), None).unwrap_err();
    assert!(matches!(err, CompileError::HostFormatError { .. }));
}

#[test]
fn test_single_equals_is_rejected() {
    let err = compile_one("X: v1.left = v2.right", &MetricSet::new()).unwrap_err();
    let rejected = matches!(
        err.root(),
        CompileError::UnknownRelation { .. } | CompileError::InvalidConstraintSyntax { .. }
    );
    assert!(rejected, "unexpected error: {:?}", err);
}

#[test]
fn test_malformed_extended_strings() {
    for raw in [
        "X: v1.left == v2",
        "X: v1.left == v2.right +",
        "X: v1.left == v2.right * 2 * 3",
        "X: 1v.left == v2.right",
        "X:\tv1.left == v2.right",
        "X: v1 . left == v2.right",
        "X: v1.left == v2. right",
    ] {
        let err = compile_one(raw, &MetricSet::new()).unwrap_err();
        assert!(
            matches!(err, CompileError::InvalidConstraintSyntax { .. }),
            "{} gave {:?}",
            raw,
            err
        );
    }
}

#[test]
fn test_unknown_attribute_lists_vocabulary() {
    let err = compile_one("X: v1.middle == v2.left", &MetricSet::new()).unwrap_err();
    match err.root() {
        CompileError::UnknownAttribute { name, valid } => {
            assert_eq!(name, "middle");
            assert!(valid.contains("centerX"));
            assert!(valid.contains("baseline"));
        }
        other => panic!("expected UnknownAttribute, got {:?}", other),
    }
}

#[test]
fn test_standard_chain_yields_several() {
    let metrics = MetricSet::new().with("e", 20.0).with("b", 20.0);
    let descriptors = compile("V:|-(e)-[v1]-(b)-[v2]-(e)-|", &registry(), &metrics, None).unwrap();
    assert_eq!(descriptors.len(), 3);
    assert!(descriptors.iter().all(|d| d.constant == 20.0));
}

#[test]
fn test_priority_override_is_uniform() {
    let descriptors = compile(
        "H:|-[v1(>=44@250)]-[v2]-|",
        &registry(),
        &MetricSet::new(),
        Some(Priority::DEFAULT_HIGH),
    )
    .unwrap();
    assert_eq!(descriptors.len(), 4);
    assert!(descriptors
        .iter()
        .all(|d| d.priority == Some(Priority::DEFAULT_HIGH)));
}

#[test]
fn test_error_report_points_at_token() {
    let raw = "X: v1.left == v3.right";
    let err = compile_one(raw, &MetricSet::new()).unwrap_err();
    assert_eq!(&raw[err.span().unwrap().clone()], "v3");

    let report = err.format("layout.toml");
    assert!(report.contains("layout.toml"));
    assert!(report.contains("v3"));
    assert!(report.contains("did you mean"));
}
