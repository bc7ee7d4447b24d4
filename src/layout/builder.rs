//! Owned fluent builder that feeds constraint text to a host

use serde::Deserialize;

use crate::compiler::Compiler;
use crate::config::LayoutConfig;
use crate::descriptor::{ConstraintDescriptor, Priority};
use crate::error::CompileError;
use crate::host::{ContentPriority, LayoutHost};
use crate::metrics::MetricSet;
use crate::registry::{GuideNode, Node, Registry, ViewNode};
use crate::vocab::Axis;

use super::tree::walk_depth_first;

/// Key of the top layout guide registered by `with_layout_guides`
pub const TOP_GUIDE_KEY: &str = "TOP_GUIDE";
/// Key of the bottom layout guide registered by `with_layout_guides`
pub const BOTTOM_GUIDE_KEY: &str = "BOTTOM_GUIDE";

/// Insets used by `fill_with_view_insets`
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn uniform(inset: f64) -> Self {
        Self::new(inset, inset, inset, inset)
    }

    fn to_metrics(self) -> MetricSet {
        MetricSet::new()
            .with("top", self.top)
            .with("left", self.left)
            .with("bottom", self.bottom)
            .with("right", self.right)
    }
}

/// One constraint string and what it became
#[derive(Debug, Clone)]
pub struct AppliedConstraint<T> {
    pub format: String,
    pub descriptors: Vec<ConstraintDescriptor>,
    pub handles: Vec<T>,
}

/// Builds the layout of one container view.
///
/// Views are registered under string keys, then referenced from constraint
/// text. Every constraint goes through [`Compiler`] and is applied to the
/// host straight away.
pub struct LayoutBuilder<H: LayoutHost> {
    host: H,
    view: ViewNode,
    config: LayoutConfig,
    registry: Registry,
    metrics: MetricSet,
    layout_guides: bool,
    applied: Vec<AppliedConstraint<H::Handle>>,
}

impl<H: LayoutHost> LayoutBuilder<H> {
    /// Builder for `view` with the default configuration
    pub fn new(host: H, view: ViewNode) -> Self {
        Self::with_config(host, view, LayoutConfig::default())
    }

    pub fn with_config(host: H, view: ViewNode, config: LayoutConfig) -> Self {
        Self {
            host,
            view,
            registry: Registry::new(config.parent_view_key.clone(), view),
            config,
            metrics: MetricSet::new(),
            layout_guides: false,
            applied: Vec::new(),
        }
    }

    /// Register the top and bottom guides; `fill_with_view` then anchors to
    /// them instead of the container's vertical edges
    pub fn with_layout_guides(mut self, top: GuideNode, bottom: GuideNode) -> Result<Self, CompileError> {
        self.registry.register(TOP_GUIDE_KEY, Node::Guide(top))?;
        self.registry.register(BOTTOM_GUIDE_KEY, Node::Guide(bottom))?;
        self.layout_guides = true;
        Ok(self)
    }

    /// Register `view` and attach it to the container
    pub fn add_view(mut self, key: impl Into<String>, view: ViewNode) -> Result<Self, CompileError> {
        self.register_view(key, view, true)?;
        Ok(self)
    }

    /// Register `view` for use in constraints without attaching it
    pub fn add_view_unattached(mut self, key: impl Into<String>, view: ViewNode) -> Result<Self, CompileError> {
        self.register_view(key, view, false)?;
        Ok(self)
    }

    pub fn add_views<K: Into<String>>(
        mut self,
        views: impl IntoIterator<Item = (K, ViewNode)>,
    ) -> Result<Self, CompileError> {
        for (key, view) in views {
            self.register_view(key, view, true)?;
        }
        Ok(self)
    }

    pub fn add_guides<K: Into<String>>(
        mut self,
        guides: impl IntoIterator<Item = (K, GuideNode)>,
    ) -> Result<Self, CompileError> {
        for (key, guide) in guides {
            self.registry.register(key, Node::Guide(guide))?;
        }
        Ok(self)
    }

    pub(crate) fn register_view(
        &mut self,
        key: impl Into<String>,
        view: ViewNode,
        attach: bool,
    ) -> Result<(), CompileError> {
        let key = key.into();
        self.registry.register(key.clone(), Node::View(view))?;
        if attach {
            self.host.attach(self.view, view)?;
        }
        tracing::trace!(key = %key, attach, "registered view");
        Ok(())
    }

    /// Unregister views and detach them from the host. Guides and unknown
    /// keys are left alone.
    pub fn remove_views<S: AsRef<str>>(mut self, keys: &[S]) -> Result<Self, CompileError> {
        let known = self.registry.view_keys();
        let keys: Vec<&str> = keys
            .iter()
            .map(AsRef::as_ref)
            .filter(|key| known.iter().any(|k| k == key))
            .collect();
        for (key, node) in self.registry.unregister(&keys) {
            if let Node::View(view) = node {
                self.host.detach(view)?;
                tracing::trace!(key = %key, "removed view");
            }
        }
        Ok(self)
    }

    pub fn remove_all_views(self) -> Result<Self, CompileError> {
        let keys = self.registry.view_keys();
        self.remove_views(&keys)
    }

    /// Replace the active metrics
    pub fn with_metrics(mut self, metrics: MetricSet) -> Self {
        self.set_metrics(metrics);
        self
    }

    pub(crate) fn set_metrics(&mut self, metrics: MetricSet) {
        self.metrics = metrics;
    }

    /// Make `view` fill the container
    pub fn fill_with_view(self, view: ViewNode) -> Result<Self, CompileError> {
        self.fill_with_view_insets(view, EdgeInsets::default())
    }

    /// Make `view` fill the container, inset on every side.
    ///
    /// Replaces the active metrics with `top`, `left`, `bottom` and `right`.
    pub fn fill_with_view_insets(self, view: ViewNode, insets: EdgeInsets) -> Result<Self, CompileError> {
        let key = self.config.default_view_key.clone();
        let (top, bottom) = if self.layout_guides {
            (format!("[{}]", TOP_GUIDE_KEY), format!("[{}]", BOTTOM_GUIDE_KEY))
        } else {
            ("|".to_string(), "|".to_string())
        };
        self.add_view(key.as_str(), view)?
            .with_metrics(insets.to_metrics())
            .add_constraints([
                format!("H:|-(left)-[{}]-(right)-|", key),
                format!("V:{}-(top)-[{}]-(bottom)-{}", top, key, bottom),
            ])
    }

    pub fn add_constraint(mut self, constraint: &str) -> Result<Self, CompileError> {
        self.apply_constraint(constraint, None)?;
        Ok(self)
    }

    pub fn add_constraint_with_priority(
        mut self,
        constraint: &str,
        priority: Priority,
    ) -> Result<Self, CompileError> {
        self.apply_constraint(constraint, Some(priority))?;
        Ok(self)
    }

    pub fn add_constraints<S: AsRef<str>>(
        mut self,
        constraints: impl IntoIterator<Item = S>,
    ) -> Result<Self, CompileError> {
        for constraint in constraints {
            self.apply_constraint(constraint.as_ref(), None)?;
        }
        Ok(self)
    }

    pub fn add_constraints_with_priority<S: AsRef<str>>(
        mut self,
        constraints: impl IntoIterator<Item = S>,
        priority: Priority,
    ) -> Result<Self, CompileError> {
        for constraint in constraints {
            self.apply_constraint(constraint.as_ref(), Some(priority))?;
        }
        Ok(self)
    }

    /// Apply a constraint and return the host's handles for it
    pub fn add_and_get_constraint(&mut self, constraint: &str) -> Result<Vec<H::Handle>, CompileError> {
        self.apply_constraint(constraint, None)
    }

    pub fn add_and_get_constraint_with_priority(
        &mut self,
        constraint: &str,
        priority: Priority,
    ) -> Result<Vec<H::Handle>, CompileError> {
        self.apply_constraint(constraint, Some(priority))
    }

    fn apply_constraint(
        &mut self,
        constraint: &str,
        priority: Option<Priority>,
    ) -> Result<Vec<H::Handle>, CompileError> {
        let descriptors =
            Compiler::new(&self.registry, &self.host).compile(constraint, &self.metrics, priority)?;
        let handles = self.host.apply(&descriptors, &self.registry)?;
        self.applied.push(AppliedConstraint {
            format: constraint.to_string(),
            descriptors,
            handles: handles.clone(),
        });
        Ok(handles)
    }

    /// Set hugging for a view and everything below it
    pub fn set_hugging(self, key: &str, priority: Priority, axis: Axis) -> Result<Self, CompileError> {
        self.set_content_priority(key, priority, axis, ContentPriority::Hugging)
    }

    /// Set compression resistance for a view and everything below it
    pub fn set_resistance(self, key: &str, priority: Priority, axis: Axis) -> Result<Self, CompileError> {
        self.set_content_priority(key, priority, axis, ContentPriority::CompressionResistance)
    }

    /// Keep a view at its content size along `axis`
    pub fn set_wrap_content(self, key: &str, axis: Axis) -> Result<Self, CompileError> {
        self.set_hugging(key, Priority::DEFAULT_HIGH, axis)?
            .set_resistance(key, Priority::REQUIRED, axis)
    }

    fn set_content_priority(
        mut self,
        key: &str,
        priority: Priority,
        axis: Axis,
        kind: ContentPriority,
    ) -> Result<Self, CompileError> {
        let view = self.registry.resolve_view(key)?;
        walk_depth_first(&mut self.host, view, |host, node| {
            host.set_content_priority(node, priority, axis, kind)
        })?;
        Ok(self)
    }

    /// The container view
    pub fn view(&self) -> ViewNode {
        self.view
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    /// Every constraint applied so far, in order
    pub fn applied(&self) -> &[AppliedConstraint<H::Handle>] {
        &self.applied
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Frame, SolverHost};
    use crate::vocab::{Attribute, Relation};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.001,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn builder() -> (LayoutBuilder<SolverHost>, ViewNode) {
        let mut host = SolverHost::new();
        let root = host.create_view();
        (LayoutBuilder::new(host, root), root)
    }

    #[test]
    fn test_add_view_attaches() {
        let (mut builder, root) = builder();
        let a = builder.host_mut().create_view();
        let b = builder.host_mut().create_view();
        let builder = builder
            .add_view("a", a)
            .unwrap()
            .add_view_unattached("b", b)
            .unwrap();
        assert_eq!(builder.host().children(root), vec![a]);
        assert!(builder.registry().contains("b"));
    }

    #[test]
    fn test_parent_key_cannot_be_registered() {
        let (mut builder, _) = builder();
        let a = builder.host_mut().create_view();
        let err = builder.add_view("parent", a).err().unwrap();
        assert!(matches!(err, CompileError::ReservedKey { .. }));
    }

    #[test]
    fn test_fill_with_view_insets() {
        let (mut builder, root) = builder();
        let content = builder.host_mut().create_view();
        let builder = builder
            .fill_with_view_insets(content, EdgeInsets::new(10.0, 20.0, 30.0, 40.0))
            .unwrap();
        assert_eq!(builder.applied().len(), 2);
        assert_eq!(builder.applied()[0].format, "H:|-(left)-[view]-(right)-|");

        let frame = builder.host().layout(root, 300.0, 200.0).unwrap().get(content).unwrap();
        assert_close(frame.x, 20.0);
        assert_close(frame.width, 240.0);
        assert_close(frame.y, 10.0);
        assert_close(frame.height, 160.0);
    }

    #[test]
    fn test_fill_with_layout_guides() {
        let mut host = SolverHost::new();
        let root = host.create_view();
        let top = host.create_guide(Frame::new(0.0, 0.0, 320.0, 20.0));
        let bottom = host.create_guide(Frame::new(0.0, 430.0, 320.0, 50.0));
        let content = host.create_view();

        let builder = LayoutBuilder::new(host, root)
            .with_layout_guides(top, bottom)
            .unwrap()
            .fill_with_view(content)
            .unwrap();
        assert_eq!(
            builder.applied()[1].format,
            "V:[TOP_GUIDE]-(top)-[view]-(bottom)-[BOTTOM_GUIDE]"
        );

        let frame = builder.host().layout(root, 320.0, 480.0).unwrap().get(content).unwrap();
        assert_close(frame.y, 20.0);
        assert_close(frame.bottom(), 430.0);
    }

    #[test]
    fn test_priority_override_reaches_descriptors() {
        let (mut builder, _) = builder();
        let a = builder.host_mut().create_view();
        let mut builder = builder.add_view("a", a).unwrap();
        let handles = builder
            .add_and_get_constraint_with_priority("X: a.width == parent.width * 0.5", Priority::DEFAULT_LOW)
            .unwrap();
        assert_eq!(handles.len(), 1);
        let descriptor = builder.host().constraint(handles[0]).unwrap();
        assert_eq!(descriptor.priority, Some(Priority::DEFAULT_LOW));
        assert_eq!(descriptor.attr2, Some(Attribute::Width));
    }

    #[test]
    fn test_failed_constraint_applies_nothing() {
        let (mut builder, _) = builder();
        let a = builder.host_mut().create_view();
        let mut builder = builder.add_view("a", a).unwrap();
        let err = builder
            .add_and_get_constraint("X: a.width == missing.width")
            .unwrap_err();
        assert!(matches!(err.root(), CompileError::UnknownViewKey { .. }));
        assert!(builder.applied().is_empty());
        assert_eq!(builder.host().constraint_count(), 0);
    }

    #[test]
    fn test_remove_views_keeps_guides() {
        let mut host = SolverHost::new();
        let root = host.create_view();
        let guide = host.create_guide(Frame::default());
        let a = host.create_view();
        let b = host.create_view();

        let builder = LayoutBuilder::new(host, root)
            .add_guides([("g", guide)])
            .unwrap()
            .add_views([("a", a), ("b", b)])
            .unwrap()
            .remove_views(&["a", "g", "nope"])
            .unwrap();
        assert!(!builder.registry().contains("a"));
        assert!(builder.registry().contains("g"));
        assert!(builder.host().is_detached(a));
        assert_eq!(builder.host().children(root), vec![b]);

        let builder = builder.remove_all_views().unwrap();
        assert!(builder.registry().view_keys().is_empty());
        assert!(builder.registry().contains("g"));
    }

    #[test]
    fn test_wrap_content_propagates_to_subviews() {
        let (mut builder, _) = builder();
        let row = builder.host_mut().create_view();
        let label = builder.host_mut().create_view();
        builder.host_mut().attach(row, label).unwrap();

        let builder = builder
            .add_view("row", row)
            .unwrap()
            .set_wrap_content("row", Axis::Horizontal)
            .unwrap();
        let host = builder.host();
        for view in [row, label] {
            assert_eq!(
                host.content_priority(view, Axis::Horizontal, ContentPriority::Hugging),
                Some(Priority::DEFAULT_HIGH)
            );
            assert_eq!(
                host.content_priority(view, Axis::Horizontal, ContentPriority::CompressionResistance),
                Some(Priority::REQUIRED)
            );
            assert_eq!(
                host.content_priority(view, Axis::Vertical, ContentPriority::Hugging),
                Some(Priority::DEFAULT_LOW)
            );
        }
    }

    #[test]
    fn test_applied_records_descriptors() {
        let (mut builder, _) = builder();
        let a = builder.host_mut().create_view();
        let builder = builder
            .add_view("a", a)
            .unwrap()
            .with_metrics(MetricSet::new().with("w", 64.0))
            .add_constraint("H:[a(==w)]")
            .unwrap();
        let applied = &builder.applied()[0];
        assert_eq!(
            applied.descriptors,
            vec![ConstraintDescriptor::constant("a", Attribute::Width, Relation::Equal, 64.0)]
        );
    }
}
