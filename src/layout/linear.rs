//! Stack views along one axis
//!
//! A [`LinearBuilder`] turns batches of views into standard-format chains
//! along its main axis, plus one pinning (or centering) constraint per view
//! along the cross axis. Margins are exposed to the emitted text as the
//! metrics [`ENDS_KEY`], [`SIDES_KEY`] and [`BETWEEN_KEY`].

use serde::Deserialize;

use crate::error::CompileError;
use crate::host::LayoutHost;
use crate::metrics::MetricSet;
use crate::registry::ViewNode;
use crate::vocab::Axis;

use super::builder::LayoutBuilder;

/// Metric key for the gap between the container and the first/last view
pub const ENDS_KEY: &str = "e";
/// Metric key for the gap between the container and each view on the cross axis
pub const SIDES_KEY: &str = "s";
/// Metric key for the gap between consecutive views
pub const BETWEEN_KEY: &str = "b";

/// Gaps used by a [`LinearBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub ends: f64,
    pub sides: f64,
    pub between: f64,
}

impl Margins {
    pub fn new(ends: f64, sides: f64, between: f64) -> Self {
        Self {
            ends,
            sides,
            between,
        }
    }

    fn to_metrics(self) -> MetricSet {
        MetricSet::new()
            .with(ENDS_KEY, self.ends)
            .with(SIDES_KEY, self.sides)
            .with(BETWEEN_KEY, self.between)
    }
}

/// Key of the `n`th view added to a sequence (1-based)
pub fn view_key(n: usize) -> String {
    format!("v{}", n)
}

/// Sequences views along `axis` inside the container of a [`LayoutBuilder`]
pub struct LinearBuilder<H: LayoutHost> {
    axis: Axis,
    layout: LayoutBuilder<H>,
    margins: Margins,
    count: usize,
    closed: bool,
}

impl<H: LayoutHost> LinearBuilder<H> {
    pub fn new(axis: Axis, layout: LayoutBuilder<H>) -> Self {
        Self {
            axis,
            layout,
            margins: Margins::default(),
            count: 0,
            closed: false,
        }
    }

    /// Set the margins used by constraints emitted from now on
    pub fn with_margins(mut self, ends: f64, sides: f64, between: f64) -> Self {
        self.margins = Margins::new(ends, sides, between);
        self
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn cross_axis(&self) -> Axis {
        self.axis.cross()
    }

    /// Number of views added so far
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether the trailing edge constraint has been emitted since the last batch
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Append a batch of views.
    ///
    /// The first batch is anchored to the container's leading edge, later
    /// batches to the last view added before them. With `centered`, each view
    /// is centered on the cross axis instead of pinned to both cross edges.
    pub fn add_views(
        mut self,
        views: impl IntoIterator<Item = ViewNode>,
        centered: bool,
    ) -> Result<Self, CompileError> {
        let views: Vec<ViewNode> = views.into_iter().collect();
        if views.is_empty() {
            tracing::warn!(axis = %self.axis.letter(), "ignoring empty batch");
            return Ok(self);
        }

        let prefix = if self.count == 0 {
            format!("|-({})-", ENDS_KEY)
        } else {
            format!("[{}]-({})-", view_key(self.count), BETWEEN_KEY)
        };

        let mut keys = Vec::with_capacity(views.len());
        for view in views {
            self.count += 1;
            let key = view_key(self.count);
            self.layout.register_view(key.as_str(), view, true)?;
            keys.push(key);
        }

        for key in &keys {
            let cross = self.cross_constraint(key, centered);
            self.emit(&cross)?;
        }
        let separator = format!("]-({})-[", BETWEEN_KEY);
        let chain = format!(
            "{}:{}[{}]",
            self.axis.letter(),
            prefix,
            keys.join(separator.as_str())
        );
        self.emit(&chain)?;

        self.closed = false;
        Ok(self)
    }

    /// Anchor the last view to the container's trailing edge
    pub fn add_bottom_constraint(mut self) -> Result<Self, CompileError> {
        if self.count == 0 {
            return Err(CompileError::EmptySequence);
        }
        if self.closed {
            tracing::warn!(axis = %self.axis.letter(), "sequence already closed");
            return Ok(self);
        }
        let closing = format!(
            "{}:[{}]-({})-|",
            self.axis.letter(),
            view_key(self.count),
            ENDS_KEY
        );
        self.emit(&closing)?;
        self.closed = true;
        Ok(self)
    }

    fn cross_constraint(&self, key: &str, centered: bool) -> String {
        let cross = self.cross_axis();
        if centered {
            let center = cross.center();
            format!(
                "X:{}.{} == {}.{}",
                self.layout.registry().parent_key(),
                center,
                key,
                center
            )
        } else {
            format!("{}:|-({})-[{}]-({})-|", cross.letter(), SIDES_KEY, key, SIDES_KEY)
        }
    }

    /// Compile and apply with the current margins as metrics
    fn emit(&mut self, constraint: &str) -> Result<(), CompileError> {
        self.layout.set_metrics(self.margins.to_metrics());
        self.layout.add_and_get_constraint(constraint)?;
        Ok(())
    }

    pub fn layout(&self) -> &LayoutBuilder<H> {
        &self.layout
    }

    pub fn into_layout(self) -> LayoutBuilder<H> {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SolverHost;
    use crate::vocab::{Attribute, Relation};
    use pretty_assertions::assert_eq;

    fn linear(axis: Axis) -> (LinearBuilder<SolverHost>, ViewNode, Vec<ViewNode>) {
        let mut host = SolverHost::new();
        let root = host.create_view();
        let views = (0..3)
            .map(|_| host.create_view_with_intrinsic_size(40.0, 50.0))
            .collect();
        (LinearBuilder::new(axis, LayoutBuilder::new(host, root)), root, views)
    }

    fn formats<H: LayoutHost>(linear: &LinearBuilder<H>) -> Vec<&str> {
        linear
            .layout()
            .applied()
            .iter()
            .map(|a| a.format.as_str())
            .collect()
    }

    #[test]
    fn test_first_batch_anchors_to_container() {
        let (linear, _, views) = linear(Axis::Vertical);
        let linear = linear
            .with_margins(20.0, 20.0, 20.0)
            .add_views(views[..2].to_vec(), false)
            .unwrap()
            .add_bottom_constraint()
            .unwrap();
        assert_eq!(
            formats(&linear),
            vec![
                "H:|-(s)-[v1]-(s)-|",
                "H:|-(s)-[v2]-(s)-|",
                "V:|-(e)-[v1]-(b)-[v2]",
                "V:[v2]-(e)-|",
            ]
        );
        assert_eq!(linear.layout().metrics().get("e"), Some(20.0));
        assert_eq!(linear.layout().metrics().get("b"), Some(20.0));
        assert!(linear.is_closed());
    }

    #[test]
    fn test_later_batch_anchors_to_previous_view() {
        let (linear, _, views) = linear(Axis::Horizontal);
        let linear = linear
            .add_views([views[0]], false)
            .unwrap()
            .add_views([views[1], views[2]], false)
            .unwrap();
        assert_eq!(
            formats(&linear),
            vec![
                "V:|-(s)-[v1]-(s)-|",
                "H:|-(e)-[v1]",
                "V:|-(s)-[v2]-(s)-|",
                "V:|-(s)-[v3]-(s)-|",
                "H:[v1]-(b)-[v2]-(b)-[v3]",
            ]
        );
        assert_eq!(linear.cross_axis(), Axis::Vertical);
        assert_eq!(linear.len(), 3);
        assert!(!linear.is_closed());
    }

    #[test]
    fn test_centered_batch_uses_extended_constraints() {
        let (linear, _, views) = linear(Axis::Vertical);
        let linear = linear.add_views(views[..2].to_vec(), true).unwrap();
        let applied = linear.layout().applied();
        assert_eq!(applied[0].format, "X:parent.centerX == v1.centerX");
        assert_eq!(applied[1].format, "X:parent.centerX == v2.centerX");
        assert_eq!(applied[0].descriptors.len(), 1);
        assert_eq!(applied[0].descriptors[0].attr1, Attribute::CenterX);
        assert_eq!(applied[0].descriptors[0].relation, Relation::Equal);
    }

    #[test]
    fn test_close_without_views_fails() {
        let (linear, _, _) = linear(Axis::Vertical);
        let err = linear.add_bottom_constraint().err().unwrap();
        assert!(matches!(err, CompileError::EmptySequence));
    }

    #[test]
    fn test_second_close_is_ignored() {
        let (linear, _, views) = linear(Axis::Vertical);
        let linear = linear
            .add_views([views[0]], true)
            .unwrap()
            .add_bottom_constraint()
            .unwrap()
            .add_bottom_constraint()
            .unwrap();
        assert_eq!(linear.layout().applied().len(), 3);
    }

    #[test]
    fn test_margins_apply_going_forward() {
        let (linear, _, views) = linear(Axis::Vertical);
        let linear = linear
            .with_margins(10.0, 0.0, 4.0)
            .add_views([views[0]], true)
            .unwrap()
            .with_margins(30.0, 0.0, 4.0)
            .add_views([views[1]], true)
            .unwrap();
        let applied = linear.layout().applied();
        assert_eq!(applied[1].descriptors[0].constant, 10.0);
        assert_eq!(applied[3].descriptors[0].constant, 4.0);
        assert_eq!(linear.layout().metrics().get("e"), Some(30.0));
    }

    #[test]
    fn test_empty_batch_is_a_no_op() {
        let (linear, _, _) = linear(Axis::Vertical);
        let linear = linear.add_views(Vec::new(), false).unwrap();
        assert!(linear.is_empty());
        assert!(linear.layout().applied().is_empty());
    }

    #[test]
    fn test_solved_stack() {
        let (linear, root, views) = linear(Axis::Vertical);
        let linear = linear
            .with_margins(20.0, 20.0, 20.0)
            .add_views(views[..2].to_vec(), false)
            .unwrap();
        let frames = linear.layout().host().layout(root, 300.0, 400.0).unwrap();

        let first = frames.get(views[0]).unwrap();
        let second = frames.get(views[1]).unwrap();
        assert!((first.x - 20.0).abs() < 0.001);
        assert!((first.width - 260.0).abs() < 0.001);
        assert!((first.y - 20.0).abs() < 0.001);
        assert!((second.y - 90.0).abs() < 0.001);
    }
}
