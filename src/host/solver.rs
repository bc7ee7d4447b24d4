//! A layout host backed by the kasuari Cassowary solver
//!
//! Views and guides live in an arena owned by [`SolverHost`]. Applied
//! descriptors are kept resolved to nodes; [`SolverHost::layout`] builds a
//! fresh solver from them and reads back one frame per view.

use std::collections::HashMap;

use kasuari::{Expression, Solver, Strength, Variable, WeightedRelation, WeightedRelation::*};

use crate::compiler::{BuiltinVisualFormat, FormatFailure, VisualFormatCompiler};
use crate::config::LayoutConfig;
use crate::descriptor::{ConstraintDescriptor, Priority};
use crate::metrics::MetricSet;
use crate::registry::{GuideNode, Node, Registry, ViewNode};
use crate::vocab::{Attribute, Axis, Relation};

use super::{ContentPriority, HostError, LayoutHost};

/// A resolved rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Index of an applied descriptor inside a [`SolverHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintHandle(usize);

/// Frames computed by [`SolverHost::layout`]
#[derive(Debug, Clone, Default)]
pub struct Frames {
    views: HashMap<ViewNode, Frame>,
}

impl Frames {
    pub fn get(&self, view: ViewNode) -> Option<Frame> {
        self.views.get(&view).copied()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[derive(Debug, Clone)]
struct ViewData {
    parent: Option<ViewNode>,
    children: Vec<ViewNode>,
    detached: bool,
    intrinsic: Option<(f64, f64)>,
    /// Indexed by axis: horizontal, vertical
    hugging: [Priority; 2],
    resistance: [Priority; 2],
}

impl ViewData {
    fn new(intrinsic: Option<(f64, f64)>) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            detached: false,
            intrinsic,
            hugging: [Priority::DEFAULT_LOW; 2],
            resistance: [Priority::DEFAULT_HIGH; 2],
        }
    }
}

#[derive(Debug, Clone)]
struct Applied {
    descriptor: ConstraintDescriptor,
    first: Node,
    second: Option<Node>,
}

/// Solver variables of one node
#[derive(Debug, Clone, Copy)]
struct NodeVars {
    x: Variable,
    y: Variable,
    width: Variable,
    height: Variable,
}

impl NodeVars {
    fn new() -> Self {
        Self {
            x: Variable::new(),
            y: Variable::new(),
            width: Variable::new(),
            height: Variable::new(),
        }
    }

    fn attribute(&self, attr: Attribute) -> Expression {
        match attr {
            Attribute::Left | Attribute::Leading => self.x.into(),
            Attribute::Right | Attribute::Trailing => self.x + self.width,
            Attribute::Top => self.y.into(),
            Attribute::Bottom | Attribute::Baseline => self.y + self.height,
            Attribute::Width => self.width.into(),
            Attribute::Height => self.height.into(),
            Attribute::CenterX => self.x + self.width * 0.5,
            Attribute::CenterY => self.y + self.height * 0.5,
        }
    }

    fn size(&self, axis: Axis) -> Variable {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// Layout host that solves frames with kasuari
#[derive(Debug, Clone, Default)]
pub struct SolverHost {
    format: BuiltinVisualFormat,
    views: Vec<ViewData>,
    guides: Vec<Frame>,
    constraints: Vec<Applied>,
}

impl SolverHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &LayoutConfig) -> Self {
        Self {
            format: BuiltinVisualFormat::from_config(config),
            ..Self::default()
        }
    }

    /// Create a view with no intrinsic size
    pub fn create_view(&mut self) -> ViewNode {
        self.push_view(ViewData::new(None))
    }

    /// Create a view whose content wants `width` x `height`
    pub fn create_view_with_intrinsic_size(&mut self, width: f64, height: f64) -> ViewNode {
        self.push_view(ViewData::new(Some((width, height))))
    }

    /// Create a guide pinned to a fixed frame
    pub fn create_guide(&mut self, frame: Frame) -> GuideNode {
        self.guides.push(frame);
        GuideNode::from_raw(self.guides.len() as u32 - 1)
    }

    fn push_view(&mut self, data: ViewData) -> ViewNode {
        self.views.push(data);
        ViewNode::from_raw(self.views.len() as u32 - 1)
    }

    fn view(&self, view: ViewNode) -> Result<&ViewData, HostError> {
        self.views
            .get(view.raw() as usize)
            .ok_or_else(|| HostError::UnknownNode(Node::View(view).to_string()))
    }

    fn view_mut(&mut self, view: ViewNode) -> Result<&mut ViewData, HostError> {
        self.views
            .get_mut(view.raw() as usize)
            .ok_or_else(|| HostError::UnknownNode(Node::View(view).to_string()))
    }

    fn check_node(&self, node: Node) -> Result<(), HostError> {
        let known = match node {
            Node::View(view) => (view.raw() as usize) < self.views.len(),
            Node::Guide(guide) => (guide.raw() as usize) < self.guides.len(),
        };
        if known {
            Ok(())
        } else {
            Err(HostError::UnknownNode(node.to_string()))
        }
    }

    pub fn parent(&self, view: ViewNode) -> Option<ViewNode> {
        self.views.get(view.raw() as usize).and_then(|v| v.parent)
    }

    pub fn is_detached(&self, view: ViewNode) -> bool {
        self.views
            .get(view.raw() as usize)
            .map_or(false, |v| v.detached)
    }

    pub fn content_priority(&self, view: ViewNode, axis: Axis, kind: ContentPriority) -> Option<Priority> {
        let data = self.views.get(view.raw() as usize)?;
        let index = axis_index(axis);
        Some(match kind {
            ContentPriority::Hugging => data.hugging[index],
            ContentPriority::CompressionResistance => data.resistance[index],
        })
    }

    /// The descriptor behind a handle
    pub fn constraint(&self, handle: ConstraintHandle) -> Option<&ConstraintDescriptor> {
        self.constraints.get(handle.0).map(|a| &a.descriptor)
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Solve every live constraint with `root` pinned to `(0, 0, width, height)`
    pub fn layout(&self, root: ViewNode, width: f64, height: f64) -> Result<Frames, HostError> {
        self.view(root)?;
        let mut solver = Solver::new();
        let mut vars: HashMap<Node, NodeVars> = HashMap::new();

        for (index, data) in self.views.iter().enumerate() {
            let node = ViewNode::from_raw(index as u32);
            if data.detached && node != root {
                continue;
            }
            let v = *vars.entry(Node::View(node)).or_insert_with(NodeVars::new);
            add(&mut solver, v.width | GE(Strength::REQUIRED) | 0.0, "width >= 0")?;
            add(&mut solver, v.height | GE(Strength::REQUIRED) | 0.0, "height >= 0")?;

            if let Some((w, h)) = data.intrinsic {
                for (axis, size) in [(Axis::Horizontal, w), (Axis::Vertical, h)] {
                    let i = axis_index(axis);
                    let var = v.size(axis);
                    let desc = format!("{} {} content size", node.raw(), axis.letter());
                    add(&mut solver, var | LE(strength(data.hugging[i])) | size, &desc)?;
                    add(&mut solver, var | GE(strength(data.resistance[i])) | size, &desc)?;
                }
            }
        }

        let r = vars[&Node::View(root)];
        for (var, value, desc) in [
            (r.x, 0.0, "root x"),
            (r.y, 0.0, "root y"),
            (r.width, width, "root width"),
            (r.height, height, "root height"),
        ] {
            add(&mut solver, var | EQ(Strength::REQUIRED) | value, desc)?;
        }

        for (index, frame) in self.guides.iter().enumerate() {
            let g = *vars
                .entry(Node::Guide(GuideNode::from_raw(index as u32)))
                .or_insert_with(NodeVars::new);
            for (var, value) in [
                (g.x, frame.x),
                (g.y, frame.y),
                (g.width, frame.width),
                (g.height, frame.height),
            ] {
                add(&mut solver, var | EQ(Strength::REQUIRED) | value, "guide frame")?;
            }
        }

        for applied in &self.constraints {
            let solved = |node: Node| vars.contains_key(&node);
            if !solved(applied.first) || !applied.second.map_or(true, solved) {
                tracing::debug!(constraint = %applied.descriptor, "skipping constraint on detached view");
                continue;
            }
            let d = &applied.descriptor;
            let lhs = vars[&applied.first].attribute(d.attr1);
            let relation = weighted(d.relation, strength(d.priority.unwrap_or(Priority::REQUIRED)));
            let desc = d.to_string();
            match (applied.second, d.attr2) {
                (Some(second), Some(attr2)) => {
                    let rhs = vars[&second].attribute(attr2);
                    add(&mut solver, lhs | relation | rhs * d.multiplier + d.constant, &desc)?;
                }
                _ => add(&mut solver, lhs | relation | d.constant, &desc)?,
            }
        }

        // Variables still at zero are not reported
        let values: HashMap<Variable, f64> = solver
            .fetch_changes()
            .iter()
            .map(|(v, value)| (*v, *value))
            .collect();
        let value = |var: Variable| values.get(&var).copied().unwrap_or(0.0);

        let mut frames = Frames::default();
        for (node, v) in &vars {
            if let Node::View(view) = node {
                frames.views.insert(
                    *view,
                    Frame::new(value(v.x), value(v.y), value(v.width), value(v.height)),
                );
            }
        }
        tracing::debug!(views = frames.len(), width, height, "solved layout");
        Ok(frames)
    }
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::Horizontal => 0,
        Axis::Vertical => 1,
    }
}

/// Map a 0..=1000 priority onto the solver's strength buckets
fn strength(priority: Priority) -> Strength {
    let value = priority.value();
    if value >= Priority::REQUIRED.value() {
        Strength::REQUIRED
    } else if value >= Priority::DEFAULT_HIGH.value() {
        Strength::STRONG
    } else if value >= Priority::DEFAULT_LOW.value() {
        Strength::MEDIUM
    } else {
        Strength::WEAK
    }
}

fn weighted(relation: Relation, strength: Strength) -> WeightedRelation {
    match relation {
        Relation::Equal => EQ(strength),
        Relation::GreaterOrEqual => GE(strength),
        Relation::LessOrEqual => LE(strength),
    }
}

fn add(solver: &mut Solver, constraint: kasuari::Constraint, desc: &str) -> Result<(), HostError> {
    solver.add_constraint(constraint).map_err(|e| match e {
        kasuari::AddConstraintError::UnsatisfiableConstraint => HostError::Unsatisfiable {
            constraint: desc.to_string(),
        },
        kasuari::AddConstraintError::DuplicateConstraint => HostError::Duplicate {
            constraint: desc.to_string(),
        },
        kasuari::AddConstraintError::InternalSolverError(msg) => {
            HostError::Internal(format!("{}: {}", desc, msg))
        }
    })
}

impl VisualFormatCompiler for SolverHost {
    fn compile_visual_format(
        &self,
        format: &str,
        registry: &Registry,
        metrics: &MetricSet,
    ) -> Result<Vec<ConstraintDescriptor>, FormatFailure> {
        self.format.compile_visual_format(format, registry, metrics)
    }
}

impl LayoutHost for SolverHost {
    type Handle = ConstraintHandle;

    fn attach(&mut self, parent: ViewNode, child: ViewNode) -> Result<(), HostError> {
        self.view(child)?;
        let mut ancestor = Some(parent);
        while let Some(node) = ancestor {
            if node == child {
                return Err(HostError::Cycle {
                    parent: parent.raw(),
                    child: child.raw(),
                });
            }
            ancestor = self.view(node)?.parent;
        }
        if let Some(old) = self.view(child)?.parent {
            self.view_mut(old)?.children.retain(|c| *c != child);
        }
        let data = self.view_mut(child)?;
        data.parent = Some(parent);
        data.detached = false;
        self.view_mut(parent)?.children.push(child);
        Ok(())
    }

    fn detach(&mut self, view: ViewNode) -> Result<(), HostError> {
        if let Some(parent) = self.view(view)?.parent {
            self.view_mut(parent)?.children.retain(|c| *c != view);
        }
        let data = self.view_mut(view)?;
        data.parent = None;
        data.detached = true;
        Ok(())
    }

    fn children(&self, view: ViewNode) -> Vec<ViewNode> {
        self.views
            .get(view.raw() as usize)
            .map(|v| v.children.clone())
            .unwrap_or_default()
    }

    fn set_content_priority(
        &mut self,
        view: ViewNode,
        priority: Priority,
        axis: Axis,
        kind: ContentPriority,
    ) -> Result<(), HostError> {
        let data = self.view_mut(view)?;
        let index = axis_index(axis);
        match kind {
            ContentPriority::Hugging => data.hugging[index] = priority,
            ContentPriority::CompressionResistance => data.resistance[index] = priority,
        }
        Ok(())
    }

    fn apply(
        &mut self,
        constraints: &[ConstraintDescriptor],
        registry: &Registry,
    ) -> Result<Vec<ConstraintHandle>, HostError> {
        let resolve = |key: &str| {
            registry
                .resolve(key)
                .map_err(|_| HostError::UnknownNode(key.to_string()))
        };

        let mut resolved = Vec::with_capacity(constraints.len());
        for descriptor in constraints {
            let first = resolve(&descriptor.item1)?;
            self.check_node(first)?;
            let second = match &descriptor.item2 {
                Some(key) => {
                    let node = resolve(key)?;
                    self.check_node(node)?;
                    Some(node)
                }
                None => None,
            };
            resolved.push(Applied {
                descriptor: descriptor.clone(),
                first,
                second,
            });
        }

        let start = self.constraints.len();
        self.constraints.extend(resolved);
        Ok((start..self.constraints.len()).map(ConstraintHandle).collect())
    }
}
