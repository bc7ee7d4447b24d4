//! The layout engine that consumes compiled constraints
//!
//! Builders only talk to a host through [`LayoutHost`]. [`SolverHost`] is a
//! self-contained host backed by a Cassowary solver.

mod solver;

pub use solver::{ConstraintHandle, Frame, Frames, SolverHost};

use thiserror::Error;

use crate::compiler::VisualFormatCompiler;
use crate::descriptor::{ConstraintDescriptor, Priority};
use crate::registry::{Registry, ViewNode};
use crate::vocab::Axis;

/// Errors raised by a host while mutating its view tree or applying constraints
#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown node {0}")]
    UnknownNode(String),

    #[error("unsatisfiable constraint `{constraint}`: conflicts with existing constraints")]
    Unsatisfiable { constraint: String },

    #[error("duplicate constraint `{constraint}`")]
    Duplicate { constraint: String },

    #[error("attaching view {child} under view {parent} would make it its own ancestor")]
    Cycle { parent: u32, child: u32 },

    #[error("internal solver error: {0}")]
    Internal(String),
}

/// Which content priority of a view to set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentPriority {
    /// Resistance to growing past the intrinsic size
    Hugging,
    /// Resistance to shrinking below the intrinsic size
    CompressionResistance,
}

/// A layout engine: owns views, applies descriptors, compiles the standard format
pub trait LayoutHost: VisualFormatCompiler {
    /// Native handle for an applied constraint
    type Handle: Clone + std::fmt::Debug;

    /// Make `child` a subview of `parent`
    fn attach(&mut self, parent: ViewNode, child: ViewNode) -> Result<(), HostError>;

    /// Remove `view` from its parent; its constraints stop taking part in layout
    fn detach(&mut self, view: ViewNode) -> Result<(), HostError>;

    /// Direct subviews, in attach order
    fn children(&self, view: ViewNode) -> Vec<ViewNode>;

    /// Set one view's content priority along an axis (not recursive)
    fn set_content_priority(
        &mut self,
        view: ViewNode,
        priority: Priority,
        axis: Axis,
        kind: ContentPriority,
    ) -> Result<(), HostError>;

    /// Apply a batch of descriptors whose keys resolve through `registry`
    fn apply(
        &mut self,
        constraints: &[ConstraintDescriptor],
        registry: &Registry,
    ) -> Result<Vec<Self::Handle>, HostError>;
}
