//! Builders that drive constraint text into a host
//!
//! [`LayoutBuilder`] owns the registry and metrics for one container view.
//! [`LinearBuilder`] sits on top of it and stacks views along an axis.

pub mod builder;
pub mod linear;
pub mod tree;

pub use builder::{AppliedConstraint, EdgeInsets, LayoutBuilder, BOTTOM_GUIDE_KEY, TOP_GUIDE_KEY};
pub use linear::{view_key, LinearBuilder, Margins, BETWEEN_KEY, ENDS_KEY, SIDES_KEY};
pub use tree::walk_depth_first;
