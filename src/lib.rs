//! Constraint DSL - a textual language for layout constraints
//!
//! Constraint strings come in two forms: the standard visual format
//! (`H:|-(pad)-[title]-(pad)-|`) and the extended algebraic form
//! (`X: title.centerX == parent.centerX`). Both compile into
//! [`ConstraintDescriptor`]s that a [`LayoutHost`] applies.
//!
//! # Example
//!
//! ```rust
//! use constraint_dsl::{compile, MetricSet, Node, Registry, ViewNode};
//!
//! let mut registry = Registry::new("parent", ViewNode::from_raw(0));
//! registry.register("v1", Node::View(ViewNode::from_raw(1))).unwrap();
//!
//! let descriptors = compile(
//!     "X: parent.centerX == v1.centerX",
//!     &registry,
//!     &MetricSet::new(),
//!     None,
//! )
//! .unwrap();
//! assert_eq!(descriptors.len(), 1);
//! assert_eq!(descriptors[0].to_string(), "X: parent.centerX == v1.centerX");
//! ```

pub mod compiler;
pub mod config;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod host;
pub mod layout;
pub mod metrics;
pub mod parser;
pub mod registry;
pub mod vocab;

pub use compiler::{compile, BuiltinVisualFormat, Compiler, FormatFailure, VisualFormatCompiler};
pub use config::LayoutConfig;
pub use descriptor::{ConstraintDescriptor, Priority};
pub use document::{Document, DocumentError, Solved};
pub use error::CompileError;
pub use host::{ContentPriority, Frame, Frames, HostError, LayoutHost, SolverHost};
pub use layout::{EdgeInsets, LayoutBuilder, LinearBuilder, Margins};
pub use metrics::MetricSet;
pub use registry::{GuideNode, Node, Registry, ViewNode};
pub use vocab::{Attribute, Axis, Relation};
