//! TOML layout documents
//!
//! A document declares a container, views, guides, metrics and constraint
//! strings, and optionally a linear sequence. [`Document::solve`] builds it on
//! a [`SolverHost`] and returns one frame per registered key.
//!
//! ```toml
//! constraints = ["H:|-(pad)-[title]-(pad)-|", { format = "V:|-[title]", priority = 750 }]
//!
//! [container]
//! width = 320
//! height = 480
//!
//! [metrics]
//! pad = 16
//!
//! [[views]]
//! key = "title"
//! size = [120, 24]
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::config::LayoutConfig;
use crate::descriptor::{ConstraintDescriptor, Priority};
use crate::error::CompileError;
use crate::host::{Frame, HostError, LayoutHost, SolverHost};
use crate::layout::{LayoutBuilder, LinearBuilder, Margins};
use crate::metrics::MetricSet;
use crate::registry::ViewNode;
use crate::vocab::Axis;

/// Errors that can occur when loading or building a layout document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read layout file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse layout TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("view `{key}` is nested in unknown view `{parent}`")]
    UnknownParent { key: String, parent: String },

    #[error("linear batch names undeclared view `{key}`")]
    UnknownView { key: String },

    #[error("linear batch names `{key}`, which is nested in `{parent}`; batches stack direct children of the container")]
    NestedInBatch { key: String, parent: String },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Host(#[from] HostError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default)]
    pub layout: LayoutConfig,
    pub container: Container,
    #[serde(default)]
    pub metrics: MetricSet,
    #[serde(default)]
    pub guides: Vec<GuideSpec>,
    #[serde(default)]
    pub views: Vec<ViewSpec>,
    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,
    pub linear: Option<LinearSpec>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Container {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuideSpec {
    pub key: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl GuideSpec {
    fn frame(&self) -> Frame {
        Frame::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewSpec {
    pub key: String,
    /// Intrinsic content size, `[width, height]`
    pub size: Option<(f64, f64)>,
    /// Key of the view this one is nested in; the container when absent
    pub parent: Option<String>,
    #[serde(default)]
    pub hugging: AxisPriorities,
    #[serde(default)]
    pub resistance: AxisPriorities,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisPriorities {
    pub horizontal: Option<Priority>,
    pub vertical: Option<Priority>,
}

impl AxisPriorities {
    fn iter(self) -> impl Iterator<Item = (Axis, Priority)> {
        [(Axis::Horizontal, self.horizontal), (Axis::Vertical, self.vertical)]
            .into_iter()
            .filter_map(|(axis, priority)| priority.map(|p| (axis, p)))
    }
}

/// A constraint string, optionally with a priority override
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConstraintSpec {
    Plain(String),
    Weighted {
        format: String,
        priority: Option<Priority>,
    },
}

impl ConstraintSpec {
    pub fn format(&self) -> &str {
        match self {
            ConstraintSpec::Plain(format) | ConstraintSpec::Weighted { format, .. } => format,
        }
    }

    pub fn priority(&self) -> Option<Priority> {
        match self {
            ConstraintSpec::Plain(_) => None,
            ConstraintSpec::Weighted { priority, .. } => *priority,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearSpec {
    pub axis: Axis,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub batches: Vec<BatchSpec>,
    /// Anchor the last view to the trailing edge
    #[serde(default)]
    pub close: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchSpec {
    pub views: Vec<String>,
    #[serde(default)]
    pub centered: bool,
}

/// Frames and constraints of a solved document
#[derive(Debug, Clone)]
pub struct Solved {
    /// The container first, then registered view keys in sorted order
    pub frames: Vec<(String, Frame)>,
    /// Each constraint string with the descriptors it compiled to
    pub constraints: Vec<(String, Vec<ConstraintDescriptor>)>,
}

impl Solved {
    /// One `key: x=.. y=.. w=.. h=..` line per frame
    pub fn render_frames(&self) -> String {
        self.frames
            .iter()
            .map(|(key, f)| {
                format!(
                    "{}: x={:.1} y={:.1} w={:.1} h={:.1}",
                    key, f.x, f.y, f.width, f.height
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Each constraint string followed by its indented descriptors
    pub fn render_constraints(&self) -> String {
        let mut out = Vec::new();
        for (format, descriptors) in &self.constraints {
            out.push(format.clone());
            out.extend(descriptors.iter().map(|d| format!("  {}", d)));
        }
        out.join("\n")
    }
}

impl Document {
    /// Load a document from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load a document from a TOML string
    pub fn parse(content: &str) -> Result<Self, DocumentError> {
        Ok(toml::from_str(content)?)
    }

    /// Create every view and guide and apply every constraint
    pub fn build(&self) -> Result<LayoutBuilder<SolverHost>, DocumentError> {
        let mut host = SolverHost::with_config(&self.layout);
        let root = host.create_view();
        let views: Vec<(&ViewSpec, ViewNode)> = self
            .views
            .iter()
            .map(|decl| {
                let node = match decl.size {
                    Some((width, height)) => host.create_view_with_intrinsic_size(width, height),
                    None => host.create_view(),
                };
                (decl, node)
            })
            .collect();
        let guides: Vec<_> = self
            .guides
            .iter()
            .map(|decl| (decl.key.clone(), host.create_guide(decl.frame())))
            .collect();
        let lookup = |key: &str| {
            views
                .iter()
                .find(|(decl, _)| decl.key == key)
                .map(|(_, node)| *node)
        };

        let mut builder =
            LayoutBuilder::with_config(host, root, self.layout.clone()).add_guides(guides)?;
        for (decl, node) in &views {
            builder = match decl.parent.as_deref() {
                None => builder.add_view(decl.key.as_str(), *node)?,
                Some(parent) if parent == self.layout.parent_view_key => {
                    builder.add_view(decl.key.as_str(), *node)?
                }
                Some(parent) => {
                    let parent_node = lookup(parent).ok_or_else(|| DocumentError::UnknownParent {
                        key: decl.key.clone(),
                        parent: parent.to_string(),
                    })?;
                    let mut builder = builder.add_view_unattached(decl.key.as_str(), *node)?;
                    builder.host_mut().attach(parent_node, *node)?;
                    builder
                }
            };
        }
        for (decl, _) in &views {
            for (axis, priority) in decl.hugging.iter() {
                builder = builder.set_hugging(&decl.key, priority, axis)?;
            }
            for (axis, priority) in decl.resistance.iter() {
                builder = builder.set_resistance(&decl.key, priority, axis)?;
            }
        }

        builder = builder.with_metrics(self.metrics.clone());
        for constraint in &self.constraints {
            builder = match constraint.priority() {
                Some(priority) => builder.add_constraint_with_priority(constraint.format(), priority)?,
                None => builder.add_constraint(constraint.format())?,
            };
        }

        if let Some(linear) = &self.linear {
            let margins = linear.margins;
            let mut sequence = LinearBuilder::new(linear.axis, builder).with_margins(
                margins.ends,
                margins.sides,
                margins.between,
            );
            for batch in &linear.batches {
                let nodes = batch
                    .views
                    .iter()
                    .map(|key| {
                        let decl = self
                            .views
                            .iter()
                            .find(|decl| &decl.key == key)
                            .ok_or_else(|| DocumentError::UnknownView { key: key.clone() })?;
                        match decl.parent.as_deref() {
                            Some(parent) if parent != self.layout.parent_view_key => {
                                Err(DocumentError::NestedInBatch {
                                    key: key.clone(),
                                    parent: parent.to_string(),
                                })
                            }
                            _ => lookup(key).ok_or_else(|| DocumentError::UnknownView { key: key.clone() }),
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                sequence = sequence.add_views(nodes, batch.centered)?;
            }
            if linear.close {
                sequence = sequence.add_bottom_constraint()?;
            }
            builder = sequence.into_layout();
        }

        tracing::debug!(
            views = self.views.len(),
            constraints = builder.applied().len(),
            "built layout document"
        );
        Ok(builder)
    }

    /// Build and solve at the container size
    pub fn solve(&self) -> Result<Solved, DocumentError> {
        let builder = self.build()?;
        let root = builder.view();
        let frames = builder
            .host()
            .layout(root, self.container.width, self.container.height)?;

        let registry = builder.registry();
        let mut solved = Solved {
            frames: Vec::new(),
            constraints: builder
                .applied()
                .iter()
                .map(|a| (a.format.clone(), a.descriptors.clone()))
                .collect(),
        };
        if let Some(frame) = frames.get(root) {
            solved.frames.push((registry.parent_key().to_string(), frame));
        }
        for key in registry.view_keys() {
            let frame = registry.resolve_view(&key).ok().and_then(|view| frames.get(view));
            if let Some(frame) = frame {
                solved.frames.push((key, frame));
            }
        }
        Ok(solved)
    }
}
