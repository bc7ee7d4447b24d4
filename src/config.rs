//! Configuration for layout builders and the built-in format compiler

use serde::Deserialize;

/// Configuration options shared by builders and compilers
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Key that refers to the container view in constraint text
    pub parent_view_key: String,

    /// Key used by `fill_with_view`
    pub default_view_key: String,

    /// Gap for a bare `-` between two views
    pub sibling_spacing: f64,

    /// Gap for a bare `-` between a view and the container edge
    pub superview_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            parent_view_key: "parent".to_string(),
            default_view_key: "view".to_string(),
            sibling_spacing: 8.0,
            superview_spacing: 20.0,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key that refers to the container view
    pub fn with_parent_view_key(mut self, key: impl Into<String>) -> Self {
        self.parent_view_key = key.into();
        self
    }

    /// Set the key used by `fill_with_view`
    pub fn with_default_view_key(mut self, key: impl Into<String>) -> Self {
        self.default_view_key = key.into();
        self
    }

    /// Set the standard spacings (between views, and to the container edge)
    pub fn with_standard_spacing(mut self, sibling: f64, superview: f64) -> Self {
        self.sibling_spacing = sibling;
        self.superview_spacing = superview;
        self
    }
}
