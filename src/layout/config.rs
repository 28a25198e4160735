//! Spacing configuration for format resolution

use serde::Deserialize;

/// Default spacing used by the visual format language
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap for a bare `-` between two sibling views
    pub standard_spacing: f64,

    /// Gap for a bare `-` between a view and its superview edge
    pub superview_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            standard_spacing: 8.0,
            superview_spacing: 20.0,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sibling spacing
    pub fn with_standard_spacing(mut self, spacing: f64) -> Self {
        self.standard_spacing = spacing;
        self
    }

    /// Set the superview edge spacing
    pub fn with_superview_spacing(mut self, spacing: f64) -> Self {
        self.superview_spacing = spacing;
        self
    }

    /// Spacing for a bare `-`, depending on whether one side is the superview
    pub fn default_spacing(&self, touches_superview: bool) -> f64 {
        if touches_superview {
            self.superview_spacing
        } else {
            self.standard_spacing
        }
    }
}
