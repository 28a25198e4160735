//! Render configuration
//!
//! Bundles the spacing defaults, the color palette and the data root name.
//! Can be loaded from a TOML file:
//!
//! ```toml
//! [metadata]
//! name = "Brand"
//!
//! [colors]
//! teal = "#00abb0"
//!
//! [layout]
//! standard_spacing = 8.0
//! superview_spacing = 20.0
//!
//! [bindings]
//! root = "object"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::LayoutConfig;
use crate::palette::{Palette, PaletteError, TomlMetadata};

/// Name template expressions use for the bound data object
pub const DEFAULT_DATA_ROOT: &str = "object";

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error("Invalid data root '{0}': expected an identifier")]
    InvalidDataRoot(String),
}

/// Configuration for a document build
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Spacing defaults for the visual format language
    pub layout: LayoutConfig,
    /// Colors for `@color:` lookups
    pub palette: Palette,
    /// Leading path segment naming the data object
    pub data_root: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            palette: Palette::default(),
            data_root: DEFAULT_DATA_ROOT.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct TomlConfig {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: HashMap<String, String>,
    #[serde(default)]
    layout: LayoutConfig,
    bindings: Option<TomlBindings>,
}

#[derive(Deserialize)]
struct TomlBindings {
    root: Option<String>,
}

impl RenderConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout configuration
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Set the palette
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Set the data root name
    pub fn with_data_root(mut self, root: impl Into<String>) -> Self {
        self.data_root = root.into();
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    ///
    /// Missing sections keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;

        let mut palette = Palette::from_entries(parsed.colors)?;
        if let Some(metadata) = parsed.metadata {
            palette.name = metadata.name;
            palette.description = metadata.description;
        }

        let data_root = match parsed.bindings.and_then(|b| b.root) {
            Some(root) => {
                let valid = root.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                    && root.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                if !valid {
                    return Err(ConfigError::InvalidDataRoot(root));
                }
                root
            }
            None => DEFAULT_DATA_ROOT.to_string(),
        };

        Ok(Self {
            layout: parsed.layout,
            palette,
            data_root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Color;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.data_root, "object");
        assert_eq!(config.layout.standard_spacing, 8.0);
        assert!(config.palette.colors.is_empty());
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r##"
[metadata]
name = "Brand"

[colors]
teal = "#00abb0"

[layout]
superview_spacing = 16.0

[bindings]
root = "model"
"##;
        let config = RenderConfig::from_toml_str(toml_str).expect("Should parse");
        assert_eq!(config.palette.name.as_deref(), Some("Brand"));
        assert_eq!(config.palette.resolve("teal"), Some(Color::rgb(0x00, 0xab, 0xb0)));
        assert_eq!(config.layout.superview_spacing, 16.0);
        assert_eq!(config.layout.standard_spacing, 8.0);
        assert_eq!(config.data_root, "model");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = RenderConfig::from_toml_str("").expect("Should parse");
        assert_eq!(config.data_root, DEFAULT_DATA_ROOT);
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn test_invalid_root() {
        let result = RenderConfig::from_toml_str("[bindings]\nroot = \"a.b\"\n");
        assert!(matches!(result, Err(ConfigError::InvalidDataRoot(_))));
    }

    #[test]
    fn test_invalid_color() {
        let result = RenderConfig::from_toml_str("[colors]\nx = \"nope\"\n");
        assert!(matches!(result, Err(ConfigError::Palette(_))));
    }
}
