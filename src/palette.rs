//! Named color palette and color literals
//!
//! `@color:<name>` attribute values are looked up here. The built-in palette
//! mirrors the platform's system colors; a palette loaded from TOML can add
//! brand colors or override built-in names.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing palettes
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Failed to read palette file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse palette TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid color '{value}' for '{name}': {reason}")]
    InvalidColor {
        name: String,
        value: String,
        reason: String,
    },
}

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse 6 (RGB) or 8 (RGBA) hex digits, without a leading `#`
    ///
    /// The error is a human-readable reason; callers wrap it into their own
    /// error type.
    pub fn from_hex(digits: &str) -> Result<Self, String> {
        if digits.len() != 6 && digits.len() != 8 {
            return Err(format!(
                "expected 6 or 8 hex digits, found {}",
                digits.chars().count()
            ));
        }
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(format!("'{}' is not a hex digit", bad));
        }

        // All characters are ASCII hex digits here, so byte slicing is safe
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|e| e.to_string());
        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if !self.is_opaque() {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// System colors available without any palette file
const SYSTEM_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("darkGray", Color::rgb(85, 85, 85)),
    ("lightGray", Color::rgb(170, 170, 170)),
    ("white", Color::rgb(255, 255, 255)),
    ("gray", Color::rgb(128, 128, 128)),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("orange", Color::rgb(255, 128, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("brown", Color::rgb(153, 102, 51)),
    ("clear", Color::rgba(0, 0, 0, 0)),
];

/// A palette mapping symbolic color names to concrete colors
#[derive(Debug, Clone, Default)]
pub struct Palette {
    /// Optional name for the palette
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Palette entries layered over the system colors
    pub colors: HashMap<String, Color>,
}

/// TOML structure for deserializing palettes
#[derive(Deserialize)]
struct TomlPalette {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: HashMap<String, String>,
}

#[derive(Deserialize)]
pub(crate) struct TomlMetadata {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
}

impl Palette {
    /// Load palette from TOML file
    pub fn from_file(path: &Path) -> Result<Self, PaletteError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load palette from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, PaletteError> {
        let parsed: TomlPalette = toml::from_str(content)?;
        let mut palette = Self::from_entries(parsed.colors)?;
        palette.name = parsed.metadata.as_ref().and_then(|m| m.name.clone());
        palette.description = parsed.metadata.as_ref().and_then(|m| m.description.clone());
        Ok(palette)
    }

    /// Build a palette from `name -> "#rrggbb[aa]"` entries
    pub fn from_entries(entries: HashMap<String, String>) -> Result<Self, PaletteError> {
        let mut colors = HashMap::with_capacity(entries.len());
        for (name, value) in entries {
            let digits = value.strip_prefix('#').unwrap_or(&value);
            let color = Color::from_hex(digits).map_err(|reason| PaletteError::InvalidColor {
                name: name.clone(),
                value: value.clone(),
                reason,
            })?;
            colors.insert(name, color);
        }
        Ok(Self {
            name: None,
            description: None,
            colors,
        })
    }

    /// Add or replace a single entry
    pub fn with_color(mut self, name: impl Into<String>, color: Color) -> Self {
        self.colors.insert(name.into(), color);
        self
    }

    /// Resolve a color name
    ///
    /// Lookup order:
    /// 1. Palette entries, exact name
    /// 2. System colors, exact name
    /// 3. System colors, ignoring ASCII case (`darkgray` finds `darkGray`)
    pub fn resolve(&self, name: &str) -> Option<Color> {
        if let Some(color) = self.colors.get(name) {
            return Some(*color);
        }
        SYSTEM_COLORS
            .iter()
            .find(|(system, _)| *system == name)
            .or_else(|| {
                SYSTEM_COLORS
                    .iter()
                    .find(|(system, _)| system.eq_ignore_ascii_case(name))
            })
            .map(|(_, color)| *color)
    }

    /// All names this palette can resolve, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = SYSTEM_COLORS.iter().map(|(name, _)| *name).collect();
        names.extend(self.colors.keys().map(|k| k.as_str()));
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_rgb() {
        assert_eq!(Color::from_hex("00abb0"), Ok(Color::rgb(0x00, 0xab, 0xb0)));
    }

    #[test]
    fn test_from_hex_rgba() {
        assert_eq!(
            Color::from_hex("00CCF080"),
            Ok(Color::rgba(0x00, 0xcc, 0xf0, 0x80))
        );
    }

    #[test]
    fn test_from_hex_rejects_bad_length() {
        assert!(Color::from_hex("fff").is_err());
        assert!(Color::from_hex("00abb0f").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let err = Color::from_hex("00abzz").unwrap_err();
        assert!(err.contains("'z'"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Color::rgb(0, 0xab, 0xb0).to_string(), "#00abb0");
        assert_eq!(Color::rgba(0, 0, 0, 0).to_string(), "#00000000");
    }

    #[test]
    fn test_resolve_system_colors() {
        let palette = Palette::default();
        assert_eq!(palette.resolve("white"), Some(Color::rgb(255, 255, 255)));
        assert_eq!(palette.resolve("darkgray"), Some(Color::rgb(85, 85, 85)));
        assert_eq!(palette.resolve("mauve"), None);
    }

    #[test]
    fn test_palette_overrides_system_color() {
        let palette = Palette::default().with_color("white", Color::rgb(250, 250, 250));
        assert_eq!(palette.resolve("white"), Some(Color::rgb(250, 250, 250)));
    }

    #[test]
    fn test_parse_toml_with_metadata() {
        let toml_str = r##"
[metadata]
name = "Brand"
description = "Brand colors"

[colors]
teal = "#00abb0"
sky = "00CCF0"
"##;
        let palette = Palette::from_str(toml_str).expect("Should parse");
        assert_eq!(palette.name, Some("Brand".to_string()));
        assert_eq!(palette.resolve("teal"), Some(Color::rgb(0x00, 0xab, 0xb0)));
        assert_eq!(palette.resolve("sky"), Some(Color::rgb(0x00, 0xcc, 0xf0)));
        assert!(palette.names().contains(&"teal"));
    }

    #[test]
    fn test_invalid_color_in_toml() {
        let result = Palette::from_str("[colors]\nbad = \"#12\"\n");
        assert!(matches!(result, Err(PaletteError::InvalidColor { .. })));
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = Palette::from_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(PaletteError::ParseError(_))));
    }
}
