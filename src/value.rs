//! Attribute value resolution
//!
//! Raw JSON attribute values become typed [`AttributeValue`]s. Strings with a
//! reserved marker are color literals; every other string is scanned as a
//! template; non-strings pass through with their JSON shape intact.

use serde_json::Value;

use crate::error::MarkupError;
use crate::palette::{Color, Palette};
use crate::template::TemplateString;

/// Marker for a named color: `@color:white`
pub const COLOR_MARKER: &str = "@color:";
/// Marker for a hex color: `@color-hex:00abb0`
pub const COLOR_HEX_MARKER: &str = "@color-hex:";

/// A resolved attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Non-string JSON, shape preserved
    Literal(Value),
    ColorRef { name: String, color: Color },
    ColorHex { hex: String, color: Color },
    /// Any unmarked string, possibly with embedded expressions
    Template(TemplateString),
}

impl AttributeValue {
    /// The color, for either color form
    pub fn color(&self) -> Option<Color> {
        match self {
            Self::ColorRef { color, .. } | Self::ColorHex { color, .. } => Some(*color),
            _ => None,
        }
    }

    pub fn as_template(&self) -> Option<&TemplateString> {
        match self {
            Self::Template(t) => Some(t),
            _ => None,
        }
    }
}

/// Resolve one raw attribute value
///
/// Pure: the palette is only read. Errors carry no key path; the caller knows
/// where the attribute lives.
pub fn resolve_attribute(raw: &Value, palette: &Palette) -> Result<AttributeValue, MarkupError> {
    let Value::String(s) = raw else {
        return Ok(AttributeValue::Literal(raw.clone()));
    };

    // The hex marker is checked first since both markers start with `@color`
    if let Some(hex) = s.strip_prefix(COLOR_HEX_MARKER) {
        let color = Color::from_hex(hex).map_err(|reason| MarkupError::MalformedColorLiteral {
            key_path: String::new(),
            literal: s.clone(),
            reason,
        })?;
        return Ok(AttributeValue::ColorHex {
            hex: hex.to_string(),
            color,
        });
    }

    if let Some(name) = s.strip_prefix(COLOR_MARKER) {
        if name.is_empty() {
            return Err(MarkupError::MalformedColorLiteral {
                key_path: String::new(),
                literal: s.clone(),
                reason: "missing color name".to_string(),
            });
        }
        let color = palette
            .resolve(name)
            .ok_or_else(|| MarkupError::UnknownColorName {
                key_path: String::new(),
                name: name.to_string(),
            })?;
        return Ok(AttributeValue::ColorRef {
            name: name.to_string(),
            color,
        });
    }

    TemplateString::parse(s).map(AttributeValue::Template)
}
