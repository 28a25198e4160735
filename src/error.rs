//! Error types for document parsing, building and constraint resolution

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors that abort a document build
///
/// Every variant except `Document` carries a `key_path` naming the offending
/// location in the document (`@layout[0].@subviews[1].text`). Components that
/// do not know where they are being called from leave it empty and the caller
/// fills it in through [`MarkupError::at`].
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed color literal '{literal}': {reason}{}", location(.key_path))]
    MalformedColorLiteral {
        key_path: String,
        literal: String,
        reason: String,
    },

    #[error("unknown color name '{name}'{}", location(.key_path))]
    UnknownColorName { key_path: String, name: String },

    #[error("unterminated template expression starting at offset {offset}{}", location(.key_path))]
    UnterminatedTemplateExpression {
        key_path: String,
        template: String,
        offset: usize,
    },

    #[error("unresolved binding path '{path}': {reason}{}", location(.key_path))]
    UnresolvedBindingPath {
        key_path: String,
        path: String,
        reason: String,
    },

    #[error("unknown view kind '{kind}'{}{}", location(.key_path), did_you_mean(.suggestions))]
    UnknownViewKind {
        key_path: String,
        kind: String,
        suggestions: Vec<String>,
    },

    #[error("unsupported attribute '{attribute}' on '{kind}': {reason}{}", location(.key_path))]
    UnsupportedAttribute {
        key_path: String,
        kind: String,
        attribute: String,
        reason: String,
    },

    #[error("duplicate identifier '{id}' (first declared at {first}){}", location(.key_path))]
    DuplicateIdentifier {
        key_path: String,
        id: String,
        first: String,
    },

    #[error("malformed constraint format '{format}': {message}{}{}", location(.key_path), did_you_mean(.suggestions))]
    MalformedConstraintFormat {
        key_path: String,
        format: String,
        span: Option<Span>,
        message: String,
        suggestions: Vec<String>,
    },

    /// The input is not a well-formed document
    #[error("invalid document: {0}")]
    Document(#[from] serde_json::Error),
}

fn location(key_path: &str) -> String {
    if key_path.is_empty() {
        String::new()
    } else {
        format!(" at {}", key_path)
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join(", "))
    }
}

impl MarkupError {
    /// Create a format error pointing at a region of the format string
    pub fn format_error(format: &str, span: Span, message: impl Into<String>) -> Self {
        Self::MalformedConstraintFormat {
            key_path: String::new(),
            format: format.to_string(),
            span: Some(span),
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    /// Create an unresolved binding error
    pub fn unresolved(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvedBindingPath {
            key_path: String::new(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Attach suggestions to an unknown-identifier style error
    pub fn with_suggestions(mut self, candidates: Vec<String>) -> Self {
        match &mut self {
            Self::UnknownViewKind { suggestions, .. }
            | Self::MalformedConstraintFormat { suggestions, .. } => *suggestions = candidates,
            _ => {}
        }
        self
    }

    /// Fill in the document location if the error does not carry one yet
    pub fn at(mut self, path: impl Into<String>) -> Self {
        match &mut self {
            Self::MalformedColorLiteral { key_path, .. }
            | Self::UnknownColorName { key_path, .. }
            | Self::UnterminatedTemplateExpression { key_path, .. }
            | Self::UnresolvedBindingPath { key_path, .. }
            | Self::UnknownViewKind { key_path, .. }
            | Self::UnsupportedAttribute { key_path, .. }
            | Self::DuplicateIdentifier { key_path, .. }
            | Self::MalformedConstraintFormat { key_path, .. } => {
                if key_path.is_empty() {
                    *key_path = path.into();
                }
            }
            Self::Document(_) => {}
        }
        self
    }

    /// Document location of the error, if known
    pub fn key_path(&self) -> Option<&str> {
        let path = match self {
            Self::MalformedColorLiteral { key_path, .. }
            | Self::UnknownColorName { key_path, .. }
            | Self::UnterminatedTemplateExpression { key_path, .. }
            | Self::UnresolvedBindingPath { key_path, .. }
            | Self::UnknownViewKind { key_path, .. }
            | Self::UnsupportedAttribute { key_path, .. }
            | Self::DuplicateIdentifier { key_path, .. }
            | Self::MalformedConstraintFormat { key_path, .. } => key_path.as_str(),
            Self::Document(_) => return None,
        };
        (!path.is_empty()).then_some(path)
    }

    /// Format the error with source context using ariadne
    ///
    /// Format-language and template errors are rendered against the offending
    /// string with the failing region labelled; everything else falls back to
    /// the plain message.
    pub fn format(&self, filename: &str) -> String {
        let (source, span, label) = match self {
            Self::MalformedConstraintFormat {
                format,
                span: Some(span),
                message,
                ..
            } => (format.as_str(), span.clone(), message.clone()),
            Self::UnterminatedTemplateExpression {
                template, offset, ..
            } => (
                template.as_str(),
                *offset..template.len(),
                "expression is never closed".to_string(),
            ),
            _ => return format!("Error: {}", self),
        };

        // ariadne counts chars, spans here count bytes
        let span = char_span(source, span);
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| format!("Error: {}", self)),
            Err(_) => format!("Error: {}", self),
        }
    }
}

/// Convert a byte range in `source` into a char range
fn char_span(source: &str, span: Span) -> Span {
    let to_char = |byte: usize| {
        source
            .char_indices()
            .take_while(|(i, _)| *i < byte)
            .count()
    };
    to_char(span.start)..to_char(span.end)
}
