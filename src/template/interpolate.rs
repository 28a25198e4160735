//! Template strings: literal text with embedded `#{...}` expressions

use std::fmt;

use serde_json::Value;

use crate::error::{MarkupError, Span};

use super::data::DataSource;

/// Opens an embedded expression
pub const EXPRESSION_OPEN: &str = "#{";
/// Closes an embedded expression
pub const EXPRESSION_CLOSE: char = '}';
/// Explicit live-binding call inside an expression: `@bind(object.foo)`
pub const BIND_CALL: &str = "@bind(";

/// How an expression is re-evaluated after the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindMode {
    /// `#{@bind(path)}`: recomposed whenever the path is invalidated
    Explicit,
    /// `#{path}`: evaluated at build time, and again only when an explicit
    /// sibling in the same template fires
    Implicit,
}

/// A dotted path into the bound data object (`object.user.name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingPath {
    segments: Vec<String>,
}

impl BindingPath {
    /// Parse a dotted path; segments are identifiers or array indices
    pub fn parse(raw: &str) -> Result<Self, MarkupError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(MarkupError::unresolved(raw, "empty expression"));
        }

        let mut segments = Vec::new();
        for segment in raw.split('.') {
            if !is_path_segment(segment) {
                return Err(MarkupError::unresolved(
                    raw,
                    format!("'{}' is not a valid path segment", segment),
                ));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments below the data root
    ///
    /// A leading segment equal to `root` names the data object itself and is
    /// dropped; any other path is read from the data object directly.
    pub fn relative_to(&self, root: &str) -> &[String] {
        match self.segments.split_first() {
            Some((first, rest)) if first == root => rest,
            _ => &self.segments,
        }
    }

    /// Normalized key used to index dependents in the binding graph
    pub fn key(&self, root: &str) -> String {
        self.relative_to(root).join(".")
    }
}

impl fmt::Display for BindingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

fn is_path_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => segment.chars().all(|c| c.is_ascii_digit()),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// One `#{...}` region of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingExpression {
    pub path: BindingPath,
    pub mode: BindMode,
    /// Byte range of the whole `#{...}` region in the template
    pub span: Span,
}

impl BindingExpression {
    /// Parse the body between `#{` and `}`
    pub fn parse(body: &str, span: Span) -> Result<Self, MarkupError> {
        let body = body.trim();
        if let Some(rest) = body.strip_prefix(BIND_CALL) {
            let inner = rest.strip_suffix(')').ok_or_else(|| {
                MarkupError::unresolved(body, "malformed @bind call, expected @bind(path)")
            })?;
            return Ok(Self {
                path: BindingPath::parse(inner)?,
                mode: BindMode::Explicit,
                span,
            });
        }

        Ok(Self {
            path: BindingPath::parse(body)?,
            mode: BindMode::Implicit,
            span,
        })
    }

    pub fn is_explicit(&self) -> bool {
        self.mode == BindMode::Explicit
    }
}

/// A piece of a template string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Expression(BindingExpression),
}

/// A string attribute split into literal text and binding expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateString {
    source: String,
    segments: Vec<Segment>,
}

impl TemplateString {
    /// Scan a string for `#{...}` expressions
    ///
    /// Braces inside an expression nest, so the body may itself contain `{`
    /// and `}`. A `}` outside any expression is ordinary text.
    pub fn parse(input: &str) -> Result<Self, MarkupError> {
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut search_from = 0;

        while let Some(found) = input[search_from..].find(EXPRESSION_OPEN) {
            let open = search_from + found;
            let body_start = open + EXPRESSION_OPEN.len();
            let close = matching_close(input, body_start).ok_or_else(|| {
                MarkupError::UnterminatedTemplateExpression {
                    key_path: String::new(),
                    template: input.to_string(),
                    offset: open,
                }
            })?;

            if open > literal_start {
                segments.push(Segment::Literal(input[literal_start..open].to_string()));
            }
            let expression = BindingExpression::parse(&input[body_start..close], open..close + 1)?;
            segments.push(Segment::Expression(expression));

            literal_start = close + 1;
            search_from = literal_start;
        }

        if literal_start < input.len() || segments.is_empty() {
            segments.push(Segment::Literal(input[literal_start..].to_string()));
        }

        Ok(Self {
            source: input.to_string(),
            segments,
        })
    }

    /// A template with a single literal segment
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            segments: vec![Segment::Literal(text.clone())],
            source: text,
        }
    }

    /// The string this template was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn expressions(&self) -> impl Iterator<Item = &BindingExpression> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Expression(e) => Some(e),
            Segment::Literal(_) => None,
        })
    }

    /// True when the template has no expressions at all
    pub fn is_literal(&self) -> bool {
        self.expressions().next().is_none()
    }

    /// True when at least one expression is an explicit binding
    pub fn is_live(&self) -> bool {
        self.expressions().any(|e| e.is_explicit())
    }

    /// Paths whose invalidation must recompose this template
    pub fn live_paths(&self) -> impl Iterator<Item = &BindingPath> {
        self.expressions()
            .filter(|e| e.is_explicit())
            .map(|e| &e.path)
    }

    /// Evaluate every segment left to right against the data object
    pub fn compose(&self, data: &dyn DataSource, root: &str) -> Result<String, MarkupError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Expression(expr) => {
                    let value = resolve_path(&expr.path, data, root)?;
                    push_value_text(&mut out, &value);
                }
            }
        }
        Ok(out)
    }
}

/// Find the `}` closing an expression whose body starts at `from`
fn matching_close(input: &str, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in input.as_bytes()[from..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(from + offset),
            b'}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Read the current value at `path` off the data object
pub fn resolve_path(
    path: &BindingPath,
    data: &dyn DataSource,
    root: &str,
) -> Result<Value, MarkupError> {
    let segments = path.relative_to(root);
    data.get(segments).ok_or_else(|| {
        let missing = (1..=segments.len())
            .find(|&n| data.get(&segments[..n]).is_none())
            .map(|n| segments[n - 1].as_str())
            .unwrap_or(root);
        MarkupError::unresolved(path.to_string(), format!("no value for '{}'", missing))
    })
}

/// Append the textual form of a JSON value
pub fn push_value_text(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Null => {}
        other => out.push_str(&other.to_string()),
    }
}
