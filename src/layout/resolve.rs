//! Resolution of visual format strings into constraint descriptors
//!
//! A single left-to-right pass over the parsed format. The scan keeps the
//! previous item and emits, in order: the spacing between the previous item
//! and the next, then the next view's own size constraints. Alignment options
//! add one descriptor per adjacent pair of views after the scan.

use tracing::{debug, warn};

use crate::document::ConstraintSpec;
use crate::error::MarkupError;
use crate::parser::{self, Axis, Connection, Operand, Relation, Spanned, ViewTerm, VisualFormat};
use crate::view::IdTable;

use super::config::LayoutConfig;
use super::find_similar;
use super::types::{ConstraintDescriptor, ItemRef, LayoutAttribute, Priority};

/// Order of views in an `H:` format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatDirection {
    #[default]
    LeadingToTrailing,
    LeftToRight,
    RightToLeft,
}

const ALIGNMENT_OPTIONS: &[(&str, LayoutAttribute)] = &[
    ("left", LayoutAttribute::Left),
    ("right", LayoutAttribute::Right),
    ("top", LayoutAttribute::Top),
    ("bottom", LayoutAttribute::Bottom),
    ("leading", LayoutAttribute::Leading),
    ("trailing", LayoutAttribute::Trailing),
    ("centerX", LayoutAttribute::CenterX),
    ("centerY", LayoutAttribute::CenterY),
    ("baseline", LayoutAttribute::Baseline),
    ("lastBaseline", LayoutAttribute::LastBaseline),
    ("firstBaseline", LayoutAttribute::FirstBaseline),
];

const DIRECTION_OPTIONS: &[(&str, FormatDirection)] = &[
    ("leadingToTrailing", FormatDirection::LeadingToTrailing),
    ("leftToRight", FormatDirection::LeftToRight),
    ("rightToLeft", FormatDirection::RightToLeft),
];

/// Parsed `options` of a constraint spec
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormatOptions {
    pub alignments: Vec<LayoutAttribute>,
    pub direction: FormatDirection,
}

impl FormatOptions {
    /// Parse option names
    ///
    /// Accepts short names (`baseline`) and the platform spellings
    /// (`NSLayoutFormatAlignAllBaseline`, `NSLayoutFormatDirectionRightToLeft`).
    pub fn parse(format: &str, options: &[String]) -> Result<Self, MarkupError> {
        let mut parsed = Self::default();
        let mut direction: Option<FormatDirection> = None;

        for option in options {
            let name = normalize_option(option);
            if let Some((_, attribute)) = ALIGNMENT_OPTIONS.iter().find(|(n, _)| *n == name) {
                if !parsed.alignments.contains(attribute) {
                    parsed.alignments.push(*attribute);
                }
            } else if let Some((_, dir)) = DIRECTION_OPTIONS.iter().find(|(n, _)| *n == name) {
                if direction.is_some_and(|d| d != *dir) {
                    return Err(option_error(
                        format,
                        format!("conflicting direction option '{}'", option),
                    ));
                }
                direction = Some(*dir);
            } else {
                let known = ALIGNMENT_OPTIONS
                    .iter()
                    .map(|(n, _)| *n)
                    .chain(DIRECTION_OPTIONS.iter().map(|(n, _)| *n));
                return Err(
                    option_error(format, format!("unknown option '{}'", option))
                        .with_suggestions(find_similar(known, &name, 2)),
                );
            }
        }

        parsed.direction = direction.unwrap_or_default();
        Ok(parsed)
    }
}

fn normalize_option(option: &str) -> String {
    let trimmed = option.trim();
    let stripped = ["NSLayoutFormatAlignAll", "NSLayoutFormatDirection", "alignAll"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn option_error(format: &str, message: String) -> MarkupError {
    MarkupError::MalformedConstraintFormat {
        key_path: String::new(),
        format: format.to_string(),
        span: None,
        message,
        suggestions: Vec::new(),
    }
}

/// Turn one constraint spec into descriptors
///
/// Every bracketed view must be declared in `ids`. Errors carry no key path;
/// the caller knows which spec failed.
pub fn resolve_constraint(
    spec: &ConstraintSpec,
    ids: &IdTable,
    config: &LayoutConfig,
) -> Result<Vec<ConstraintDescriptor>, MarkupError> {
    let format = parser::parse(&spec.format)?;
    let options = FormatOptions::parse(&spec.format, &spec.options)?;

    if let Some(parallel) = options
        .alignments
        .iter()
        .find(|attribute| attribute.axis() == format.axis)
    {
        return Err(option_error(
            &spec.format,
            format!(
                "alignment option '{}' runs along the {} axis of the format",
                parallel, format.axis
            ),
        ));
    }

    let scan = Scan::new(spec, ids, config, &format, &options);
    scan.check_views(&format)?;
    let constraints = scan.run(&format, &options.alignments)?;

    debug!(
        format = %spec.format,
        constraints = constraints.len(),
        "resolved constraint format"
    );
    Ok(constraints)
}

struct Scan<'a> {
    spec: &'a ConstraintSpec,
    ids: &'a IdTable,
    config: &'a LayoutConfig,
    axis: Axis,
    start: LayoutAttribute,
    end: LayoutAttribute,
    reversed: bool,
}

impl<'a> Scan<'a> {
    fn new(
        spec: &'a ConstraintSpec,
        ids: &'a IdTable,
        config: &'a LayoutConfig,
        format: &VisualFormat,
        options: &FormatOptions,
    ) -> Self {
        let (start, end, reversed) = match (format.axis, options.direction) {
            (Axis::Vertical, _) => (LayoutAttribute::Top, LayoutAttribute::Bottom, false),
            (Axis::Horizontal, FormatDirection::LeadingToTrailing) => {
                (LayoutAttribute::Leading, LayoutAttribute::Trailing, false)
            }
            (Axis::Horizontal, FormatDirection::LeftToRight) => {
                (LayoutAttribute::Left, LayoutAttribute::Right, false)
            }
            (Axis::Horizontal, FormatDirection::RightToLeft) => {
                (LayoutAttribute::Right, LayoutAttribute::Left, true)
            }
        };
        Self {
            spec,
            ids,
            config,
            axis: format.axis,
            start,
            end,
            reversed,
        }
    }

    fn error(&self, span: &std::ops::Range<usize>, message: String) -> MarkupError {
        MarkupError::format_error(&self.spec.format, span.clone(), message)
    }

    /// Every bracketed view must exist; with `|`, they must share a superview
    fn check_views(&self, format: &VisualFormat) -> Result<(), MarkupError> {
        let mut shared: Option<(&str, _)> = None;
        for name in format.view_names() {
            let Some(entry) = self.ids.get(&name.node) else {
                return Err(self
                    .error(&name.span, format!("unknown view '{}'", name.node))
                    .with_suggestions(find_similar(self.ids.ids(), &name.node, 2)));
            };

            if !format.touches_superview() {
                continue;
            }
            match shared {
                None => shared = Some((name.node.as_str(), entry.parent)),
                Some((first, parent)) if parent != entry.parent => {
                    return Err(self.error(
                        &name.span,
                        format!(
                            "'{}' does not share a superview with '{}'",
                            name.node, first
                        ),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn run(
        &self,
        format: &VisualFormat,
        alignments: &[LayoutAttribute],
    ) -> Result<Vec<ConstraintDescriptor>, MarkupError> {
        let mut out = Vec::new();
        let (Some(first), Some(last)) = (format.views.first(), format.views.last()) else {
            return Ok(out);
        };

        if let Some(connection) = &format.leading {
            self.connect(&mut out, ItemRef::Superview, view_ref(first), connection)?;
        }
        self.size(&mut out, first)?;

        for (pair, gap) in format.views.windows(2).zip(&format.gaps) {
            self.connect(&mut out, view_ref(&pair[0]), view_ref(&pair[1]), gap)?;
            self.size(&mut out, &pair[1])?;
        }

        if let Some(connection) = &format.trailing {
            self.connect(&mut out, view_ref(last), ItemRef::Superview, connection)?;
        }

        for attribute in alignments {
            for pair in format.views.windows(2) {
                out.push(ConstraintDescriptor::between(
                    view_ref(&pair[1]),
                    *attribute,
                    Relation::Equal,
                    view_ref(&pair[0]),
                    *attribute,
                    0.0,
                ));
            }
        }
        Ok(out)
    }

    /// Spacing between the earlier item `prev` and the later item `next`
    fn connect(
        &self,
        out: &mut Vec<ConstraintDescriptor>,
        prev: ItemRef,
        next: ItemRef,
        connection: &Connection,
    ) -> Result<(), MarkupError> {
        let touches_superview = prev == ItemRef::Superview || next == ItemRef::Superview;
        let gaps = match connection {
            Connection::Flush => vec![(Relation::Equal, 0.0, Priority::REQUIRED)],
            Connection::Standard => vec![(
                Relation::Equal,
                self.config.default_spacing(touches_superview),
                Priority::REQUIRED,
            )],
            Connection::Spacer(operand) => vec![(
                Relation::Equal,
                self.spacer(operand, touches_superview),
                Priority::REQUIRED,
            )],
            Connection::Predicates(predicates) => predicates
                .iter()
                .map(|p| {
                    Ok((
                        p.node.relation,
                        self.metric(&p.node.object)?,
                        self.priority(p.node.priority.as_ref())?,
                    ))
                })
                .collect::<Result<Vec<_>, MarkupError>>()?,
        };

        // Superview edges face inward: its start edge leads, its end edge trails
        let first_attribute = if next == ItemRef::Superview {
            self.end
        } else {
            self.start
        };
        let second_attribute = if prev == ItemRef::Superview {
            self.start
        } else {
            self.end
        };

        for (relation, gap, priority) in gaps {
            let (relation, constant) = if self.reversed {
                (relation.mirrored(), -gap)
            } else {
                (relation, gap)
            };
            out.push(
                ConstraintDescriptor::between(
                    next.clone(),
                    first_attribute,
                    relation,
                    prev.clone(),
                    second_attribute,
                    constant,
                )
                .with_priority(priority),
            );
        }
        Ok(())
    }

    /// Size predicates of a bracketed view
    fn size(&self, out: &mut Vec<ConstraintDescriptor>, view: &ViewTerm) -> Result<(), MarkupError> {
        let dimension = LayoutAttribute::size(self.axis);
        for predicate in &view.predicates {
            let p = &predicate.node;
            let priority = self.priority(p.priority.as_ref())?;
            let descriptor = match &p.object.node {
                Operand::Number(n) => {
                    ConstraintDescriptor::constant(view_ref(view), dimension, p.relation, *n)
                }
                Operand::Name(name) => match self.spec.metrics.get(name) {
                    Some(value) => {
                        ConstraintDescriptor::constant(view_ref(view), dimension, p.relation, *value)
                    }
                    None if self.ids.contains(name) => ConstraintDescriptor::between(
                        view_ref(view),
                        dimension,
                        p.relation,
                        ItemRef::view(name.as_str()),
                        dimension,
                        0.0,
                    ),
                    None => {
                        let candidates = self
                            .spec
                            .metrics
                            .keys()
                            .map(String::as_str)
                            .chain(self.ids.ids());
                        return Err(self
                            .error(
                                &p.object.span,
                                format!("'{}' is neither a metric nor a view", name),
                            )
                            .with_suggestions(find_similar(candidates, name, 2)));
                    }
                },
            };
            out.push(descriptor.with_priority(priority));
        }
        Ok(())
    }

    /// A simple spacer; a name missing from metrics falls back to the default spacing
    fn spacer(&self, operand: &Spanned<Operand>, touches_superview: bool) -> f64 {
        match &operand.node {
            Operand::Number(n) => *n,
            Operand::Name(name) => match self.spec.metrics.get(name) {
                Some(value) => *value,
                None => {
                    let fallback = self.config.default_spacing(touches_superview);
                    warn!(
                        metric = %name,
                        format = %self.spec.format,
                        fallback,
                        "spacer metric not defined, using default spacing"
                    );
                    fallback
                }
            },
        }
    }

    /// A number, or a name that must be a metric
    fn metric(&self, operand: &Spanned<Operand>) -> Result<f64, MarkupError> {
        match &operand.node {
            Operand::Number(n) => Ok(*n),
            Operand::Name(name) => self.spec.metrics.get(name).copied().ok_or_else(|| {
                let candidates = self.spec.metrics.keys().map(String::as_str);
                self.error(&operand.span, format!("unknown metric '{}'", name))
                    .with_suggestions(find_similar(candidates, name, 2))
            }),
        }
    }

    fn priority(&self, operand: Option<&Spanned<Operand>>) -> Result<Priority, MarkupError> {
        let Some(operand) = operand else {
            return Ok(Priority::REQUIRED);
        };
        let value = self.metric(operand)?;
        if value > 0.0 && value <= 1000.0 {
            Ok(Priority(value as f32))
        } else {
            Err(self.error(
                &operand.span,
                format!("priority {} is outside 1...1000", value),
            ))
        }
    }
}

fn view_ref(view: &ViewTerm) -> ItemRef {
    ItemRef::view(view.name.node.as_str())
}
