//! Constraint descriptors handed to the external layout solver

use std::fmt;

pub use crate::parser::ast::{Axis, Relation};

/// One side of a constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemRef {
    /// The common superview of the format's views
    Superview,
    /// A view, by its declared `@id`
    View(String),
}

impl ItemRef {
    pub fn view(id: impl Into<String>) -> Self {
        ItemRef::View(id.into())
    }

    pub fn as_view(&self) -> Option<&str> {
        match self {
            ItemRef::View(id) => Some(id),
            ItemRef::Superview => None,
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Superview => write!(f, "superview"),
            ItemRef::View(id) => write!(f, "{}", id),
        }
    }
}

/// Geometric attribute of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutAttribute {
    Left,
    Right,
    Top,
    Bottom,
    Leading,
    Trailing,
    Width,
    Height,
    CenterX,
    CenterY,
    /// Same as `LastBaseline`
    Baseline,
    FirstBaseline,
    LastBaseline,
}

impl LayoutAttribute {
    /// Dimension along an axis
    pub fn size(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => LayoutAttribute::Width,
            Axis::Vertical => LayoutAttribute::Height,
        }
    }

    /// The axis this attribute positions or measures along
    pub fn axis(self) -> Axis {
        match self {
            LayoutAttribute::Left
            | LayoutAttribute::Right
            | LayoutAttribute::Leading
            | LayoutAttribute::Trailing
            | LayoutAttribute::Width
            | LayoutAttribute::CenterX => Axis::Horizontal,
            LayoutAttribute::Top
            | LayoutAttribute::Bottom
            | LayoutAttribute::Height
            | LayoutAttribute::CenterY
            | LayoutAttribute::Baseline
            | LayoutAttribute::FirstBaseline
            | LayoutAttribute::LastBaseline => Axis::Vertical,
        }
    }
}

impl fmt::Display for LayoutAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutAttribute::Left => "left",
            LayoutAttribute::Right => "right",
            LayoutAttribute::Top => "top",
            LayoutAttribute::Bottom => "bottom",
            LayoutAttribute::Leading => "leading",
            LayoutAttribute::Trailing => "trailing",
            LayoutAttribute::Width => "width",
            LayoutAttribute::Height => "height",
            LayoutAttribute::CenterX => "centerX",
            LayoutAttribute::CenterY => "centerY",
            LayoutAttribute::Baseline => "baseline",
            LayoutAttribute::FirstBaseline => "firstBaseline",
            LayoutAttribute::LastBaseline => "lastBaseline",
        };
        write!(f, "{}", name)
    }
}

/// Constraint priority, 1 to 1000
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Priority(pub f32);

impl Priority {
    pub const REQUIRED: Priority = Priority(1000.0);
    pub const HIGH: Priority = Priority(750.0);
    pub const LOW: Priority = Priority(250.0);

    pub fn is_required(self) -> bool {
        self.0 >= Self::REQUIRED.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::REQUIRED
    }
}

/// `first.attribute relation second.attribute * multiplier + constant @ priority`
///
/// Without a second item the constraint fixes the first attribute to the
/// constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDescriptor {
    pub first_item: ItemRef,
    pub first_attribute: LayoutAttribute,
    pub relation: Relation,
    pub second_item: Option<ItemRef>,
    pub second_attribute: Option<LayoutAttribute>,
    pub multiplier: f64,
    pub constant: f64,
    pub priority: Priority,
}

impl ConstraintDescriptor {
    /// `first.attribute relation constant`
    pub fn constant(
        first: ItemRef,
        attribute: LayoutAttribute,
        relation: Relation,
        constant: f64,
    ) -> Self {
        Self {
            first_item: first,
            first_attribute: attribute,
            relation,
            second_item: None,
            second_attribute: None,
            multiplier: 1.0,
            constant,
            priority: Priority::REQUIRED,
        }
    }

    /// `first.first_attribute relation second.second_attribute + constant`
    pub fn between(
        first: ItemRef,
        first_attribute: LayoutAttribute,
        relation: Relation,
        second: ItemRef,
        second_attribute: LayoutAttribute,
        constant: f64,
    ) -> Self {
        Self {
            first_item: first,
            first_attribute,
            relation,
            second_item: Some(second),
            second_attribute: Some(second_attribute),
            multiplier: 1.0,
            constant,
            priority: Priority::REQUIRED,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Every view id this descriptor mentions
    pub fn views(&self) -> impl Iterator<Item = &str> {
        std::iter::once(&self.first_item)
            .chain(self.second_item.as_ref())
            .filter_map(ItemRef::as_view)
    }
}

impl fmt::Display for ConstraintDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {} ",
            self.first_item, self.first_attribute, self.relation
        )?;
        match (&self.second_item, self.second_attribute) {
            (Some(item), Some(attribute)) => {
                write!(f, "{}.{}", item, attribute)?;
                if self.multiplier != 1.0 {
                    write!(f, " * {}", self.multiplier)?;
                }
                if self.constant > 0.0 {
                    write!(f, " + {}", self.constant)?;
                } else if self.constant < 0.0 {
                    write!(f, " - {}", -self.constant)?;
                }
            }
            _ => write!(f, "{}", self.constant)?,
        }
        if !self.priority.is_required() {
            write!(f, " @{}", self.priority.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_spacing() {
        let d = ConstraintDescriptor::between(
            ItemRef::view("l2"),
            LayoutAttribute::Leading,
            Relation::Equal,
            ItemRef::view("l1"),
            LayoutAttribute::Trailing,
            30.0,
        );
        assert_eq!(d.to_string(), "l2.leading == l1.trailing + 30");
    }

    #[test]
    fn test_display_constant_and_priority() {
        let d = ConstraintDescriptor::constant(
            ItemRef::view("l1"),
            LayoutAttribute::Width,
            Relation::GreaterOrEqual,
            140.0,
        )
        .with_priority(Priority::HIGH);
        assert_eq!(d.to_string(), "l1.width >= 140 @750");
    }

    #[test]
    fn test_display_negative_constant() {
        let d = ConstraintDescriptor::between(
            ItemRef::Superview,
            LayoutAttribute::Trailing,
            Relation::Equal,
            ItemRef::view("a"),
            LayoutAttribute::Trailing,
            -8.0,
        );
        assert_eq!(d.to_string(), "superview.trailing == a.trailing - 8");
    }

    #[test]
    fn test_views() {
        let d = ConstraintDescriptor::between(
            ItemRef::view("a"),
            LayoutAttribute::Leading,
            Relation::Equal,
            ItemRef::Superview,
            LayoutAttribute::Leading,
            20.0,
        );
        assert_eq!(d.views().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_attribute_axis() {
        assert_eq!(LayoutAttribute::Baseline.axis(), Axis::Vertical);
        assert_eq!(LayoutAttribute::Leading.axis(), Axis::Horizontal);
        assert_eq!(LayoutAttribute::size(Axis::Vertical), LayoutAttribute::Height);
    }
}
