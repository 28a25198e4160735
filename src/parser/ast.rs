//! Syntax tree for the visual format language
//!
//! ```text
//! format     ::= orientation? (superview connection)? view (connection view)* (connection superview)?
//! connection ::= ε | '-' | '-' simple '-' | '-' predicates '-'
//! view       ::= '[' name predicates? ']'
//! predicates ::= '(' predicate (',' predicate)* ')'
//! predicate  ::= relation? operand ('@' operand)?
//! ```

use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A node with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Layout axis of a format string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => write!(f, "H"),
            Axis::Vertical => write!(f, "V"),
        }
    }
}

/// Comparison between the two sides of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Relation {
    #[default]
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

impl Relation {
    /// The relation seen from the other side (`a >= b` is `b <= a`)
    pub fn mirrored(self) -> Self {
        match self {
            Relation::Equal => Relation::Equal,
            Relation::GreaterOrEqual => Relation::LessOrEqual,
            Relation::LessOrEqual => Relation::GreaterOrEqual,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Equal => write!(f, "=="),
            Relation::GreaterOrEqual => write!(f, ">="),
            Relation::LessOrEqual => write!(f, "<="),
        }
    }
}

/// A number or a name; names are resolved against metrics or view ids later
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Name(String),
}

/// `relation? operand (@ priority)?`
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub relation: Relation,
    pub object: Spanned<Operand>,
    pub priority: Option<Spanned<Operand>>,
}

/// What sits between two adjacent items
#[derive(Debug, Clone, PartialEq)]
pub enum Connection {
    /// No dash: the items touch
    Flush,
    /// A single `-`
    Standard,
    /// `-30-` or `-margin-`
    Spacer(Spanned<Operand>),
    /// `-(>=20@750)-`
    Predicates(Vec<Spanned<Predicate>>),
}

/// `[name(predicates)]`
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTerm {
    pub name: Spanned<String>,
    pub predicates: Vec<Spanned<Predicate>>,
    pub span: Span,
}

/// A parsed format string
///
/// `gaps[i]` connects `views[i]` to `views[i + 1]`. `leading` and `trailing`
/// are present when the format starts or ends with `|`.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualFormat {
    pub axis: Axis,
    pub leading: Option<Connection>,
    pub views: Vec<ViewTerm>,
    pub gaps: Vec<Connection>,
    pub trailing: Option<Connection>,
}

impl VisualFormat {
    /// True when either end references the superview
    pub fn touches_superview(&self) -> bool {
        self.leading.is_some() || self.trailing.is_some()
    }

    /// Bracketed view names, in format order
    pub fn view_names(&self) -> impl Iterator<Item = &Spanned<String>> {
        self.views.iter().map(|v| &v.name)
    }
}
