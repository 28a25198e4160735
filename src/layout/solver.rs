//! Reference frame solver backed by kasuari
//!
//! Feeds constraint descriptors into a Cassowary solver to preview the
//! frames a platform layout engine would compute. Frames are absolute: every
//! view gets its own left/top/width/height variables in the root's
//! coordinate space, and the root is pinned to the requested size.

use std::collections::{BTreeMap, HashMap};

use kasuari::{Expression, Solver, Strength, Variable, WeightedRelation::*};
use thiserror::Error;

use crate::view::{IdTable, Rect, ViewHandle, ViewTree};

use super::types::{ConstraintDescriptor, ItemRef, LayoutAttribute, Priority, Relation};

/// Errors from the frame solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Undefined view: {0}")]
    UndefinedView(String),

    #[error("View '{0}' has no superview")]
    NoSuperview(String),

    #[error("Unsatisfiable constraint: {0}")]
    Unsatisfiable(String),

    #[error("Internal solver error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy)]
struct FrameVars {
    left: Variable,
    top: Variable,
    width: Variable,
    height: Variable,
}

impl FrameVars {
    fn new() -> Self {
        Self {
            left: Variable::new(),
            top: Variable::new(),
            width: Variable::new(),
            height: Variable::new(),
        }
    }

    /// Baselines sit at the bottom edge; first baseline at the top
    fn expression(&self, attribute: LayoutAttribute) -> Expression {
        match attribute {
            LayoutAttribute::Left | LayoutAttribute::Leading => self.left.into(),
            LayoutAttribute::Right | LayoutAttribute::Trailing => self.left + self.width,
            LayoutAttribute::Top | LayoutAttribute::FirstBaseline => self.top.into(),
            LayoutAttribute::Bottom | LayoutAttribute::Baseline | LayoutAttribute::LastBaseline => {
                self.top + self.height
            }
            LayoutAttribute::Width => self.width.into(),
            LayoutAttribute::Height => self.height.into(),
            LayoutAttribute::CenterX => self.left + self.width * 0.5,
            LayoutAttribute::CenterY => self.top + self.height * 0.5,
        }
    }
}

fn strength(priority: Priority) -> Strength {
    if priority.is_required() {
        Strength::REQUIRED
    } else if priority.0 >= Priority::HIGH.0 {
        Strength::STRONG
    } else if priority.0 >= Priority::LOW.0 {
        Strength::MEDIUM
    } else {
        Strength::WEAK
    }
}

/// Solved frames, keyed by view id
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedFrames {
    pub root: Rect,
    pub frames: BTreeMap<String, Rect>,
}

impl SolvedFrames {
    pub fn get(&self, id: &str) -> Option<Rect> {
        self.frames.get(id).copied()
    }
}

/// Wrapper around the kasuari solver
pub struct FrameSolver<'a> {
    tree: &'a ViewTree,
    ids: &'a IdTable,
    solver: Solver,
    vars: HashMap<ViewHandle, FrameVars>,
}

impl<'a> FrameSolver<'a> {
    /// Start a system with the root container pinned to `width` x `height`
    pub fn new(
        tree: &'a ViewTree,
        ids: &'a IdTable,
        width: f64,
        height: f64,
    ) -> Result<Self, SolverError> {
        let mut solver = Self {
            tree,
            ids,
            solver: Solver::new(),
            vars: HashMap::new(),
        };
        let root = solver.vars_for(tree.root())?;
        for (var, value) in [
            (root.left, 0.0),
            (root.top, 0.0),
            (root.width, width),
            (root.height, height),
        ] {
            solver.require(Expression::from(var) | EQ(Strength::REQUIRED) | value, "root frame")?;
        }
        Ok(solver)
    }

    fn require(&mut self, constraint: kasuari::Constraint, desc: &str) -> Result<(), SolverError> {
        self.solver.add_constraint(constraint).map_err(|e| match e {
            kasuari::AddConstraintError::UnsatisfiableConstraint => {
                SolverError::Unsatisfiable(desc.to_string())
            }
            other => SolverError::Internal(format!("{:?} for {}", other, desc)),
        })
    }

    /// Variables of a view, created with weak zero preferences on first use
    fn vars_for(&mut self, handle: ViewHandle) -> Result<FrameVars, SolverError> {
        if let Some(vars) = self.vars.get(&handle) {
            return Ok(*vars);
        }
        let vars = FrameVars::new();
        self.vars.insert(handle, vars);

        let desc = format!("frame of {}", handle);
        for var in [vars.width, vars.height] {
            self.require(Expression::from(var) | GE(Strength::REQUIRED) | 0.0, &desc)?;
        }
        for var in [vars.left, vars.top, vars.width, vars.height] {
            self.require(Expression::from(var) | EQ(Strength::WEAK) | 0.0, &desc)?;
        }
        Ok(vars)
    }

    fn view(&mut self, id: &str) -> Result<(ViewHandle, FrameVars), SolverError> {
        let handle = self
            .ids
            .handle(id)
            .ok_or_else(|| SolverError::UndefinedView(id.to_string()))?;
        Ok((handle, self.vars_for(handle)?))
    }

    /// `Superview` is the parent of the view on the other side
    fn item(&mut self, item: &ItemRef, other: Option<&ItemRef>) -> Result<FrameVars, SolverError> {
        match item {
            ItemRef::View(id) => Ok(self.view(id)?.1),
            ItemRef::Superview => {
                let id = other.and_then(ItemRef::as_view).ok_or_else(|| {
                    SolverError::Internal("superview constraint without a view".to_string())
                })?;
                let (handle, _) = self.view(id)?;
                let parent = self
                    .tree
                    .parent(handle)
                    .ok_or_else(|| SolverError::NoSuperview(id.to_string()))?;
                self.vars_for(parent)
            }
        }
    }

    /// Add one descriptor
    pub fn add(&mut self, descriptor: &ConstraintDescriptor) -> Result<(), SolverError> {
        let first = self.item(&descriptor.first_item, descriptor.second_item.as_ref())?;
        let lhs = first.expression(descriptor.first_attribute);

        let rhs = match (&descriptor.second_item, descriptor.second_attribute) {
            (Some(item), Some(attribute)) => {
                let second = self.item(item, Some(&descriptor.first_item))?;
                second.expression(attribute) * descriptor.multiplier + descriptor.constant
            }
            _ => Expression::from_constant(descriptor.constant),
        };

        let s = strength(descriptor.priority);
        let constraint = match descriptor.relation {
            Relation::Equal => lhs | EQ(s) | rhs,
            Relation::GreaterOrEqual => lhs | GE(s) | rhs,
            Relation::LessOrEqual => lhs | LE(s) | rhs,
        };
        self.require(constraint, &descriptor.to_string())
    }

    /// Read back every identified view's frame
    pub fn solve(mut self) -> SolvedFrames {
        let changes: Vec<(Variable, f64)> = self.solver.fetch_changes().to_vec();
        // Variables the solver never moved are still 0
        let value = |var: Variable| {
            changes
                .iter()
                .find(|(v, _)| *v == var)
                .map(|(_, x)| round(*x))
                .unwrap_or(0.0)
        };
        let rect = |vars: &FrameVars| {
            Rect::new(
                value(vars.left),
                value(vars.top),
                value(vars.width),
                value(vars.height),
            )
        };

        let root = self
            .vars
            .get(&self.tree.root())
            .map(|v| rect(v))
            .unwrap_or_default();
        let frames = self
            .ids
            .ids()
            .into_iter()
            .filter_map(|id| {
                let handle = self.ids.handle(id)?;
                let vars = self.vars.get(&handle)?;
                Some((id.to_string(), rect(vars)))
            })
            .collect();
        SolvedFrames { root, frames }
    }
}

/// Solver output carries float noise
fn round(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Solve frames for a built tree in a container of the given size
///
/// Identified views no descriptor mentions are left out of the result.
pub fn solve_frames(
    tree: &ViewTree,
    ids: &IdTable,
    constraints: &[ConstraintDescriptor],
    width: f64,
    height: f64,
) -> Result<SolvedFrames, SolverError> {
    let mut solver = FrameSolver::new(tree, ids, width, height)?;
    for descriptor in constraints {
        solver.add(descriptor)?;
    }
    Ok(solver.solve())
}
