use std::ops::ControlFlow;

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, error};

use crate::arrangement::{Arrangement, POSITION_COUNT};
use crate::domain::{members, Direction, Domains, Mask};

/// Reasons an [`AssignmentSolver`] may fail.
///
/// Both indicate that a target layout and the card table disagree, i.e. a bug in whoever produced the target, not a player error.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum SolverFailure {
    /// Some variable has no candidate value at all.
    #[error("variable {variable} has an empty domain ({direction} to values)")]
    DomainUnsatisfiable { direction: Direction, variable: usize },
    /// Every domain is non-empty yet no bijection exists.
    #[error("no complete assignment exists")]
    Infeasible,
}

pub(crate) fn infeasible() -> SolverFailure {
    error!("search exhausted without a complete assignment");
    SolverFailure::Infeasible
}

/// Depth-first enumeration of every bijection consistent with a set of [`Domains`].
///
/// Variables are visited most-constrained first: ascending domain size, ties by index.
/// Candidate values are tried in ascending order, so the enumeration order is fully deterministic
/// and the same for [`Self::solve_all`], [`Self::solve_one`] and [`Self::search`].
pub struct AssignmentSolver<'d> {
    domains: &'d Domains,
    order: Vec<usize>,
}

impl<'d> From<&'d Domains> for AssignmentSolver<'d> {
    fn from(domains: &'d Domains) -> Self {
        let order = (0..POSITION_COUNT)
            .sorted_by_key(|variable| domains.size(*variable))
            .collect();

        Self { domains, order }
    }
}

impl AssignmentSolver<'_> {
    /// The variable order the search follows.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Hand every complete assignment to `visit` until it breaks.
    ///
    /// Returns how many assignments were visited.
    pub fn search<F>(&self, mut visit: F) -> Result<usize, SolverFailure>
    where
        F: FnMut(Arrangement) -> ControlFlow<()>,
    {
        if let Some(variable) = self.domains.first_empty() {
            let direction = self.domains.direction();
            error!(%direction, variable, "empty domain");
            return Err(SolverFailure::DomainUnsatisfiable { direction, variable });
        }

        let mut visited = 0;
        let mut values = [0; POSITION_COUNT];
        let _ = self.descend(0, 0, &mut values, &mut |arrangement| {
            visited += 1;
            visit(arrangement)
        });

        debug!(direction = %self.domains.direction(), visited, "search finished");
        Ok(visited)
    }

    fn descend<F>(&self, depth: usize, used: Mask, values: &mut [usize; POSITION_COUNT], visit: &mut F) -> ControlFlow<()>
    where
        F: FnMut(Arrangement) -> ControlFlow<()>,
    {
        let Some(&variable) = self.order.get(depth) else {
            return visit(self.domains.direction().arrangement_from(*values));
        };

        for value in members(self.domains.mask(variable) & !used) {
            values[variable] = value;
            self.descend(depth + 1, used | 1 << value, values, visit)?;
        }

        ControlFlow::Continue(())
    }

    /// Every consistent bijection, in enumeration order.
    pub fn solve_all(&self) -> Result<Vec<Arrangement>, SolverFailure> {
        let mut found = Vec::new();
        self.search(|arrangement| {
            found.push(arrangement);
            ControlFlow::Continue(())
        })?;

        if found.is_empty() {
            return Err(infeasible());
        }
        Ok(found)
    }

    /// The first bijection in enumeration order.
    pub fn solve_one(&self) -> Result<Arrangement, SolverFailure> {
        let mut first = None;
        self.search(|arrangement| {
            first = Some(arrangement);
            ControlFlow::Break(())
        })?;

        first.ok_or_else(infeasible)
    }
}
