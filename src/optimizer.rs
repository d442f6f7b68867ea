use std::ops::ControlFlow;

use tracing::debug;

use crate::arrangement::Arrangement;
use crate::domain::{DomainBuilder, Direction, Domains};
use crate::graph::MarkGraph;
use crate::pattern::TargetSpec;
use crate::solver::{infeasible, AssignmentSolver, SolverFailure};
use crate::swap::{compute_sequence, distance, SwapSequence};

/// The assignment nearest to a starting layout, and how to get there.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapPlan {
    pub assignment: Arrangement,
    pub distance: usize,
    pub swaps: SwapSequence,
}

/// Among every assignment `domains` admit, pick the one fewest swaps away from `start`.
///
/// Ties go to whichever assignment the solver enumerates first. The search stops as soon as
/// `start` itself turns out to be an assignment.
pub fn best_assignment(start: &Arrangement, domains: &Domains) -> Result<SwapPlan, SolverFailure> {
    let solver = AssignmentSolver::from(domains);
    let mut best: Option<(Arrangement, usize)> = None;

    let visited = solver.search(|candidate| {
        let candidate_distance = distance(start, &candidate);
        if best.map_or(true, |(_, best_distance)| candidate_distance < best_distance) {
            best = Some((candidate, candidate_distance));
        }
        if candidate_distance == 0 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    let (assignment, distance) = best.ok_or_else(infeasible)?;
    debug!(visited, distance, "chose nearest assignment");

    Ok(SwapPlan {
        swaps: compute_sequence(start, &assignment),
        assignment,
        distance,
    })
}

/// Build domains for `target` in `direction`, then [`best_assignment`].
pub fn plan(graph: &MarkGraph, start: &Arrangement, target: &TargetSpec, direction: Direction) -> Result<SwapPlan, SolverFailure> {
    let domains = DomainBuilder::from(graph).build_in(direction, target)?;
    best_assignment(start, &domains)
}
