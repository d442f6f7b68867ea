//! An independent feasibility check for [`Domains`], expressed as Boolean satisfiability.
//!
//! The backtracking [`AssignmentSolver`](crate::solver::AssignmentSolver) is the engine proper;
//! this exists to cross-check its verdicts on hand-built or suspicious domains.

use std::collections::HashSet;
use std::convert::identity;

use itertools::Itertools;
use tracing::debug;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

use crate::arrangement::{Arrangement, POSITION_COUNT};
use crate::domain::Domains;
use crate::logic::exactly_one;
use crate::solver::{infeasible, SolverFailure};

#[inline]
fn choice_var(variable: usize, value: usize) -> Var {
    Var::from_index(variable * POSITION_COUNT + value)
}

/// Find one bijection consistent with `domains`, or report why none exists.
///
/// # Logical setup
/// Let `x(v, k)` mean variable `v` takes value `k`; it only exists when `k` is in the domain of `v`.
/// Every variable takes exactly one of its values, and every value is taken by exactly one variable.
pub fn solve_one(domains: &Domains) -> Result<Arrangement, SolverFailure> {
    if let Some(variable) = domains.first_empty() {
        return Err(SolverFailure::DomainUnsatisfiable { direction: domains.direction(), variable });
    }

    let mut formula = CnfFormula::new();

    for variable in 0..POSITION_COUNT {
        exactly_one(domains.candidates(variable)
            .map(|value| choice_var(variable, value).positive())
            .collect_vec())
            .iter()
            .for_each(|clause| formula.add_clause(clause));
    }

    for value in 0..POSITION_COUNT {
        exactly_one((0..POSITION_COUNT)
            .filter(|variable| domains.candidates(*variable).contains(&value))
            .map(|variable| choice_var(variable, value).positive())
            .collect_vec())
            .iter()
            .for_each(|clause| formula.add_clause(clause));
    }

    let mut solver = Solver::new();
    solver.add_formula(&formula);
    if !solver.solve().is_ok_and(identity) {
        return Err(infeasible());
    }

    let model: HashSet<Lit> = solver.model().unwrap_or_default().into_iter().collect();
    let mut values = [0; POSITION_COUNT];
    for (variable, slot) in values.iter_mut().enumerate() {
        *slot = domains.candidates(variable)
            .find(|value| model.contains(&choice_var(variable, *value).positive()))
            .ok_or_else(infeasible)?;
    }

    debug!(?values, "satisfying assignment found");
    Ok(domains.direction().arrangement_from(values))
}
