#![warn(missing_docs)]

//! # `ninetile`
//!
//! The assignment and minimum-swap engine behind the Nine Tile puzzle.
//!
//! Nine cards each carry two of six marks; every mark sits on exactly three cards (see [`MarkGraph`]).
//! A round asks for a particular mark at each of nine grid positions (a [`TargetSpec`]), usually derived from a [`Pattern`]
//! that picks one face of every card. The engine answers two questions:
//!
//! 1. Which ways can the nine cards be laid out so every position shows its required mark?
//!    [`DomainBuilder`] turns the target into per-variable candidate sets and [`AssignmentSolver`] enumerates every
//!    consistent bijection by backtracking.
//! 2. Starting from some layout, which of those is fewest swaps away, and what are the swaps?
//!    [`swap::distance`] counts cycles of the induced position permutation, [`swap::compute_sequence`] produces a
//!    shortest sequence, and [`optimizer::best_assignment`] combines the two with the solver.
//!
//! [`sampler`] runs the same machinery over sampled pairs of targets to describe how far apart puzzles are,
//! by class of mark-count signature (see [`PatternClass`]).
//!
//! # Internals
//! The matching between cards and positions is a small bipartite constraint problem. Either side may play the role of
//! the variables ([`Direction`]); both share one search. Domains are 9-bit masks, so the search tracks used values in a
//! single integer and never allocates while descending. Variables are taken most-constrained first.
//!
//! Nothing here holds global state. The card table, the pattern catalog and any random source are built by the caller
//! and passed in.

pub use arrangement::{Arrangement, ArrangementError, Position};
pub use catalog::{CatalogEntry, CatalogError, PatternCatalog};
pub use domain::{Direction, DomainBuilder, Domains};
pub use graph::{CardId, GraphInvalidReason, MarkGraph};
pub use mark::{Mark, MarkMultiset};
pub use optimizer::SwapPlan;
pub use pattern::{Pattern, PatternClass, TargetSpec};
pub use solver::{AssignmentSolver, SolverFailure};
pub use swap::SwapSequence;

mod tests;
pub(crate) mod logic;
/// Layouts of the nine cards over the grid.
pub mod arrangement;
/// Pattern tables, validity filtering and generated targets.
pub mod catalog;
/// Candidate sets for each card or position.
pub mod domain;
/// The card table: which two marks each card carries.
pub mod graph;
/// Scoring of the three-card quiz rule.
pub mod judge;
/// The six marks and mark counts.
pub mod mark;
/// Choice of the assignment nearest to a starting layout.
pub mod optimizer;
/// Face choices, their classes, and per-position targets.
pub mod pattern;
/// Pairwise swap distances over sampled targets.
pub mod sampler;
pub mod sat;
/// Backtracking enumeration of consistent layouts.
pub mod solver;
/// Swap distance and shortest swap sequences.
pub mod swap;
/// JavaScript bindings.
#[cfg(feature = "wasm")]
pub mod wasm;
