use ndarray::Array2;
use strum::{Display, EnumString, VariantArray};
use tracing::{debug, error};

use crate::arrangement::{Arrangement, POSITION_COUNT};
use crate::graph::{MarkGraph, CARD_COUNT};
use crate::pattern::TargetSpec;
use crate::solver::SolverFailure;

/// A set of values `0..9`, one bit each.
pub type Mask = u16;

/// Which side of the card/position matching plays the role of the variables.
#[derive(Copy, Clone, Debug, Default, Display, EnumString, VariantArray, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Each card chooses a position.
    #[default]
    #[strum(to_string = "cards", serialize = "card")]
    CardsToPositions,
    /// Each position chooses a card.
    #[strum(to_string = "positions", serialize = "position")]
    PositionsToCards,
}

impl Direction {
    /// Turn one value per variable into the layout it describes. `values` must be a permutation.
    pub(crate) fn arrangement_from(self, values: [usize; POSITION_COUNT]) -> Arrangement {
        match self {
            Direction::CardsToPositions => Arrangement::from_positions_unchecked(values),
            Direction::PositionsToCards => Arrangement::from_cards_unchecked(values),
        }
    }
}

/// The candidate values of each of the nine variables.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Domains {
    direction: Direction,
    masks: [Mask; POSITION_COUNT],
}

impl Domains {
    pub fn new(direction: Direction, masks: [Mask; POSITION_COUNT]) -> Self {
        Self { direction, masks }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn masks(&self) -> &[Mask; POSITION_COUNT] {
        &self.masks
    }

    #[inline]
    pub fn mask(&self, variable: usize) -> Mask {
        self.masks[variable]
    }

    pub fn size(&self, variable: usize) -> u32 {
        self.masks[variable].count_ones()
    }

    pub fn candidates(&self, variable: usize) -> impl Iterator<Item = usize> {
        members(self.masks[variable])
    }

    /// The first variable with no candidate at all, if any.
    pub fn first_empty(&self) -> Option<usize> {
        self.masks.iter().position(|mask| *mask == 0)
    }
}

/// Values present in `mask`, ascending.
pub(crate) fn members(mask: Mask) -> impl Iterator<Item = usize> {
    (0..POSITION_COUNT).filter(move |value| mask >> *value & 1 == 1)
}

/// Computes [`Domains`] for a target layout against a fixed card table.
pub struct DomainBuilder<'g> {
    graph: &'g MarkGraph,
}

impl<'g> From<&'g MarkGraph> for DomainBuilder<'g> {
    fn from(graph: &'g MarkGraph) -> Self {
        Self { graph }
    }
}

impl DomainBuilder<'_> {
    /// Entry `(card, position)` is set when `card` carries the mark `target` requires at `position`.
    pub fn compatibility(&self, target: &TargetSpec) -> Array2<bool> {
        Array2::from_shape_fn((CARD_COUNT, POSITION_COUNT), |(card, position)| {
            self.graph.carries(card, target.mark_at(position))
        })
    }

    /// For each card, the positions it could occupy.
    pub fn build(&self, target: &TargetSpec) -> Result<Domains, SolverFailure> {
        self.build_in(Direction::CardsToPositions, target)
    }

    /// For each position, the cards that could fill it.
    pub fn build_by_position(&self, target: &TargetSpec) -> Result<Domains, SolverFailure> {
        self.build_in(Direction::PositionsToCards, target)
    }

    pub fn build_in(&self, direction: Direction, target: &TargetSpec) -> Result<Domains, SolverFailure> {
        let table = self.compatibility(target);
        let lanes = match direction {
            Direction::CardsToPositions => table.rows(),
            Direction::PositionsToCards => table.columns(),
        };

        let mut masks = [0; POSITION_COUNT];
        for (variable, lane) in lanes.into_iter().enumerate() {
            masks[variable] = lane.iter()
                .enumerate()
                .filter(|(_, compatible)| **compatible)
                .fold(0, |mask, (value, _)| mask | 1 << value);
        }

        let domains = Domains::new(direction, masks);
        if let Some(variable) = domains.first_empty() {
            error!(%direction, variable, %target, "empty domain");
            return Err(SolverFailure::DomainUnsatisfiable { direction, variable });
        }

        debug!(%direction, sizes = ?masks.map(Mask::count_ones), "built domains");
        Ok(domains)
    }
}
