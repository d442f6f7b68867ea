use std::fmt::{Display, Formatter};

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::graph::{card_label, CardId, MarkGraph, CARD_COUNT};
use crate::pattern::TargetSpec;
use crate::mark::Mark;

/// Index of a grid cell, `0..POSITION_COUNT`, row-major. The algorithms attach no geometry to it.
pub type Position = usize;

/// Number of grid cells. Every card occupies exactly one.
pub const POSITION_COUNT: usize = CARD_COUNT;

/// Reasons caller-supplied layouts are rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum ArrangementError {
    #[error("expected {expected} entries, found {found}")]
    WrongLength { expected: usize, found: usize },
    #[error("{0} is outside 0..{POSITION_COUNT}", POSITION_COUNT = POSITION_COUNT)]
    OutOfRange(usize),
    #[error("{0} appears more than once")]
    Duplicate(usize),
}

/// A bijection between cards and positions: a physical layout of the nine cards.
///
/// Both directions are stored so lookups either way are constant time.
/// An [`Arrangement`] that satisfies a [`TargetSpec`] is what the solver calls an assignment.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Arrangement {
    card_at: [CardId; POSITION_COUNT],
    position_of: [Position; CARD_COUNT],
}

impl Default for Arrangement {
    fn default() -> Self {
        Self::identity()
    }
}

fn check_permutation(values: &[usize]) -> Result<[usize; POSITION_COUNT], ArrangementError> {
    if values.len() != POSITION_COUNT {
        return Err(ArrangementError::WrongLength { expected: POSITION_COUNT, found: values.len() });
    }

    let mut seen = [false; POSITION_COUNT];
    let mut out = [0; POSITION_COUNT];
    for (slot, value) in values.iter().copied().enumerate() {
        if value >= POSITION_COUNT {
            return Err(ArrangementError::OutOfRange(value));
        }
        if seen[value] {
            return Err(ArrangementError::Duplicate(value));
        }
        seen[value] = true;
        out[slot] = value;
    }

    Ok(out)
}

fn invert(values: &[usize; POSITION_COUNT]) -> [usize; POSITION_COUNT] {
    let mut inverse = [0; POSITION_COUNT];
    for (index, value) in values.iter().enumerate() {
        inverse[*value] = index;
    }
    inverse
}

impl Arrangement {
    /// Card `i` at position `i`.
    pub fn identity() -> Self {
        let card_at = std::array::from_fn(|i| i);
        Self { card_at, position_of: card_at }
    }

    /// Build from the card lying at each position.
    pub fn from_cards(cards: &[CardId]) -> Result<Self, ArrangementError> {
        Ok(Self::from_cards_unchecked(check_permutation(cards)?))
    }

    /// Build from the position each card lies at.
    pub fn from_positions(positions: &[Position]) -> Result<Self, ArrangementError> {
        Ok(Self::from_positions_unchecked(check_permutation(positions)?))
    }

    pub(crate) fn from_cards_unchecked(card_at: [CardId; POSITION_COUNT]) -> Self {
        Self { position_of: invert(&card_at), card_at }
    }

    pub(crate) fn from_positions_unchecked(position_of: [Position; CARD_COUNT]) -> Self {
        Self { card_at: invert(&position_of), position_of }
    }

    /// A uniformly random layout.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut card_at: [CardId; POSITION_COUNT] = std::array::from_fn(|i| i);
        card_at.shuffle(rng);
        Self::from_cards_unchecked(card_at)
    }

    #[inline]
    pub fn card_at(&self, position: Position) -> CardId {
        self.card_at[position]
    }

    #[inline]
    pub fn position_of(&self, card: CardId) -> Position {
        self.position_of[card]
    }

    /// Cards by position.
    pub fn cards(&self) -> &[CardId; POSITION_COUNT] {
        &self.card_at
    }

    /// Positions by card.
    pub fn positions(&self) -> &[Position; CARD_COUNT] {
        &self.position_of
    }

    /// Exchange the cards lying at two positions.
    pub fn swap(&mut self, a: Position, b: Position) {
        self.card_at.swap(a, b);
        self.position_of[self.card_at[a]] = a;
        self.position_of[self.card_at[b]] = b;
    }

    /// Whether the card at every position carries the mark `target` requires there.
    pub fn satisfies(&self, graph: &MarkGraph, target: &TargetSpec) -> bool {
        target.marks().iter()
            .enumerate()
            .all(|(position, mark)| graph.carries(self.card_at[position], *mark))
    }

    /// The mark each card must show, by card, for this layout to display `target`.
    pub fn active_marks(&self, target: &TargetSpec) -> [Mark; CARD_COUNT] {
        std::array::from_fn(|card| target.mark_at(self.position_of[card]))
    }
}

impl Display for Arrangement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.card_at.iter().map(|card| card_label(*card)).join(" "))
    }
}
