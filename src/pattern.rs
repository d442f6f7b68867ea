use std::fmt::{Display, Formatter};

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use strum::{EnumString, VariantArray};

use crate::arrangement::{ArrangementError, Position, POSITION_COUNT};
use crate::graph::{CardId, MarkGraph, CARD_COUNT};
use crate::mark::{count_marks, Mark, MarkCounts, MarkMultiset};

/// A choice, per card, of which of its two marks faces up.
///
/// Bit `i` selects the first (0) or second (1) mark of card `i`; the resolved marks are kept alongside.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Pattern {
    bits: [u8; CARD_COUNT],
    marks: [Mark; CARD_COUNT],
}

impl Pattern {
    /// Resolve a row of bits against the card table. Any nonzero bit counts as 1.
    pub fn from_bits(graph: &MarkGraph, bits: [u8; CARD_COUNT]) -> Self {
        let bits = bits.map(|bit| u8::from(bit != 0));
        Self {
            bits,
            marks: std::array::from_fn(|card| graph.face(card, bits[card])),
        }
    }

    pub fn bits(&self) -> &[u8; CARD_COUNT] {
        &self.bits
    }

    /// Active marks, by card.
    pub fn marks(&self) -> &[Mark; CARD_COUNT] {
        &self.marks
    }

    pub fn active_mark(&self, card: CardId) -> Mark {
        self.marks[card]
    }

    /// Which count-signature class this pattern falls in.
    pub fn class(&self) -> PatternClass {
        PatternClass::of(&self.counts())
    }

    /// Number of warm marks facing up.
    pub fn warm_total(&self) -> usize {
        self.marks.iter().filter(|mark| mark.is_warm()).count()
    }
}

impl MarkMultiset for Pattern {
    fn counts(&self) -> MarkCounts {
        count_marks(self.marks)
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits.iter().join(""))
    }
}

/// Count-signature classes of valid mark multisets.
///
/// `X` has counts {2,2,2,2,1,0} over the six marks, `Y` has {2,2,2,1,1,1}.
#[derive(Copy, Clone, Debug, strum::Display, EnumString, VariantArray, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum PatternClass {
    X,
    Y,
    /// Any other multiset. Valid data never lands here.
    Unclassified,
}

impl PatternClass {
    pub fn of(counts: &MarkCounts) -> Self {
        let mut sorted = *counts;
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        match sorted {
            [2, 2, 2, 2, 1, 0] => Self::X,
            [2, 2, 2, 1, 1, 1] => Self::Y,
            _ => Self::Unclassified,
        }
    }
}

/// The mark required at each grid position.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TargetSpec {
    marks: [Mark; POSITION_COUNT],
}

impl TargetSpec {
    pub fn new(marks: [Mark; POSITION_COUNT]) -> Self {
        Self { marks }
    }

    pub fn from_marks(marks: &[Mark]) -> Result<Self, ArrangementError> {
        let marks = <[Mark; POSITION_COUNT]>::try_from(marks)
            .map_err(|_| ArrangementError::WrongLength { expected: POSITION_COUNT, found: marks.len() })?;
        Ok(Self { marks })
    }

    /// The pattern's active marks laid out in card order, so the identity arrangement satisfies it.
    pub fn from_pattern(pattern: &Pattern) -> Self {
        Self { marks: *pattern.marks() }
    }

    /// The pattern's active marks in a random order, as presented to a player.
    pub fn shuffled<R: Rng + ?Sized>(pattern: &Pattern, rng: &mut R) -> Self {
        let mut marks = *pattern.marks();
        marks.shuffle(rng);
        Self { marks }
    }

    pub fn marks(&self) -> &[Mark; POSITION_COUNT] {
        &self.marks
    }

    #[inline]
    pub fn mark_at(&self, position: Position) -> Mark {
        self.marks[position]
    }

    pub fn class(&self) -> PatternClass {
        PatternClass::of(&self.counts())
    }
}

impl MarkMultiset for TargetSpec {
    fn counts(&self) -> MarkCounts {
        count_marks(self.marks)
    }
}

impl Display for TargetSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.marks.iter().join(" "))
    }
}
