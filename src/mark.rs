use strum::{Display, EnumString, VariantArray};

/// Number of distinct marks.
pub const MARK_COUNT: usize = 6;

/// Per-mark occurrence counts, indexed by [`Mark::index`].
pub type MarkCounts = [u8; MARK_COUNT];

/// One of the six symbols printed on the cards.
///
/// The first three are warm-colored, the last three cold-colored.
#[derive(Copy, Clone, Debug, Display, EnumString, VariantArray, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[strum(ascii_case_insensitive)]
pub enum Mark {
    Maru,
    Cookie,
    Sakura,
    Lime,
    #[strum(to_string = "Hanabi", serialize = "Hanabana")]
    Hanabi,
    #[strum(to_string = "Block", serialize = "Brocco")]
    Block,
}

impl Mark {
    /// Position of this mark in [`Mark::VARIANTS`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::VARIANTS.get(index).copied()
    }

    pub fn is_warm(self) -> bool {
        matches!(self, Mark::Maru | Mark::Cookie | Mark::Sakura)
    }
}

/// Tally how many times each mark occurs.
pub fn count_marks(marks: impl IntoIterator<Item = Mark>) -> MarkCounts {
    let mut counts = [0; MARK_COUNT];
    for mark in marks {
        counts[mark.index()] += 1;
    }
    counts
}

/// Anything that displays a multiset of nine marks: a pattern, a target layout.
pub trait MarkMultiset {
    fn counts(&self) -> MarkCounts;

    /// No mark may be shown three or more times.
    fn is_valid(&self) -> bool {
        self.counts().iter().all(|count| *count < 3)
    }
}
