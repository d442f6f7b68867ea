use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;
use strum::VariantArray;
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::mark::Mark;

/// Index of a card, `0..CARD_COUNT`. Card `i` is labelled `e{i + 1}` in play.
pub type CardId = usize;

/// Number of physical cards.
pub const CARD_COUNT: usize = 9;

/// Cards every mark must appear on.
pub const MARK_DEGREE: usize = 3;

/// The card table used by the physical game, in card order.
/// The first mark of each pair is selected by bit 0, the second by bit 1.
pub const STANDARD_CARDS: [(Mark, Mark); CARD_COUNT] = [
    (Mark::Maru, Mark::Cookie),
    (Mark::Maru, Mark::Sakura),
    (Mark::Maru, Mark::Block),
    (Mark::Lime, Mark::Hanabi),
    (Mark::Lime, Mark::Sakura),
    (Mark::Lime, Mark::Block),
    (Mark::Cookie, Mark::Hanabi),
    (Mark::Cookie, Mark::Sakura),
    (Mark::Hanabi, Mark::Block),
];

/// Reasons a card table cannot form a [`MarkGraph`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum GraphInvalidReason {
    /// The table does not hold exactly [`CARD_COUNT`] cards.
    #[error("expected {} cards, found {}", CARD_COUNT, .0)]
    WrongCardCount(usize),
    /// A card shows the same mark on both faces.
    #[error("card e{} carries {} twice", .0 + 1, .1)]
    DegenerateCard(CardId, Mark),
    /// Two cards carry the same unordered pair of marks.
    #[error("card e{} repeats the pair of card e{}", .0 + 1, .1 + 1)]
    RepeatedCard(CardId, CardId),
    /// A mark appears on some number of cards other than [`MARK_DEGREE`].
    #[error("{mark} appears on {degree} cards")]
    WrongDegree { mark: Mark, degree: usize },
}

/// The fixed topology of the game: marks are vertices, cards are edges.
///
/// Built once at startup and shared by reference with everything that needs to know which marks a card carries.
#[derive(Clone, Debug)]
pub struct MarkGraph {
    cards: Vec<UnorderedPair<Mark>>,
    graph: UnGraphMap<Mark, CardId>,
}

impl Default for MarkGraph {
    fn default() -> Self {
        Self::standard()
    }
}

impl MarkGraph {
    /// The graph of the physical game, see [`STANDARD_CARDS`].
    pub fn standard() -> Self {
        Self::assemble(&STANDARD_CARDS)
    }

    /// Build a graph from an arbitrary card table, checking every structural invariant.
    ///
    /// All problems found are reported, not only the first.
    pub fn from_cards(cards: &[(Mark, Mark)]) -> Result<Self, Vec<GraphInvalidReason>> {
        let mut invalid_reasons = Vec::new();

        if cards.len() != CARD_COUNT {
            invalid_reasons.push(GraphInvalidReason::WrongCardCount(cards.len()));
        }

        for (id, (first, second)) in cards.iter().enumerate() {
            if first == second {
                invalid_reasons.push(GraphInvalidReason::DegenerateCard(id, *first));
            }
        }

        for ((a, card_a), (b, card_b)) in cards.iter().map(|c| UnorderedPair::from(*c)).enumerate().tuple_combinations() {
            if card_a == card_b {
                invalid_reasons.push(GraphInvalidReason::RepeatedCard(b, a));
            }
        }

        for mark in Mark::VARIANTS {
            let degree = cards.iter()
                .map(|(first, second)| usize::from(first == mark) + usize::from(second == mark))
                .sum::<usize>();
            if degree != MARK_DEGREE {
                invalid_reasons.push(GraphInvalidReason::WrongDegree { mark: *mark, degree });
            }
        }

        if invalid_reasons.is_empty() {
            Ok(Self::assemble(cards))
        } else {
            Err(invalid_reasons)
        }
    }

    fn assemble(cards: &[(Mark, Mark)]) -> Self {
        let mut graph = UnGraphMap::with_capacity(Mark::VARIANTS.len(), cards.len());
        for mark in Mark::VARIANTS {
            graph.add_node(*mark);
        }
        for (id, (first, second)) in cards.iter().enumerate() {
            graph.add_edge(*first, *second, id);
        }

        Self {
            cards: cards.iter().map(|c| UnorderedPair::from(*c)).collect(),
            graph,
        }
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// The two marks of `card`, in table order.
    pub fn card(&self, card: CardId) -> UnorderedPair<Mark> {
        self.cards[card]
    }

    pub fn cards(&self) -> impl Iterator<Item = (CardId, UnorderedPair<Mark>)> + '_ {
        self.cards.iter().copied().enumerate()
    }

    /// The mark `card` shows when `bit` is set as in a pattern row: 0 for the first mark, anything else for the second.
    pub fn face(&self, card: CardId, bit: u8) -> Mark {
        let UnorderedPair(first, second) = self.cards[card];
        if bit == 0 { first } else { second }
    }

    #[inline]
    pub fn carries(&self, card: CardId, mark: Mark) -> bool {
        let UnorderedPair(first, second) = self.cards[card];
        first == mark || second == mark
    }

    /// Cards carrying `mark`, ascending.
    pub fn cards_with(&self, mark: Mark) -> Vec<CardId> {
        self.graph.edges(mark)
            .map(|(_, _, card)| *card)
            .sorted()
            .collect()
    }

    /// The card joining two marks, if there is one.
    pub fn card_joining(&self, a: Mark, b: Mark) -> Option<CardId> {
        self.graph.edge_weight(a, b).copied()
    }

    /// Whether `card` joins a warm mark to a cold one.
    pub fn is_cross(&self, card: CardId) -> bool {
        let UnorderedPair(first, second) = self.cards[card];
        first.is_warm() != second.is_warm()
    }

    pub fn cross_cards(&self) -> Vec<CardId> {
        (0..self.card_count()).filter(|card| self.is_cross(*card)).collect()
    }
}

/// Display label of a card as printed on the physical tile.
pub fn card_label(card: CardId) -> String {
    format!("e{}", card + 1)
}
