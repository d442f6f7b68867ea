use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::arrangement::{Arrangement, Position, POSITION_COUNT};
use crate::graph::CARD_COUNT;

/// One exchange of the cards at two positions.
pub type Swap = (Position, Position);

/// Exchanges applied in order to turn one [`Arrangement`] into another.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct SwapSequence(Vec<Swap>);

impl SwapSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn swaps(&self) -> &[Swap] {
        &self.0
    }

    /// The layout reached after every swap.
    pub fn apply(&self, start: &Arrangement) -> Arrangement {
        let mut current = *start;
        self.0.iter().for_each(|(a, b)| current.swap(*a, *b));
        current
    }

    /// `start` followed by the layout after each swap in turn, for step-by-step display.
    pub fn replay(&self, start: &Arrangement) -> Vec<Arrangement> {
        let mut states = Vec::with_capacity(self.0.len() + 1);
        states.push(*start);
        let mut current = *start;
        for (a, b) in self.0.iter() {
            current.swap(*a, *b);
            states.push(current);
        }
        states
    }
}

impl From<Vec<Swap>> for SwapSequence {
    fn from(swaps: Vec<Swap>) -> Self {
        Self(swaps)
    }
}

impl Display for SwapSequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().map(|(a, b)| format!("({a}, {b})")).join(" "))
    }
}

/// Where each position's card ends up: `mapping[source position of c] = target position of c`.
fn induced_mapping(source: &Arrangement, target: &Arrangement) -> [Position; POSITION_COUNT] {
    let mut mapping = [0; POSITION_COUNT];
    for card in 0..CARD_COUNT {
        mapping[source.position_of(card)] = target.position_of(card);
    }
    mapping
}

/// The disjoint cycles of the position permutation taking `source` to `target`, fixed points included.
pub fn cycles(source: &Arrangement, target: &Arrangement) -> Vec<Vec<Position>> {
    let mapping = induced_mapping(source, target);
    let mut visited = [false; POSITION_COUNT];
    let mut out = Vec::new();

    for start in 0..POSITION_COUNT {
        if visited[start] {
            continue;
        }
        let mut cycle = Vec::new();
        let mut position = start;
        while !visited[position] {
            visited[position] = true;
            cycle.push(position);
            position = mapping[position];
        }
        out.push(cycle);
    }

    out
}

/// Fewest swaps turning `source` into `target`: nine minus the number of cycles.
pub fn distance(source: &Arrangement, target: &Arrangement) -> usize {
    let mapping = induced_mapping(source, target);
    let mut visited = [false; POSITION_COUNT];
    let mut cycle_count = 0;

    for start in 0..POSITION_COUNT {
        if visited[start] {
            continue;
        }
        cycle_count += 1;
        let mut position = start;
        while !visited[position] {
            visited[position] = true;
            position = mapping[position];
        }
    }

    POSITION_COUNT - cycle_count
}

/// A shortest sequence of swaps from `source` to `target`.
///
/// Positions are settled left to right: whenever a position does not hold the card `target` wants there,
/// it is swapped with the position currently holding that card. Each swap settles at least one position for good,
/// and the result always has exactly [`distance`] swaps.
pub fn compute_sequence(source: &Arrangement, target: &Arrangement) -> SwapSequence {
    let mut current = *source;
    let mut swaps = Vec::new();

    for position in 0..POSITION_COUNT {
        let wanted = target.card_at(position);
        if current.card_at(position) == wanted {
            continue;
        }
        let holder = current.position_of(wanted);
        swaps.push((position, holder));
        current.swap(position, holder);
    }

    SwapSequence(swaps)
}
