use itertools::Itertools;

use crate::graph::MarkGraph;
use crate::mark::Mark;

/// Outcome of checking a player's three chosen marks against a pattern.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Judgement {
    pub correct: bool,
    /// Two of the chosen marks sit on opposite faces of a cross card.
    pub conflict: bool,
    /// Warm and cold marks the pattern asks for, or `None` when its warm total has no rule.
    pub required: Option<(usize, usize)>,
}

/// Warm and cold marks a selection must contain, given how many warm marks the pattern shows.
pub fn required_counts(warm_total: usize) -> Option<(usize, usize)> {
    match warm_total {
        6 => Some((3, 0)),
        5 => Some((2, 1)),
        4 => Some((1, 2)),
        3 => Some((0, 3)),
        _ => None,
    }
}

/// Judge a selection: three different marks, no two joined by a cross card, and the required warm/cold split.
pub fn judge(graph: &MarkGraph, selected: [Mark; 3], warm_total: usize) -> Judgement {
    let required = required_counts(warm_total);
    let all_different = selected.iter().all_unique();

    let conflict = selected.iter()
        .tuple_combinations()
        .filter_map(|(a, b)| graph.card_joining(*a, *b))
        .any(|card| graph.is_cross(card));

    let warm = selected.iter().filter(|mark| mark.is_warm()).count();
    let split_matches = required == Some((warm, selected.len() - warm));

    Judgement {
        correct: all_different && !conflict && split_matches,
        conflict,
        required,
    }
}
