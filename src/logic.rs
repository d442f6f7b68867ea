use itertools::Itertools;
use varisat::Lit;

/// CNF clauses stating that exactly one of `lits` holds.
///
/// An empty `lits` yields the empty clause, which no model satisfies.
pub(crate) fn exactly_one(lits: Vec<Lit>) -> Vec<Vec<Lit>> {
    let mut clauses = Vec::with_capacity(lits.len() * (lits.len() + 1) / 2 + 1);

    // no two are true; (!A + !B) * (!A + !C) * ...
    clauses.extend(lits.iter()
        .tuple_combinations()
        .map(|(a, b)| vec![!*a, !*b])
    );
    // at least one is true; A + B + C + ...
    clauses.push(lits);

    clauses
}
