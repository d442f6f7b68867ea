use itertools::Itertools;
use strum::VariantArray;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::arrangement::POSITION_COUNT;
use crate::graph::{MarkGraph, CARD_COUNT};
use crate::mark::{Mark, MarkCounts, MarkMultiset, MARK_COUNT};
use crate::pattern::{Pattern, PatternClass, TargetSpec};

/// Failures while producing patterns.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CatalogError {
    /// A table row could not be read as nine bits. The row is skipped; loading continues.
    #[error("row {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
    /// Nothing survived filtering; the caller cannot continue without a pattern.
    #[error("no valid patterns found")]
    EmptyCatalog,
    /// A count signature must cover exactly nine slots.
    #[error("signature covers {total} slots, expected {}", POSITION_COUNT)]
    BadSignature { total: usize },
}

/// Valid patterns for one card table, plus the bookkeeping of how they were obtained.
#[derive(Clone, Debug)]
pub struct PatternCatalog {
    patterns: Vec<Pattern>,
    skipped: Vec<CatalogError>,
    rejected: usize,
}

impl PatternCatalog {
    /// Read a comma-separated pattern table.
    ///
    /// Blank lines are ignored. Within a row, blank fields read as 0 and any nonzero integer as 1;
    /// rows shorter than nine fields are zero-padded and fields past the ninth are ignored.
    /// Rows holding a non-integer field are skipped and kept in [`Self::skipped`].
    /// Rows whose marks fail [`MarkMultiset::is_valid`] are dropped.
    pub fn load(graph: &MarkGraph, table: &str) -> Result<Self, CatalogError> {
        let mut skipped = Vec::new();
        let mut candidates = Vec::new();

        for (index, raw) in table.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            match parse_row(index + 1, line) {
                Ok(bits) => candidates.push(Pattern::from_bits(graph, bits)),
                Err(err) => {
                    warn!(%err, "skipping pattern row");
                    skipped.push(err);
                }
            }
        }

        let read = candidates.len();
        let patterns = filter_valid(candidates)?;
        info!(read, kept = patterns.len(), skipped = skipped.len(), "loaded pattern table");

        Ok(Self {
            rejected: read - patterns.len(),
            patterns,
            skipped,
        })
    }

    /// Every one of the 512 bit rows, in counting order with card 0 as the most significant bit, then filtered.
    pub fn exhaustive(graph: &MarkGraph) -> Result<Self, CatalogError> {
        let candidates = (0..1u16 << CARD_COUNT)
            .map(|row| Pattern::from_bits(graph, std::array::from_fn(|card| ((row >> (CARD_COUNT - 1 - card)) & 1) as u8)))
            .collect_vec();
        let read = candidates.len();
        let patterns = filter_valid(candidates)?;
        debug!(read, kept = patterns.len(), "enumerated pattern table");

        Ok(Self {
            rejected: read - patterns.len(),
            patterns,
            skipped: Vec::new(),
        })
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Rows that could not be parsed.
    pub fn skipped(&self) -> &[CatalogError] {
        &self.skipped
    }

    /// Rows that parsed but showed some mark three or more times.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn of_class(&self, class: PatternClass) -> impl Iterator<Item = &Pattern> + '_ {
        self.patterns.iter().filter(move |pattern| pattern.class() == class)
    }
}

fn parse_row(line: usize, row: &str) -> Result<[u8; CARD_COUNT], CatalogError> {
    let fields = row.split(',').map(str::trim).collect_vec();
    let mut bits = [0; CARD_COUNT];

    for (slot, field) in fields.iter().take(CARD_COUNT).enumerate() {
        if field.is_empty() {
            continue;
        }
        let value: i64 = field.parse().map_err(|_| CatalogError::MalformedRow {
            line,
            reason: format!("field {} is not an integer: {:?}", slot + 1, field),
        })?;
        bits[slot] = u8::from(value != 0);
    }

    if fields.len() < CARD_COUNT {
        warn!(line, fields = fields.len(), "short pattern row, padding with zeros");
    }

    Ok(bits)
}

/// Keep only the items where no mark shows three or more times.
///
/// An empty result is an error: there is nothing left to play or analyse.
pub fn filter_valid<T: MarkMultiset>(items: impl IntoIterator<Item = T>) -> Result<Vec<T>, CatalogError> {
    let kept = items.into_iter().filter(MarkMultiset::is_valid).collect_vec();
    if kept.is_empty() {
        return Err(CatalogError::EmptyCatalog);
    }
    Ok(kept)
}

/// Every distinct ordering of the marks described by `signature` over the nine positions.
///
/// Orderings come out in lexicographic order of [`Mark`]; each appears exactly once.
pub fn generate(signature: MarkCounts) -> Result<Vec<TargetSpec>, CatalogError> {
    let total = signature.iter().map(|count| usize::from(*count)).sum::<usize>();
    if total != POSITION_COUNT {
        return Err(CatalogError::BadSignature { total });
    }
    Ok(expand(signature))
}

fn expand(mut signature: MarkCounts) -> Vec<TargetSpec> {
    let mut out = Vec::new();
    let mut slots = [Mark::Maru; POSITION_COUNT];
    extend(&mut signature, &mut slots, 0, &mut out);
    out
}

fn extend(remaining: &mut MarkCounts, slots: &mut [Mark; POSITION_COUNT], depth: usize, out: &mut Vec<TargetSpec>) {
    if depth == POSITION_COUNT {
        out.push(TargetSpec::new(*slots));
        return;
    }

    for mark in Mark::VARIANTS {
        if remaining[mark.index()] == 0 {
            continue;
        }
        remaining[mark.index()] -= 1;
        slots[depth] = *mark;
        extend(remaining, slots, depth + 1, out);
        remaining[mark.index()] += 1;
    }
}

/// Every count signature belonging to `class`.
///
/// For `X`: for each mark shown once, each other mark shown zero times (30 signatures).
/// For `Y`: each set of three marks shown once (20 signatures).
pub fn signatures(class: PatternClass) -> Vec<MarkCounts> {
    match class {
        PatternClass::X => Mark::VARIANTS.iter()
            .cartesian_product(Mark::VARIANTS.iter())
            .filter(|(once, absent)| once != absent)
            .map(|(once, absent)| {
                let mut counts = [2; MARK_COUNT];
                counts[once.index()] = 1;
                counts[absent.index()] = 0;
                counts
            })
            .collect(),
        PatternClass::Y => Mark::VARIANTS.iter()
            .combinations(3)
            .map(|singles| {
                let mut counts = [2; MARK_COUNT];
                singles.iter().for_each(|mark| counts[mark.index()] = 1);
                counts
            })
            .collect(),
        PatternClass::Unclassified => Vec::new(),
    }
}

/// One target layout of the generated population.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CatalogEntry {
    /// Running index over the whole stream.
    pub index: usize,
    pub class: PatternClass,
    pub target: TargetSpec,
}

/// Every target layout of class `X`, then of class `Y`, lazily, one signature at a time.
pub fn generated_targets() -> impl Iterator<Item = CatalogEntry> {
    [PatternClass::X, PatternClass::Y].into_iter()
        .flat_map(|class| signatures(class).into_iter().map(move |signature| (class, signature)))
        .flat_map(|(class, signature)| expand(signature).into_iter().map(move |target| (class, target)))
        .enumerate()
        .map(|(index, (class, target))| CatalogEntry { index, class, target })
}
