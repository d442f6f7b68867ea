use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use rand::Rng;
use tracing::{debug, info};

use crate::arrangement::Arrangement;
use crate::catalog::CatalogEntry;
use crate::domain::{DomainBuilder, Direction};
use crate::graph::MarkGraph;
use crate::pattern::{PatternClass, TargetSpec};
use crate::solver::{AssignmentSolver, SolverFailure};
use crate::swap::distance;

/// A uniform `k`-subset of `source`, drawn in a single pass.
///
/// The first `k` items fill the reservoir; after that the `i`-th item (1-indexed) replaces a uniformly chosen slot with probability `k / i`.
pub fn reservoir_sample<T, R>(source: impl IntoIterator<Item = T>, k: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    let mut reservoir = Vec::with_capacity(k);
    for (index, item) in source.into_iter().enumerate() {
        if reservoir.len() < k {
            reservoir.push(item);
            continue;
        }
        let slot = rng.gen_range(0..=index);
        if slot < k {
            reservoir[slot] = item;
        }
    }
    reservoir
}

/// Fewest swaps between any assignment in `a` and any assignment in `b`. `None` when either is empty.
pub fn min_distance_between(a: &[Arrangement], b: &[Arrangement]) -> Option<usize> {
    let mut best = None;
    for x in a {
        for y in b {
            let d = distance(x, y);
            if best.map_or(true, |best| d < best) {
                best = Some(d);
                if d == 0 {
                    return best;
                }
            }
        }
    }
    best
}

/// Every assignment of `target`, with card-to-position domains.
fn assignments(graph: &MarkGraph, target: &TargetSpec, direction: Direction) -> Result<Vec<Arrangement>, SolverFailure> {
    let domains = DomainBuilder::from(graph).build_in(direction, target)?;
    AssignmentSolver::from(&domains).solve_all()
}

/// Fewest swaps from some layout showing `a` to some layout showing `b`.
pub fn pairwise_min_distance(graph: &MarkGraph, a: &TargetSpec, b: &TargetSpec) -> Result<usize, SolverFailure> {
    let from = assignments(graph, a, Direction::default())?;
    let to = assignments(graph, b, Direction::default())?;
    // both sets are non-empty, or solve_all would have failed
    Ok(min_distance_between(&from, &to).unwrap_or_default())
}

/// An unordered pair of classes, stored smaller first.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ClassPair(PatternClass, PatternClass);

impl ClassPair {
    pub fn new(a: PatternClass, b: PatternClass) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn classes(&self) -> (PatternClass, PatternClass) {
        (self.0, self.1)
    }
}

impl Display for ClassPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// A pair of sample members reaching the largest min-distance seen.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MaxPair {
    /// Indices into the analysed slice, `i < j`.
    pub i: usize,
    pub j: usize,
    pub classes: ClassPair,
    pub distance: usize,
}

/// Observed counts keyed by class pair, then by min-distance.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Histogram {
    buckets: BTreeMap<ClassPair, BTreeMap<usize, usize>>,
    max_pairs: Vec<MaxPair>,
}

impl Histogram {
    fn record(&mut self, i: usize, j: usize, classes: ClassPair, distance: usize) {
        *self.buckets.entry(classes).or_default().entry(distance).or_default() += 1;

        let max = self.max_distance();
        if max.map_or(true, |max| distance > max) {
            self.max_pairs.clear();
        }
        if max.map_or(true, |max| distance >= max) {
            self.max_pairs.push(MaxPair { i, j, classes, distance });
        }
    }

    pub fn get(&self, classes: ClassPair, distance: usize) -> usize {
        self.buckets.get(&classes)
            .and_then(|by_distance| by_distance.get(&distance))
            .copied()
            .unwrap_or_default()
    }

    pub fn buckets(&self) -> &BTreeMap<ClassPair, BTreeMap<usize, usize>> {
        &self.buckets
    }

    /// Number of pairs recorded.
    pub fn total(&self) -> usize {
        self.buckets.values().flat_map(|by_distance| by_distance.values()).sum()
    }

    /// Largest min-distance recorded for `classes`.
    pub fn max_for(&self, classes: ClassPair) -> Option<usize> {
        self.buckets.get(&classes).and_then(|by_distance| by_distance.keys().next_back().copied())
    }

    pub fn max_distance(&self) -> Option<usize> {
        self.max_pairs.first().map(|pair| pair.distance)
    }

    /// All pairs reaching [`Self::max_distance`], in the order they were found.
    pub fn max_pairs(&self) -> &[MaxPair] {
        &self.max_pairs
    }
}

/// `pair_type,min_swaps,count` rows.
impl Display for Histogram {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "pair_type,min_swaps,count")?;
        for (classes, by_distance) in self.buckets.iter() {
            for (distance, count) in by_distance.iter() {
                writeln!(f, "{classes},{distance},{count}")?;
            }
        }
        Ok(())
    }
}

/// Bucket the min-distance of every unordered pair of `targets` by the pair of their classes.
///
/// Each target's assignments are computed once up front.
pub fn histogram<F>(graph: &MarkGraph, targets: &[TargetSpec], classify: F) -> Result<Histogram, SolverFailure>
where
    F: Fn(&TargetSpec) -> PatternClass,
{
    let prepared = targets.iter()
        .map(|target| Ok((classify(target), assignments(graph, target, Direction::default())?)))
        .collect::<Result<Vec<_>, SolverFailure>>()?;

    let mut histogram = Histogram::default();
    for (i, (class_i, assigns_i)) in prepared.iter().enumerate() {
        for (j, (class_j, assigns_j)) in prepared.iter().enumerate().skip(i + 1) {
            let best = min_distance_between(assigns_i, assigns_j).unwrap_or_default();
            histogram.record(i, j, ClassPair::new(*class_i, *class_j), best);
        }
    }

    debug!(targets = targets.len(), pairs = histogram.total(), "built histogram");
    Ok(histogram)
}

/// Results of one sampling run.
#[derive(Clone, Debug)]
pub struct SampleReport {
    /// Items seen in the source stream.
    pub population: usize,
    pub sample: Vec<CatalogEntry>,
    pub histogram: Histogram,
}

impl SampleReport {
    pub fn pair_count(&self) -> usize {
        self.sample.len() * self.sample.len().saturating_sub(1) / 2
    }
}

/// Characterises swap distances across a population of targets from a bounded sample.
pub struct StatisticalSampler<'g> {
    graph: &'g MarkGraph,
    sample_size: usize,
}

impl<'g> StatisticalSampler<'g> {
    pub fn new(graph: &'g MarkGraph, sample_size: usize) -> Self {
        Self { graph, sample_size }
    }

    /// Reservoir-sample `source`, then histogram every pair of the sample by class.
    pub fn run<R>(&self, source: impl IntoIterator<Item = CatalogEntry>, rng: &mut R) -> Result<SampleReport, SolverFailure>
    where
        R: Rng + ?Sized,
    {
        let mut population = 0;
        let sample = reservoir_sample(source.into_iter().inspect(|_| population += 1), self.sample_size, rng);
        info!(population, sample = sample.len(), "sampled targets");

        let targets = sample.iter().map(|entry| entry.target).collect::<Vec<_>>();
        let histogram = histogram(self.graph, &targets, TargetSpec::class)?;

        Ok(SampleReport { population, sample, histogram })
    }
}
