use std::path::PathBuf;

use clap::{Parser, Subcommand};
use itertools::Itertools;
use ninetile::catalog::generated_targets;
use ninetile::graph::card_label;
use ninetile::optimizer::plan;
use ninetile::sampler::StatisticalSampler;
use ninetile::{
    Arrangement, ArrangementError, CatalogError, Direction, MarkGraph, MarkMultiset, Pattern, PatternCatalog,
    PatternClass, SolverFailure, TargetSpec,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use thiserror::Error;
use tracing::info;

mod telemetry;

#[derive(Parser)]
#[command(name = "ninetile", about = "Nine Tile assignment and swap planner")]
struct Cli {
    /// Seed for every random choice
    #[arg(long, global = true, env = "NINETILE_SEED", default_value_t = 42)]
    seed: u64,
    /// Pattern table to read instead of the full 512-row table
    #[arg(long, global = true)]
    table: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan the fewest swaps from a starting layout to a pattern
    Plan {
        /// Nine bits choosing each card's face, e.g. 001001000; random when absent
        #[arg(long)]
        bits: Option<String>,
        /// Starting card per position, comma-separated 0-based ids; random when absent
        #[arg(long)]
        start: Option<String>,
        /// Shuffle the pattern's marks over the grid (always done for a random pattern)
        #[arg(long)]
        shuffle: bool,
        /// Which side of the matching the search assigns: cards or positions
        #[arg(long, default_value = "cards")]
        direction: Direction,
    },
    /// Load and summarise the pattern table
    Catalog,
    /// Sample generated targets and histogram pairwise swap distances by class
    Histogram {
        /// Reservoir size
        #[arg(long, default_value_t = 200)]
        sample: usize,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Solver(#[from] SolverFailure),
    #[error(transparent)]
    Arrangement(#[from] ArrangementError),
    #[error("bad argument: {0}")]
    Argument(String),
}

fn load_catalog(graph: &MarkGraph, table: Option<&PathBuf>) -> Result<PatternCatalog, CliError> {
    match table {
        None => Ok(PatternCatalog::exhaustive(graph)?),
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| CliError::Io { path: path.clone(), source })?;
            Ok(PatternCatalog::load(graph, &text)?)
        }
    }
}

fn parse_bits(graph: &MarkGraph, raw: &str) -> Result<Pattern, CliError> {
    let bits = raw.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            other => Err(CliError::Argument(format!("{other:?} is not a bit"))),
        })
        .collect::<Result<Vec<u8>, _>>()?;
    let bits = <[u8; 9]>::try_from(bits.as_slice())
        .map_err(|_| CliError::Argument(format!("expected 9 bits, found {}", bits.len())))?;
    Ok(Pattern::from_bits(graph, bits))
}

fn parse_start(raw: &str) -> Result<Arrangement, CliError> {
    let cards = raw.split(',')
        .map(|field| field.trim().parse::<usize>().map_err(|_| CliError::Argument(format!("{field:?} is not a card id"))))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Arrangement::from_cards(&cards)?)
}

fn render_layout(layout: &Arrangement, target: &TargetSpec) -> String {
    let active = layout.active_marks(target);
    layout.cards().iter()
        .map(|card| format!("{}:{}", card_label(*card), active[*card]))
        .chunks(3)
        .into_iter()
        .map(|mut row| row.join(" "))
        .join("\n")
}

fn run(cli: Cli) -> Result<(), CliError> {
    let graph = MarkGraph::standard();
    let mut rng = ChaCha12Rng::seed_from_u64(cli.seed);

    match cli.command {
        Command::Plan { bits, start, shuffle, direction } => {
            let random_pattern = bits.is_none();
            let pattern = match bits {
                Some(raw) => parse_bits(&graph, &raw)?,
                None => *load_catalog(&graph, cli.table.as_ref())?
                    .patterns()
                    .choose(&mut rng)
                    .ok_or(CatalogError::EmptyCatalog)?,
            };
            if !pattern.is_valid() {
                return Err(CliError::Argument(format!("pattern {pattern} shows some mark three times")));
            }

            let target = if shuffle || random_pattern { TargetSpec::shuffled(&pattern, &mut rng) } else { TargetSpec::from_pattern(&pattern) };
            let start = match start {
                Some(raw) => parse_start(&raw)?,
                None => Arrangement::shuffled(&mut rng),
            };

            let chosen = plan(&graph, &start, &target, direction)?;
            println!("pattern   {pattern} ({}, warm {})", pattern.class(), pattern.warm_total());
            println!("target    {target}");
            println!("start     {start}");
            println!("assigned  {}", chosen.assignment);
            println!("distance  {}", chosen.distance);
            for (step, (layout, swap)) in chosen.swaps.replay(&start).iter().skip(1).zip(chosen.swaps.swaps()).enumerate() {
                println!("\nstep {} swap {:?}\n{}", step + 1, swap, render_layout(layout, &target));
            }
        }
        Command::Catalog => {
            let catalog = load_catalog(&graph, cli.table.as_ref())?;
            println!("valid     {}", catalog.len());
            println!("rejected  {}", catalog.rejected());
            for class in [PatternClass::X, PatternClass::Y, PatternClass::Unclassified] {
                println!("class {class}   {}", catalog.of_class(class).count());
            }
            for skipped in catalog.skipped() {
                println!("skipped   {skipped}");
            }
        }
        Command::Histogram { sample } => {
            let report = StatisticalSampler::new(&graph, sample).run(generated_targets(), &mut rng)?;
            info!(population = report.population, pairs = report.pair_count(), "histogram complete");

            print!("{}", report.histogram);
            println!();
            println!("pattern_idx_i,pattern_idx_j,type_i,type_j,min_swaps");
            for pair in report.histogram.max_pairs() {
                let (a, b) = (&report.sample[pair.i], &report.sample[pair.j]);
                println!("{},{},{},{},{}", a.index, b.index, a.class, b.class, pair.distance);
            }
        }
    }

    Ok(())
}

fn main() {
    telemetry::init_tracing();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
