#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::str::FromStr;

    use itertools::Itertools;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;
    use strum::VariantArray;

    use crate::arrangement::{Arrangement, ArrangementError};
    use crate::catalog::{filter_valid, generate, generated_targets, signatures, CatalogError, PatternCatalog};
    use crate::domain::{Direction, DomainBuilder, Domains};
    use crate::graph::{GraphInvalidReason, MarkGraph, STANDARD_CARDS};
    use crate::judge::judge;
    use crate::mark::{Mark, MarkMultiset};
    use crate::optimizer::{best_assignment, plan};
    use crate::pattern::{Pattern, PatternClass, TargetSpec};
    use crate::sampler::{histogram, pairwise_min_distance, reservoir_sample, ClassPair, StatisticalSampler};
    use crate::solver::{AssignmentSolver, SolverFailure};
    use crate::swap::{compute_sequence, cycles, distance, SwapSequence};
    use crate::sat;

    fn seeded() -> ChaCha12Rng {
        ChaCha12Rng::seed_from_u64(42)
    }

    fn pattern(bits: [u8; 9]) -> Pattern {
        Pattern::from_bits(&MarkGraph::standard(), bits)
    }

    #[test]
    fn standard_graph_is_valid() {
        let graph = MarkGraph::from_cards(&STANDARD_CARDS).unwrap();

        assert_eq!(graph.cards_with(Mark::Maru), vec![0, 1, 2]);
        assert_eq!(graph.cards_with(Mark::Cookie), vec![0, 6, 7]);
        assert_eq!(graph.cards_with(Mark::Sakura), vec![1, 4, 7]);
        assert_eq!(graph.cards_with(Mark::Lime), vec![3, 4, 5]);
        assert_eq!(graph.cards_with(Mark::Hanabi), vec![3, 6, 8]);
        assert_eq!(graph.cards_with(Mark::Block), vec![2, 5, 8]);
        assert_eq!(graph.cross_cards(), vec![2, 4, 6]);
        assert_eq!(graph.card_joining(Mark::Sakura, Mark::Cookie), Some(7));
        assert_eq!(graph.card_joining(Mark::Maru, Mark::Lime), None);
    }

    #[test]
    fn broken_card_tables() {
        let mut degenerate = STANDARD_CARDS;
        degenerate[8] = (Mark::Hanabi, Mark::Hanabi);
        assert_eq!(MarkGraph::from_cards(&degenerate).unwrap_err(), vec![
            GraphInvalidReason::DegenerateCard(8, Mark::Hanabi),
            GraphInvalidReason::WrongDegree { mark: Mark::Hanabi, degree: 4 },
            GraphInvalidReason::WrongDegree { mark: Mark::Block, degree: 2 },
        ]);

        let mut repeated = STANDARD_CARDS;
        repeated[8] = (Mark::Cookie, Mark::Maru);
        assert_eq!(MarkGraph::from_cards(&repeated).unwrap_err(), vec![
            GraphInvalidReason::RepeatedCard(8, 0),
            GraphInvalidReason::WrongDegree { mark: Mark::Maru, degree: 4 },
            GraphInvalidReason::WrongDegree { mark: Mark::Cookie, degree: 4 },
            GraphInvalidReason::WrongDegree { mark: Mark::Hanabi, degree: 2 },
            GraphInvalidReason::WrongDegree { mark: Mark::Block, degree: 2 },
        ]);

        assert!(MarkGraph::from_cards(&STANDARD_CARDS[..8]).unwrap_err()
            .contains(&GraphInvalidReason::WrongCardCount(8)));
    }

    #[test]
    fn mark_names() {
        assert_eq!(Mark::from_str("hanabana").unwrap(), Mark::Hanabi);
        assert_eq!(Mark::from_str("Brocco").unwrap(), Mark::Block);
        assert_eq!(Mark::Hanabi.to_string(), "Hanabi");
        assert!(Mark::VARIANTS.iter().take(3).all(|mark| mark.is_warm()));
        assert!(Mark::VARIANTS.iter().skip(3).all(|mark| !mark.is_warm()));
    }

    #[test]
    fn all_first_faces_is_rejected() {
        let all_first = pattern([0; 9]);
        assert_eq!(format!("{}", all_first), "000000000");
        // Maru sits first on cards e1, e2 and e3
        assert_eq!(all_first.counts()[Mark::Maru.index()], 3);
        assert!(!all_first.is_valid());
        assert_eq!(filter_valid([all_first]).unwrap_err(), CatalogError::EmptyCatalog);
    }

    #[test]
    fn exhaustive_table_splits_into_two_classes() {
        let catalog = PatternCatalog::exhaustive(&MarkGraph::standard()).unwrap();

        assert_eq!(catalog.len(), 176);
        assert_eq!(catalog.rejected(), 512 - 176);
        assert!(catalog.patterns().iter().all(|pattern| pattern.counts().iter().all(|count| *count <= 2)));
        assert_eq!(catalog.of_class(PatternClass::X).count(), 72);
        assert_eq!(catalog.of_class(PatternClass::Y).count(), 104);
        assert_eq!(catalog.of_class(PatternClass::Unclassified).count(), 0);
    }

    #[test]
    fn load_table() {
        let table = "c1,c2,c3,c4,c5,c6,c7,c8,c9
0,0,1,0,0,1,0,0,0

0,0,1,0,0,1
0,0,0,0,0,0,0,0,0
0,x,1,0,0,1,0,0,0
,,1,,,7,,,,extra
";
        let catalog = PatternCatalog::load(&MarkGraph::standard(), table).unwrap();

        assert_eq!(catalog.patterns().iter().map(|pattern| pattern.to_string()).collect_vec(),
                   vec!["001001000", "001001000", "001001000"]);
        assert_eq!(catalog.rejected(), 1);
        assert_eq!(catalog.skipped().len(), 2);
        assert!(matches!(catalog.skipped()[0], CatalogError::MalformedRow { line: 1, .. }));
        assert!(matches!(catalog.skipped()[1], CatalogError::MalformedRow { line: 6, .. }));

        assert_eq!(PatternCatalog::load(&MarkGraph::standard(), "0,0,0,0,0,0,0,0,0\n\n").unwrap_err(),
                   CatalogError::EmptyCatalog);
    }

    #[test]
    fn generate_multiset_orderings() {
        let orderings = generate([2, 2, 2, 2, 1, 0]).unwrap();

        // 9! / 2!^4
        assert_eq!(orderings.len(), 22680);
        assert_eq!(orderings.iter().collect::<HashSet<_>>().len(), orderings.len());
        assert!(orderings.iter().all(|target| target.is_valid() && target.class() == PatternClass::X));
        assert!(orderings.iter().tuple_windows().all(|(a, b)| a < b));
        assert_eq!(format!("{}", orderings[0]), "Maru Maru Cookie Cookie Sakura Sakura Lime Lime Hanabi");

        assert_eq!(generate([2, 2, 2, 1, 1, 1]).unwrap().len(), 45360);
        assert_eq!(generate([2, 2, 2, 1, 1, 0]).unwrap_err(), CatalogError::BadSignature { total: 8 });
    }

    #[test]
    fn class_signatures() {
        let x = signatures(PatternClass::X);
        let y = signatures(PatternClass::Y);

        assert_eq!(x.len(), 30);
        assert_eq!(y.len(), 20);
        assert!(x.iter().chain(y.iter()).all_unique());
        assert!(x.iter().all(|counts| PatternClass::of(counts) == PatternClass::X));
        assert!(y.iter().all(|counts| PatternClass::of(counts) == PatternClass::Y));
        assert!(signatures(PatternClass::Unclassified).is_empty());
    }

    #[test]
    fn generated_population() {
        let mut count = 0;
        let mut last_class = PatternClass::X;
        for (expected_index, entry) in generated_targets().enumerate() {
            assert_eq!(entry.index, expected_index);
            assert!(entry.class >= last_class);
            last_class = entry.class;
            count += 1;
        }
        assert_eq!(count, 30 * 22680 + 20 * 45360);
    }

    #[test]
    fn domains_both_directions() {
        let graph = MarkGraph::standard();
        let target = TargetSpec::from_pattern(&pattern([0, 0, 1, 0, 0, 1, 0, 0, 0]));
        assert_eq!(format!("{}", target), "Maru Maru Block Lime Lime Block Cookie Cookie Hanabi");

        let builder = DomainBuilder::from(&graph);
        let by_card = builder.build(&target).unwrap();
        assert_eq!(by_card.masks(), &[195, 3, 39, 280, 24, 60, 448, 192, 292]);
        assert_eq!(by_card.candidates(1).collect_vec(), vec![0, 1]);

        let by_position = builder.build_by_position(&target).unwrap();
        assert_eq!(by_position.masks(), &[7, 7, 292, 56, 56, 292, 193, 193, 328]);

        // one matrix, read by rows or by columns
        let table = builder.compatibility(&target);
        assert_eq!(table.t().rows().into_iter().count(), 9);
        assert!(table[[8, 2]] && !table[[8, 0]]);
    }

    #[test]
    fn empty_domain_is_reported() {
        let graph = MarkGraph::standard();
        let all_maru = TargetSpec::new([Mark::Maru; 9]);

        assert_eq!(DomainBuilder::from(&graph).build(&all_maru).unwrap_err(),
                   SolverFailure::DomainUnsatisfiable { direction: Direction::CardsToPositions, variable: 3 });

        // every position can hold e1, e2 or e3, but there are nine positions
        let by_position = DomainBuilder::from(&graph).build_by_position(&all_maru).unwrap();
        assert_eq!(AssignmentSolver::from(&by_position).solve_all().unwrap_err(), SolverFailure::Infeasible);
        assert_eq!(sat::solve_one(&by_position).unwrap_err(), SolverFailure::Infeasible);

        let hand_made = Domains::new(Direction::PositionsToCards, [0b1, 0b1, 0x1ff, 0x1ff, 0x1ff, 0x1ff, 0x1ff, 0x1ff, 0x1ff]);
        assert_eq!(AssignmentSolver::from(&hand_made).solve_one().unwrap_err(), SolverFailure::Infeasible);

        let with_hole = Domains::new(Direction::CardsToPositions, [0x1ff, 0x1ff, 0, 0x1ff, 0x1ff, 0x1ff, 0x1ff, 0x1ff, 0x1ff]);
        assert_eq!(AssignmentSolver::from(&with_hole).solve_all().unwrap_err(),
                   SolverFailure::DomainUnsatisfiable { direction: Direction::CardsToPositions, variable: 2 });
    }

    #[test]
    fn solve_known_pattern() {
        let graph = MarkGraph::standard();
        let target = TargetSpec::from_pattern(&pattern([0, 0, 1, 0, 0, 1, 0, 0, 0]));
        let builder = DomainBuilder::from(&graph);

        let by_card = builder.build(&target).unwrap();
        let solver = AssignmentSolver::from(&by_card);
        assert_eq!(solver.order(), &[1, 4, 7, 3, 6, 8, 0, 2, 5]);

        let from_cards = solver.solve_all().unwrap();
        assert_eq!(from_cards.len(), 48);
        assert_eq!(from_cards[0].cards(), &[1, 0, 2, 4, 3, 5, 7, 6, 8]);
        assert_eq!(solver.solve_one().unwrap(), from_cards[0]);

        let from_positions = AssignmentSolver::from(&builder.build_by_position(&target).unwrap()).solve_all().unwrap();
        assert_eq!(from_positions[0], Arrangement::identity());
        assert_eq!(from_cards.iter().collect::<HashSet<_>>(), from_positions.iter().collect::<HashSet<_>>());

        assert!(from_cards.iter().all(|assignment| assignment.satisfies(&graph, &target)));
        assert!(sat::solve_one(&by_card).unwrap().satisfies(&graph, &target));
    }

    #[test]
    fn every_cataloged_pattern_is_solvable() {
        let graph = MarkGraph::standard();
        let catalog = PatternCatalog::exhaustive(&graph).unwrap();
        let mut rng = seeded();

        for pattern in catalog.patterns() {
            let target = TargetSpec::shuffled(pattern, &mut rng);
            assert_eq!(target.counts(), pattern.counts());

            let assignments = AssignmentSolver::from(&DomainBuilder::from(&graph).build(&target).unwrap())
                .solve_all()
                .unwrap();
            assert!([32, 40, 48].contains(&assignments.len()), "{} has {} assignments", pattern, assignments.len());

            for assignment in assignments.iter() {
                assert!(assignment.satisfies(&graph, &target));
                // the marks each card turns up read back as the target, position by position
                let active = assignment.active_marks(&target);
                let shown = (0..9).map(|position| active[assignment.card_at(position)]).collect_vec();
                assert_eq!(&shown[..], &target.marks()[..]);
                assert!((0..9).all(|card| graph.carries(card, active[card])));
            }
        }
    }

    #[test]
    fn swap_single_transposition() {
        let start = Arrangement::identity();
        let target = Arrangement::from_cards(&[1, 0, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        assert_eq!(distance(&start, &target), 1);
        let swaps = compute_sequence(&start, &target);
        assert_eq!(swaps.swaps(), &[(0, 1)]);
        assert_eq!(format!("{}", swaps), "(0, 1)");
    }

    #[test]
    fn swap_full_rotation() {
        let start = Arrangement::identity();
        let rotated = Arrangement::from_cards(&[1, 2, 3, 4, 5, 6, 7, 8, 0]).unwrap();

        assert_eq!(distance(&start, &rotated), 8);
        assert_eq!(cycles(&start, &rotated).len(), 1);
        assert_eq!(compute_sequence(&start, &rotated).len(), 8);
        assert_eq!(cycles(&start, &start).len(), 9);
    }

    #[test]
    fn swap_properties_on_random_layouts() {
        let mut rng = seeded();
        for _ in 0..500 {
            let a = Arrangement::shuffled(&mut rng);
            let b = Arrangement::shuffled(&mut rng);

            let d = distance(&a, &b);
            assert_eq!(distance(&a, &a), 0);
            assert_eq!(d, distance(&b, &a));
            assert!(d <= 8);
            assert_eq!(d == 0, a == b);
            assert_eq!(d, 9 - cycles(&a, &b).len());

            let swaps = compute_sequence(&a, &b);
            assert_eq!(swaps.len(), d);
            assert_eq!(swaps.apply(&a), b);

            let states = swaps.replay(&a);
            assert_eq!(states.len(), d + 1);
            assert_eq!(states.first(), Some(&a));
            assert_eq!(states.last(), Some(&b));
            assert!(states.iter().tuple_windows().all(|(x, y)| distance(x, y) == 1));
        }
    }

    #[test]
    fn arrangement_validation() {
        assert_eq!(Arrangement::from_cards(&[0, 1, 2]).unwrap_err(), ArrangementError::WrongLength { expected: 9, found: 3 });
        assert_eq!(Arrangement::from_cards(&[0, 1, 2, 3, 4, 5, 6, 7, 9]).unwrap_err(), ArrangementError::OutOfRange(9));
        assert_eq!(Arrangement::from_positions(&[0, 1, 2, 3, 4, 5, 6, 7, 7]).unwrap_err(), ArrangementError::Duplicate(7));
        assert_eq!(TargetSpec::from_marks(&[Mark::Maru; 4]).unwrap_err(), ArrangementError::WrongLength { expected: 9, found: 4 });

        let layout = Arrangement::from_positions(&[8, 7, 6, 5, 4, 3, 2, 1, 0]).unwrap();
        assert_eq!(format!("{}", layout), "e9 e8 e7 e6 e5 e4 e3 e2 e1");
        assert_eq!(layout.position_of(0), 8);
        assert_eq!(layout.card_at(0), 8);
    }

    #[test]
    fn best_assignment_prefers_start_when_it_fits() {
        let graph = MarkGraph::standard();
        let target = TargetSpec::from_pattern(&pattern([0, 0, 1, 0, 0, 1, 0, 0, 0]));
        let start = Arrangement::identity();

        let chosen = plan(&graph, &start, &target, Direction::CardsToPositions).unwrap();
        assert_eq!(chosen.assignment, start);
        assert_eq!(chosen.distance, 0);
        assert_eq!(chosen.swaps, SwapSequence::default());
    }

    #[test]
    fn best_assignment_reversed_start() {
        let graph = MarkGraph::standard();
        let target = TargetSpec::from_pattern(&pattern([0, 0, 1, 0, 0, 1, 0, 0, 0]));
        let start = Arrangement::from_cards(&[8, 7, 6, 5, 4, 3, 2, 1, 0]).unwrap();

        for direction in Direction::VARIANTS {
            let chosen = plan(&graph, &start, &target, *direction).unwrap();
            assert_eq!(chosen.distance, 4);
            assert_eq!(chosen.assignment, Arrangement::identity());
            assert_eq!(chosen.swaps.apply(&start), chosen.assignment);
            assert_eq!(chosen.swaps.len(), 4);
        }
    }

    #[test]
    fn best_assignment_is_first_minimum() {
        let graph = MarkGraph::standard();
        let catalog = PatternCatalog::exhaustive(&graph).unwrap();
        let mut rng = seeded();

        for pattern in catalog.patterns().iter().step_by(7) {
            let target = TargetSpec::shuffled(pattern, &mut rng);
            let start = Arrangement::shuffled(&mut rng);
            let domains = DomainBuilder::from(&graph).build(&target).unwrap();

            let all = AssignmentSolver::from(&domains).solve_all().unwrap();
            let distances = all.iter().map(|candidate| distance(&start, candidate)).collect_vec();
            let min = *distances.iter().min().unwrap();

            let chosen = best_assignment(&start, &domains).unwrap();
            assert_eq!(chosen.distance, min);
            assert_eq!(chosen.assignment, all[distances.iter().position(|d| *d == min).unwrap()]);
            assert_eq!(chosen.swaps.apply(&start), chosen.assignment);
            assert!(chosen.assignment.satisfies(&graph, &target));
        }
    }

    #[test]
    fn reservoir_is_uniform() {
        let mut rng = seeded();
        let (n, k, trials) = (10, 3, 20000);
        let mut hits = [0usize; 10];

        for _ in 0..trials {
            let sample = reservoir_sample(0..n, k, &mut rng);
            assert_eq!(sample.len(), k);
            assert!(sample.iter().all_unique());
            sample.into_iter().for_each(|item| hits[item] += 1);
        }

        let expected = k as f64 / n as f64;
        for count in hits {
            let observed = count as f64 / trials as f64;
            assert!((observed - expected).abs() < 0.02, "observed {observed}, expected {expected}");
        }

        assert_eq!(reservoir_sample(0..4, 10, &mut rng), vec![0, 1, 2, 3]);
        assert!(reservoir_sample(0..4, 0, &mut rng).is_empty());
    }

    #[test]
    fn pairwise_distance() {
        let graph = MarkGraph::standard();
        let a = TargetSpec::from_pattern(&pattern([0, 0, 1, 0, 0, 1, 0, 0, 0]));
        let b = TargetSpec::from_marks(&a.marks().iter().rev().copied().collect_vec()).unwrap();

        assert_eq!(pairwise_min_distance(&graph, &a, &a).unwrap(), 0);
        let ab = pairwise_min_distance(&graph, &a, &b).unwrap();
        assert_eq!(ab, pairwise_min_distance(&graph, &b, &a).unwrap());
        assert!(ab <= 8);

        let all_maru = TargetSpec::new([Mark::Maru; 9]);
        assert!(pairwise_min_distance(&graph, &a, &all_maru).is_err());
    }

    #[test]
    fn histogram_of_small_sample() {
        let graph = MarkGraph::standard();
        let mut rng = seeded();
        let report = StatisticalSampler::new(&graph, 12).run(generated_targets().step_by(1000), &mut rng).unwrap();

        assert_eq!(report.population, 1588);
        assert_eq!(report.sample.len(), 12);
        assert_eq!(report.pair_count(), 66);
        assert_eq!(report.histogram.total(), 66);

        let max = report.histogram.max_distance().unwrap();
        assert!(max <= 8);
        assert!(!report.histogram.max_pairs().is_empty());
        assert!(report.histogram.max_pairs().iter().all(|pair| pair.distance == max && pair.i < pair.j));
        assert!(report.histogram.buckets().keys().all(|classes| classes.classes().0 <= classes.classes().1));

        let rendered = format!("{}", report.histogram);
        assert_eq!(rendered.lines().next(), Some("pair_type,min_swaps,count"));
        assert_eq!(rendered.lines().skip(1)
                       .map(|row| row.rsplit(',').next().unwrap().parse::<usize>().unwrap())
                       .sum::<usize>(), 66);
    }

    #[test]
    fn histogram_buckets_by_class_pair() {
        let graph = MarkGraph::standard();
        let x = TargetSpec::from_pattern(&pattern([0, 0, 1, 0, 0, 1, 0, 0, 0]));
        let targets = [x, x, x];

        let by_class = histogram(&graph, &targets, TargetSpec::class).unwrap();
        let pair = ClassPair::new(x.class(), x.class());
        assert_eq!(by_class.get(pair, 0), 3);
        assert_eq!(by_class.max_for(pair), Some(0));
        assert_eq!(format!("{}", by_class), format!("pair_type,min_swaps,count\n{pair},0,3\n"));

        assert_eq!(ClassPair::new(PatternClass::Y, PatternClass::X), ClassPair::new(PatternClass::X, PatternClass::Y));
        assert_eq!(ClassPair::new(PatternClass::Y, PatternClass::X).to_string(), "X-Y");
    }

    #[test]
    fn judge_selections() {
        let graph = MarkGraph::standard();

        let warm = judge(&graph, [Mark::Maru, Mark::Cookie, Mark::Sakura], 6);
        assert!(warm.correct && !warm.conflict);
        assert_eq!(warm.required, Some((3, 0)));

        let crossed = judge(&graph, [Mark::Maru, Mark::Block, Mark::Lime], 4);
        assert!(crossed.conflict && !crossed.correct);

        assert!(judge(&graph, [Mark::Maru, Mark::Lime, Mark::Hanabi], 4).correct);
        assert!(!judge(&graph, [Mark::Maru, Mark::Maru, Mark::Lime], 4).correct);
        assert!(!judge(&graph, [Mark::Maru, Mark::Lime, Mark::Hanabi], 5).correct);
        assert_eq!(judge(&graph, [Mark::Maru, Mark::Lime, Mark::Hanabi], 7).required, None);
    }

    #[test]
    fn warm_total_of_pattern() {
        let valid = pattern([0, 0, 1, 0, 0, 1, 0, 0, 0]);
        // Maru, Maru, Cookie, Cookie
        assert_eq!(valid.warm_total(), 4);
        assert_eq!(valid.class(), PatternClass::of(&valid.counts()));
    }
}
