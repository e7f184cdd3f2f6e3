//! Integration tests for seqarrange-d2.

use proptest::prelude::*;
use seqarrange_core::{
    Arranger, ArrangementResult, ArrangementStatus, Error, IndeterminateReason, SearchPolicy,
    SolverConfiguration,
};
use seqarrange_d2::{validate_arrangement, ArrangementObject, Arranger2D};

fn arrange(objects: &[ArrangementObject], config: SolverConfiguration) -> ArrangementResult {
    Arranger2D::new(config).arrange(objects).unwrap()
}

fn assert_sound(objects: &[ArrangementObject], result: &ArrangementResult) {
    let report = validate_arrangement(objects, result).unwrap();
    assert!(
        report.is_valid(),
        "violations: {:?}",
        report.violations
    );
}

fn mixed_objects(n: usize) -> Vec<ArrangementObject> {
    (0..n)
        .map(|i| {
            let w = 8.0 + (i as f64 * 3.0) % 10.0;
            let h = 6.0 + (i as f64 * 7.0) % 9.0;
            match i % 4 {
                0 => ArrangementObject::rectangle(format!("r{}", i), w, h),
                1 => ArrangementObject::l_shape(format!("l{}", i), w + 4.0, h + 4.0, 4.0, 4.0),
                2 => ArrangementObject::diamond(format!("d{}", i), w, h),
                _ => ArrangementObject::rectangle(format!("s{}", i), h, h).with_duration(2.0),
            }
        })
        .collect()
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_four_object_scenario() {
        let objects = vec![
            ArrangementObject::rectangle("square", 20.0, 20.0),
            ArrangementObject::l_shape("bracket", 30.0, 30.0, 15.0, 15.0),
            ArrangementObject::diamond("diamond", 20.0, 20.0),
            ArrangementObject::arrow("arrow", 40.0, 20.0, 8.0, 12.0),
        ];
        let config = SolverConfiguration::new()
            .with_plate_range(10.0, 200.0)
            .with_size_step(10.0);
        let result = arrange(&objects, config);

        assert!(result.all_placed());
        assert_sound(&objects, &result);

        let size = result.plate_size.unwrap();
        assert_eq!(result.status, ArrangementStatus::Valid(size));
        // The arrow alone is 40 long; a diagonal staircase of all four fits in 110.
        assert!(size >= 40.0);
        assert!(size <= 110.0);
        assert!(result.stats.refinements <= 6);
        assert!(result.stats.sizes_tried > 1);
    }

    #[test]
    fn test_clearance_zones_respected() {
        // Each part needs the strip to its left free while it is processed.
        let objects: Vec<ArrangementObject> = (0..3)
            .map(|i| {
                ArrangementObject::rectangle(format!("p{}", i), 10.0, 10.0)
                    .with_clearance_zone(vec![(-6.0, 0.0), (0.0, 0.0), (0.0, 10.0), (-6.0, 10.0)])
            })
            .collect();
        let config = SolverConfiguration::new().with_plate_range(10.0, 60.0);
        let result = arrange(&objects, config);

        assert!(result.all_placed());
        assert_sound(&objects, &result);
    }

    #[test]
    fn test_concurrent_processing_allowed() {
        let objects = mixed_objects(4);
        let config = SolverConfiguration::new()
            .with_plate_range(10.0, 100.0)
            .with_exclusive_processing(false);
        let result = arrange(&objects, config);
        assert!(result.all_placed());
        assert_sound(&objects, &result);
    }

    #[test]
    fn test_24_objects_in_batches_of_4() {
        let objects = mixed_objects(24);
        let config = SolverConfiguration::new()
            .with_plate_range(10.0, 200.0)
            .with_size_step(10.0)
            .with_batch_size(4);
        let result = arrange(&objects, config);

        assert!(result.all_placed(), "remaining: {:?}", result.remaining);
        assert_sound(&objects, &result);
        assert!(result.stats.batches >= 6);
        assert_eq!(result.decided_indices(), (0..24).collect::<Vec<_>>());

        // Batches are processed one after another.
        for p in &result.placements {
            for q in &result.placements {
                if p.batch < q.batch {
                    let end = &p.t + seqarrange_core::rational::rational_from_f64(
                        objects[p.index].duration(),
                    )
                    .unwrap();
                    assert!(end <= q.t);
                }
            }
        }
    }
}

mod search_tests {
    use super::*;

    #[test]
    fn test_policies_reach_same_size_on_squares() {
        let objects: Vec<ArrangementObject> = (0..4)
            .map(|i| ArrangementObject::rectangle(format!("sq{}", i), 10.0, 10.0))
            .collect();
        let mut sizes = Vec::new();
        for policy in [
            SearchPolicy::Descending,
            SearchPolicy::Bisection,
            SearchPolicy::Exhaustive,
        ] {
            let config = SolverConfiguration::new()
                .with_plate_range(10.0, 80.0)
                .with_search_policy(policy);
            let result = arrange(&objects, config);
            assert_sound(&objects, &result);
            sizes.push(result.plate_size);
        }
        assert_eq!(sizes, vec![Some(20.0); 3]);
    }

    #[test]
    fn test_refinement_cap_is_indeterminate() {
        let objects: Vec<ArrangementObject> = (0..3)
            .map(|i| ArrangementObject::rectangle(format!("sq{}", i), 10.0, 10.0))
            .collect();
        let config = SolverConfiguration::new()
            .with_plate_range(10.0, 50.0)
            .with_weak_extent_ratio(0.01)
            .with_max_refinements(1);
        let result = arrange(&objects, config);

        assert_eq!(
            result.status,
            ArrangementStatus::Indeterminate(IndeterminateReason::BudgetExceeded)
        );
        assert!(matches!(
            result.ensure_complete(10.0, 50.0),
            Err(Error::BudgetExceeded(_))
        ));
        assert_sound(&objects, &result);
    }
}

mod termination_tests {
    use super::*;

    fn check_termination(n: usize) {
        let objects = mixed_objects(n);
        let config = SolverConfiguration::new()
            .with_plate_range(20.0, 200.0)
            .with_size_step(20.0)
            .with_batch_size(n);
        let result = arrange(&objects, config);

        assert!(result.all_placed());
        assert_sound(&objects, &result);
        assert!(
            result.stats.refinements <= n * (n - 1) / 2,
            "{} lemmas for {} objects",
            result.stats.refinements,
            n
        );
    }

    #[test]
    fn test_termination_4() {
        check_termination(4);
    }

    #[test]
    fn test_termination_8() {
        check_termination(8);
    }

    #[test]
    fn test_termination_16() {
        check_termination(16);
    }
}

mod decomposition_tests {
    use super::*;

    #[test]
    fn test_rerun_is_identical() {
        let objects = mixed_objects(6);
        let config = SolverConfiguration::new()
            .with_plate_range(10.0, 120.0)
            .with_batch_size(3);
        let first = arrange(&objects, config.clone());
        let second = arrange(&objects, config);

        assert_eq!(first.placements, second.placements);
        assert_eq!(first.plate_size, second.plate_size);
        assert_eq!(first.stats.refinements, second.stats.refinements);
    }

    #[test]
    fn test_single_batch_when_threshold_covers_input() {
        let objects = mixed_objects(5);
        let config = SolverConfiguration::new()
            .with_plate_range(10.0, 120.0)
            .with_batch_size(5);
        let result = arrange(&objects, config);
        assert_eq!(result.stats.batches, 1);
        assert_eq!(result.batches.len(), 1);
        assert!(result.placements.iter().all(|p| p.batch == 0));
    }

    #[test]
    fn test_unplaceable_object_is_reported() {
        let mut objects = mixed_objects(3);
        objects.insert(1, ArrangementObject::rectangle("too-big", 150.0, 10.0));
        let config = SolverConfiguration::new()
            .with_plate_range(10.0, 100.0)
            .with_batch_size(4);
        let result = arrange(&objects, config);

        assert_eq!(result.remaining, vec![1]);
        assert_eq!(result.placed_count(), 3);
        assert!(matches!(
            result.ensure_complete(10.0, 100.0),
            Err(Error::PartialPlacement {
                decided: 3,
                remaining: 1
            })
        ));
        assert_sound(&objects, &result);
    }
}

fn rectangles() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((4u8..20, 4u8..20), 1..5)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Every result satisfies the arrangement invariants.
    #[test]
    fn arrangements_are_sound(sides in rectangles()) {
        let objects: Vec<ArrangementObject> = sides
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| ArrangementObject::rectangle(format!("r{}", i), w as f64, h as f64))
            .collect();
        let config = SolverConfiguration::new().with_plate_range(10.0, 100.0);
        let result = arrange(&objects, config);

        prop_assert!(result.all_placed());
        let report = validate_arrangement(&objects, &result).unwrap();
        prop_assert!(report.is_valid());
        let widest = sides.iter().map(|&(w, h)| w.max(h)).max().unwrap_or(0) as f64;
        prop_assert!(result.plate_size.unwrap() >= widest);
    }

    /// A plate larger than a feasible one is feasible as well.
    #[test]
    fn larger_plates_stay_feasible(sides in rectangles()) {
        let objects: Vec<ArrangementObject> = sides
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| ArrangementObject::rectangle(format!("r{}", i), w as f64, h as f64))
            .collect();
        let tight = arrange(&objects, SolverConfiguration::new().with_plate_range(10.0, 100.0));
        let size = tight.plate_size.unwrap();

        let roomy = arrange(
            &objects,
            SolverConfiguration::new().with_plate_range(size + 10.0, 100.0 + size),
        );
        prop_assert!(roomy.all_placed());
        prop_assert!(roomy.plate_size.unwrap() >= size + 10.0);
        prop_assert!(validate_arrangement(&objects, &roomy).unwrap().is_valid());
    }
}
