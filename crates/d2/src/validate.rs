//! Independent re-check of an arrangement result.

use crate::object::{ArrangementObject, PreparedObject};
use crate::polygon::{contains, overlaps, overlaps_with_tolerance, BoundingBox, PlacedShape, Point};
use num_rational::BigRational;
use num_traits::Zero;
use seqarrange_core::rational::rational_from_f64;
use seqarrange_core::{ArrangementResult, Result};
use std::fmt;

/// One broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A placement refers to an index outside the input, or twice to the same one.
    UnknownObject { index: usize },
    /// Two placed footprints overlap.
    Overlap { a: usize, b: usize },
    /// Two objects with overlapping footprints are processed at the same time.
    ConcurrentOverlap { a: usize, b: usize },
    /// The head processing `processed` sweeps through `blocked`, which was finished
    /// earlier.
    Clearance { processed: usize, blocked: usize },
    /// A footprint leaves the plate.
    OutOfPlate { index: usize },
    /// Objects were placed but no plate size was reported.
    MissingPlate,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownObject { index } => write!(f, "unknown or repeated object {}", index),
            Self::Overlap { a, b } => write!(f, "objects {} and {} overlap", a, b),
            Self::ConcurrentOverlap { a, b } => {
                write!(f, "objects {} and {} overlap while processed together", a, b)
            }
            Self::Clearance { processed, blocked } => write!(
                f,
                "clearance zone of {} hits finished object {}",
                processed, blocked
            ),
            Self::OutOfPlate { index } => write!(f, "object {} leaves the plate", index),
            Self::MissingPlate => write!(f, "no plate size reported"),
        }
    }
}

/// Outcome of [`validate_arrangement`].
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    /// Pairs of decided objects whose processing windows overlap.
    pub concurrent_pairs: usize,
    /// Decided pairs checked.
    pub pairs_checked: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Checks non-overlap, ordering, clearance and containment of every decided object.
pub fn validate_arrangement(
    objects: &[ArrangementObject],
    result: &ArrangementResult,
) -> Result<ValidationReport> {
    validate_with_tolerance(objects, result, 0.0)
}

struct Decided {
    index: usize,
    object: PreparedObject,
    position: Point,
    start: BigRational,
    end: BigRational,
}

/// As [`validate_arrangement`], ignoring overlaps of area at most `tolerance`.
pub fn validate_with_tolerance(
    objects: &[ArrangementObject],
    result: &ArrangementResult,
    tolerance: f64,
) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();
    let mut seen = vec![false; objects.len()];
    let mut decided = Vec::with_capacity(result.placements.len());

    for p in &result.placements {
        if p.index >= objects.len() || seen[p.index] {
            report.violations.push(Violation::UnknownObject { index: p.index });
            continue;
        }
        seen[p.index] = true;
        let object = objects[p.index].prepare()?;
        let end = &p.t + &object.duration;
        decided.push(Decided {
            index: p.index,
            object,
            position: (p.x.clone(), p.y.clone()),
            start: p.t.clone(),
            end,
        });
    }

    match result.plate_size {
        Some(size) => {
            let size = rational_from_f64(size)?;
            let plate = BoundingBox {
                min_x: BigRational::zero(),
                min_y: BigRational::zero(),
                max_x: size.clone(),
                max_y: size,
            };
            for d in &decided {
                if !contains(&plate, &d.object.footprint.translated(&d.position)) {
                    report.violations.push(Violation::OutOfPlate { index: d.index });
                }
            }
        }
        None if !decided.is_empty() => report.violations.push(Violation::MissingPlate),
        None => {}
    }

    for (k, a) in decided.iter().enumerate() {
        for b in &decided[k + 1..] {
            report.pairs_checked += 1;
            let shape_a = PlacedShape::new(&a.object.footprint, &a.position, a.index);
            let shape_b = PlacedShape::new(&b.object.footprint, &b.position, b.index);

            if overlaps_with_tolerance(&shape_a, &shape_b, tolerance) {
                report.violations.push(Violation::Overlap {
                    a: a.index,
                    b: b.index,
                });
            }

            let concurrent = a.start < b.end && b.start < a.end;
            if concurrent {
                report.concurrent_pairs += 1;
                if overlaps(&shape_a, &shape_b) && tolerance <= 0.0 {
                    report.violations.push(Violation::ConcurrentOverlap {
                        a: a.index,
                        b: b.index,
                    });
                }
            }

            for (first, second) in [(a, b), (b, a)] {
                // `second` is processed after `first` has finished.
                if first.end > second.start {
                    continue;
                }
                let blocked = PlacedShape::new(&first.object.footprint, &first.position, first.index);
                let hit = second.object.zones.iter().any(|zone| {
                    overlaps(&PlacedShape::new(zone, &second.position, second.index), &blocked)
                });
                if hit {
                    report.violations.push(Violation::Clearance {
                        processed: second.index,
                        blocked: first.index,
                    });
                }
            }
        }
    }

    if !report.is_valid() {
        log::debug!(
            "arrangement has {} violations: {}",
            report.violations.len(),
            report
                .violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqarrange_core::rational::rational_from_int;
    use seqarrange_core::{ArrangementStatus, Placement};

    fn placement(index: usize, x: i64, y: i64, t: i64) -> Placement {
        Placement {
            id: format!("o{}", index),
            index,
            x: rational_from_int(x),
            y: rational_from_int(y),
            t: rational_from_int(t),
            batch: 0,
        }
    }

    fn result(placements: Vec<Placement>, size: f64) -> ArrangementResult {
        ArrangementResult {
            placements,
            plate_size: Some(size),
            status: ArrangementStatus::Valid(size),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_arrangement() {
        let objects = vec![
            ArrangementObject::rectangle("a", 10.0, 10.0),
            ArrangementObject::rectangle("b", 10.0, 10.0),
        ];
        let r = result(vec![placement(0, 0, 0, 0), placement(1, 10, 0, 1)], 20.0);
        let report = validate_arrangement(&objects, &r).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.pairs_checked, 1);
        assert_eq!(report.concurrent_pairs, 0);
    }

    #[test]
    fn test_detects_overlap_and_containment() {
        let objects = vec![
            ArrangementObject::rectangle("a", 10.0, 10.0),
            ArrangementObject::rectangle("b", 10.0, 10.0),
        ];
        let r = result(vec![placement(0, 0, 0, 0), placement(1, 5, 5, 0)], 12.0);
        let report = validate_arrangement(&objects, &r).unwrap();
        assert!(report.violations.contains(&Violation::Overlap { a: 0, b: 1 }));
        assert!(report.violations.contains(&Violation::ConcurrentOverlap { a: 0, b: 1 }));
        assert!(report.violations.contains(&Violation::OutOfPlate { index: 1 }));
        assert!(!report.violations.contains(&Violation::OutOfPlate { index: 0 }));
    }

    #[test]
    fn test_detects_clearance_violation() {
        // Processing b sweeps the strip left of it, where a already sits.
        let objects = vec![
            ArrangementObject::rectangle("a", 10.0, 10.0),
            ArrangementObject::rectangle("b", 10.0, 10.0).with_clearance_zone(vec![
                (-10.0, 0.0),
                (0.0, 0.0),
                (0.0, 10.0),
                (-10.0, 10.0),
            ]),
        ];
        let bad = result(vec![placement(0, 0, 0, 0), placement(1, 10, 0, 1)], 20.0);
        let report = validate_arrangement(&objects, &bad).unwrap();
        assert_eq!(
            report.violations,
            vec![Violation::Clearance {
                processed: 1,
                blocked: 0
            }]
        );

        // Processing b first is fine: a does not exist yet.
        let good = result(vec![placement(0, 0, 0, 1), placement(1, 10, 0, 0)], 20.0);
        assert!(validate_arrangement(&objects, &good).unwrap().is_valid());
    }

    #[test]
    fn test_unknown_index_and_missing_plate() {
        let objects = vec![ArrangementObject::rectangle("a", 1.0, 1.0)];
        let r = ArrangementResult {
            placements: vec![placement(0, 0, 0, 0), placement(3, 0, 0, 0)],
            ..Default::default()
        };
        let report = validate_arrangement(&objects, &r).unwrap();
        assert!(report.violations.contains(&Violation::UnknownObject { index: 3 }));
        assert!(report.violations.contains(&Violation::MissingPlate));
    }
}
