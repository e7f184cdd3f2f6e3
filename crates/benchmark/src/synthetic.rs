//! Synthetic object sets for benchmarking the arranger.
//!
//! Vertices are snapped to a quarter-unit grid so the exact arithmetic in the solver
//! works with small denominators.

use rand::prelude::*;
use seqarrange_d2::ArrangementObject;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A named set of objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub objects: Vec<ArrangementObject>,
    /// Known optimal plate size, when the construction gives one.
    pub best_known: Option<f64>,
}

impl Dataset {
    /// Sum of footprint areas.
    pub fn total_area(&self) -> f64 {
        self.objects.iter().map(ArrangementObject::area).sum()
    }

    /// Sum of processing durations.
    pub fn total_duration(&self) -> f64 {
        self.objects.iter().map(ArrangementObject::duration).sum()
    }

    /// Side of the smallest square whose area covers every footprint.
    pub fn area_lower_bound(&self) -> f64 {
        self.total_area().sqrt()
    }
}

fn snap(value: f64) -> f64 {
    (value * 4.0).round() / 4.0
}

/// Seeded generator for synthetic datasets.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    rng: StdRng,
}

impl SyntheticGenerator {
    /// Creates a generator with a random seed.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a generator with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn duration(&mut self) -> f64 {
        self.rng.gen_range(1..=4) as f64
    }

    /// Regular convex polygons of 3 to 8 sides.
    pub fn convex(&mut self, count: usize) -> Dataset {
        let objects = (0..count)
            .map(|i| {
                let sides = self.rng.gen_range(3..=8);
                let radius = snap(self.rng.gen_range(4.0..10.0));
                let duration = self.duration();
                ArrangementObject::new(format!("convex{}", i))
                    .with_contour(regular_polygon(sides, radius))
                    .with_duration(duration)
            })
            .collect();

        Dataset {
            name: "convex".to_string(),
            objects,
            best_known: None,
        }
    }

    /// L, T, arrow and star shapes.
    pub fn concave(&mut self, count: usize) -> Dataset {
        let objects = (0..count)
            .map(|i| {
                let id = format!("concave{}", i);
                let w = snap(self.rng.gen_range(8.0..16.0));
                let h = snap(self.rng.gen_range(8.0..16.0));
                let object = match self.rng.gen_range(0..4) {
                    0 => ArrangementObject::l_shape(id, w, h, snap(w * 0.5), snap(h * 0.5)),
                    1 => ArrangementObject::new(id).with_contour(t_shape(w, h)),
                    2 => ArrangementObject::arrow(id, w + 6.0, snap(h * 0.6), snap(h * 0.25), 4.0),
                    _ => {
                        let points = self.rng.gen_range(4..=6);
                        ArrangementObject::new(id).with_contour(star_polygon(points, w * 0.6))
                    }
                };
                let duration = self.duration();
                object.with_duration(duration)
            })
            .collect();

        Dataset {
            name: "concave".to_string(),
            objects,
            best_known: None,
        }
    }

    /// Rectangles whose processing sweeps a gantry strip on their left side.
    ///
    /// Every strip has the height of its object and a width drawn from
    /// `[gantry_width / 2, gantry_width]`.
    pub fn gantry(&mut self, count: usize, gantry_width: f64) -> Dataset {
        let objects = (0..count)
            .map(|i| {
                let w = snap(self.rng.gen_range(6.0..14.0));
                let h = snap(self.rng.gen_range(6.0..14.0));
                let reach = snap(self.rng.gen_range(gantry_width * 0.5..=gantry_width));
                let duration = self.duration();
                ArrangementObject::rectangle(format!("gantry{}", i), w, h)
                    .with_clearance_zone(vec![(-reach, 0.0), (0.0, 0.0), (0.0, h), (-reach, h)])
                    .with_duration(duration)
            })
            .collect();

        Dataset {
            name: "gantry".to_string(),
            objects,
            best_known: None,
        }
    }

    /// `count` identical squares; the optimum is a `ceil(sqrt(count))` grid.
    pub fn squares(&mut self, count: usize, side: f64) -> Dataset {
        let objects = (0..count)
            .map(|i| ArrangementObject::rectangle(format!("square{}", i), side, side))
            .collect();
        let per_row = (count as f64).sqrt().ceil();

        Dataset {
            name: format!("squares_{}", count),
            objects,
            best_known: Some(per_row * side),
        }
    }
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn regular_polygon(sides: usize, radius: f64) -> Vec<(f64, f64)> {
    (0..sides)
        .map(|i| {
            let angle = 2.0 * PI * (i as f64) / (sides as f64) - PI / 2.0;
            (snap(radius + radius * angle.cos()), snap(radius + radius * angle.sin()))
        })
        .collect()
}

fn star_polygon(points: usize, outer: f64) -> Vec<(f64, f64)> {
    let inner = outer * 0.45;
    (0..points * 2)
        .map(|i| {
            let angle = PI * (i as f64) / (points as f64) - PI / 2.0;
            let radius = if i % 2 == 0 { outer } else { inner };
            (snap(outer + radius * angle.cos()), snap(outer + radius * angle.sin()))
        })
        .collect()
}

fn t_shape(width: f64, height: f64) -> Vec<(f64, f64)> {
    let stem = snap(width / 3.0);
    let bar = snap(height / 3.0);
    vec![
        (stem, 0.0),
        (width - stem, 0.0),
        (width - stem, height - bar),
        (width, height - bar),
        (width, height),
        (0.0, height),
        (0.0, height - bar),
        (stem, height - bar),
    ]
}

/// Predefined synthetic datasets.
pub struct SyntheticDatasets;

impl SyntheticDatasets {
    /// Generates every predefined dataset from one seed.
    pub fn all(seed: u64) -> Vec<Dataset> {
        let mut gen = SyntheticGenerator::with_seed(seed);
        vec![
            gen.squares(9, 10.0),
            gen.convex(8),
            gen.concave(8),
            gen.gantry(6, 6.0),
        ]
    }

    /// Generates the dataset called `name` with `count` objects.
    pub fn by_name(name: &str, count: usize, seed: u64) -> Option<Dataset> {
        let mut gen = SyntheticGenerator::with_seed(seed);
        match name {
            "squares" => Some(gen.squares(count, 10.0)),
            "convex" => Some(gen.convex(count)),
            "concave" => Some(gen.concave(count)),
            "gantry" => Some(gen.gantry(count, 6.0)),
            _ => None,
        }
    }

    /// Names accepted by [`SyntheticDatasets::by_name`].
    pub fn names() -> &'static [&'static str] {
        &["squares", "convex", "concave", "gantry"]
    }
}
