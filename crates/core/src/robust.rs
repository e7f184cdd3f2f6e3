//! Robust predicates for validating input contours.
//!
//! Contours arrive as `f64` vertex lists. Before they are converted to exact rationals
//! they are normalised (duplicate and collinear vertices removed, counter-clockwise
//! winding enforced) and checked for simplicity. All orientation decisions use
//! Shewchuk's adaptive-precision `orient2d`, so the checks are exact for the given
//! floating-point inputs.
//!
//! ## References
//!
//! - Shewchuk, J.R. (1997). "Adaptive Precision Floating-Point Arithmetic and
//!   Fast Robust Predicates for Computational Geometry"

use robust::{orient2d as robust_orient2d, Coord};

/// Result of an orientation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Left turn.
    CounterClockwise,
    /// Right turn.
    Clockwise,
    /// Points on one line.
    Collinear,
}

impl Orientation {
    /// Returns true if the orientation is counter-clockwise.
    #[inline]
    pub fn is_ccw(self) -> bool {
        matches!(self, Orientation::CounterClockwise)
    }

    /// Returns true if the orientation is clockwise.
    #[inline]
    pub fn is_cw(self) -> bool {
        matches!(self, Orientation::Clockwise)
    }

    /// Returns true if the points are collinear.
    #[inline]
    pub fn is_collinear(self) -> bool {
        matches!(self, Orientation::Collinear)
    }
}

/// Orientation of `pc` relative to the directed line `pa -> pb`.
///
/// ```rust
/// use seqarrange_core::robust::{orient2d, Orientation};
///
/// assert_eq!(orient2d((0.0, 0.0), (1.0, 0.0), (0.5, 1.0)), Orientation::CounterClockwise);
/// ```
#[inline]
pub fn orient2d(pa: (f64, f64), pb: (f64, f64), pc: (f64, f64)) -> Orientation {
    let det = robust_orient2d(
        Coord { x: pa.0, y: pa.1 },
        Coord { x: pb.0, y: pb.1 },
        Coord { x: pc.0, y: pc.1 },
    );

    if det > 0.0 {
        Orientation::CounterClockwise
    } else if det < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Signed area of a polygon (positive for counter-clockwise winding).
///
/// Kahan-compensated shoelace sum; used only for the winding decision and for
/// rejecting zero-area inputs.
pub fn signed_area(polygon: &[(f64, f64)]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    let mut c = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let term = polygon[i].0 * polygon[j].1 - polygon[j].0 * polygon[i].1;
        let y = term - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }

    sum / 2.0
}

/// Returns true if the polygon winds counter-clockwise.
///
/// Uses the orientation at the lowest-leftmost vertex, which is always convex.
pub fn is_ccw(polygon: &[(f64, f64)]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut min_idx = 0;
    for (i, &(x, y)) in polygon.iter().enumerate() {
        let (min_x, min_y) = polygon[min_idx];
        if y < min_y || (y == min_y && x < min_x) {
            min_idx = i;
        }
    }

    let n = polygon.len();
    let prev = polygon[(min_idx + n - 1) % n];
    let curr = polygon[min_idx];
    let next = polygon[(min_idx + 1) % n];

    orient2d(prev, curr, next).is_ccw()
}

/// Returns true if every turn of the polygon has the same orientation.
pub fn is_convex(polygon: &[(f64, f64)]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut expected: Option<Orientation> = None;
    for i in 0..n {
        let o = orient2d(polygon[i], polygon[(i + 1) % n], polygon[(i + 2) % n]);
        if o.is_collinear() {
            continue;
        }
        match expected {
            None => expected = Some(o),
            Some(e) if e != o => return false,
            _ => {}
        }
    }

    true
}

/// Normalises a contour for exact processing.
///
/// - drops an explicit closing vertex equal to the first one
/// - drops consecutive duplicate vertices
/// - drops vertices collinear with their neighbours
/// - reverses clockwise contours
///
/// The result may have fewer than three vertices if the input was degenerate.
pub fn normalize_contour(polygon: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut pts: Vec<(f64, f64)> = Vec::with_capacity(polygon.len());
    for &p in polygon {
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    }
    while pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }

    // Removing one collinear vertex can expose another, so iterate to a fixpoint.
    loop {
        let n = pts.len();
        if n < 3 {
            return pts;
        }
        let keep: Vec<bool> = (0..n)
            .map(|i| !orient2d(pts[(i + n - 1) % n], pts[i], pts[(i + 1) % n]).is_collinear())
            .collect();
        if keep.iter().all(|&k| k) {
            break;
        }
        pts = pts
            .iter()
            .zip(keep.iter())
            .filter(|(_, &k)| k)
            .map(|(&p, _)| p)
            .collect();
    }

    if !is_ccw(&pts) {
        pts.reverse();
    }
    pts
}

/// Returns true if the closed segments `p1-p2` and `q1-q2` share a point.
pub fn segments_intersect(
    p1: (f64, f64),
    p2: (f64, f64),
    q1: (f64, f64),
    q2: (f64, f64),
) -> bool {
    let d1 = orient2d(q1, q2, p1);
    let d2 = orient2d(q1, q2, p2);
    let d3 = orient2d(p1, p2, q1);
    let d4 = orient2d(p1, p2, q2);

    let straddles = |a: Orientation, b: Orientation| {
        (a.is_ccw() && b.is_cw()) || (a.is_cw() && b.is_ccw())
    };
    if straddles(d1, d2) && straddles(d3, d4) {
        return true;
    }

    (d1.is_collinear() && on_segment(q1, q2, p1))
        || (d2.is_collinear() && on_segment(q1, q2, p2))
        || (d3.is_collinear() && on_segment(p1, p2, q1))
        || (d4.is_collinear() && on_segment(p1, p2, q2))
}

/// For a point already known to be collinear with `a-b`, tests the bounding range.
fn on_segment(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> bool {
    p.0 >= a.0.min(b.0) && p.0 <= a.0.max(b.0) && p.1 >= a.1.min(b.1) && p.1 <= a.1.max(b.1)
}

/// Returns true if the closed polygon has no self-intersections.
///
/// Adjacent edges may only share their common vertex; non-adjacent edges may not
/// touch at all.
pub fn is_simple(polygon: &[(f64, f64)]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        let a1 = polygon[i];
        let a2 = polygon[(i + 1) % n];
        for j in (i + 1)..n {
            let b1 = polygon[j];
            let b2 = polygon[(j + 1) % n];
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if adjacent {
                // Adjacent edges overlap only if they fold back onto each other.
                let shared = if j == i + 1 { a2 } else { a1 };
                let other_a = if j == i + 1 { a1 } else { a2 };
                let other_b = if j == i + 1 { b2 } else { b1 };
                if orient2d(other_a, shared, other_b).is_collinear()
                    && (on_segment(shared, other_a, other_b) || on_segment(shared, other_b, other_a))
                {
                    return false;
                }
                continue;
            }
            if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }

    true
}
