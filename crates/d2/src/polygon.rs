//! Exact polygon geometry over rationals.
//!
//! All predicates here are decided exactly: coordinates are `BigRational`, so there
//! is no epsilon anywhere in overlap, containment or separation tests. `geo` is used
//! for the convex hull and `i_overlay` for intersection areas, both of which only
//! feed non-decisive quantities (candidate axes, tolerance comparison).

use geo::{ConvexHull, Coord, LineString, Polygon as GeoPolygon};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use seqarrange_core::rational::{midpoint, polygon_from_f64, rational_to_f64};
use seqarrange_core::robust::normalize_contour;
use seqarrange_core::{Error, Result};

/// Exact 2D point.
pub type Point = (BigRational, BigRational);

fn sub(a: &Point, b: &Point) -> Point {
    (&a.0 - &b.0, &a.1 - &b.1)
}

fn add(a: &Point, b: &Point) -> Point {
    (&a.0 + &b.0, &a.1 + &b.1)
}

fn dot(u: &Point, p: &Point) -> BigRational {
    &u.0 * &p.0 + &u.1 * &p.1
}

/// `(a - o) x (b - o)`; positive when `o, a, b` turn counter-clockwise.
fn cross(o: &Point, a: &Point, b: &Point) -> BigRational {
    (&a.0 - &o.0) * (&b.1 - &o.1) - (&a.1 - &o.1) * (&b.0 - &o.0)
}

/// Outward normal of edge `p -> q` for a counter-clockwise polygon.
fn edge_normal(p: &Point, q: &Point) -> Point {
    (&q.1 - &p.1, &p.0 - &q.0)
}

fn to_f64_points(points: &[Point]) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|(x, y)| (rational_to_f64(x), rational_to_f64(y)))
        .collect()
}

// ============================================================================
// Bounding boxes
// ============================================================================

/// Exact axis-aligned bounding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: BigRational,
    pub min_y: BigRational,
    pub max_x: BigRational,
    pub max_y: BigRational,
}

impl BoundingBox {
    /// Box of a point set; `None` when empty.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut b = BoundingBox {
            min_x: first.0.clone(),
            min_y: first.1.clone(),
            max_x: first.0.clone(),
            max_y: first.1.clone(),
        };
        for (x, y) in rest {
            if *x < b.min_x {
                b.min_x = x.clone();
            }
            if *x > b.max_x {
                b.max_x = x.clone();
            }
            if *y < b.min_y {
                b.min_y = y.clone();
            }
            if *y > b.max_y {
                b.max_y = y.clone();
            }
        }
        Some(b)
    }

    pub fn width(&self) -> BigRational {
        &self.max_x - &self.min_x
    }

    pub fn height(&self) -> BigRational {
        &self.max_y - &self.min_y
    }

    /// Centre point.
    pub fn center(&self) -> Point {
        (
            midpoint(&self.min_x, &self.max_x),
            midpoint(&self.min_y, &self.max_y),
        )
    }

    /// The box moved by `offset`.
    pub fn translated(&self, offset: &Point) -> Self {
        BoundingBox {
            min_x: &self.min_x + &offset.0,
            min_y: &self.min_y + &offset.1,
            max_x: &self.max_x + &offset.0,
            max_y: &self.max_y + &offset.1,
        }
    }

    /// The box scaled about its centre by `ratio` in both directions.
    pub fn shrunk(&self, ratio: &BigRational) -> Self {
        let (cx, cy) = self.center();
        let half_w = self.width() * ratio / BigRational::from_integer(2.into());
        let half_h = self.height() * ratio / BigRational::from_integer(2.into());
        BoundingBox {
            min_x: &cx - &half_w,
            min_y: &cy - &half_h,
            max_x: cx + half_w,
            max_y: cy + half_h,
        }
    }

    /// Corners in counter-clockwise order starting at the minimum corner.
    pub fn corners(&self) -> Vec<Point> {
        vec![
            (self.min_x.clone(), self.min_y.clone()),
            (self.max_x.clone(), self.min_y.clone()),
            (self.max_x.clone(), self.max_y.clone()),
            (self.min_x.clone(), self.max_y.clone()),
        ]
    }

    /// Returns true if the interiors intersect (shared edges do not count).
    pub fn overlaps_interior(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// Returns true if `other` lies inside this box (boundary included).
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }
}

/// Exact bounding box of a polygon.
pub fn bounding_box(polygon: &[Point]) -> Option<BoundingBox> {
    BoundingBox::from_points(polygon)
}

// ============================================================================
// Basic polygon functions
// ============================================================================

/// Signed area (positive for counter-clockwise).
pub fn signed_area(polygon: &[Point]) -> BigRational {
    let n = polygon.len();
    if n < 3 {
        return BigRational::zero();
    }
    let mut sum = BigRational::zero();
    for i in 0..n {
        let (x1, y1) = &polygon[i];
        let (x2, y2) = &polygon[(i + 1) % n];
        sum += x1 * y2 - x2 * y1;
    }
    sum / BigRational::from_integer(2.into())
}

/// Returns true if every turn has the same orientation (collinear turns allowed).
pub fn is_convex(polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0i8;
    for i in 0..n {
        let c = cross(&polygon[i], &polygon[(i + 1) % n], &polygon[(i + 2) % n]);
        let s = if c.is_positive() {
            1
        } else if c.is_negative() {
            -1
        } else {
            0
        };
        if s != 0 {
            if sign == 0 {
                sign = s;
            } else if sign != s {
                return false;
            }
        }
    }
    true
}

/// Translates every vertex by `offset`.
pub fn translate(polygon: &[Point], offset: &Point) -> Vec<Point> {
    polygon.iter().map(|p| add(p, offset)).collect()
}

/// Minimum and maximum of `u . p` over the points.
pub fn project(points: &[Point], u: &Point) -> (BigRational, BigRational) {
    let mut iter = points.iter().map(|p| dot(u, p));
    let first = iter.next().unwrap_or_else(BigRational::zero);
    let mut lo = first.clone();
    let mut hi = first;
    for v in iter {
        if v < lo {
            lo = v;
        } else if v > hi {
            hi = v;
        }
    }
    (lo, hi)
}

fn on_segment(p: &Point, a: &Point, b: &Point) -> bool {
    cross(a, b, p).is_zero()
        && p.0 >= a.0.clone().min(b.0.clone())
        && p.0 <= a.0.clone().max(b.0.clone())
        && p.1 >= a.1.clone().min(b.1.clone())
        && p.1 <= a.1.clone().max(b.1.clone())
}

/// Returns true if `point` lies strictly inside `polygon` (boundary points are outside).
pub fn point_in_polygon(point: &Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let (px, py) = point;
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (&polygon[i], &polygon[j]);
        if on_segment(point, a, b) {
            return false;
        }
        if (a.1 > *py) != (b.1 > *py) {
            let x_cross = &a.0 + (py - &a.1) * (&b.0 - &a.0) / (&b.1 - &a.1);
            if *px < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Returns true if every vertex of `polygon` lies inside `outer` (boundary included).
pub fn contains(outer: &BoundingBox, polygon: &[Point]) -> bool {
    polygon.iter().all(|(x, y)| {
        outer.min_x <= *x && *x <= outer.max_x && outer.min_y <= *y && *y <= outer.max_y
    })
}

/// Convex hull (counter-clockwise, no closing vertex).
///
/// The hull is computed by `geo` on the f64 images of the vertices and mapped back
/// to the exact input vertices it selected.
pub fn convex_hull(polygon: &[Point]) -> Vec<Point> {
    if polygon.len() < 3 {
        return polygon.to_vec();
    }
    let approx = to_f64_points(polygon);
    let coords: Vec<Coord<f64>> = approx.iter().map(|&(x, y)| Coord { x, y }).collect();
    let hull = GeoPolygon::new(LineString::from(coords), vec![]).convex_hull();

    let mut out = Vec::new();
    for c in hull.exterior().coords() {
        match approx.iter().position(|&(x, y)| x == c.x && y == c.y) {
            Some(i) => {
                if out.last() != Some(&polygon[i]) {
                    out.push(polygon[i].clone());
                }
            }
            // The projections of the full vertex set equal those of its hull.
            None => return polygon.to_vec(),
        }
    }
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    if signed_area(&out).is_negative() {
        out.reverse();
    }
    out
}

fn point_in_triangle_closed(p: &Point, a: &Point, b: &Point, c: &Point) -> bool {
    !cross(a, b, p).is_negative() && !cross(b, c, p).is_negative() && !cross(c, a, p).is_negative()
}

/// Exact ear-clipping triangulation of a simple counter-clockwise polygon.
pub fn triangulate(polygon: &[Point]) -> Result<Vec<[Point; 3]>> {
    if polygon.len() < 3 {
        return Err(Error::InvalidGeometry(
            "cannot triangulate fewer than 3 vertices".to_string(),
        ));
    }
    let mut idx: Vec<usize> = (0..polygon.len()).collect();
    let mut triangles = Vec::with_capacity(polygon.len() - 2);

    while idx.len() > 3 {
        let m = idx.len();
        let mut clipped = false;
        for k in 0..m {
            let (a, b, c) = (idx[(k + m - 1) % m], idx[k], idx[(k + 1) % m]);
            let (pa, pb, pc) = (&polygon[a], &polygon[b], &polygon[c]);
            if !cross(pa, pb, pc).is_positive() {
                continue;
            }
            let blocked = idx
                .iter()
                .any(|&j| j != a && j != b && j != c && point_in_triangle_closed(&polygon[j], pa, pb, pc));
            if blocked {
                continue;
            }
            triangles.push([pa.clone(), pb.clone(), pc.clone()]);
            idx.remove(k);
            clipped = true;
            break;
        }

        if !clipped {
            // Clipping can leave collinear chains; dropping such a vertex keeps the region.
            let collinear = (0..m).find(|&k| {
                let (a, b, c) = (idx[(k + m - 1) % m], idx[k], idx[(k + 1) % m]);
                on_segment(&polygon[b], &polygon[a], &polygon[c])
            });
            match collinear {
                Some(k) => {
                    idx.remove(k);
                }
                None => {
                    return Err(Error::InvalidGeometry(
                        "ear clipping found no ear; polygon is not simple".to_string(),
                    ))
                }
            }
        }
    }

    let (pa, pb, pc) = (&polygon[idx[0]], &polygon[idx[1]], &polygon[idx[2]]);
    if cross(pa, pb, pc).is_positive() {
        triangles.push([pa.clone(), pb.clone(), pc.clone()]);
    }
    Ok(triangles)
}

// ============================================================================
// Prepared polygons
// ============================================================================

/// A simple polygon with cached triangulation, hull and bounding box.
#[derive(Debug, Clone)]
pub struct ExactPolygon {
    vertices: Vec<Point>,
    triangles: Vec<[Point; 3]>,
    hull: Vec<Point>,
    bbox: BoundingBox,
}

impl ExactPolygon {
    /// Builds a polygon from exact vertices, reorienting clockwise input.
    pub fn new(mut vertices: Vec<Point>) -> Result<Self> {
        let area = signed_area(&vertices);
        if area.is_zero() {
            return Err(Error::InvalidGeometry(
                "polygon has zero area".to_string(),
            ));
        }
        if area.is_negative() {
            vertices.reverse();
        }
        let triangles = triangulate(&vertices)?;
        let hull = convex_hull(&vertices);
        let bbox = BoundingBox::from_points(&vertices)
            .ok_or_else(|| Error::InvalidGeometry("empty polygon".to_string()))?;
        Ok(Self {
            vertices,
            triangles,
            hull,
            bbox,
        })
    }

    /// Normalizes f64 input (closing vertex, duplicates, collinear points,
    /// orientation) and converts it exactly.
    pub fn from_f64(points: &[(f64, f64)]) -> Result<Self> {
        let normalized = normalize_contour(points);
        if normalized.len() < 3 {
            return Err(Error::InvalidGeometry(
                "polygon needs at least 3 non-collinear vertices".to_string(),
            ));
        }
        Self::new(polygon_from_f64(&normalized)?)
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[Point; 3]] {
        &self.triangles
    }

    /// Convex hull vertices (counter-clockwise).
    pub fn hull(&self) -> &[Point] {
        &self.hull
    }

    /// Bounding box in the local frame.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Vertices moved by `offset`.
    pub fn translated(&self, offset: &Point) -> Vec<Point> {
        translate(&self.vertices, offset)
    }

    /// Vertices as f64.
    pub fn to_f64(&self) -> Vec<(f64, f64)> {
        to_f64_points(&self.vertices)
    }

    pub fn area(&self) -> BigRational {
        signed_area(&self.vertices)
    }
}

/// A prepared polygon at a concrete position.
#[derive(Debug, Clone, Copy)]
pub struct PlacedShape<'a> {
    pub polygon: &'a ExactPolygon,
    pub position: &'a Point,
    /// Caller-chosen label reported in errors.
    pub label: usize,
}

impl<'a> PlacedShape<'a> {
    pub fn new(polygon: &'a ExactPolygon, position: &'a Point, label: usize) -> Self {
        Self {
            polygon,
            position,
            label,
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        self.polygon.bbox().translated(self.position)
    }
}

// ============================================================================
// Overlap
// ============================================================================

/// Separating-axis test for two counter-clockwise triangles. Touching triangles
/// do not overlap.
fn triangles_overlap(t1: &[Point; 3], t2: &[Point; 3]) -> bool {
    for tri in [t1, t2] {
        for i in 0..3 {
            let n = edge_normal(&tri[i], &tri[(i + 1) % 3]);
            let (lo1, hi1) = project(t1, &n);
            let (lo2, hi2) = project(t2, &n);
            if hi1 <= lo2 || hi2 <= lo1 {
                return false;
            }
        }
    }
    true
}

/// Returns true if the interiors of two placed polygons intersect.
pub fn overlaps(a: &PlacedShape<'_>, b: &PlacedShape<'_>) -> bool {
    if !a.bbox().overlaps_interior(&b.bbox()) {
        return false;
    }
    let shift = sub(b.position, a.position);
    let shifted: Vec<[Point; 3]> = b
        .polygon
        .triangles()
        .iter()
        .map(|t| [add(&t[0], &shift), add(&t[1], &shift), add(&t[2], &shift)])
        .collect();
    let shifted_boxes: Vec<BoundingBox> = shifted
        .iter()
        .filter_map(|t| BoundingBox::from_points(t))
        .collect();

    a.polygon.triangles().iter().any(|ta| {
        let Some(box_a) = BoundingBox::from_points(ta) else {
            return false;
        };
        shifted
            .iter()
            .zip(&shifted_boxes)
            .any(|(tb, box_b)| box_a.overlaps_interior(box_b) && triangles_overlap(ta, tb))
    })
}

/// Area of the intersection of two f64 polygons.
pub fn intersection_area(a: &[(f64, f64)], b: &[(f64, f64)]) -> f64 {
    let subject: Vec<Vec<[f64; 2]>> = vec![a.iter().map(|&(x, y)| [x, y]).collect()];
    let clip: Vec<[f64; 2]> = b.iter().map(|&(x, y)| [x, y]).collect();
    let shapes = subject.overlay(&[clip], OverlayRule::Intersect, FillRule::NonZero);

    let mut total = 0.0;
    for shape in shapes {
        for contour in shape {
            let n = contour.len();
            let mut twice = 0.0;
            for i in 0..n {
                let [x1, y1] = contour[i];
                let [x2, y2] = contour[(i + 1) % n];
                twice += x1 * y2 - x2 * y1;
            }
            total += twice / 2.0;
        }
    }
    total.abs()
}

/// Overlap test that ignores intersections of area at most `tolerance`.
pub fn overlaps_with_tolerance(a: &PlacedShape<'_>, b: &PlacedShape<'_>, tolerance: f64) -> bool {
    if !overlaps(a, b) {
        return false;
    }
    if tolerance <= 0.0 {
        return true;
    }
    let pa = to_f64_points(&a.polygon.translated(a.position));
    let pb = to_f64_points(&b.polygon.translated(b.position));
    intersection_area(&pa, &pb) > tolerance
}

// ============================================================================
// Separating lines
// ============================================================================

/// Least-penetration axis between two overlapping placed polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparatingLine {
    /// Axis direction (not normalized).
    pub axis: Point,
    /// Position of the line along `axis` (in `axis . p` units).
    pub offset: BigRational,
    /// Whether the cheaper resolution puts the first polygon below the line.
    pub first_below: bool,
    /// Penetration depth along the unit axis.
    pub penetration: f64,
}

/// Computes the candidate separating line for two placed polygons.
///
/// Candidates are the coordinate axes and the hull edge normals of both
/// polygons; the one needing the smallest translation wins. Fails with
/// `GeometryDegenerate` only if the placed polygons coincide exactly.
pub fn separating_line(a: &PlacedShape<'_>, b: &PlacedShape<'_>) -> Result<SeparatingLine> {
    let placed_a = a.polygon.translated(a.position);
    let placed_b = b.polygon.translated(b.position);
    if placed_a.len() == placed_b.len() {
        let mut sa = placed_a.clone();
        let mut sb = placed_b.clone();
        sa.sort();
        sb.sort();
        if sa == sb {
            return Err(Error::GeometryDegenerate {
                first: a.label,
                second: b.label,
            });
        }
    }

    let hull_a = translate(a.polygon.hull(), a.position);
    let hull_b = translate(b.polygon.hull(), b.position);

    let one = BigRational::from_integer(1.into());
    let zero = BigRational::zero();
    let mut axes: Vec<Point> = vec![(one.clone(), zero.clone()), (zero, one)];
    for hull in [a.polygon.hull(), b.polygon.hull()] {
        let n = hull.len();
        for i in 0..n {
            axes.push(edge_normal(&hull[i], &hull[(i + 1) % n]));
        }
    }

    let mut best: Option<(BigRational, SeparatingLine)> = None;
    for u in axes {
        let norm2 = dot(&u, &u);
        if norm2.is_zero() {
            continue;
        }
        let (min_a, max_a) = project(&hull_a, &u);
        let (min_b, max_b) = project(&hull_b, &u);
        let forward = &max_a - &min_b;
        let backward = &max_b - &min_a;
        let (depth, first_below, offset) = if forward <= backward {
            let offset = midpoint(&max_a, &min_b);
            (forward, true, offset)
        } else {
            let offset = midpoint(&max_b, &min_a);
            (backward, false, offset)
        };
        let clamped = if depth.is_negative() {
            BigRational::zero()
        } else {
            depth
        };
        let key = &clamped * &clamped / &norm2;
        let better = best.as_ref().map_or(true, |(k, _)| key < *k);
        if better {
            let penetration = rational_to_f64(&key).sqrt();
            best = Some((
                key,
                SeparatingLine {
                    axis: u,
                    offset,
                    first_below,
                    penetration,
                },
            ));
        }
    }

    best.map(|(_, line)| line).ok_or(Error::GeometryDegenerate {
        first: a.label,
        second: b.label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use seqarrange_core::rational::rational_from_int;

    fn pt(x: i64, y: i64) -> Point {
        (rational_from_int(x), rational_from_int(y))
    }

    fn rect(w: f64, h: f64) -> ExactPolygon {
        ExactPolygon::from_f64(&[(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]).unwrap()
    }

    fn l_shape() -> ExactPolygon {
        ExactPolygon::from_f64(&[
            (0.0, 0.0),
            (40.0, 0.0),
            (40.0, 15.0),
            (15.0, 15.0),
            (15.0, 40.0),
            (0.0, 40.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_triangulation_counts() {
        let l = l_shape();
        assert_eq!(l.triangles().len(), 4);
        let total: BigRational = l.triangles().iter().map(|t| signed_area(t)).sum();
        assert_eq!(total, l.area());
        assert_eq!(l.hull().len(), 5);
        assert!(!is_convex(l.vertices()));
        assert!(is_convex(rect(3.0, 4.0).vertices()));
    }

    #[test]
    fn test_clockwise_input_is_reoriented() {
        let cw = ExactPolygon::from_f64(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]).unwrap();
        assert_eq!(cw.area(), rational_from_int(4));
    }

    #[test]
    fn test_touching_is_not_overlap() {
        let r = rect(10.0, 10.0);
        let p0 = pt(0, 0);
        let p1 = pt(10, 0);
        let p2 = pt(9, 0);
        let a = PlacedShape::new(&r, &p0, 0);
        assert!(!overlaps(&a, &PlacedShape::new(&r, &p1, 1)));
        assert!(overlaps(&a, &PlacedShape::new(&r, &p2, 1)));
    }

    #[test]
    fn test_concave_notch_fit() {
        let l = l_shape();
        let square = rect(20.0, 20.0);
        let origin = pt(0, 0);
        let in_notch = pt(17, 17);
        let clashing = pt(10, 10);
        let placed_l = PlacedShape::new(&l, &origin, 0);

        let fitted = PlacedShape::new(&square, &in_notch, 1);
        assert!(placed_l.bbox().overlaps_interior(&fitted.bbox()));
        assert!(!overlaps(&placed_l, &fitted));
        assert!(overlaps(&placed_l, &PlacedShape::new(&square, &clashing, 1)));
    }

    #[test]
    fn test_overlap_with_tolerance() {
        let r = rect(10.0, 10.0);
        let p0 = pt(0, 0);
        let p1 = pt(9, 0);
        let a = PlacedShape::new(&r, &p0, 0);
        let b = PlacedShape::new(&r, &p1, 1);
        let area = intersection_area(&r.to_f64(), &[(9.0, 0.0), (19.0, 0.0), (19.0, 10.0), (9.0, 10.0)]);
        assert_relative_eq!(area, 10.0, epsilon = 1e-6);
        assert!(overlaps_with_tolerance(&a, &b, 5.0));
        assert!(!overlaps_with_tolerance(&a, &b, 20.0));
    }

    #[test]
    fn test_point_in_polygon_and_contains() {
        let l = l_shape();
        assert!(point_in_polygon(&pt(5, 5), l.vertices()));
        assert!(!point_in_polygon(&pt(30, 30), l.vertices()));
        assert!(!point_in_polygon(&pt(0, 5), l.vertices()));

        let plate = BoundingBox::from_points(&[pt(0, 0), pt(40, 40)]).unwrap();
        assert!(contains(&plate, l.vertices()));
        assert!(!contains(&plate, &l.translated(&pt(1, 0))));
    }

    #[test]
    fn test_bbox_shrink() {
        let b = BoundingBox::from_points(&[pt(0, 0), pt(10, 20)]).unwrap();
        let half = b.shrunk(&BigRational::new(1.into(), 2.into()));
        assert_eq!(half.min_x, BigRational::new(5.into(), 2.into()));
        assert_eq!(half.max_y, BigRational::from_integer(15.into()));
        assert_eq!(half.center(), b.center());
        assert!(b.contains_box(&half));
    }

    #[test]
    fn test_separating_line_prefers_shallow_axis() {
        let r = rect(10.0, 10.0);
        let p0 = pt(0, 0);
        let p1 = pt(8, 1);
        let line = separating_line(&PlacedShape::new(&r, &p0, 0), &PlacedShape::new(&r, &p1, 1))
            .unwrap();
        // x penetration is 2, y penetration is 9
        assert!(line.axis.1.is_zero());
        assert!(line.first_below == line.axis.0.is_positive());
        assert_relative_eq!(line.penetration, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_separating_line_degenerate() {
        let r = rect(10.0, 10.0);
        let p = pt(3, 3);
        let err = separating_line(&PlacedShape::new(&r, &p, 4), &PlacedShape::new(&r, &p, 7));
        assert!(matches!(
            err,
            Err(Error::GeometryDegenerate {
                first: 4,
                second: 7
            })
        ));
    }

    #[test]
    fn test_triangulate_rejects_tiny_input() {
        assert!(triangulate(&[pt(0, 0), pt(1, 0)]).is_err());
    }
}
