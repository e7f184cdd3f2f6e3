//! Objects to arrange.

use crate::polygon::{BoundingBox, ExactPolygon};
use geo::{Area, ConvexHull, Coord, LineString, Polygon as GeoPolygon};
use num_rational::BigRational;
use seqarrange_core::rational::rational_from_f64;
use seqarrange_core::robust::{is_convex, is_simple, normalize_contour};
use seqarrange_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rigid polygonal object that is placed on the plate and processed once.
///
/// The contour is given in the object's local frame; a placement translates it by
/// `(x, y)`. Clearance zones are also local: they describe where the processing head
/// sweeps while this object is being processed, and must stay clear of every object
/// completed before it.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrangementObject {
    /// Identifier used in results and logs.
    id: String,

    /// Footprint outline.
    contour: Vec<(f64, f64)>,

    /// Head clearance regions in the local frame.
    clearance_zones: Vec<Vec<(f64, f64)>>,

    /// Processing time (> 0).
    duration: f64,
}

impl ArrangementObject {
    /// Creates an object with an empty contour and unit duration.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contour: Vec::new(),
            clearance_zones: Vec::new(),
            duration: 1.0,
        }
    }

    /// Sets the contour from a list of (x, y) vertices.
    pub fn with_contour(mut self, vertices: Vec<(f64, f64)>) -> Self {
        self.contour = vertices;
        self
    }

    /// Adds a clearance zone.
    pub fn with_clearance_zone(mut self, vertices: Vec<(f64, f64)>) -> Self {
        self.clearance_zones.push(vertices);
        self
    }

    /// Sets the processing duration.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Creates a rectangular object with its lower-left corner at the origin.
    pub fn rectangle(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self::new(id).with_contour(vec![
            (0.0, 0.0),
            (width, 0.0),
            (width, height),
            (0.0, height),
        ])
    }

    /// Creates an L-shaped object.
    pub fn l_shape(
        id: impl Into<String>,
        width: f64,
        height: f64,
        notch_width: f64,
        notch_height: f64,
    ) -> Self {
        Self::new(id).with_contour(vec![
            (0.0, 0.0),
            (width, 0.0),
            (width, notch_height),
            (notch_width, notch_height),
            (notch_width, height),
            (0.0, height),
        ])
    }

    /// Creates a diamond inscribed in a `width x height` box.
    pub fn diamond(id: impl Into<String>, width: f64, height: f64) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        Self::new(id).with_contour(vec![(hw, 0.0), (width, hh), (hw, height), (0.0, hh)])
    }

    /// Creates a concave arrow pointing along +x.
    ///
    /// The shaft is `shaft_width` wide and the head takes the last `head_length` of
    /// `length`; the tail carries a V notch of depth `head_length / 2`.
    pub fn arrow(
        id: impl Into<String>,
        length: f64,
        width: f64,
        shaft_width: f64,
        head_length: f64,
    ) -> Self {
        let mid = width / 2.0;
        let shaft_lo = mid - shaft_width / 2.0;
        let shaft_hi = mid + shaft_width / 2.0;
        let neck = length - head_length;
        let notch = head_length / 2.0;
        Self::new(id).with_contour(vec![
            (0.0, shaft_lo),
            (neck, shaft_lo),
            (neck, 0.0),
            (length, mid),
            (neck, width),
            (neck, shaft_hi),
            (0.0, shaft_hi),
            (notch, mid),
        ])
    }

    /// Returns the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the contour vertices as given.
    pub fn contour(&self) -> &[(f64, f64)] {
        &self.contour
    }

    /// Returns the clearance zones.
    pub fn clearance_zones(&self) -> &[Vec<(f64, f64)>] {
        &self.clearance_zones
    }

    /// Returns the processing duration.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Converts the contour to a geo polygon.
    pub fn to_geo_polygon(&self) -> GeoPolygon<f64> {
        let exterior = LineString::from(
            self.contour
                .iter()
                .map(|&(x, y)| Coord { x, y })
                .collect::<Vec<_>>(),
        );
        GeoPolygon::new(exterior, vec![])
    }

    /// Footprint area.
    pub fn area(&self) -> f64 {
        self.to_geo_polygon().unsigned_area()
    }

    /// Convex hull of the footprint (closing vertex removed).
    pub fn convex_hull(&self) -> Vec<(f64, f64)> {
        let hull = self.to_geo_polygon().convex_hull();
        let mut points: Vec<(f64, f64)> = hull.exterior().coords().map(|c| (c.x, c.y)).collect();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }

    /// Returns true if the footprint is convex.
    pub fn is_convex(&self) -> bool {
        is_convex(&normalize_contour(&self.contour))
    }

    /// Axis-aligned bounding box `(min, max)` of the footprint.
    pub fn aabb(&self) -> ([f64; 2], [f64; 2]) {
        if self.contour.is_empty() {
            return ([0.0, 0.0], [0.0, 0.0]);
        }
        let mut min = [f64::MAX, f64::MAX];
        let mut max = [f64::MIN, f64::MIN];
        for &(x, y) in &self.contour {
            min[0] = min[0].min(x);
            min[1] = min[1].min(y);
            max[0] = max[0].max(x);
            max[1] = max[1].max(y);
        }
        (min, max)
    }

    /// Checks the object for use in an arrangement.
    pub fn validate(&self) -> Result<()> {
        validate_outline(&self.id, "contour", &self.contour)?;
        for (k, zone) in self.clearance_zones.iter().enumerate() {
            validate_outline(&self.id, &format!("clearance zone {}", k), zone)?;
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "duration of '{}' must be positive, got {}",
                self.id, self.duration
            )));
        }
        Ok(())
    }

    /// Builds the exact representation used by the solver.
    pub fn prepare(&self) -> Result<PreparedObject> {
        self.validate()?;
        let footprint = ExactPolygon::from_f64(&self.contour)?;
        let zones = self
            .clearance_zones
            .iter()
            .map(|z| ExactPolygon::from_f64(z))
            .collect::<Result<Vec<_>>>()?;
        Ok(PreparedObject {
            id: self.id.clone(),
            footprint,
            zones,
            duration: rational_from_f64(self.duration)?,
        })
    }
}

fn validate_outline(id: &str, what: &str, vertices: &[(f64, f64)]) -> Result<()> {
    if vertices.iter().any(|&(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(Error::InvalidGeometry(format!(
            "{} of '{}' has non-finite coordinates",
            what, id
        )));
    }
    let normalized = normalize_contour(vertices);
    if normalized.len() < 3 {
        return Err(Error::InvalidGeometry(format!(
            "{} of '{}' must have at least 3 non-collinear vertices",
            what, id
        )));
    }
    if !is_simple(&normalized) {
        return Err(Error::InvalidGeometry(format!(
            "{} of '{}' is self-intersecting",
            what, id
        )));
    }
    Ok(())
}

/// Exact, solver-ready form of an [`ArrangementObject`].
#[derive(Debug, Clone)]
pub struct PreparedObject {
    /// Identifier copied from the source object.
    pub id: String,
    /// Normalized footprint.
    pub footprint: ExactPolygon,
    /// Normalized clearance zones.
    pub zones: Vec<ExactPolygon>,
    /// Processing duration.
    pub duration: BigRational,
}

impl PreparedObject {
    /// Bounding box of the footprint in the local frame.
    pub fn bbox(&self) -> &BoundingBox {
        self.footprint.bbox()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle() {
        let obj = ArrangementObject::rectangle("r1", 30.0, 20.0).with_duration(5.0);
        assert_eq!(obj.id(), "r1");
        assert_relative_eq!(obj.area(), 600.0, epsilon = 1e-10);
        assert!(obj.is_convex());
        assert_eq!(obj.aabb(), ([0.0, 0.0], [30.0, 20.0]));
        assert!(obj.validate().is_ok());
    }

    #[test]
    fn test_l_shape_is_concave() {
        let obj = ArrangementObject::l_shape("l1", 40.0, 40.0, 15.0, 15.0);
        assert!(!obj.is_convex());
        assert_relative_eq!(obj.area(), 40.0 * 15.0 + 15.0 * 25.0, epsilon = 1e-10);
        assert_eq!(obj.convex_hull().len(), 5);
    }

    #[test]
    fn test_diamond_and_arrow() {
        let d = ArrangementObject::diamond("d", 20.0, 30.0);
        assert!(d.is_convex());
        assert_relative_eq!(d.area(), 300.0, epsilon = 1e-10);

        let a = ArrangementObject::arrow("a", 40.0, 20.0, 8.0, 12.0);
        assert!(!a.is_convex());
        assert!(a.validate().is_ok());
        assert_eq!(a.aabb(), ([0.0, 0.0], [40.0, 20.0]));
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let degenerate = ArrangementObject::new("line").with_contour(vec![
            (0.0, 0.0),
            (1.0, 1.0),
            (2.0, 2.0),
        ]);
        assert!(matches!(
            degenerate.validate(),
            Err(Error::InvalidGeometry(_))
        ));

        let bowtie = ArrangementObject::new("bowtie").with_contour(vec![
            (0.0, 0.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 10.0),
        ]);
        assert!(bowtie.validate().is_err());

        let no_time = ArrangementObject::rectangle("r", 1.0, 1.0).with_duration(0.0);
        assert!(no_time.validate().is_err());

        let bad_zone = ArrangementObject::rectangle("r", 1.0, 1.0)
            .with_clearance_zone(vec![(0.0, 0.0), (1.0, 0.0)]);
        assert!(bad_zone.validate().is_err());
    }

    #[test]
    fn test_prepare_normalizes() {
        let cw = ArrangementObject::new("cw")
            .with_contour(vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)])
            .with_clearance_zone(vec![(-5.0, 0.0), (0.0, 0.0), (0.0, 5.0), (-5.0, 5.0)])
            .with_duration(2.5);
        let prepared = cw.prepare().unwrap();
        assert_eq!(prepared.footprint.vertices().len(), 4);
        assert_eq!(prepared.zones.len(), 1);
        assert_eq!(prepared.duration, rational_from_f64(2.5).unwrap());
        assert!(crate::polygon::signed_area(prepared.footprint.vertices()) > BigRational::from_integer(0.into()));
    }
}
