//! Basic 2D/3D geometry types shared by the bed modules
//!
//! Points and vectors come from `nalgebra`; this module adds the bed outline
//! newtype and axis-aligned bounding boxes that can be "undefined" (empty),
//! which is the state of every box before the first point is merged.

use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::error::{Error, Result};

/// A 2D point in bed coordinates (millimetres)
pub type Point2d = Point2<f64>;

/// A 3D point in world coordinates (millimetres)
pub type Point3d = Point3<f64>;

/// Height of the bed surface
pub const GROUND_Z: f64 = 0.0;

/// Ordered bed outline as configured by the printer profile
///
/// Insertion order is the polygon winding order. A shape with fewer than
/// three points is degenerate but still representable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BedShape {
    points: Vec<Point2d>,
}

impl BedShape {
    /// Create a bed shape from its points
    pub fn new(points: Vec<Point2d>) -> Self {
        Self { points }
    }

    /// Create a bed shape from `(x, y)` pairs
    pub fn from_xy(points: &[(f64, f64)]) -> Self {
        Self::new(points.iter().map(|&(x, y)| Point2d::new(x, y)).collect())
    }

    /// Axis aligned rectangle with its minimum corner at `origin`
    pub fn rectangle(origin: Point2d, width: f64, depth: f64) -> Self {
        Self::new(vec![
            origin,
            Point2d::new(origin.x + width, origin.y),
            Point2d::new(origin.x + width, origin.y + depth),
            Point2d::new(origin.x, origin.y + depth),
        ])
    }

    /// Regular polygon approximating a circular bed
    pub fn circle(center: Point2d, radius: f64, segments: usize) -> Self {
        let segments = segments.max(3);
        let step = std::f64::consts::TAU / segments as f64;
        Self::new(
            (0..segments)
                .map(|i| {
                    let angle = step * i as f64;
                    Point2d::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
                })
                .collect(),
        )
    }

    /// Outline points
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the shape has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when every coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// True when the shape cannot enclose an area: fewer than three points or
    /// a non-finite coordinate
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3 || !self.is_finite()
    }

    /// Check that the shape can be used as a bed outline
    pub fn validate(&self) -> Result<()> {
        if let Some(index) = self
            .points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(Error::NonFiniteShape(index));
        }
        if self.points.len() < 3 {
            return Err(Error::InvalidShape(self.points.len()));
        }
        Ok(())
    }

    /// Bounding box of the outline
    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(&self.points)
    }
}

/// Axis-aligned 2D bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox2 {
    /// Minimum corner
    pub min: Point2d,
    /// Maximum corner
    pub max: Point2d,
    defined: bool,
}

impl Default for BoundingBox2 {
    fn default() -> Self {
        Self {
            min: Point2d::origin(),
            max: Point2d::origin(),
            defined: false,
        }
    }
}

impl BoundingBox2 {
    /// Bounding box of a point set, undefined when the set is empty
    pub fn from_points(points: &[Point2d]) -> Self {
        let mut bbox = Self::default();
        for p in points {
            bbox.merge_point(p);
        }
        bbox
    }

    /// True once at least one point has been merged
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Grow the box to contain `p`
    pub fn merge_point(&mut self, p: &Point2d) {
        if self.defined {
            self.min = self.min.inf(p);
            self.max = self.max.sup(p);
        } else {
            self.min = *p;
            self.max = *p;
            self.defined = true;
        }
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector2<f64> {
        self.max - self.min
    }

    /// Centre point
    pub fn center(&self) -> Point2d {
        nalgebra::center(&self.min, &self.max)
    }

    /// Half the diagonal length
    pub fn radius(&self) -> f64 {
        0.5 * self.size().norm()
    }

    /// True when the box is defined and has a positive area
    pub fn has_area(&self) -> bool {
        let size = self.size();
        self.defined && size.x > 0.0 && size.y > 0.0
    }
}

/// Axis-aligned 3D bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox3 {
    /// Minimum corner
    pub min: Point3d,
    /// Maximum corner
    pub max: Point3d,
    defined: bool,
}

impl Default for BoundingBox3 {
    fn default() -> Self {
        Self {
            min: Point3d::origin(),
            max: Point3d::origin(),
            defined: false,
        }
    }
}

impl BoundingBox3 {
    /// Box spanning the two corners
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self {
            min: min.inf(&max),
            max: min.sup(&max),
            defined: true,
        }
    }

    /// Bounding box of a point set, undefined when the set is empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3d>) -> Self {
        let mut bbox = Self::default();
        for p in points {
            bbox.merge_point(p);
        }
        bbox
    }

    /// True once at least one point has been merged
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Grow the box to contain `p`
    pub fn merge_point(&mut self, p: &Point3d) {
        if self.defined {
            self.min = self.min.inf(p);
            self.max = self.max.sup(p);
        } else {
            self.min = *p;
            self.max = *p;
            self.defined = true;
        }
    }

    /// Grow the box to contain `other`; undefined boxes are ignored
    pub fn merge(&mut self, other: &BoundingBox3) {
        if other.defined {
            self.merge_point(&other.min);
            self.merge_point(&other.max);
        }
    }

    /// Move the box by `offset`
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
            defined: self.defined,
        }
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Largest extent
    pub fn max_size(&self) -> f64 {
        self.size().max()
    }

    /// Centre point
    pub fn center(&self) -> Point3d {
        nalgebra::center(&self.min, &self.max)
    }

    /// True when `p` lies inside or on the box
    pub fn contains(&self, p: &Point3d) -> bool {
        self.defined && (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    /// True when `other` lies completely inside this box
    pub fn contains_box(&self, other: &BoundingBox3) -> bool {
        !other.defined || (self.contains(&other.min) && self.contains(&other.max))
    }
}
