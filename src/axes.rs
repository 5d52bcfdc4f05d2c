//! Coordinate axes indicator drawn at the bed origin

use nalgebra::Vector3;

use crate::geometry::{BoundingBox3, Point3d};
use crate::render::{Color, RenderGeometry};

pub const DEFAULT_STEM_RADIUS: f64 = 0.5;
pub const DEFAULT_STEM_LENGTH: f64 = 25.0;
pub const DEFAULT_TIP_RADIUS: f64 = 2.5 * DEFAULT_STEM_RADIUS;
pub const DEFAULT_TIP_LENGTH: f64 = 5.0;

/// X, Y and Z axis colours
pub const AXIS_COLORS: [Color; 3] = [
    Color::new(0.75, 0.0, 0.0, 1.0),
    Color::new(0.0, 0.75, 0.0, 1.0),
    Color::new(0.0, 0.0, 0.75, 1.0),
];

/// Three arrows along +X, +Y and +Z
///
/// Each arrow is a stem followed by a tip. The line geometry of every arrow is
/// cached and rebuilt when the origin or stem length changes.
#[derive(Debug, Clone, PartialEq)]
pub struct AxesIndicator {
    origin: Point3d,
    stem_length: f64,
    geometries: [RenderGeometry; 3],
}

impl Default for AxesIndicator {
    fn default() -> Self {
        let mut axes = Self {
            origin: Point3d::origin(),
            stem_length: DEFAULT_STEM_LENGTH,
            geometries: std::array::from_fn(|_| RenderGeometry::from_lines_3d(&[])),
        };
        axes.rebuild();
        axes
    }
}

impl AxesIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> &Point3d {
        &self.origin
    }

    pub fn set_origin(&mut self, origin: Point3d) {
        if origin != self.origin {
            self.origin = origin;
            self.rebuild();
        }
    }

    pub fn stem_length(&self) -> f64 {
        self.stem_length
    }

    /// Set the stem length; negative values are clamped to zero
    pub fn set_stem_length(&mut self, length: f64) {
        let length = length.max(0.0);
        if length != self.stem_length {
            self.stem_length = length;
            self.rebuild();
        }
    }

    /// Stem plus tip
    pub fn total_length(&self) -> f64 {
        self.stem_length + DEFAULT_TIP_LENGTH
    }

    pub fn tip_radius(&self) -> f64 {
        DEFAULT_TIP_RADIUS
    }

    /// Box enclosing all three arrows including their tips
    pub fn bounding_box(&self) -> BoundingBox3 {
        let reach = Vector3::repeat(self.total_length());
        let radius = Vector3::repeat(self.tip_radius());
        BoundingBox3::new(self.origin - radius, self.origin + reach)
    }

    /// Line geometry of axis `index` (0 = X, 1 = Y, 2 = Z)
    pub fn geometry(&self, index: usize) -> Option<&RenderGeometry> {
        self.geometries.get(index)
    }

    fn rebuild(&mut self) {
        for (index, geometry) in self.geometries.iter_mut().enumerate() {
            *geometry = RenderGeometry::from_lines_3d(&arrow_segments(
                &self.origin,
                index,
                self.stem_length,
            ));
        }
    }
}

/// Stem and a four-sided tip along axis `index`
fn arrow_segments(origin: &Point3d, index: usize, stem_length: f64) -> Vec<(Point3d, Point3d)> {
    let dir = Vector3::ith(index, 1.0);
    let side_a = Vector3::ith((index + 1) % 3, DEFAULT_TIP_RADIUS);
    let side_b = Vector3::ith((index + 2) % 3, DEFAULT_TIP_RADIUS);

    let base = origin + dir * stem_length;
    let apex = base + dir * DEFAULT_TIP_LENGTH;

    let mut segments = vec![(*origin, base)];
    segments.extend(
        [side_a, -side_a, side_b, -side_b]
            .into_iter()
            .map(|side| (base + side, apex)),
    );
    segments
}
