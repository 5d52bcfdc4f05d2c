//! Printable volume derived from the bed outline and maximum print height

use crate::geometry::{BedShape, BoundingBox2, BoundingBox3, GROUND_Z, Point2d, Point3d};
use crate::polygon_clipping::point_in_ring;

/// Geometric description of the printable volume
///
/// The footprint is the exact bed polygon, extruded from the ground plane up
/// to `max_print_height`. A degenerate bed shape yields a volume with zero
/// area that contains nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildVolume {
    bed_shape: BedShape,
    max_print_height: f64,
    bounding_volume2d: BoundingBox2,
    bounding_volume: BoundingBox3,
}

impl BuildVolume {
    /// Build the volume for `bed_shape` and `max_print_height`
    ///
    /// A shape with non-finite coordinates keeps undefined bounding boxes.
    pub fn new(bed_shape: BedShape, max_print_height: f64) -> Self {
        let max_print_height = Self::clamp_height(max_print_height);
        let bounding_volume2d = if bed_shape.is_finite() {
            bed_shape.bounding_box()
        } else {
            BoundingBox2::default()
        };
        let bounding_volume = if bounding_volume2d.is_defined() {
            BoundingBox3::new(
                Point3d::new(bounding_volume2d.min.x, bounding_volume2d.min.y, GROUND_Z),
                Point3d::new(
                    bounding_volume2d.max.x,
                    bounding_volume2d.max.y,
                    GROUND_Z + max_print_height,
                ),
            )
        } else {
            BoundingBox3::default()
        };

        Self {
            bed_shape,
            max_print_height,
            bounding_volume2d,
            bounding_volume,
        }
    }

    /// Height actually used for `max_print_height`: negative and non-finite
    /// values become zero
    pub fn clamp_height(max_print_height: f64) -> f64 {
        if max_print_height.is_finite() {
            max_print_height.max(0.0)
        } else {
            0.0
        }
    }

    /// Bed outline the volume was built from
    pub fn bed_shape(&self) -> &BedShape {
        &self.bed_shape
    }

    /// Maximum print height
    pub fn max_print_height(&self) -> f64 {
        self.max_print_height
    }

    /// Bounding box of the bed outline
    pub fn bounding_volume2d(&self) -> &BoundingBox2 {
        &self.bounding_volume2d
    }

    /// Bounding box of the whole printable volume
    pub fn bounding_volume(&self) -> &BoundingBox3 {
        &self.bounding_volume
    }

    /// Footprint area (shoelace formula); zero for degenerate shapes
    pub fn area(&self) -> f64 {
        let points = self.bed_shape.points();
        if self.bed_shape.is_degenerate() {
            return 0.0;
        }
        let doubled: f64 = points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum();
        0.5 * doubled.abs()
    }

    /// Exact 2D containment against the bed polygon
    pub fn contains_2d(&self, point: &Point2d) -> bool {
        !self.bed_shape.is_degenerate() && point_in_ring(point, self.bed_shape.points())
    }

    /// Exact 3D containment: inside the footprint and between the ground
    /// plane and the maximum print height
    pub fn contains(&self, point: &Point3d) -> bool {
        point.z >= GROUND_Z
            && point.z <= GROUND_Z + self.max_print_height
            && self.contains_2d(&Point2d::new(point.x, point.y))
    }
}
