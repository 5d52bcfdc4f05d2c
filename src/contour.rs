//! Bed contour: the bed outline as an area with optional holes

use crate::geometry::{BedShape, BoundingBox2, Point2d};
use crate::polygon_clipping::{point_in_ring, signed_area};

/// Bed area used to generate the fill, grid and contour geometry
///
/// The outer ring is stored counter-clockwise and holes clockwise, whatever
/// orientation the input had.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BedContour {
    outer: Vec<Point2d>,
    holes: Vec<Vec<Point2d>>,
}

impl BedContour {
    /// Contour of a bed shape without holes
    ///
    /// Degenerate shapes produce an empty contour.
    pub fn from_shape(shape: &BedShape) -> Self {
        if shape.is_degenerate() {
            return Self::default();
        }
        Self::with_holes(shape.points().to_vec(), Vec::new())
    }

    /// Contour with explicit holes; holes with fewer than 3 points are dropped
    pub fn with_holes(mut outer: Vec<Point2d>, holes: Vec<Vec<Point2d>>) -> Self {
        if outer.len() < 3 {
            return Self::default();
        }
        if signed_area(&outer) < 0.0 {
            outer.reverse();
        }
        let holes = holes
            .into_iter()
            .filter(|h| h.len() >= 3)
            .map(|mut h| {
                if signed_area(&h) > 0.0 {
                    h.reverse();
                }
                h
            })
            .collect();
        Self { outer, holes }
    }

    /// Outer ring, counter-clockwise
    pub fn outer(&self) -> &[Point2d] {
        &self.outer
    }

    /// Hole rings, clockwise
    pub fn holes(&self) -> &[Vec<Point2d>] {
        &self.holes
    }

    /// Outer ring followed by the holes
    pub fn rings(&self) -> impl Iterator<Item = &[Point2d]> {
        std::iter::once(self.outer.as_slice())
            .filter(|r| !r.is_empty())
            .chain(self.holes.iter().map(Vec::as_slice))
    }

    /// True when there is no area
    pub fn is_empty(&self) -> bool {
        self.outer.is_empty()
    }

    /// Bounding box of the outer ring
    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(&self.outer)
    }

    /// Area of the outer ring minus the holes
    pub fn area(&self) -> f64 {
        signed_area(&self.outer) + self.holes.iter().map(|h| signed_area(h)).sum::<f64>()
    }

    /// Inside the outer ring and outside every hole
    pub fn contains(&self, point: &Point2d) -> bool {
        point_in_ring(point, &self.outer) && !self.holes.iter().any(|h| point_in_ring(point, h))
    }
}
