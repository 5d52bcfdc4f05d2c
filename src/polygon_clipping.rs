//! Polygon offsetting and point queries for the bed outline
//!
//! The collision outline of the bed is the bed polygon grown outward by a
//! fixed margin. Offsetting uses the Clipper2 library, which handles the
//! round joins at convex corners and the trimming at concave ones.
//!
//! The point queries (`point_in_ring`, `closest_point_on_ring`) work on plain
//! rings of `Point2d` and are cheap enough to run per object per frame.

use crate::geometry::Point2d;
use clipper2::*;

/// Error type for polygon clipping operations
#[derive(Debug, thiserror::Error)]
pub enum ClippingError {
    /// Invalid polygon data
    #[error("Invalid polygon: {0}")]
    InvalidPolygon(String),

    /// Clipper produced no polygon at all
    #[error("Offset produced an empty polygon")]
    EmptyResult,
}

/// Convert a ring to a Clipper2 path
fn ring_to_path(ring: &[Point2d]) -> Vec<(f64, f64)> {
    ring.iter().map(|p| (p.x, p.y)).collect()
}

/// Convert a Clipper2 path back to a ring
fn path_to_ring(path: &[(f64, f64)]) -> Vec<Point2d> {
    path.iter().map(|&(x, y)| Point2d::new(x, y)).collect()
}

/// Signed area of a ring, positive for counter-clockwise winding
pub fn signed_area(ring: &[Point2d]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let doubled: f64 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    0.5 * doubled
}

/// Offset a closed ring outward by `delta` with round joins
///
/// Returns the largest ring of the result, oriented counter-clockwise.
/// Clipper may split a self-touching outline into several rings; only the
/// dominant one is useful as a collision outline.
///
/// # Arguments
///
/// * `ring` - Closed ring, any orientation
/// * `delta` - Offset distance in millimetres (negative shrinks)
///
/// # Example
///
/// ```
/// use bed3d::geometry::Point2d;
/// use bed3d::polygon_clipping::offset_ring;
///
/// let square = vec![
///     Point2d::new(0.0, 0.0),
///     Point2d::new(10.0, 0.0),
///     Point2d::new(10.0, 10.0),
///     Point2d::new(0.0, 10.0),
/// ];
///
/// let grown = offset_ring(&square, 1.0).expect("Failed to offset");
/// assert!(grown.iter().any(|p| p.x < -0.9));
/// ```
pub fn offset_ring(ring: &[Point2d], delta: f64) -> Result<Vec<Point2d>, ClippingError> {
    if ring.len() < 3 {
        return Err(ClippingError::InvalidPolygon(format!(
            "ring has {} vertices (minimum 3 required)",
            ring.len()
        )));
    }
    if !delta.is_finite() {
        return Err(ClippingError::InvalidPolygon(format!(
            "offset distance {} is not finite",
            delta
        )));
    }

    // Clipper offsets outward for positive delta only on positively oriented
    // paths, so normalise orientation first
    let mut path = ring_to_path(ring);
    if signed_area(ring) < 0.0 {
        path.reverse();
    }

    // miter_limit is irrelevant for round joins but still required
    let inflated = inflate::<Centi>(vec![path], delta, JoinType::Round, EndType::Polygon, 2.0);
    let paths: Vec<Vec<(f64, f64)>> = inflated.into();

    let mut largest = paths
        .iter()
        .filter(|p| p.len() >= 3)
        .map(|p| path_to_ring(p))
        .max_by(|a, b| signed_area(a).abs().total_cmp(&signed_area(b).abs()))
        .ok_or(ClippingError::EmptyResult)?;

    if signed_area(&largest) < 0.0 {
        largest.reverse();
    }
    Ok(largest)
}

/// Even-odd point in polygon test for a single ring
///
/// Points exactly on an edge may be reported either way.
pub fn point_in_ring(point: &Point2d, ring: &[Point2d]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (&ring[i], &ring[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Closest point to `point` on the segment `a`-`b`
fn closest_point_on_segment(point: &Point2d, a: &Point2d, b: &Point2d) -> Point2d {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return *a;
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point to `point` on the boundary of a ring
///
/// Returns `None` for an empty ring.
pub fn closest_point_on_ring(point: &Point2d, ring: &[Point2d]) -> Option<Point2d> {
    match ring.len() {
        0 => None,
        1 => Some(ring[0]),
        _ => ring
            .iter()
            .zip(ring.iter().cycle().skip(1))
            .map(|(a, b)| closest_point_on_segment(point, a, b))
            .min_by(|p, q| {
                (p - point)
                    .norm_squared()
                    .total_cmp(&(q - point).norm_squared())
            }),
    }
}
