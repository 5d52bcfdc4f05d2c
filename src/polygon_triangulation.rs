//! Triangulation of the bed surface
//!
//! The filled bed surface is rendered as triangles, so the bed contour (with
//! any holes) is converted into a triangle index list before it is uploaded.
//!
//! The module uses the `earcutr` library, a Rust port of the earcut.js
//! polygon triangulation library from MapBox.

use crate::geometry::Point2d;

/// Error type for polygon triangulation operations
#[derive(Debug, thiserror::Error)]
pub enum TriangulationError {
    /// Polygon has too few vertices to triangulate
    #[error("Polygon has too few vertices: {0} (minimum 3 required)")]
    TooFewVertices(usize),

    /// Invalid hole specification
    #[error("Invalid hole: {0}")]
    InvalidHole(String),

    /// Triangulation failed
    #[error("Triangulation failed: {0}")]
    TriangulationFailed(String),
}

/// Triangulate a polygon with holes
///
/// The outer boundary is expected counter-clockwise and holes clockwise,
/// although earcut tolerates either orientation.
///
/// # Returns
///
/// A vector of triangle indices referring to vertices in the combined vertex
/// array: outer vertices first, followed by hole vertices in order. Each
/// consecutive triplet is one triangle.
///
/// # Errors
///
/// Returns an error if:
/// - The outer polygon has fewer than 3 vertices
/// - Any hole has fewer than 3 vertices
/// - The triangulation algorithm fails or yields no triangles
///
/// # Example
///
/// ```
/// use bed3d::geometry::Point2d;
/// use bed3d::polygon_triangulation::triangulate_with_holes;
///
/// let outer = vec![
///     Point2d::new(0.0, 0.0),
///     Point2d::new(100.0, 0.0),
///     Point2d::new(100.0, 100.0),
///     Point2d::new(0.0, 100.0),
/// ];
///
/// let triangles = triangulate_with_holes(&outer, &[]).expect("Failed to triangulate");
/// assert_eq!(triangles.len(), 6);
/// ```
pub fn triangulate_with_holes(
    outer: &[Point2d],
    holes: &[Vec<Point2d>],
) -> Result<Vec<usize>, TriangulationError> {
    if outer.len() < 3 {
        return Err(TriangulationError::TooFewVertices(outer.len()));
    }

    for (i, hole) in holes.iter().enumerate() {
        if hole.len() < 3 {
            return Err(TriangulationError::InvalidHole(format!(
                "Hole {} has only {} vertices (minimum 3 required)",
                i,
                hole.len()
            )));
        }
    }

    // Format: [outer_x0, outer_y0, ..., hole1_x0, hole1_y0, ...]
    let mut coords =
        Vec::with_capacity((outer.len() + holes.iter().map(|h| h.len()).sum::<usize>()) * 2);
    for vertex in outer {
        coords.push(vertex.x);
        coords.push(vertex.y);
    }

    let mut hole_indices = Vec::with_capacity(holes.len());
    let mut current_index = outer.len();
    for hole in holes {
        hole_indices.push(current_index);
        for vertex in hole {
            coords.push(vertex.x);
            coords.push(vertex.y);
        }
        current_index += hole.len();
    }

    let result = earcutr::earcut(&coords, &hole_indices, 2)
        .map_err(|e| TriangulationError::TriangulationFailed(format!("Earcut error: {}", e)))?;

    if result.is_empty() {
        return Err(TriangulationError::TriangulationFailed(
            "Earcut returned no triangles".to_string(),
        ));
    }

    Ok(result)
}
