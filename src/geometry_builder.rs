//! Renderable geometry derived from the bed contour
//!
//! Three geometries are produced together from one [`BedContour`]:
//!
//! - the filled surface (triangles with texture coordinates)
//! - the grid lines, clipped against the contour including its holes
//! - the contour lines (outer boundary and holes)
//!
//! plus the collision outline used for fast containment queries. They are
//! bundled in [`BedGeometry`] so a reshape replaces all of them at once.

use crate::config::BedConfig;
use crate::contour::BedContour;
use crate::error::Result;
use crate::geometry::{GROUND_Z, Point2d};
use crate::polygon_clipping::offset_ring;
use crate::polygon_triangulation::triangulate_with_holes;
use crate::render::{PrimitiveType, RenderGeometry};

/// Candidate grid lines closer than this to the bounding box edge are skipped;
/// the contour lines already cover them
const GRID_EDGE_EPSILON: f64 = 1e-6;

/// Upper bound on candidate grid lines (both directions together); beyond it
/// the grid is skipped
pub const MAX_GRID_LINES: usize = 10_000;

/// Every geometry derived from one bed contour
#[derive(Debug, Clone, PartialEq)]
pub struct BedGeometry {
    /// Filled bed surface
    pub fill: RenderGeometry,
    /// Grid lines followed by the contour lines
    pub grid: RenderGeometry,
    /// Contour outline
    pub contour: RenderGeometry,
    /// Outline grown by the collision margin, counter-clockwise; empty for an
    /// empty contour
    pub collision_polygon: Vec<Point2d>,
}

impl Default for BedGeometry {
    fn default() -> Self {
        Self {
            fill: RenderGeometry::empty(PrimitiveType::Triangles),
            grid: RenderGeometry::empty(PrimitiveType::Lines),
            contour: RenderGeometry::empty(PrimitiveType::Lines),
            collision_polygon: Vec::new(),
        }
    }
}

impl BedGeometry {
    /// Build all geometries for `contour`
    ///
    /// Failures of a single geometry (e.g. a self-intersecting outline that
    /// earcut cannot triangulate) are logged and leave that geometry empty.
    pub fn build(contour: &BedContour, config: &BedConfig) -> Self {
        if contour.is_empty() {
            return Self::default();
        }

        let fill = build_fill(contour).unwrap_or_else(|e| {
            log::error!("Unable to triangulate bed surface: {e}");
            RenderGeometry::empty(PrimitiveType::Triangles)
        });

        let collision_polygon = build_collision_polygon(contour, config.collision_margin())
            .unwrap_or_else(|e| {
                log::error!("Unable to build bed collision outline: {e}");
                contour.outer().to_vec()
            });

        let mut grid = grid_segments(contour, config.grid_spacing());
        grid.extend(contour_segments(contour));

        Self {
            fill,
            grid: RenderGeometry::from_lines(&grid, GROUND_Z),
            contour: build_contourlines(contour),
            collision_polygon,
        }
    }
}

/// Triangulated bed surface at the ground plane
pub fn build_fill(contour: &BedContour) -> Result<RenderGeometry> {
    let indices = triangulate_with_holes(contour.outer(), contour.holes())?;
    let points: Vec<Point2d> = contour.rings().flatten().copied().collect();
    Ok(RenderGeometry::from_triangles(
        &points,
        &indices,
        GROUND_Z,
        &contour.bounding_box(),
    ))
}

/// Grid line geometry, without the contour
pub fn build_gridlines(contour: &BedContour, spacing: f64) -> RenderGeometry {
    RenderGeometry::from_lines(&grid_segments(contour, spacing), GROUND_Z)
}

/// Contour line geometry: every ring as a closed loop
pub fn build_contourlines(contour: &BedContour) -> RenderGeometry {
    RenderGeometry::from_lines(&contour_segments(contour), GROUND_Z)
}

/// Collision outline: the outer ring grown by `margin`
pub fn build_collision_polygon(contour: &BedContour, margin: f64) -> Result<Vec<Point2d>> {
    if contour.is_empty() {
        return Ok(Vec::new());
    }
    if margin == 0.0 {
        return Ok(contour.outer().to_vec());
    }
    Ok(offset_ring(contour.outer(), margin)?)
}

/// Segments of every ring of the contour
pub fn contour_segments(contour: &BedContour) -> Vec<(Point2d, Point2d)> {
    contour
        .rings()
        .flat_map(|ring| {
            ring.iter()
                .zip(ring.iter().cycle().skip(1))
                .map(|(a, b)| (*a, *b))
        })
        .collect()
}

/// Interior spans of the regular grid
///
/// Vertical lines at `min.x + k * spacing` and horizontal lines at
/// `min.y + k * spacing` are intersected with every ring; crossings sorted
/// along the line alternate between entering and leaving the bed (even-odd),
/// so spans inside holes are dropped.
pub fn grid_segments(contour: &BedContour, spacing: f64) -> Vec<(Point2d, Point2d)> {
    let bbox = contour.bounding_box();
    if !bbox.has_area() || spacing <= 0.0 || !spacing.is_finite() {
        return Vec::new();
    }

    let size = bbox.size();
    let lines = (size.x / spacing).ceil() + (size.y / spacing).ceil();
    if !lines.is_finite() || lines > MAX_GRID_LINES as f64 {
        log::warn!(
            "Bed grid skipped: {:.0} x {:.0} mm at {} mm spacing exceeds {} lines",
            size.x,
            size.y,
            spacing,
            MAX_GRID_LINES
        );
        return Vec::new();
    }

    let mut segments = Vec::new();

    for x in grid_positions(bbox.min.x, bbox.max.x, spacing) {
        let mut ys = crossings(contour, x, |p| p.x, |p| p.y);
        ys.sort_by(f64::total_cmp);
        segments.extend(
            ys.chunks_exact(2)
                .map(|span| (Point2d::new(x, span[0]), Point2d::new(x, span[1]))),
        );
    }

    for y in grid_positions(bbox.min.y, bbox.max.y, spacing) {
        let mut xs = crossings(contour, y, |p| p.y, |p| p.x);
        xs.sort_by(f64::total_cmp);
        segments.extend(
            xs.chunks_exact(2)
                .map(|span| (Point2d::new(span[0], y), Point2d::new(span[1], y))),
        );
    }

    segments
}

/// Grid coordinates strictly inside `(min, max)`
fn grid_positions(min: f64, max: f64, spacing: f64) -> impl Iterator<Item = f64> {
    (1..)
        .map(move |k| min + k as f64 * spacing)
        .take_while(move |&v| v < max - GRID_EDGE_EPSILON)
        .filter(move |&v| v > min + GRID_EDGE_EPSILON)
}

/// Where the line `along(p) == value` crosses the contour edges, expressed in
/// the other coordinate
///
/// Uses the half-open rule so a vertex lying on the line is counted once.
fn crossings(
    contour: &BedContour,
    value: f64,
    along: impl Fn(&Point2d) -> f64,
    across: impl Fn(&Point2d) -> f64,
) -> Vec<f64> {
    let mut result = Vec::new();
    for ring in contour.rings() {
        for (a, b) in ring.iter().zip(ring.iter().cycle().skip(1)) {
            let (va, vb) = (along(a), along(b));
            if (va > value) != (vb > value) {
                let t = (value - va) / (vb - va);
                result.push(across(a) + t * (across(b) - across(a)));
            }
        }
    }
    result
}
