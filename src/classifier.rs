//! Bed shape classification against a catalog of known printer beds
//!
//! A bed whose outline matches a catalog entry is a *system* bed and is
//! rendered with the texture and 3D model bundled for that printer. Anything
//! else is a *custom* bed drawn procedurally from its polygon.
//!
//! Matching is translation invariant: both outlines are moved so that their
//! bounding-box minimum sits at the origin before the points are compared.
//! The start vertex may differ (any cyclic rotation matches) but the winding
//! order must be the same.

use std::sync::{Arc, LazyLock};

use crate::error::{Error, Result};
use crate::geometry::{BedShape, Point2d};

/// Default per-coordinate tolerance for outline matching, in millimetres
pub const DEFAULT_MATCH_TOLERANCE: f64 = 1e-3;

/// Origin of the bed rendering assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BedType {
    /// Bed model and texture come from a known printer
    System,
    /// Bed is unknown and rendered procedurally
    #[default]
    Custom,
}

/// A known printer bed
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    name: String,
    outline: Vec<Point2d>,
    texture: String,
    model: String,
}

impl CatalogEntry {
    /// Create a catalog entry; the outline is normalised to the origin
    ///
    /// `texture` and `model` are asset names, either may be empty.
    pub fn new(
        name: impl Into<String>,
        outline: &[(f64, f64)],
        texture: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if outline.len() < 3 {
            return Err(Error::InvalidCatalogEntry(name));
        }
        let points: Vec<Point2d> = outline.iter().map(|&(x, y)| Point2d::new(x, y)).collect();
        Ok(Self {
            name,
            outline: normalize(&points),
            texture: texture.into(),
            model: model.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outline(&self) -> &[Point2d] {
        &self.outline
    }

    pub fn texture(&self) -> &str {
        &self.texture
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Immutable table of known printer beds
#[derive(Debug, Clone, PartialEq)]
pub struct BedCatalog {
    entries: Vec<CatalogEntry>,
    tolerance: f64,
}

static BUILTIN_CATALOG: LazyLock<Arc<BedCatalog>> = LazyLock::new(|| {
    let entries = [
        ("MK3", 250.0, 210.0, "mk3.svg", "mk3_bed.stl"),
        ("MINI", 180.0, 180.0, "mini.svg", "mini_bed.stl"),
        ("XL", 360.0, 360.0, "xl.svg", "xl_bed.stl"),
        ("ENDER3", 235.0, 235.0, "ender3.png", ""),
    ]
    .into_iter()
    .filter_map(|(name, width, depth, texture, model)| {
        let outline = [(0.0, 0.0), (width, 0.0), (width, depth), (0.0, depth)];
        CatalogEntry::new(name, &outline, texture, model).ok()
    })
    .collect();

    Arc::new(BedCatalog::new(entries))
});

impl BedCatalog {
    /// Catalog with the default matching tolerance
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            tolerance: DEFAULT_MATCH_TOLERANCE,
        }
    }

    /// Catalog without entries; every bed classifies as custom
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// The catalog shipped with the crate
    pub fn builtin() -> Arc<BedCatalog> {
        Arc::clone(&BUILTIN_CATALOG)
    }

    /// Set the per-coordinate matching tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// First entry whose outline matches `shape`
    pub fn find(&self, shape: &BedShape) -> Option<&CatalogEntry> {
        if shape.is_degenerate() {
            return None;
        }
        let normalized = normalize(shape.points());
        self.entries
            .iter()
            .find(|entry| outlines_match(&normalized, &entry.outline, self.tolerance))
    }
}

/// Outcome of classifying a bed shape
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    pub bed_type: BedType,
    /// Texture asset name, empty when none
    pub texture: String,
    /// Model asset name, empty when none
    pub model: String,
}

impl Classification {
    fn custom() -> Self {
        Self::default()
    }
}

/// Classify `shape` against `catalog`
///
/// `force_custom` skips the lookup: the bed is custom and carries no assets
/// even if its outline is known.
///
/// # Example
///
/// ```
/// use bed3d::{classify, BedCatalog, BedShape, BedType};
///
/// let mk3 = BedShape::from_xy(&[(0.0, 0.0), (250.0, 0.0), (250.0, 210.0), (0.0, 210.0)]);
/// let result = classify(&mk3, &BedCatalog::builtin(), false);
/// assert_eq!(result.bed_type, BedType::System);
/// assert_eq!(result.texture, "mk3.svg");
///
/// let forced = classify(&mk3, &BedCatalog::builtin(), true);
/// assert_eq!(forced.bed_type, BedType::Custom);
/// assert!(forced.texture.is_empty());
/// ```
pub fn classify(shape: &BedShape, catalog: &BedCatalog, force_custom: bool) -> Classification {
    if force_custom {
        return Classification::custom();
    }
    match catalog.find(shape) {
        Some(entry) => Classification {
            bed_type: BedType::System,
            texture: entry.texture.clone(),
            model: entry.model.clone(),
        },
        None => Classification::custom(),
    }
}

/// Translate points so that their bounding-box minimum is the origin
fn normalize(points: &[Point2d]) -> Vec<Point2d> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    let min = points.iter().fold(*first, |acc, p| acc.inf(p));
    points.iter().map(|p| Point2d::from(p - min)).collect()
}

fn outlines_match(a: &[Point2d], b: &[Point2d], tolerance: f64) -> bool {
    if a.len() != b.len() || a.is_empty() {
        return false;
    }
    let close = |p: &Point2d, q: &Point2d| {
        (p.x - q.x).abs() <= tolerance && (p.y - q.y).abs() <= tolerance
    };
    (0..b.len()).any(|shift| {
        a.iter()
            .enumerate()
            .all(|(i, p)| close(p, &b[(i + shift) % b.len()]))
    })
}
