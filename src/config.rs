//! Configuration for bed geometry and asset handling

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::classifier::BedCatalog;

/// Default spacing of the bed grid lines, in millimetres
pub const DEFAULT_GRID_SPACING: f64 = 10.0;

/// Default outward margin of the collision outline, in millimetres
pub const DEFAULT_COLLISION_MARGIN: f64 = 10.0;

/// Default texture size limit passed to the asset loader
pub const DEFAULT_MAX_TEXTURE_SIZE: u32 = 4096;

/// Default vertical offset of the bed model, just below the textured surface
pub const DEFAULT_MODEL_Z_OFFSET: f64 = -0.03;

/// Configuration for a [`Bed3D`](crate::Bed3D)
///
/// # Example
///
/// ```
/// use bed3d::BedConfig;
///
/// let config = BedConfig::new()
///     .with_grid_spacing(5.0)
///     .with_collision_margin(2.0)
///     .with_resources_dir("/usr/share/slicer/profiles");
///
/// assert_eq!(config.grid_spacing(), 5.0);
/// ```
#[derive(Debug, Clone)]
pub struct BedConfig {
    grid_spacing: f64,
    collision_margin: f64,
    max_texture_size: u32,
    model_z_offset: f64,
    resources_dir: Option<PathBuf>,
    catalog: Arc<BedCatalog>,
}

impl BedConfig {
    /// Default configuration using the builtin catalog
    pub fn new() -> Self {
        Self {
            grid_spacing: DEFAULT_GRID_SPACING,
            collision_margin: DEFAULT_COLLISION_MARGIN,
            max_texture_size: DEFAULT_MAX_TEXTURE_SIZE,
            model_z_offset: DEFAULT_MODEL_Z_OFFSET,
            resources_dir: None,
            catalog: BedCatalog::builtin(),
        }
    }

    /// Set the grid spacing; non-positive values keep the default
    pub fn with_grid_spacing(mut self, spacing: f64) -> Self {
        if spacing > 0.0 && spacing.is_finite() {
            self.grid_spacing = spacing;
        }
        self
    }

    /// Set the collision outline margin; negative values are clamped to zero
    pub fn with_collision_margin(mut self, margin: f64) -> Self {
        if margin.is_finite() {
            self.collision_margin = margin.max(0.0);
        }
        self
    }

    /// Set the largest texture size requested from the loader
    pub fn with_max_texture_size(mut self, size: u32) -> Self {
        self.max_texture_size = size.max(1);
        self
    }

    /// Set the vertical offset applied to the bed model
    pub fn with_model_z_offset(mut self, offset: f64) -> Self {
        self.model_z_offset = offset;
        self
    }

    /// Directory that relative catalog asset names are resolved against
    pub fn with_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = Some(dir.into());
        self
    }

    /// Replace the catalog of known beds
    pub fn with_catalog(mut self, catalog: Arc<BedCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn grid_spacing(&self) -> f64 {
        self.grid_spacing
    }

    pub fn collision_margin(&self) -> f64 {
        self.collision_margin
    }

    pub fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    pub fn model_z_offset(&self) -> f64 {
        self.model_z_offset
    }

    pub fn resources_dir(&self) -> Option<&Path> {
        self.resources_dir.as_deref()
    }

    pub fn catalog(&self) -> &BedCatalog {
        &self.catalog
    }

    /// Resolve a catalog asset name to a path
    ///
    /// Empty names stay empty; absolute names and names without a resources
    /// directory are returned unchanged.
    pub fn resolve_asset(&self, name: &str) -> String {
        if name.is_empty() || Path::new(name).is_absolute() {
            return name.to_string();
        }
        match &self.resources_dir {
            Some(dir) => dir.join(name).to_string_lossy().into_owned(),
            None => name.to_string(),
        }
    }
}

impl Default for BedConfig {
    fn default() -> Self {
        Self::new()
    }
}
