//! Error types for print bed operations
//!
//! Nothing in this crate is fatal to the host application: `Bed3D` catches
//! every error listed here, logs it and degrades to an empty geometry or a
//! missing asset. The types are public so that the lower-level helpers
//! (triangulation, clipping, catalog construction) can be used directly.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: Bed geometry errors
//! - **E2xxx**: Asset errors
//! - **E3xxx**: Catalog and configuration errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: Bed shape with fewer than three points
//! - `E1002`: Triangulation of the bed surface failed
//! - `E1003`: Offsetting or clipping the bed outline failed
//! - `E1004`: Bed shape with a NaN or infinite coordinate
//! - `E2001`: Asset path rejected before loading
//! - `E2002`: Asset loader reported a failure
//! - `E3001`: Invalid catalog entry

use thiserror::Error;

use crate::polygon_clipping::ClippingError;
use crate::polygon_triangulation::TriangulationError;

/// Result type for print bed operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or rendering a print bed
#[derive(Error, Debug)]
pub enum Error {
    /// Bed shape is degenerate
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - Printer profile with an empty or partially edited bed shape
    /// - A shape collapsed to a line or a single point
    #[error("[E1001] Invalid bed shape: {0} point(s), at least 3 required")]
    InvalidShape(usize),

    /// Bed shape has a NaN or infinite coordinate
    ///
    /// **Error Code**: E1004
    #[error("[E1004] Invalid bed shape: point {0} has a non-finite coordinate")]
    NonFiniteShape(usize),

    /// Bed surface triangulation failed
    ///
    /// **Error Code**: E1002
    #[error("[E1002] Triangulation error: {0}")]
    Triangulation(#[from] TriangulationError),

    /// Bed outline offsetting failed
    ///
    /// **Error Code**: E1003
    #[error("[E1003] Clipping error: {0}")]
    Clipping(#[from] ClippingError),

    /// Asset path rejected before a load was requested
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - File does not exist
    /// - Unsupported extension (textures: `.svg`, `.png`; models: `.stl`)
    #[error("[E2001] Invalid asset path '{path}': {reason}")]
    InvalidAssetPath {
        /// The rejected path
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// Asset loader failed to produce the asset
    ///
    /// **Error Code**: E2002
    #[error("[E2002] Failed to load asset '{path}': {message}")]
    AssetLoad {
        /// Path of the asset
        path: String,
        /// Loader supplied message
        message: String,
    },

    /// Catalog entry is malformed
    ///
    /// **Error Code**: E3001
    #[error("[E3001] Invalid catalog entry '{0}': outline needs at least 3 points")]
    InvalidCatalogEntry(String),
}

impl Error {
    /// Create an invalid asset path error
    pub fn invalid_asset_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidAssetPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an asset load error
    pub fn asset_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::AssetLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}
