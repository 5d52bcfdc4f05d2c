//! # bed3d
//!
//! The print bed of a 3D-printing slicer scene.
//!
//! This library turns a configured bed polygon into everything a slicer needs
//! to show and reason about its print bed:
//!
//! - Classification of the outline as a known printer bed (with bundled
//!   texture and 3D model) or a custom bed drawn procedurally
//! - GPU-ready geometry for the bed surface, grid lines and contour
//! - Progressive loading of the bed texture and model through a host supplied
//!   loader, with a low resolution placeholder while the texture loads
//! - Draw calls for display and for object picking, emitted to a host canvas
//! - Fast containment and projection queries against a slightly enlarged
//!   collision outline
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - No graphics API dependency: geometry is exposed as `bytemuck` buffers and
//!   draws as plain [`render::DrawCall`] values
//!
//! ## Example
//!
//! ```
//! use bed3d::{BedCatalog, BedShape, BuildVolume, classify};
//! use bed3d::geometry::Point2d;
//!
//! let shape = BedShape::rectangle(Point2d::origin(), 250.0, 210.0);
//! let classification = classify(&shape, &BedCatalog::builtin(), false);
//! println!("Bed type: {:?}", classification.bed_type);
//!
//! let volume = BuildVolume::new(shape, 210.0);
//! assert!(volume.contains_2d(&Point2d::new(125.0, 105.0)));
//! ```

#![forbid(unsafe_code)]

pub mod assets;
pub mod axes;
pub mod bed;
pub mod build_volume;
pub mod classifier;
pub mod config;
pub mod contour;
pub mod error;
pub mod geometry;
pub mod geometry_builder;
pub mod polygon_clipping;
pub mod polygon_triangulation;
pub mod render;

pub use assets::{AssetLoader, AssetManager, AssetStatus, AssetTicket};
pub use axes::AxesIndicator;
pub use bed::{Bed3D, BedState};
pub use build_volume::BuildVolume;
pub use classifier::{BedCatalog, BedType, CatalogEntry, Classification, classify};
pub use config::BedConfig;
pub use contour::BedContour;
pub use error::{Error, Result};
pub use geometry::{BedShape, BoundingBox2, BoundingBox3};
pub use geometry_builder::BedGeometry;
pub use render::{Canvas, DrawCall, PickingRegistry, RenderGeometry};
