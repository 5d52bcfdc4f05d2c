//! Bed texture and model asset tracking
//!
//! Decoding images and meshes is the host's business, done through the
//! [`AssetLoader`] trait. This module decides which assets to request, keeps
//! the tickets of the current requests, and polls them once per frame:
//!
//! - A texture request starts two loads: a low resolution placeholder that
//!   is quick to produce, and the final compressed, mip-mapped texture.
//!   The placeholder is shown until the final texture has at least one ready
//!   level, then it is released for good.
//! - A model request starts one load; until it is ready the bed is drawn
//!   without it.
//! - A failed load degrades to "no asset" and is logged once.
//!
//! Replacing a request releases the previous tickets, so results of stale
//! loads are never observed.

use std::path::Path;

use crate::error::{Error, Result};
use crate::render::{RenderGeometry, TextureId};

/// Handle of an in-flight or completed load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetTicket(pub u64);

/// Result of polling a load
#[derive(Debug, Clone, PartialEq)]
pub enum AssetStatus<T> {
    /// Still loading
    Pending,
    /// Loaded
    Ready(T),
    /// Failed for good
    Failed(String),
}

/// Quality of a requested texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureQuality {
    /// Uncompressed, no mipmaps, available quickly
    Preview,
    /// Compressed with mipmaps; levels become ready over several frames
    Full,
}

/// Parameters of a texture load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRequest {
    pub quality: TextureQuality,
    /// Largest dimension of the rasterised texture
    pub max_size: u32,
}

/// A texture known to the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedTexture {
    pub id: TextureId,
    /// Number of mipmap levels already uploaded
    pub ready_levels: u32,
}

impl LoadedTexture {
    /// At least one level can be sampled
    pub fn is_usable(&self) -> bool {
        self.ready_levels > 0
    }
}

/// Asset loading backend supplied by the host
///
/// Requests return immediately; results are collected by polling. Polling a
/// released ticket is a caller bug and loaders may return `Failed`.
pub trait AssetLoader {
    /// Start loading a texture
    fn request_texture(&mut self, path: &Path, request: TextureRequest) -> AssetTicket;

    /// Current state of a texture load
    fn poll_texture(&mut self, ticket: AssetTicket) -> AssetStatus<LoadedTexture>;

    /// Start loading a bed model mesh
    fn request_model(&mut self, path: &Path) -> AssetTicket;

    /// Current state of a model load
    fn poll_model(&mut self, ticket: AssetTicket) -> AssetStatus<RenderGeometry>;

    /// Cancel the load or free the loaded asset
    fn release(&mut self, ticket: AssetTicket);
}

fn has_extension(path: &str, extensions: &[&str]) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

fn validate_path(path: &str, extensions: &[&str]) -> Result<()> {
    if !has_extension(path, extensions) {
        return Err(Error::invalid_asset_path(
            path,
            format!("unsupported extension, expected one of {:?}", extensions),
        ));
    }
    if !Path::new(path).exists() {
        return Err(Error::invalid_asset_path(path, "file not found"));
    }
    Ok(())
}

/// Check that a texture path names an existing `.svg` or `.png` file
pub fn validate_texture_path(path: &str) -> Result<()> {
    validate_path(path, &["svg", "png"])
}

/// Check that a model path names an existing `.stl` file
pub fn validate_model_path(path: &str) -> Result<()> {
    validate_path(path, &["stl"])
}

#[derive(Debug, Default)]
struct TextureState {
    source: String,
    final_ticket: Option<AssetTicket>,
    final_texture: Option<LoadedTexture>,
    placeholder_ticket: Option<AssetTicket>,
    placeholder: Option<LoadedTexture>,
    failed: bool,
}

impl TextureState {
    fn release(&mut self, loader: &mut dyn AssetLoader) {
        for ticket in [self.final_ticket.take(), self.placeholder_ticket.take()]
            .into_iter()
            .flatten()
        {
            loader.release(ticket);
        }
        *self = Self::default();
    }

    fn release_placeholder(&mut self, loader: &mut dyn AssetLoader) {
        if let Some(ticket) = self.placeholder_ticket.take() {
            loader.release(ticket);
        }
        self.placeholder = None;
    }

    fn has_usable_final(&self) -> bool {
        self.final_texture.is_some_and(|t| t.is_usable())
    }
}

#[derive(Debug, Default)]
struct ModelState {
    source: String,
    ticket: Option<AssetTicket>,
    mesh: Option<RenderGeometry>,
    failed: bool,
}

impl ModelState {
    fn release(&mut self, loader: &mut dyn AssetLoader) {
        if let Some(ticket) = self.ticket.take() {
            loader.release(ticket);
        }
        *self = Self::default();
    }
}

/// What changed during a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollOutcome {
    /// A different texture (or none) should be shown from now on
    pub texture_changed: bool,
    /// The model mesh became available
    pub model_loaded: bool,
}

/// Tracks the bed texture and model requests
#[derive(Debug, Default)]
pub struct AssetManager {
    texture: TextureState,
    model: ModelState,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `path` as the bed texture; an empty path clears it
    ///
    /// Requesting the current source again keeps the existing loads.
    pub fn request_texture(&mut self, loader: &mut dyn AssetLoader, path: &str, max_size: u32) {
        if path == self.texture.source && !path.is_empty() {
            return;
        }
        self.texture.release(loader);
        if path.is_empty() {
            return;
        }

        let file = Path::new(path);
        self.texture.source = path.to_string();
        self.texture.placeholder_ticket = Some(loader.request_texture(
            file,
            TextureRequest {
                quality: TextureQuality::Preview,
                max_size: (max_size / 8).max(1),
            },
        ));
        self.texture.final_ticket = Some(loader.request_texture(
            file,
            TextureRequest {
                quality: TextureQuality::Full,
                max_size,
            },
        ));
        log::debug!("Requested bed texture {path}");
    }

    /// Request `path` as the bed model; an empty path clears it
    pub fn request_model(&mut self, loader: &mut dyn AssetLoader, path: &str) {
        if path == self.model.source && !path.is_empty() {
            return;
        }
        self.model.release(loader);
        if path.is_empty() {
            return;
        }

        self.model.source = path.to_string();
        self.model.ticket = Some(loader.request_model(Path::new(path)));
        log::debug!("Requested bed model {path}");
    }

    /// Release every asset
    pub fn release_all(&mut self, loader: &mut dyn AssetLoader) {
        self.texture.release(loader);
        self.model.release(loader);
    }

    /// Collect finished loads
    pub fn poll(&mut self, loader: &mut dyn AssetLoader) -> PollOutcome {
        PollOutcome {
            texture_changed: self.poll_texture(loader),
            model_loaded: self.poll_model(loader),
        }
    }

    fn poll_texture(&mut self, loader: &mut dyn AssetLoader) -> bool {
        let state = &mut self.texture;
        if state.failed || state.has_usable_final() {
            return false;
        }
        let Some(final_ticket) = state.final_ticket else {
            return false;
        };

        let mut changed = false;
        match loader.poll_texture(final_ticket) {
            AssetStatus::Pending => {}
            AssetStatus::Ready(texture) => {
                state.final_texture = Some(texture);
                if texture.is_usable() {
                    state.release_placeholder(loader);
                    return true;
                }
            }
            AssetStatus::Failed(message) => {
                log::warn!("{}", Error::asset_load(&state.source, message));
                let source = std::mem::take(&mut state.source);
                state.release(loader);
                state.source = source;
                state.failed = true;
                return true;
            }
        }

        if state.placeholder.is_none()
            && let Some(ticket) = state.placeholder_ticket
        {
            match loader.poll_texture(ticket) {
                AssetStatus::Pending => {}
                AssetStatus::Ready(texture) => {
                    state.placeholder = Some(texture);
                    changed = true;
                }
                AssetStatus::Failed(message) => {
                    log::warn!("{}", Error::asset_load(&state.source, message));
                    state.release_placeholder(loader);
                }
            }
        }
        changed
    }

    fn poll_model(&mut self, loader: &mut dyn AssetLoader) -> bool {
        let state = &mut self.model;
        if state.failed || state.mesh.is_some() {
            return false;
        }
        let Some(ticket) = state.ticket else {
            return false;
        };

        match loader.poll_model(ticket) {
            AssetStatus::Pending => false,
            AssetStatus::Ready(mesh) => {
                state.mesh = Some(mesh);
                true
            }
            AssetStatus::Failed(message) => {
                log::warn!("{}", Error::asset_load(&state.source, message));
                if let Some(ticket) = state.ticket.take() {
                    loader.release(ticket);
                }
                state.failed = true;
                false
            }
        }
    }

    /// Texture to bind: the final one once usable, otherwise the placeholder
    pub fn current_texture(&self) -> Option<TextureId> {
        if let Some(texture) = self.texture.final_texture.filter(|t| t.is_usable()) {
            return Some(texture.id);
        }
        self.texture.placeholder.map(|t| t.id)
    }

    /// Placeholder still in use
    pub fn has_placeholder(&self) -> bool {
        self.texture.placeholder.is_some() || self.texture.placeholder_ticket.is_some()
    }

    /// Requested texture path, empty when none
    pub fn texture_source(&self) -> &str {
        &self.texture.source
    }

    /// Texture source is an SVG drawing
    pub fn texture_is_svg(&self) -> bool {
        has_extension(&self.texture.source, &["svg"])
    }

    /// Texture load failed for the current source
    pub fn texture_failed(&self) -> bool {
        self.texture.failed
    }

    /// Requested model path, empty when none
    pub fn model_source(&self) -> &str {
        &self.model.source
    }

    /// Model mesh, once loaded
    pub fn model(&self) -> Option<&RenderGeometry> {
        self.model.mesh.as_ref()
    }

    /// Model load failed for the current source
    pub fn model_failed(&self) -> bool {
        self.model.failed
    }
}
