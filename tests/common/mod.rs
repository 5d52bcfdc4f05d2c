//! Shared fakes for the integration tests
//!
//! `RecordingCanvas` keeps every draw call and picking registration it
//! receives. `ScriptedLoader` hands out tickets and answers polls from a
//! script the test fills in; it is shared through `Rc<RefCell<_>>` so the test
//! can keep driving it after handing a boxed clone to `Bed3D`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use bed3d::assets::{
    AssetLoader, AssetStatus, AssetTicket, LoadedTexture, TextureQuality, TextureRequest,
};
use bed3d::render::{
    BedLayer, Canvas, Color, DrawCall, PickingRegistry, RenderGeometry, RenderState, TextureId,
};
use bed3d::{Bed3D, BedConfig};
use nalgebra::Matrix4;

/// Initialise logging once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Owned copy of the interesting parts of a draw call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub layer: BedLayer,
    pub color: Color,
    pub texture: Option<TextureId>,
    pub svg_source: bool,
    pub transparent_background: bool,
    pub model_matrix: Matrix4<f64>,
    pub state: RenderState,
    pub index_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    Removed,
    Registered {
        index_count: usize,
        transform: Matrix4<f64>,
    },
}

#[derive(Debug, Default)]
pub struct RecordingRegistry {
    pub events: Vec<Registration>,
}

impl PickingRegistry for RecordingRegistry {
    fn remove_bed(&mut self) {
        self.events.push(Registration::Removed);
    }

    fn register_bed(&mut self, geometry: &RenderGeometry, transform: &Matrix4<f64>) {
        self.events.push(Registration::Registered {
            index_count: geometry.indices().len(),
            transform: *transform,
        });
    }
}

#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub draws: Vec<RecordedDraw>,
    pub registry: RecordingRegistry,
    pub extra_frames: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> Vec<BedLayer> {
        self.draws.iter().map(|d| d.layer).collect()
    }

    pub fn draws_of(&self, layer: BedLayer) -> Vec<&RecordedDraw> {
        self.draws.iter().filter(|d| d.layer == layer).collect()
    }

    pub fn clear(&mut self) {
        self.draws.clear();
        self.registry.events.clear();
        self.extra_frames = 0;
    }
}

impl Canvas for RecordingCanvas {
    fn draw(&mut self, call: &DrawCall<'_>) {
        self.draws.push(RecordedDraw {
            layer: call.layer,
            color: call.color,
            texture: call.texture,
            svg_source: call.svg_source,
            transparent_background: call.transparent_background,
            model_matrix: call.model_matrix,
            state: call.state,
            index_count: call.geometry.indices().len(),
        });
    }

    fn picking_registry(&mut self) -> &mut dyn PickingRegistry {
        &mut self.registry
    }

    fn request_extra_frame(&mut self) {
        self.extra_frames += 1;
    }
}

#[derive(Debug, Clone)]
pub enum Request {
    Texture(PathBuf, TextureRequest),
    Model(PathBuf),
}

#[derive(Debug, Default)]
pub struct LoaderScript {
    next: u64,
    pub requests: HashMap<AssetTicket, Request>,
    pub textures: HashMap<AssetTicket, AssetStatus<LoadedTexture>>,
    pub models: HashMap<AssetTicket, AssetStatus<RenderGeometry>>,
    pub released: Vec<AssetTicket>,
    pub polled: Vec<AssetTicket>,
}

impl LoaderScript {
    fn issue(&mut self, request: Request) -> AssetTicket {
        self.next += 1;
        let ticket = AssetTicket(self.next);
        self.requests.insert(ticket, request);
        ticket
    }

    /// Most recent live ticket of a texture request with `quality`
    pub fn texture_ticket(&self, quality: TextureQuality) -> Option<AssetTicket> {
        self.requests
            .iter()
            .filter(|(t, r)| {
                matches!(r, Request::Texture(_, req) if req.quality == quality)
                    && !self.released.contains(t)
            })
            .map(|(t, _)| *t)
            .max_by_key(|t| t.0)
    }

    /// Most recent live model ticket
    pub fn model_ticket(&self) -> Option<AssetTicket> {
        self.requests
            .iter()
            .filter(|(t, r)| matches!(r, Request::Model(_)) && !self.released.contains(t))
            .map(|(t, _)| *t)
            .max_by_key(|t| t.0)
    }

    pub fn live_tickets(&self) -> usize {
        self.requests
            .keys()
            .filter(|t| !self.released.contains(t))
            .count()
    }
}

/// Loader whose answers are scripted by the test
#[derive(Debug, Clone, Default)]
pub struct ScriptedLoader(pub Rc<RefCell<LoaderScript>>);

impl AssetLoader for ScriptedLoader {
    fn request_texture(&mut self, path: &Path, request: TextureRequest) -> AssetTicket {
        self.0
            .borrow_mut()
            .issue(Request::Texture(path.to_path_buf(), request))
    }

    fn poll_texture(&mut self, ticket: AssetTicket) -> AssetStatus<LoadedTexture> {
        let mut script = self.0.borrow_mut();
        script.polled.push(ticket);
        script
            .textures
            .get(&ticket)
            .cloned()
            .unwrap_or(AssetStatus::Pending)
    }

    fn request_model(&mut self, path: &Path) -> AssetTicket {
        self.0.borrow_mut().issue(Request::Model(path.to_path_buf()))
    }

    fn poll_model(&mut self, ticket: AssetTicket) -> AssetStatus<RenderGeometry> {
        let mut script = self.0.borrow_mut();
        script.polled.push(ticket);
        script
            .models
            .get(&ticket)
            .cloned()
            .unwrap_or(AssetStatus::Pending)
    }

    fn release(&mut self, ticket: AssetTicket) {
        self.0.borrow_mut().released.push(ticket);
    }
}

/// Bed wired to a scripted loader the test keeps a handle to
pub fn scripted_bed(config: BedConfig) -> (Bed3D, Rc<RefCell<LoaderScript>>) {
    let loader = ScriptedLoader::default();
    let script = Rc::clone(&loader.0);
    (Bed3D::new(config, Box::new(loader)), script)
}

pub fn ready_texture(id: u32, ready_levels: u32) -> AssetStatus<LoadedTexture> {
    AssetStatus::Ready(LoadedTexture {
        id: TextureId(id),
        ready_levels,
    })
}

/// A flat 10 x 10 square mesh centred on the origin
pub fn square_mesh() -> RenderGeometry {
    RenderGeometry::from_mesh(
        &[
            [-5.0, -5.0, -1.0],
            [5.0, -5.0, -1.0],
            [5.0, 5.0, 0.0],
            [-5.0, 5.0, 0.0],
        ],
        &[[0, 1, 2], [0, 2, 3]],
    )
}

/// Create a resources directory holding empty asset files with `names`
pub fn resources_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for name in names {
        std::fs::write(dir.path().join(name), b"").expect("Failed to write asset");
    }
    dir
}
