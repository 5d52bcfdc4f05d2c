//! The print bed: shape, assets, queries and rendering
//!
//! [`Bed3D`] owns everything derived from the configured bed polygon. A call
//! to [`Bed3D::set_shape`] rebuilds it; the render entry points are called
//! once per frame and only read that state, apart from collecting finished
//! asset loads.

use nalgebra::{Matrix4, Translation3, Vector3};

use crate::assets::{AssetLoader, AssetManager, validate_model_path, validate_texture_path};
use crate::axes::{AXIS_COLORS, AxesIndicator};
use crate::build_volume::BuildVolume;
use crate::classifier::{BedType, classify};
use crate::config::BedConfig;
use crate::contour::BedContour;
use crate::error::Result;
use crate::geometry::{BedShape, BoundingBox3, GROUND_Z, Point2d, Point3d};
use crate::geometry_builder::BedGeometry;
use crate::polygon_clipping::{closest_point_on_ring, point_in_ring};
use crate::render::{
    BedLayer, Canvas, Color, DEFAULT_CONTOUR_COLOR, DEFAULT_MODEL_COLOR, DEFAULT_SOLID_GRID_COLOR,
    DEFAULT_TRANSPARENT_GRID_COLOR, DrawCall, FrontFace, PICKING_MODEL_COLOR, RenderGeometry,
    RenderState, ShaderKind,
};

/// Tint applied to the textured surface
const TEXTURE_TINT: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Grid line width relative to the display scale
const GRID_LINE_WIDTH: f32 = 1.5;

/// Contour line width relative to the display scale
const CONTOUR_LINE_WIDTH: f32 = 1.0;

/// Lifecycle of a [`Bed3D`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BedState {
    /// No shape applied yet; renders nothing, queries see an empty bed
    #[default]
    Uninitialized,
    /// A shape has been applied
    Shaped,
}

/// Per-frame render inputs
#[derive(Clone, Copy)]
struct Frame<'a> {
    view: &'a Matrix4<f64>,
    projection: &'a Matrix4<f64>,
    bottom: bool,
    scale: f32,
    show_texture: bool,
    picking: bool,
}

impl<'a> Frame<'a> {
    fn call<'g>(
        &self,
        layer: BedLayer,
        geometry: &'g RenderGeometry,
        shader: ShaderKind,
        color: Color,
    ) -> DrawCall<'g>
    where
        'a: 'g,
    {
        DrawCall {
            layer,
            geometry,
            shader,
            color,
            texture: None,
            svg_source: false,
            transparent_background: false,
            model_matrix: Matrix4::identity(),
            view_matrix: self.view,
            projection_matrix: self.projection,
            state: RenderState::default(),
        }
    }
}

/// The print bed of a slicer scene
///
/// # Example
///
/// ```
/// use bed3d::{Bed3D, BedConfig, BedShape, BedType};
/// use bed3d::assets::{AssetLoader, AssetStatus, AssetTicket, LoadedTexture, TextureRequest};
/// use bed3d::render::RenderGeometry;
/// use bed3d::geometry::Point2d;
/// use std::path::Path;
///
/// struct NoAssets;
///
/// impl AssetLoader for NoAssets {
///     fn request_texture(&mut self, _: &Path, _: TextureRequest) -> AssetTicket {
///         AssetTicket(0)
///     }
///     fn poll_texture(&mut self, _: AssetTicket) -> AssetStatus<LoadedTexture> {
///         AssetStatus::Pending
///     }
///     fn request_model(&mut self, _: &Path) -> AssetTicket {
///         AssetTicket(0)
///     }
///     fn poll_model(&mut self, _: AssetTicket) -> AssetStatus<RenderGeometry> {
///         AssetStatus::Pending
///     }
///     fn release(&mut self, _: AssetTicket) {}
/// }
///
/// let mut bed = Bed3D::new(BedConfig::new(), Box::new(NoAssets));
/// let shape = BedShape::rectangle(Point2d::origin(), 200.0, 200.0);
///
/// assert!(bed.set_shape(&shape, 180.0, "", "", false));
/// assert_eq!(bed.bed_type(), BedType::Custom);
/// assert!(bed.contains(&Point2d::new(100.0, 100.0)));
/// assert!(!bed.contains(&Point2d::new(300.0, 100.0)));
/// ```
pub struct Bed3D {
    config: BedConfig,
    loader: Box<dyn AssetLoader>,
    state: BedState,
    build_volume: BuildVolume,
    bed_type: BedType,
    contour: BedContour,
    geometry: BedGeometry,
    assets: AssetManager,
    model_offset: Vector3<f64>,
    axes: AxesIndicator,
    extended_bounding_box: BoundingBox3,
    picking_dirty: bool,
}

impl Bed3D {
    /// Create an uninitialized bed
    pub fn new(config: BedConfig, loader: Box<dyn AssetLoader>) -> Self {
        Self {
            config,
            loader,
            state: BedState::Uninitialized,
            build_volume: BuildVolume::default(),
            bed_type: BedType::Custom,
            contour: BedContour::default(),
            geometry: BedGeometry::default(),
            assets: AssetManager::new(),
            model_offset: Vector3::zeros(),
            axes: AxesIndicator::new(),
            extended_bounding_box: BoundingBox3::default(),
            picking_dirty: false,
        }
    }

    /// Apply a bed shape, print height and optional custom assets
    ///
    /// Non-empty `custom_texture` / `custom_model` paths take precedence over
    /// the catalog assets of a recognised bed. `force_custom` makes the bed
    /// custom even if its outline is in the catalog.
    ///
    /// Returns `true` when the bed was rebuilt. When shape, type and assets
    /// are unchanged the bed is kept as is and `false` is returned, even if
    /// `max_print_height` differs; the new height is still applied to the
    /// build volume.
    pub fn set_shape(
        &mut self,
        shape: &BedShape,
        max_print_height: f64,
        custom_texture: &str,
        custom_model: &str,
        force_custom: bool,
    ) -> bool {
        if let Err(e) = shape.validate() {
            log::warn!("{e}");
        }
        let degenerate = shape.is_degenerate();

        let classification = classify(shape, self.config.catalog(), force_custom);
        let (texture, model) = if degenerate {
            (String::new(), String::new())
        } else {
            let texture = pick_asset(custom_texture, &classification.texture, &self.config);
            let model = pick_asset(custom_model, &classification.model, &self.config);
            (
                checked_asset(texture, validate_texture_path),
                checked_asset(model, validate_model_path),
            )
        };

        if self.state == BedState::Shaped
            && self.build_volume.bed_shape() == shape
            && self.bed_type == classification.bed_type
            && self.assets.texture_source() == texture
            && self.assets.model_source() == model
        {
            let height = BuildVolume::clamp_height(max_print_height);
            if self.build_volume.max_print_height() != height {
                self.build_volume = BuildVolume::new(shape.clone(), max_print_height);
                self.update_axes();
                self.update_extended_bounding_box();
            }
            return false;
        }

        let contour = BedContour::from_shape(shape);
        let geometry = BedGeometry::build(&contour, &self.config);

        self.build_volume = BuildVolume::new(shape.clone(), max_print_height);
        self.bed_type = classification.bed_type;
        self.contour = contour;
        self.geometry = geometry;

        self.assets.request_texture(
            self.loader.as_mut(),
            &texture,
            self.config.max_texture_size(),
        );
        self.assets.request_model(self.loader.as_mut(), &model);

        let center = self.build_volume.bounding_volume2d().center();
        self.model_offset = Vector3::new(center.x, center.y, self.config.model_z_offset());
        self.picking_dirty = true;

        self.update_axes();
        self.update_extended_bounding_box();
        self.state = BedState::Shaped;

        log::debug!(
            "Bed shape set: {} points, {:?}, texture '{}', model '{}'",
            shape.len(),
            self.bed_type,
            texture,
            model
        );
        true
    }

    pub fn state(&self) -> BedState {
        self.state
    }

    pub fn config(&self) -> &BedConfig {
        &self.config
    }

    pub fn build_volume(&self) -> &BuildVolume {
        &self.build_volume
    }

    pub fn bed_type(&self) -> BedType {
        self.bed_type
    }

    /// Same as [`bed_type`](Self::bed_type)
    pub fn get_type(&self) -> BedType {
        self.bed_type
    }

    pub fn is_custom(&self) -> bool {
        self.bed_type == BedType::Custom
    }

    /// Box enclosing the bed footprint, the axes and the offset model
    pub fn extended_bounding_box(&self) -> &BoundingBox3 {
        &self.extended_bounding_box
    }

    pub fn contour(&self) -> &BedContour {
        &self.contour
    }

    pub fn geometry(&self) -> &BedGeometry {
        &self.geometry
    }

    /// Outline used by [`contains`](Self::contains) and
    /// [`point_projection`](Self::point_projection)
    pub fn collision_polygon(&self) -> &[Point2d] {
        &self.geometry.collision_polygon
    }

    pub fn axes(&self) -> &AxesIndicator {
        &self.axes
    }

    /// Texture being shown or loaded, empty when none
    pub fn texture_source(&self) -> &str {
        self.assets.texture_source()
    }

    /// Model being shown or loaded, empty when none
    pub fn model_source(&self) -> &str {
        self.assets.model_source()
    }

    /// Translation applied to the bed model
    pub fn model_offset(&self) -> &Vector3<f64> {
        &self.model_offset
    }

    /// Fast containment test against the collision outline
    ///
    /// The outline is slightly larger than the bed; use
    /// [`BuildVolume::contains`] for exact tests.
    pub fn contains(&self, point: &Point2d) -> bool {
        let polygon = self.collision_polygon();
        !polygon.is_empty() && point_in_ring(point, polygon)
    }

    /// Closest point on the collision outline for points outside it
    ///
    /// Points inside, and any point while the outline is empty, are returned
    /// unchanged. Callers that need the boundary point for an interior point
    /// should use [`closest_point_on_ring`] on
    /// [`collision_polygon`](Self::collision_polygon) directly.
    pub fn point_projection(&self, point: &Point2d) -> Point2d {
        if self.collision_polygon().is_empty() || self.contains(point) {
            return *point;
        }
        closest_point_on_ring(point, self.collision_polygon()).unwrap_or(*point)
    }

    /// Draw the bed
    ///
    /// `bottom` is set when the camera looks at the bed from below. `scale` is
    /// the display scale factor applied to line widths.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        canvas: &mut dyn Canvas,
        view: &Matrix4<f64>,
        projection: &Matrix4<f64>,
        bottom: bool,
        scale: f32,
        show_axes: bool,
        show_texture: bool,
    ) {
        let frame = Frame {
            view,
            projection,
            bottom,
            scale,
            show_texture,
            picking: false,
        };
        self.render_internal(canvas, &frame, show_axes);
    }

    /// Draw the bed into the picking buffer and refresh its hit-test volumes
    pub fn render_for_picking(
        &mut self,
        canvas: &mut dyn Canvas,
        view: &Matrix4<f64>,
        projection: &Matrix4<f64>,
        bottom: bool,
        scale: f32,
    ) {
        let frame = Frame {
            view,
            projection,
            bottom,
            scale,
            show_texture: false,
            picking: true,
        };
        self.render_internal(canvas, &frame, false);
    }

    fn render_internal(&mut self, canvas: &mut dyn Canvas, frame: &Frame<'_>, show_axes: bool) {
        if self.state == BedState::Uninitialized {
            return;
        }

        let outcome = self.assets.poll(self.loader.as_mut());
        if outcome.model_loaded {
            self.update_extended_bounding_box();
            self.picking_dirty = true;
        }
        if outcome.texture_changed {
            canvas.request_extra_frame();
        }

        if frame.picking {
            self.refresh_picking(canvas);
            self.render_picking(canvas, frame);
            return;
        }

        if self.has_assets() {
            self.render_with_assets(canvas, frame);
        } else {
            self.render_default(canvas, frame);
        }

        if show_axes {
            self.render_axes(canvas, frame);
        }
    }

    /// Bed has a texture or model to show, from the catalog or custom paths
    fn has_assets(&self) -> bool {
        !self.assets.texture_source().is_empty() || !self.assets.model_source().is_empty()
    }

    /// Model mesh when it is ready and the bed is seen from above
    fn visible_model(&self, bottom: bool) -> Option<&RenderGeometry> {
        if bottom { None } else { self.assets.model() }
    }

    fn model_matrix(&self) -> Matrix4<f64> {
        Translation3::from(self.model_offset).to_homogeneous()
    }

    fn refresh_picking(&mut self, canvas: &mut dyn Canvas) {
        if !self.picking_dirty {
            return;
        }
        let registry = canvas.picking_registry();
        registry.remove_bed();
        if !self.geometry.fill.is_empty() {
            registry.register_bed(&self.geometry.fill, &Matrix4::identity());
        }
        if let Some(model) = self.assets.model() {
            registry.register_bed(model, &self.model_matrix());
        }
        self.picking_dirty = false;
    }

    fn render_picking(&self, canvas: &mut dyn Canvas, frame: &Frame<'_>) {
        if let Some(model) = self.visible_model(frame.bottom) {
            let mut call = frame.call(BedLayer::Model, model, ShaderKind::Flat, PICKING_MODEL_COLOR);
            call.model_matrix = self.model_matrix();
            canvas.draw(&call);
        }
        if !self.geometry.fill.is_empty() {
            let call = frame.call(
                BedLayer::Fill,
                &self.geometry.fill,
                ShaderKind::Flat,
                PICKING_MODEL_COLOR,
            );
            canvas.draw(&call);
        }
    }

    fn render_with_assets(&self, canvas: &mut dyn Canvas, frame: &Frame<'_>) {
        let model = self.visible_model(frame.bottom);
        if let Some(model) = model {
            let mut call =
                frame.call(BedLayer::Model, model, ShaderKind::Gouraud, DEFAULT_MODEL_COLOR);
            call.model_matrix = self.model_matrix();
            canvas.draw(&call);
        }

        if frame.show_texture {
            self.render_texture(canvas, frame);
        } else if frame.bottom {
            self.render_contour(canvas, frame);
        } else if model.is_none() {
            self.render_default(canvas, frame);
        }
    }

    fn render_texture(&self, canvas: &mut dyn Canvas, frame: &Frame<'_>) {
        let Some(texture) = self.assets.current_texture() else {
            self.render_default(canvas, frame);
            return;
        };
        if self.geometry.fill.is_empty() {
            return;
        }

        let mut call = frame.call(
            BedLayer::Texture,
            &self.geometry.fill,
            ShaderKind::PrintBed,
            TEXTURE_TINT,
        );
        call.texture = Some(texture);
        call.svg_source = self.assets.texture_is_svg();
        call.transparent_background = frame.bottom;
        call.state = RenderState {
            blend: true,
            depth_write: !frame.bottom,
            front_face: if frame.bottom {
                FrontFace::Clockwise
            } else {
                FrontFace::CounterClockwise
            },
            ..RenderState::default()
        };
        canvas.draw(&call);
    }

    /// Procedural surface: fill, then grid or contour
    fn render_default(&self, canvas: &mut dyn Canvas, frame: &Frame<'_>) {
        let model_shown = self.visible_model(frame.bottom).is_some();

        if !model_shown && !frame.bottom && !self.geometry.fill.is_empty() {
            let mut call = frame.call(
                BedLayer::Fill,
                &self.geometry.fill,
                ShaderKind::Flat,
                DEFAULT_MODEL_COLOR,
            );
            call.state.depth_write = false;
            canvas.draw(&call);
        }

        if frame.show_texture {
            if self.geometry.grid.is_empty() {
                return;
            }
            let color = if model_shown {
                DEFAULT_SOLID_GRID_COLOR
            } else {
                DEFAULT_TRANSPARENT_GRID_COLOR
            };
            let mut call = frame.call(BedLayer::Grid, &self.geometry.grid, ShaderKind::Flat, color);
            call.state.blend = true;
            call.state.line_width = GRID_LINE_WIDTH * frame.scale;
            canvas.draw(&call);
        } else {
            self.render_contour(canvas, frame);
        }
    }

    fn render_contour(&self, canvas: &mut dyn Canvas, frame: &Frame<'_>) {
        if self.geometry.contour.is_empty() {
            return;
        }
        let mut call = frame.call(
            BedLayer::Contour,
            &self.geometry.contour,
            ShaderKind::Flat,
            DEFAULT_CONTOUR_COLOR,
        );
        call.state.blend = true;
        call.state.line_width = CONTOUR_LINE_WIDTH * frame.scale;
        canvas.draw(&call);
    }

    fn render_axes(&self, canvas: &mut dyn Canvas, frame: &Frame<'_>) {
        for (index, color) in AXIS_COLORS.iter().enumerate() {
            if let Some(geometry) = self.axes.geometry(index) {
                let mut call =
                    frame.call(BedLayer::Axis(index as u8), geometry, ShaderKind::Flat, *color);
                call.state.line_width = frame.scale;
                canvas.draw(&call);
            }
        }
    }

    fn update_axes(&mut self) {
        self.axes.set_origin(Point3d::new(0.0, 0.0, GROUND_Z));
        let volume = self.build_volume.bounding_volume();
        let max_size = if volume.is_defined() { volume.max_size() } else { 0.0 };
        self.axes.set_stem_length(0.1 * max_size);
    }

    fn update_extended_bounding_box(&mut self) {
        let mut bbox = BoundingBox3::default();

        let volume = self.build_volume.bounding_volume();
        if volume.is_defined() {
            bbox.merge_point(&Point3d::new(volume.min.x, volume.min.y, GROUND_Z));
            bbox.merge_point(&Point3d::new(volume.max.x, volume.max.y, GROUND_Z));
        }

        bbox.merge(&self.axes.bounding_box());

        if let Some(model) = self.assets.model() {
            bbox.merge(&model.bounding_box().translated(&self.model_offset));
        }

        self.extended_bounding_box = bbox;
    }
}

impl Drop for Bed3D {
    fn drop(&mut self) {
        self.assets.release_all(self.loader.as_mut());
    }
}

/// Custom asset if given, otherwise the catalog asset resolved against the
/// resources directory
fn pick_asset(custom: &str, catalog: &str, config: &BedConfig) -> String {
    if custom.is_empty() {
        config.resolve_asset(catalog)
    } else {
        custom.to_string()
    }
}

/// `path` if it passes `validate`, otherwise an empty path
fn checked_asset(path: String, validate: fn(&str) -> Result<()>) -> String {
    if path.is_empty() {
        return path;
    }
    match validate(&path) {
        Ok(()) => path,
        Err(e) => {
            log::error!("{e}");
            String::new()
        }
    }
}
