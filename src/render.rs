//! Render plumbing shared by the bed and its collaborators
//!
//! The crate does not talk to a graphics API. It produces [`RenderGeometry`]
//! buffers with a GPU-friendly layout and describes every draw as a
//! [`DrawCall`] handed to the host's [`Canvas`]. Picking (hit testing) volumes
//! are pushed into the host's [`PickingRegistry`].

use bytemuck::{Pod, Zeroable};
use nalgebra::Matrix4;

use crate::geometry::{BoundingBox2, BoundingBox3, Point2d, Point3d};

/// Interleaved vertex uploaded for every bed geometry
///
/// 20 bytes: position followed by texture coordinates.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct BedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// How the index buffer is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// Every three indices form a triangle
    Triangles,
    /// Every two indices form a line segment
    Lines,
}

/// Straight-alpha RGBA colour
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Colour as an array, in the layout shaders expect
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Bed surface and model colour
pub const DEFAULT_MODEL_COLOR: Color = Color::new(0.3255, 0.337, 0.337, 1.0);
/// Colour used when drawing into the picking buffer
pub const PICKING_MODEL_COLOR: Color = Color::new(0.0, 0.0, 0.0, 1.0);
/// Grid colour when drawn over an opaque model
pub const DEFAULT_SOLID_GRID_COLOR: Color = Color::new(0.9, 0.9, 0.9, 1.0);
/// Grid colour when drawn over the procedural surface
pub const DEFAULT_TRANSPARENT_GRID_COLOR: Color = Color::new(0.9, 0.9, 0.9, 0.6);
/// Contour outline colour
pub const DEFAULT_CONTOUR_COLOR: Color = Color::new(1.0, 1.0, 1.0, 0.5);

/// GPU-ready geometry: vertex and index buffers plus primitive type
///
/// Geometries are built once and replaced wholesale when the bed changes;
/// there are no mutators.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderGeometry {
    primitive: PrimitiveType,
    vertices: Vec<BedVertex>,
    indices: Vec<u32>,
}

impl RenderGeometry {
    /// Geometry with no vertices
    pub fn empty(primitive: PrimitiveType) -> Self {
        Self {
            primitive,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Flat triangle geometry at height `z`
    ///
    /// Texture coordinates map `uv_box` to the unit square.
    pub fn from_triangles(
        points: &[Point2d],
        indices: &[usize],
        z: f64,
        uv_box: &BoundingBox2,
    ) -> Self {
        let size = uv_box.size();
        let inv = |extent: f64| if extent > 0.0 { 1.0 / extent } else { 0.0 };
        let (inv_x, inv_y) = (inv(size.x), inv(size.y));

        let vertices = points
            .iter()
            .map(|p| BedVertex {
                position: [p.x as f32, p.y as f32, z as f32],
                uv: [
                    ((p.x - uv_box.min.x) * inv_x) as f32,
                    ((p.y - uv_box.min.y) * inv_y) as f32,
                ],
            })
            .collect();

        Self {
            primitive: PrimitiveType::Triangles,
            vertices,
            indices: indices.iter().map(|&i| i as u32).collect(),
        }
    }

    /// Line list at height `z`, one segment per pair
    pub fn from_lines(segments: &[(Point2d, Point2d)], z: f64) -> Self {
        let mut vertices = Vec::with_capacity(segments.len() * 2);
        for (a, b) in segments {
            for p in [a, b] {
                vertices.push(BedVertex {
                    position: [p.x as f32, p.y as f32, z as f32],
                    uv: [0.0, 0.0],
                });
            }
        }
        let indices = (0..vertices.len() as u32).collect();

        Self {
            primitive: PrimitiveType::Lines,
            vertices,
            indices,
        }
    }

    /// Line list from 3D segments
    pub fn from_lines_3d(segments: &[(Point3d, Point3d)]) -> Self {
        let mut vertices = Vec::with_capacity(segments.len() * 2);
        for (a, b) in segments {
            for p in [a, b] {
                vertices.push(BedVertex {
                    position: [p.x as f32, p.y as f32, p.z as f32],
                    uv: [0.0, 0.0],
                });
            }
        }
        let indices = (0..vertices.len() as u32).collect();

        Self {
            primitive: PrimitiveType::Lines,
            vertices,
            indices,
        }
    }

    /// Triangle mesh, e.g. a decoded printer bed model
    pub fn from_mesh(positions: &[[f32; 3]], triangles: &[[u32; 3]]) -> Self {
        Self {
            primitive: PrimitiveType::Triangles,
            vertices: positions
                .iter()
                .map(|&position| BedVertex {
                    position,
                    uv: [0.0, 0.0],
                })
                .collect(),
            indices: triangles.iter().flatten().copied().collect(),
        }
    }

    pub fn primitive(&self) -> PrimitiveType {
        self.primitive
    }

    pub fn vertices(&self) -> &[BedVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex buffer as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Bounds of all vertices, undefined when empty
    pub fn bounding_box(&self) -> BoundingBox3 {
        let points: Vec<Point3d> = self
            .vertices
            .iter()
            .map(|v| {
                Point3d::new(
                    v.position[0] as f64,
                    v.position[1] as f64,
                    v.position[2] as f64,
                )
            })
            .collect();
        BoundingBox3::from_points(&points)
    }
}

/// Shader program the host should bind for a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    /// Uniform colour, no lighting
    Flat,
    /// Textured print bed surface
    PrintBed,
    /// Lit mesh
    Gouraud,
}

/// Which part of the bed a draw call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedLayer {
    /// Procedural filled surface
    Fill,
    /// Textured surface
    Texture,
    /// Grid lines
    Grid,
    /// Contour outline
    Contour,
    /// Printer bed model
    Model,
    /// Coordinate axis (0 = X, 1 = Y, 2 = Z)
    Axis(u8),
}

/// Polygon winding treated as front facing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    CounterClockwise,
    Clockwise,
}

/// Fixed-function state for one draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub blend: bool,
    pub front_face: FrontFace,
    /// Line width in pixels; ignored for triangles
    pub line_width: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            blend: false,
            front_face: FrontFace::CounterClockwise,
            line_width: 1.0,
        }
    }
}

/// Opaque texture handle issued by the asset loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// One draw submitted to the canvas
#[derive(Debug, Clone)]
pub struct DrawCall<'a> {
    pub layer: BedLayer,
    pub geometry: &'a RenderGeometry,
    pub shader: ShaderKind,
    pub color: Color,
    pub texture: Option<TextureId>,
    /// Texture was rasterised from an SVG source
    pub svg_source: bool,
    /// Surface viewed from below, drawn semi-transparent
    pub transparent_background: bool,
    pub model_matrix: Matrix4<f64>,
    pub view_matrix: &'a Matrix4<f64>,
    pub projection_matrix: &'a Matrix4<f64>,
    pub state: RenderState,
}

/// Rendering surface owned by the host application
pub trait Canvas {
    /// Upload (if needed), bind and draw one geometry
    fn draw(&mut self, call: &DrawCall<'_>);

    /// Registry receiving hit-test volumes in picking mode
    fn picking_registry(&mut self) -> &mut dyn PickingRegistry;

    /// Ask for another frame because a progressive asset changed
    fn request_extra_frame(&mut self) {}
}

/// Hit-test volume registry used for cursor ray casting
pub trait PickingRegistry {
    /// Drop every volume previously registered for the bed
    fn remove_bed(&mut self);

    /// Register a bed volume with its world transform
    fn register_bed(&mut self, geometry: &RenderGeometry, transform: &Matrix4<f64>);
}
