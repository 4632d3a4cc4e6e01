/// Straight-alpha RGBA color, components in `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub(crate) fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

/// Render state shared by every pipeline created after setup.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GraphicsConfig {
    /// Depth test with `Less` compare and depth writes.
    pub depth_test: bool,
    /// Source-alpha / one-minus-source-alpha blending.
    pub blend: bool,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self { depth_test: true, blend: true }
    }
}

/// What `begin_pass` clears.
///
/// Colour is always cleared. Depth is cleared only when `clear_depth` lies in
/// `[0, 1]`; stencil only when `clear_stencil` is non-negative.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassAction {
    pub clear_color: Color,
    pub clear_depth: f32,
    pub clear_stencil: i32,
}

impl Default for PassAction {
    fn default() -> Self {
        Self { clear_color: Color::BLACK, clear_depth: 1.0, clear_stencil: 0 }
    }
}

/// Primitive topology of a pipeline.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

impl Topology {
    pub(crate) fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Points => wgpu::PrimitiveTopology::PointList,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }

    pub(crate) fn is_strip(self) -> bool {
        matches!(self, Topology::LineStrip | Topology::TriangleStrip)
    }
}

/// Global polygon fill mode.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FillMode {
    #[default]
    Fill,
    /// Polygon outlines only.
    Line,
}

/// Geometry upload request.
///
/// `vertex_buffer` holds tightly packed `3 x f32` positions. `index_buffer`,
/// when present, holds `u32` indices.
#[derive(Debug, Copy, Clone)]
pub struct BufferConfig<'a> {
    pub vertex_buffer: &'a [u8],
    pub index_buffer: Option<&'a [u8]>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PipelineConfig {
    pub shader: ShaderProgram,
    pub topology: Topology,
}

/// Handle of a linked shader program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderProgram {
    pub(crate) index: usize,
}

/// Handle of a GPU buffer owned by the backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub u32);

/// Uploaded geometry: the vertex buffer and, optionally, its index buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GeometryBinding {
    pub(crate) index: usize,
    pub vertex_buffer: BufferId,
    pub index_buffer: Option<BufferId>,
}

impl GeometryBinding {
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }
}

/// A shader paired with a primitive topology.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Pipeline {
    pub(crate) index: usize,
    pub shader: ShaderProgram,
    pub topology: Topology,
}

/// Byte range of one member inside a program's uniform block.
///
/// The invalid location (returned for unknown names) is accepted by the
/// setters and ignored.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformLocation(pub(crate) Option<(u32, u32)>);

impl UniformLocation {
    pub const INVALID: Self = Self(None);

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }
}

/// Number of objects held by the registry.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Counts {
    pub shaders: usize,
    pub bindings: usize,
    pub pipelines: usize,
}
