//! Graphics registry.
//!
//! Shader programs, geometry bindings and pipelines live in append-only
//! arenas owned by [`Graphics`]. Draws are recorded between `begin_pass`
//! and `commit`, and `commit` replays them into the window's swapchain
//! through a [`RasterBackend`].

mod arena;
mod backend;
mod error;
mod frame;
mod registry;
mod shader;
mod types;
mod wgpu_backend;

pub use backend::{BufferKind, RasterBackend, RawProgram};
pub use error::{GfxError, Result, ShaderStage};
pub use frame::{plan_draw, ClearOps, DrawCommand, DrawPath, FrameOp, FrameRecording};
pub use registry::{Graphics, VERTEX_STRIDE};
pub use shader::{
    capabilities_for, compile, link, CompiledStage, FsLoader, LinkedProgram, SourceLoader, UniformBlock,
    UniformField, UniformKind,
};
pub use types::{
    BufferConfig, BufferId, Color, Counts, FillMode, GeometryBinding, GraphicsConfig, PassAction,
    Pipeline, PipelineConfig, ShaderProgram, Topology, UniformLocation,
};
pub use wgpu_backend::WgpuBackend;
