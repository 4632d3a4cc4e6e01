use std::path::Path;

use super::arena::Arena;
use super::backend::{BufferKind, RasterBackend, RawProgram};
use super::error::{GfxError, Result, ShaderStage};
use super::frame::{plan_draw, ClearOps, DrawCommand, FrameRecording};
use super::shader::{self, FsLoader, SourceLoader, UniformBlock};
use super::types::{
    BufferConfig, BufferId, Counts, FillMode, GeometryBinding, GraphicsConfig, PassAction, Pipeline,
    PipelineConfig, ShaderProgram, Topology, UniformLocation,
};
use super::wgpu_backend::WgpuBackend;

/// Size of one vertex: `3 x f32` position.
pub const VERTEX_STRIDE: usize = 3 * std::mem::size_of::<f32>();

struct ProgramRecord {
    raw: RawProgram,
    uniform: Option<UniformBlock>,
    /// Current uniform values; persists across frames.
    staging: Vec<u8>,
}

struct BindingRecord {
    vertex: BufferId,
    index: Option<BufferId>,
}

/// The graphics registry.
///
/// Owns every program, geometry binding and pipeline created during the
/// session in append-only arenas, tracks the currently applied state, and
/// records each frame's clears and draws until `commit` presents them.
///
/// Only successfully created objects enter the arenas. Dropping the registry
/// releases its GPU objects the same way [`Graphics::shutdown`] does.
pub struct Graphics<B: RasterBackend = WgpuBackend> {
    backend: B,
    loader: Box<dyn SourceLoader>,
    config: GraphicsConfig,

    programs: Arena<ProgramRecord>,
    bindings: Arena<BindingRecord>,
    pipelines: Arena<Pipeline>,

    current_pipeline: Option<Pipeline>,
    current_binding: Option<GeometryBinding>,

    fill: FillMode,
    wireframe_warned: bool,

    frame: FrameRecording,
    released: bool,
}

impl<B: RasterBackend> Graphics<B> {
    pub fn new(mut backend: B, config: &GraphicsConfig) -> Self {
        backend.configure(config);
        let frame = FrameRecording::new(backend.uniform_alignment());

        log::info!("successfully initialized graphics module");

        Self {
            backend,
            loader: Box::new(FsLoader),
            config: *config,
            programs: Arena::new(),
            bindings: Arena::new(),
            pipelines: Arena::new(),
            current_pipeline: None,
            current_binding: None,
            fill: FillMode::Fill,
            wireframe_warned: false,
            frame,
            released: false,
        }
    }

    /// Replaces the collaborator `load_shader` reads files through.
    pub fn set_loader(&mut self, loader: impl SourceLoader + 'static) {
        self.loader = Box::new(loader);
    }

    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    /// Releases every program and buffer, then empties the arenas.
    pub fn shutdown(mut self) {
        self.release_all();
    }

    fn release_all(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for program in self.programs.take_all() {
            self.backend.release_program(program.raw);
        }
        for binding in self.bindings.take_all() {
            self.backend.release_buffer(binding.vertex);
            if let Some(index) = binding.index {
                self.backend.release_buffer(index);
            }
        }
        self.pipelines.take_all();

        self.current_pipeline = None;
        self.current_binding = None;
        self.frame.reset();

        log::info!("successfully shut down graphics module");
    }

    // ── resources ──────────────────────────────────────────────────────────

    /// Reads, compiles and links a program from two WGSL files.
    pub fn load_shader(
        &mut self,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<ShaderProgram> {
        let vertex = self.read_source(vertex_path.as_ref())?;
        let fragment = self.read_source(fragment_path.as_ref())?;
        self.load_shader_source(&vertex, &fragment)
    }

    /// Compiles and links a program from in-memory WGSL.
    pub fn load_shader_source(&mut self, vertex: &str, fragment: &str) -> Result<ShaderProgram> {
        let caps = self.backend.shader_capabilities();
        let linked = logged(
            shader::compile(ShaderStage::Vertex, vertex, caps)
                .and_then(|vs| Ok((vs, shader::compile(ShaderStage::Fragment, fragment, caps)?)))
                .and_then(|(vs, fs)| shader::link(vs, fs)),
        )?;

        let raw = logged(self.backend.create_program(&linked))?;

        let staging = linked
            .uniform
            .as_ref()
            .map(|block| vec![0u8; block.size as usize])
            .unwrap_or_default();

        let index = self.programs.push(ProgramRecord { raw, uniform: linked.uniform, staging });

        log::info!("successfully loaded shaders");
        Ok(ShaderProgram { index })
    }

    fn read_source(&self, path: &Path) -> Result<String> {
        logged(self.loader.load(path).map_err(|source| GfxError::Io {
            path: path.to_path_buf(),
            source,
        }))
    }

    /// Uploads geometry: `3 x f32` vertices at attribute slot 0 and, when
    /// given, `u32` indices.
    pub fn make_buffer(&mut self, conf: &BufferConfig<'_>) -> Result<GeometryBinding> {
        logged(check_geometry(conf))?;

        let vertex_buffer = logged(self.backend.create_buffer(BufferKind::Vertex, conf.vertex_buffer))?;

        let index_buffer = match conf.index_buffer {
            Some(bytes) => match self.backend.create_buffer(BufferKind::Index, bytes) {
                Ok(id) => Some(id),
                Err(e) => {
                    self.backend.release_buffer(vertex_buffer);
                    return logged(Err(e));
                }
            },
            None => None,
        };

        let index = self.bindings.push(BindingRecord { vertex: vertex_buffer, index: index_buffer });
        log::debug!("created geometry binding {index}");

        Ok(GeometryBinding { index, vertex_buffer, index_buffer })
    }

    pub fn make_pipeline(&mut self, conf: &PipelineConfig) -> Pipeline {
        let pipeline = Pipeline {
            index: self.pipelines.len(),
            shader: conf.shader,
            topology: conf.topology,
        };
        self.pipelines.push(pipeline);
        pipeline
    }

    pub fn counts(&self) -> Counts {
        Counts {
            shaders: self.programs.len(),
            bindings: self.bindings.len(),
            pipelines: self.pipelines.len(),
        }
    }

    // ── state ──────────────────────────────────────────────────────────────

    pub fn apply_pipeline(&mut self, pipeline: &Pipeline) {
        self.current_pipeline = Some(*pipeline);
    }

    pub fn apply_bindings(&mut self, bindings: &GeometryBinding) {
        self.current_binding = Some(*bindings);
    }

    /// Location of a member of the program's uniform block; invalid when
    /// the program has no member called `name`.
    pub fn uniform_location(&self, shader: ShaderProgram, name: &str) -> UniformLocation {
        self.programs
            .get(shader.index)
            .and_then(|p| p.uniform.as_ref())
            .and_then(|block| block.field(name))
            .map(|field| UniformLocation(Some((field.offset, field.size))))
            .unwrap_or(UniformLocation::INVALID)
    }

    pub fn set_uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]) {
        self.write_uniform(location, bytemuck::cast_slice(value));
    }

    pub fn set_uniform_vec4(&mut self, location: UniformLocation, value: &[f32; 4]) {
        self.write_uniform(location, bytemuck::cast_slice(value));
    }

    /// Writes into the applied program's staging block. Nothing is checked
    /// beyond keeping the write inside the block.
    fn write_uniform(&mut self, location: UniformLocation, bytes: &[u8]) {
        let UniformLocation(Some((offset, size))) = location else { return };
        let Some(pipeline) = self.current_pipeline else { return };
        let Some(program) = self.programs.get_mut(pipeline.shader.index) else { return };

        let start = (offset as usize).min(program.staging.len());
        let len = bytes.len().min(size as usize).min(program.staging.len() - start);
        program.staging[start..start + len].copy_from_slice(&bytes[..len]);
    }

    /// Switches between filled polygons and outlines for all later draws.
    pub fn set_wireframe(&mut self, enable: bool) {
        if enable && !self.backend.supports_wireframe() && !self.wireframe_warned {
            log::warn!("wireframe rendering is not supported by this adapter; drawing filled");
            self.wireframe_warned = true;
        }
        self.fill = if enable { FillMode::Line } else { FillMode::Fill };
    }

    pub fn fill_mode(&self) -> FillMode {
        self.fill
    }

    // ── frame ──────────────────────────────────────────────────────────────

    pub fn begin_pass(&mut self, action: &PassAction) {
        self.frame.clear(ClearOps::from_action(action));
    }

    /// Unbinds the current pipeline and bindings.
    pub fn end_pass(&mut self) {
        self.current_pipeline = None;
        self.current_binding = None;
    }

    /// Records a triangle-list draw of `count` elements starting at `first`.
    ///
    /// Geometry comes from the applied bindings; `bindings` only selects the
    /// indexed path (when it has an index buffer) or the plain one. Instanced
    /// when `instances > 1`. Uses the applied pipeline's program and a
    /// snapshot of the program's current uniforms.
    pub fn draw(&mut self, bindings: &GeometryBinding, first: u32, count: u32, instances: u32) {
        let Some(pipeline) = self.current_pipeline else {
            log::warn!("draw skipped: no pipeline applied");
            return;
        };
        let Some(applied) = self.current_binding else {
            log::warn!("draw skipped: no bindings applied");
            return;
        };
        if bindings.is_indexed() && !applied.is_indexed() {
            log::warn!("draw skipped: indexed draw without an applied index buffer");
            return;
        }
        let Some(program) = self.programs.get(pipeline.shader.index) else {
            log::warn!("draw skipped: pipeline refers to an unknown shader");
            return;
        };
        if count == 0 {
            return;
        }

        let uniform_offset = program
            .uniform
            .as_ref()
            .map(|_| self.frame.push_uniforms(&program.staging));

        self.frame.draw(DrawCommand {
            program: program.raw,
            topology: Topology::Triangles,
            fill: self.fill,
            vertex_buffer: applied.vertex_buffer,
            index_buffer: applied.index_buffer,
            first,
            count,
            instances: instances.max(1),
            path: plan_draw(bindings.is_indexed(), instances),
            uniform_offset,
        });
    }

    /// Presents the recorded frame and starts a new one.
    pub fn commit(&mut self) -> Result<()> {
        let result = self.backend.present(&self.frame);
        self.frame.reset();
        logged(result)
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: RasterBackend> Drop for Graphics<B> {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn check_geometry(conf: &BufferConfig<'_>) -> Result<()> {
    let v = conf.vertex_buffer.len();
    if v == 0 || v % VERTEX_STRIDE != 0 {
        return Err(GfxError::Gpu(format!(
            "vertex data must be a non-empty multiple of {VERTEX_STRIDE} bytes, got {v}"
        )));
    }
    if let Some(indices) = conf.index_buffer {
        let i = indices.len();
        if i == 0 || i % 4 != 0 {
            return Err(GfxError::Gpu(format!(
                "index data must be a non-empty multiple of 4 bytes, got {i}"
            )));
        }
    }
    Ok(())
}

fn logged<T>(result: Result<T>) -> Result<T> {
    result.inspect_err(|e| log::error!("{e}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io;
    use std::path::PathBuf;

    use super::*;
    use crate::gfx::backend::recording::RecordingBackend;
    use crate::gfx::frame::{DrawPath, FrameOp};
    use crate::gfx::shader::tests::{FS, VS};
    use crate::gfx::types::Color;

    #[derive(Default)]
    struct MemoryLoader(HashMap<PathBuf, String>);

    impl MemoryLoader {
        fn with(mut self, path: &str, src: &str) -> Self {
            self.0.insert(PathBuf::from(path), src.to_owned());
            self
        }
    }

    impl SourceLoader for MemoryLoader {
        fn load(&self, path: &Path) -> io::Result<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }

    const QUAD: [f32; 12] = [
        -0.5, -0.5, 0.0, //
        0.5, -0.5, 0.0, //
        0.5, 0.5, 0.0, //
        -0.5, 0.5, 0.0,
    ];
    const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

    fn graphics() -> Graphics<RecordingBackend> {
        let mut gfx = Graphics::new(RecordingBackend::default(), &GraphicsConfig::default());
        gfx.set_loader(
            MemoryLoader::default()
                .with("quad.vert.wgsl", VS)
                .with("quad.frag.wgsl", FS)
                .with("broken.frag.wgsl", "@fragment fn main( {"),
        );
        gfx
    }

    fn quad(gfx: &mut Graphics<RecordingBackend>, indexed: bool) -> GeometryBinding {
        gfx.make_buffer(&BufferConfig {
            vertex_buffer: bytemuck::cast_slice(&QUAD),
            index_buffer: indexed.then(|| bytemuck::cast_slice(&QUAD_INDICES)),
        })
        .unwrap()
    }

    fn last_frame(gfx: &Graphics<RecordingBackend>) -> Vec<FrameOp> {
        gfx.backend().log.borrow().presented.last().cloned().unwrap()
    }

    fn draws(ops: &[FrameOp]) -> Vec<DrawCommand> {
        ops.iter()
            .filter_map(|op| match op {
                FrameOp::Draw(d) => Some(*d),
                FrameOp::Clear(_) => None,
            })
            .collect()
    }

    #[test]
    fn setup_configures_backend() {
        let gfx = graphics();
        assert_eq!(gfx.backend().log.borrow().config, Some(GraphicsConfig::default()));
        assert_eq!(gfx.counts(), Counts::default());
    }

    #[test]
    fn successful_load_adds_one_shader() {
        let mut gfx = graphics();
        let program = gfx.load_shader("quad.vert.wgsl", "quad.frag.wgsl").unwrap();
        assert_eq!(gfx.counts().shaders, 1);
        assert_eq!(program, ShaderProgram { index: 0 });

        gfx.load_shader_source(VS, FS).unwrap();
        assert_eq!(gfx.counts().shaders, 2);
    }

    #[test]
    fn failed_loads_leave_registry_unchanged() {
        let mut gfx = graphics();

        let err = gfx.load_shader("quad.vert.wgsl", "broken.frag.wgsl").unwrap_err();
        assert!(matches!(err, GfxError::Compile { stage: ShaderStage::Fragment, .. }));

        let err = gfx.load_shader("missing.vert.wgsl", "quad.frag.wgsl").unwrap_err();
        match err {
            GfxError::Io { path, .. } => assert_eq!(path, PathBuf::from("missing.vert.wgsl")),
            other => panic!("unexpected error: {other}"),
        }

        let plain_vs = "@vertex fn main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> { return vec4<f32>(p, 1.0); }";
        let err = gfx.load_shader_source(plain_vs, FS).unwrap_err();
        assert!(matches!(err, GfxError::Link { .. }));

        assert_eq!(gfx.counts().shaders, 0);
        assert!(gfx.backend().log.borrow().programs.is_empty());
    }

    #[test]
    fn shader_needing_missing_device_features_is_rejected() {
        let mut gfx = graphics();
        let fs = r#"
@fragment
fn main() -> @location(0) vec4<f32> {
    let d: f64 = 1.0lf;
    return vec4<f32>(f32(d), 0.0, 0.0, 1.0);
}
"#;
        let plain_vs = "@vertex fn main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> { return vec4<f32>(p, 1.0); }";

        let err = gfx.load_shader_source(plain_vs, fs).unwrap_err();
        assert!(matches!(err, GfxError::Compile { stage: ShaderStage::Fragment, .. }));
        assert_eq!(gfx.counts().shaders, 0);
        assert!(gfx.backend().log.borrow().programs.is_empty());
    }

    #[test]
    fn index_buffer_presence_round_trips() {
        let mut gfx = graphics();

        let plain = quad(&mut gfx, false);
        assert!(plain.index_buffer.is_none());
        assert!(!plain.is_indexed());

        let indexed = quad(&mut gfx, true);
        assert!(indexed.index_buffer.is_some());
        assert_ne!(indexed.vertex_buffer, plain.vertex_buffer);

        assert_eq!(gfx.counts().bindings, 2);
        let log = gfx.backend().log.borrow();
        assert_eq!(
            log.buffers,
            vec![(BufferKind::Vertex, 48), (BufferKind::Vertex, 48), (BufferKind::Index, 24)]
        );
    }

    #[test]
    fn malformed_geometry_is_rejected() {
        let mut gfx = graphics();
        let err = gfx
            .make_buffer(&BufferConfig { vertex_buffer: &[0u8; 10], index_buffer: None })
            .unwrap_err();
        assert!(matches!(err, GfxError::Gpu(_)));
        assert_eq!(gfx.counts().bindings, 0);
    }

    #[test]
    fn failed_index_upload_releases_vertex_buffer() {
        let backend = RecordingBackend { fail_buffers_after: Some(1), ..Default::default() };
        let mut gfx = Graphics::new(backend, &GraphicsConfig::default());

        let result = gfx.make_buffer(&BufferConfig {
            vertex_buffer: bytemuck::cast_slice(&QUAD),
            index_buffer: Some(bytemuck::cast_slice(&QUAD_INDICES)),
        });
        assert!(result.is_err());
        assert_eq!(gfx.counts().bindings, 0);
        assert_eq!(gfx.backend().log.borrow().released_buffers.len(), 1);
    }

    #[test]
    fn pipelines_are_descriptors() {
        let mut gfx = graphics();
        let shader = gfx.load_shader_source(VS, FS).unwrap();
        let p = gfx.make_pipeline(&PipelineConfig { shader, topology: Topology::Lines });
        assert_eq!(p.shader, shader);
        assert_eq!(p.topology, Topology::Lines);
        assert_eq!(gfx.counts().pipelines, 1);
    }

    #[test]
    fn pass_action_sentinels() {
        let mut gfx = graphics();
        gfx.begin_pass(&PassAction {
            clear_color: Color::rgba(0.1, 0.2, 0.3, 1.0),
            clear_depth: -1.0,
            clear_stencil: -1,
        });
        gfx.end_pass();
        gfx.commit().unwrap();

        match last_frame(&gfx).as_slice() {
            [FrameOp::Clear(c)] => {
                assert_eq!(c.color, Color::rgba(0.1, 0.2, 0.3, 1.0));
                assert_eq!(c.depth, None);
                assert_eq!(c.stencil, None);
            }
            other => panic!("unexpected frame: {other:?}"),
        }

        gfx.begin_pass(&PassAction::default());
        gfx.commit().unwrap();
        match last_frame(&gfx).as_slice() {
            [FrameOp::Clear(c)] => {
                assert_eq!(c.depth, Some(1.0));
                assert_eq!(c.stencil, Some(0));
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn draw_path_follows_indices_and_instances() {
        let mut gfx = graphics();
        let shader = gfx.load_shader_source(VS, FS).unwrap();
        let pipeline = gfx.make_pipeline(&PipelineConfig { shader, topology: Topology::Triangles });
        let plain = quad(&mut gfx, false);
        let indexed = quad(&mut gfx, true);

        gfx.begin_pass(&PassAction::default());
        gfx.apply_pipeline(&pipeline);
        gfx.apply_bindings(&indexed);
        gfx.draw(&indexed, 0, 6, 1);
        gfx.draw(&indexed, 0, 6, 3);
        gfx.apply_bindings(&plain);
        gfx.draw(&plain, 0, 4, 0);
        gfx.draw(&plain, 0, 4, 2);
        gfx.end_pass();
        gfx.commit().unwrap();

        let paths: Vec<_> = draws(&last_frame(&gfx)).iter().map(|d| (d.path, d.instances)).collect();
        assert_eq!(
            paths,
            vec![
                (DrawPath::Elements, 1),
                (DrawPath::ElementsInstanced, 3),
                (DrawPath::Arrays, 1),
                (DrawPath::ArraysInstanced, 2),
            ]
        );
    }

    #[test]
    fn draws_are_always_triangle_lists() {
        let mut gfx = graphics();
        let shader = gfx.load_shader_source(VS, FS).unwrap();
        let lines = gfx.make_pipeline(&PipelineConfig { shader, topology: Topology::LineStrip });
        assert_eq!(lines.topology, Topology::LineStrip);
        let geo = quad(&mut gfx, false);

        gfx.apply_pipeline(&lines);
        gfx.apply_bindings(&geo);
        gfx.draw(&geo, 0, 4, 1);
        gfx.commit().unwrap();

        let frame = last_frame(&gfx);
        assert_eq!(draws(&frame)[0].topology, Topology::Triangles);
        // No begin_pass: the draw lands in a frame without a clear.
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn draw_reads_geometry_from_applied_bindings() {
        let mut gfx = graphics();
        let shader = gfx.load_shader_source(VS, FS).unwrap();
        let pipeline = gfx.make_pipeline(&PipelineConfig { shader, topology: Topology::Triangles });
        let applied = quad(&mut gfx, true);
        let other = quad(&mut gfx, true);
        let plain = quad(&mut gfx, false);

        gfx.apply_pipeline(&pipeline);
        gfx.apply_bindings(&applied);
        gfx.draw(&other, 0, 6, 1);
        gfx.draw(&plain, 0, 4, 1);
        gfx.commit().unwrap();

        let frame = last_frame(&gfx);
        let recorded = draws(&frame);
        assert_eq!(recorded.len(), 2);
        for draw in &recorded {
            assert_eq!(draw.vertex_buffer, applied.vertex_buffer);
            assert_eq!(draw.index_buffer, applied.index_buffer);
        }
        assert_eq!(recorded[0].path, DrawPath::Elements);
        assert_eq!(recorded[1].path, DrawPath::Arrays);
    }

    #[test]
    fn indexed_draw_over_plain_bindings_is_skipped() {
        let mut gfx = graphics();
        let shader = gfx.load_shader_source(VS, FS).unwrap();
        let pipeline = gfx.make_pipeline(&PipelineConfig { shader, topology: Topology::Triangles });
        let plain = quad(&mut gfx, false);
        let indexed = quad(&mut gfx, true);

        gfx.apply_pipeline(&pipeline);
        gfx.apply_bindings(&plain);
        gfx.draw(&indexed, 0, 6, 1);
        gfx.commit().unwrap();

        assert!(draws(&last_frame(&gfx)).is_empty());
    }

    #[test]
    fn draw_without_pipeline_or_bindings_is_skipped() {
        let mut gfx = graphics();
        let shader = gfx.load_shader_source(VS, FS).unwrap();
        let pipeline = gfx.make_pipeline(&PipelineConfig { shader, topology: Topology::Triangles });
        let geo = quad(&mut gfx, false);

        gfx.begin_pass(&PassAction::default());
        gfx.draw(&geo, 0, 4, 1);
        gfx.apply_pipeline(&pipeline);
        gfx.draw(&geo, 0, 4, 1);
        gfx.apply_bindings(&geo);
        gfx.end_pass();
        gfx.draw(&geo, 0, 4, 1);
        gfx.commit().unwrap();

        assert!(draws(&last_frame(&gfx)).is_empty());
    }

    #[test]
    fn wireframe_toggle_is_idempotent() {
        let mut gfx = graphics();
        assert_eq!(gfx.fill_mode(), FillMode::Fill);

        gfx.set_wireframe(true);
        gfx.set_wireframe(true);
        assert_eq!(gfx.fill_mode(), FillMode::Line);

        gfx.set_wireframe(false);
        gfx.set_wireframe(false);
        assert_eq!(gfx.fill_mode(), FillMode::Fill);
    }

    #[test]
    fn draws_record_fill_mode() {
        let mut gfx = graphics();
        let shader = gfx.load_shader_source(VS, FS).unwrap();
        let pipeline = gfx.make_pipeline(&PipelineConfig { shader, topology: Topology::Triangles });
        let geo = quad(&mut gfx, true);

        gfx.set_wireframe(true);
        gfx.apply_pipeline(&pipeline);
        gfx.apply_bindings(&geo);
        gfx.draw(&geo, 0, 6, 1);
        gfx.set_wireframe(false);
        gfx.draw(&geo, 0, 6, 1);
        gfx.commit().unwrap();

        let fills: Vec<_> = draws(&last_frame(&gfx)).iter().map(|d| d.fill).collect();
        assert_eq!(fills, vec![FillMode::Line, FillMode::Fill]);
    }

    #[test]
    fn uniform_locations() {
        let mut gfx = graphics();
        let shader = gfx.load_shader_source(VS, FS).unwrap();

        assert_eq!(gfx.uniform_location(shader, "mvp"), UniformLocation(Some((0, 64))));
        assert_eq!(gfx.uniform_location(shader, "color"), UniformLocation(Some((64, 16))));
        assert!(!gfx.uniform_location(shader, "missing").is_valid());
    }

    #[test]
    fn uniform_writes_are_snapshotted_per_draw_and_persist() {
        let mut gfx = graphics();
        let shader = gfx.load_shader_source(VS, FS).unwrap();
        let pipeline = gfx.make_pipeline(&PipelineConfig { shader, topology: Topology::Triangles });
        let geo = quad(&mut gfx, true);
        let color = gfx.uniform_location(shader, "color");

        gfx.apply_pipeline(&pipeline);
        gfx.apply_bindings(&geo);
        gfx.set_uniform_vec4(color, &[1.0, 0.0, 0.0, 1.0]);
        gfx.draw(&geo, 0, 6, 1);
        gfx.set_uniform_vec4(color, &[0.0, 1.0, 0.0, 1.0]);
        gfx.set_uniform_vec4(UniformLocation::INVALID, &[9.0; 4]);
        gfx.draw(&geo, 0, 6, 1);
        gfx.end_pass();
        gfx.commit().unwrap();

        let read = |bytes: &[u8], at: usize| -> [f32; 4] {
            let mut out = [0.0f32; 4];
            bytemuck::cast_slice_mut::<f32, u8>(&mut out).copy_from_slice(&bytes[at..at + 16]);
            out
        };

        let frame = last_frame(&gfx);
        let offsets: Vec<_> = draws(&frame).iter().map(|d| d.uniform_offset.unwrap() as usize).collect();
        {
            let log = gfx.backend().log.borrow();
            let uniforms = log.presented_uniforms.last().unwrap();
            assert_eq!(read(uniforms, offsets[0] + 64), [1.0, 0.0, 0.0, 1.0]);
            assert_eq!(read(uniforms, offsets[1] + 64), [0.0, 1.0, 0.0, 1.0]);
        }

        // Next frame: the program keeps its last value.
        gfx.apply_pipeline(&pipeline);
        gfx.apply_bindings(&geo);
        gfx.draw(&geo, 0, 6, 1);
        gfx.commit().unwrap();

        let log = gfx.backend().log.borrow();
        let uniforms = log.presented_uniforms.last().unwrap();
        assert_eq!(read(uniforms, 64), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn uniform_write_without_pipeline_is_ignored() {
        let mut gfx = graphics();
        let shader = gfx.load_shader_source(VS, FS).unwrap();
        let mvp = gfx.uniform_location(shader, "mvp");
        gfx.set_uniform_mat4(mvp, &[1.0; 16]);

        let pipeline = gfx.make_pipeline(&PipelineConfig { shader, topology: Topology::Triangles });
        let geo = quad(&mut gfx, false);
        gfx.apply_pipeline(&pipeline);
        gfx.apply_bindings(&geo);
        gfx.draw(&geo, 0, 4, 1);
        gfx.commit().unwrap();

        let log = gfx.backend().log.borrow();
        assert!(log.presented_uniforms[0][..64].iter().all(|b| *b == 0));
    }

    #[test]
    fn commit_failure_is_returned() {
        let backend = RecordingBackend { fail_present: true, ..Default::default() };
        let mut gfx = Graphics::new(backend, &GraphicsConfig::default());
        gfx.begin_pass(&PassAction::default());
        assert!(matches!(gfx.commit(), Err(GfxError::Surface(_))));
    }

    #[test]
    fn shutdown_releases_everything_once() {
        let mut gfx = graphics();
        let log = gfx.backend().log.clone();
        gfx.load_shader_source(VS, FS).unwrap();
        quad(&mut gfx, false);
        quad(&mut gfx, true);

        gfx.shutdown();

        let log = log.borrow();
        assert_eq!(log.released_programs, vec![RawProgram(0)]);
        // Two vertex buffers and the one index buffer.
        assert_eq!(log.released_buffers.len(), 3);
    }

    #[test]
    fn drop_releases_like_shutdown() {
        let mut gfx = graphics();
        let log = gfx.backend().log.clone();
        gfx.load_shader_source(VS, FS).unwrap();
        drop(gfx);
        assert_eq!(log.borrow().released_programs.len(), 1);
    }
}
