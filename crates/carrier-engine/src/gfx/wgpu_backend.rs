use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU64;
use std::rc::Rc;

use naga::valid::Capabilities;
use wgpu::util::DeviceExt;

use super::backend::{BufferKind, RasterBackend, RawProgram};
use super::error::{GfxError, Result, ShaderStage};
use super::frame::{DrawCommand, DrawPath, FrameOp, FrameRecording};
use super::registry::VERTEX_STRIDE;
use super::shader::{self, LinkedProgram};
use super::types::{BufferId, FillMode, GraphicsConfig, Topology};
use crate::device::{Gpu, SurfaceErrorAction, DEPTH_FORMAT};

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

/// Smallest uniform buffer allocated for frame snapshots.
const MIN_UNIFORM_CAPACITY: u64 = 4096;

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRIBUTES,
    }
}

struct ProgramObjects {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_entry: String,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    layout: wgpu::PipelineLayout,
    uniform_size: u64,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    program: RawProgram,
    topology: Topology,
    fill: FillMode,
}

/// Registry backend drawing into the window's swapchain.
///
/// wgpu bakes topology, polygon mode, depth and blend state into render
/// pipelines, so one is built lazily per (program, topology, fill mode).
pub struct WgpuBackend {
    gpu: Rc<RefCell<Gpu>>,
    config: GraphicsConfig,
    wireframe: bool,

    programs: Vec<Option<ProgramObjects>>,
    buffers: Vec<Option<wgpu::Buffer>>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    /// Pipelines wgpu rejected; their draws are skipped without retrying.
    rejected: HashSet<PipelineKey>,

    /// Holds every uniform snapshot of the frame being presented.
    uniforms: Option<wgpu::Buffer>,
}

impl WgpuBackend {
    pub(crate) fn new(gpu: Rc<RefCell<Gpu>>) -> Self {
        let wireframe = gpu.borrow().supports_wireframe();
        Self {
            gpu,
            config: GraphicsConfig::default(),
            wireframe,
            programs: Vec::new(),
            buffers: Vec::new(),
            pipelines: HashMap::new(),
            rejected: HashSet::new(),
            uniforms: None,
        }
    }

    fn key(&self, draw: &DrawCommand) -> PipelineKey {
        let fill = if self.wireframe { draw.fill } else { FillMode::Fill };
        PipelineKey { program: draw.program, topology: draw.topology, fill }
    }

    fn buffer(&self, id: BufferId) -> Option<&wgpu::Buffer> {
        self.buffers.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn program(&self, id: RawProgram) -> Option<&ProgramObjects> {
        self.programs.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Builds the render pipeline for `draw` if it does not exist yet.
    /// Returns `false` when the draw's program has been released or wgpu
    /// rejected the pipeline.
    fn ensure_pipeline(&mut self, draw: &DrawCommand) -> bool {
        let key = self.key(draw);
        if self.pipelines.contains_key(&key) {
            return true;
        }
        if self.rejected.contains(&key) {
            return false;
        }
        let Some(program) = self.program(draw.program) else {
            return false;
        };

        let gpu = self.gpu.borrow();
        let depth_test = self.config.depth_test;

        let scope = gpu.device().push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = gpu.device().create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("carrier pipeline"),
            layout: Some(&program.layout),

            vertex: wgpu::VertexState {
                module: &program.vertex,
                entry_point: Some(program.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &program.fragment,
                entry_point: Some(program.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: self.config.blend.then_some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: key.topology.to_wgpu(),
                strip_index_format: key.topology.is_strip().then_some(wgpu::IndexFormat::Uint32),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: match key.fill {
                    FillMode::Fill => wgpu::PolygonMode::Fill,
                    FillMode::Line => wgpu::PolygonMode::Line,
                },
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: depth_test,
                depth_compare: if depth_test {
                    wgpu::CompareFunction::Less
                } else {
                    wgpu::CompareFunction::Always
                },
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });
        let error = pollster::block_on(scope.pop());

        drop(gpu);
        if let Some(e) = error {
            log::error!("failed to create render pipeline: {e}");
            self.rejected.insert(key);
            return false;
        }
        self.pipelines.insert(key, pipeline);
        true
    }

    fn upload_uniforms(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let gpu = self.gpu.borrow();
        let needed = bytes.len() as u64;

        if self.uniforms.as_ref().is_none_or(|b| b.size() < needed) {
            self.uniforms = Some(gpu.device().create_buffer(&wgpu::BufferDescriptor {
                label: Some("carrier uniform snapshots"),
                size: needed.next_power_of_two().max(MIN_UNIFORM_CAPACITY),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }

        if let Some(buffer) = &self.uniforms {
            gpu.queue().write_buffer(buffer, 0, bytes);
        }
    }

    /// One bind group per program drawn this frame, over the snapshot buffer.
    fn bind_groups(&self, frame: &FrameRecording) -> HashMap<RawProgram, wgpu::BindGroup> {
        let mut groups = HashMap::new();
        let Some(buffer) = &self.uniforms else { return groups };
        let gpu = self.gpu.borrow();

        for op in frame.ops() {
            let FrameOp::Draw(draw) = op else { continue };
            if draw.uniform_offset.is_none() || groups.contains_key(&draw.program) {
                continue;
            }
            let Some(program) = self.program(draw.program) else { continue };
            let Some(layout) = &program.bind_group_layout else { continue };

            let group = gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("carrier uniform bind group"),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer,
                        offset: 0,
                        size: NonZeroU64::new(program.uniform_size),
                    }),
                }],
            });
            groups.insert(draw.program, group);
        }
        groups
    }
}

/// Creates a shader module, turning a wgpu validation error into a compile error.
fn shader_module(device: &wgpu::Device, stage: ShaderStage, source: &str) -> Result<wgpu::ShaderModule> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(match stage {
            ShaderStage::Vertex => "carrier vertex shader",
            ShaderStage::Fragment => "carrier fragment shader",
        }),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    match pollster::block_on(scope.pop()) {
        Some(e) => Err(GfxError::Compile { stage, log: e.to_string() }),
        None => Ok(module),
    }
}

impl RasterBackend for WgpuBackend {
    fn uniform_alignment(&self) -> u32 {
        self.gpu.borrow().uniform_alignment()
    }

    fn supports_wireframe(&self) -> bool {
        self.wireframe
    }

    fn shader_capabilities(&self) -> Capabilities {
        let gpu = self.gpu.borrow();
        shader::capabilities_for(gpu.device().features(), gpu.downlevel_flags())
    }

    fn configure(&mut self, config: &GraphicsConfig) {
        self.config = *config;
        self.pipelines.clear();
        self.rejected.clear();
    }

    fn create_program(&mut self, program: &LinkedProgram) -> Result<RawProgram> {
        let gpu = self.gpu.borrow();
        let device = gpu.device();

        let vertex = shader_module(device, ShaderStage::Vertex, &program.vertex_source)?;
        let fragment = shader_module(device, ShaderStage::Fragment, &program.fragment_source)?;

        let uniform_size = program.uniform.as_ref().map_or(0, |block| block.size as u64);
        let bind_group_layout = program.uniform.as_ref().map(|_| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("carrier uniform bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(uniform_size),
                    },
                    count: None,
                }],
            })
        });

        let group_layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("carrier pipeline layout"),
            bind_group_layouts: &group_layouts,
            immediate_size: 0,
        });

        let objects = ProgramObjects {
            vertex,
            fragment,
            vertex_entry: program.vertex_entry.clone(),
            fragment_entry: program.fragment_entry.clone(),
            bind_group_layout,
            layout,
            uniform_size,
        };

        let id = u32::try_from(self.programs.len())
            .map_err(|_| GfxError::Gpu("too many shader programs".into()))?;
        self.programs.push(Some(objects));
        Ok(RawProgram(id))
    }

    fn create_buffer(&mut self, kind: BufferKind, bytes: &[u8]) -> Result<BufferId> {
        let (label, usage) = match kind {
            BufferKind::Vertex => ("carrier vertex buffer", wgpu::BufferUsages::VERTEX),
            BufferKind::Index => ("carrier index buffer", wgpu::BufferUsages::INDEX),
        };

        let id = u32::try_from(self.buffers.len())
            .map_err(|_| GfxError::Gpu("too many buffers".into()))?;

        let buffer = self
            .gpu
            .borrow()
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytes,
                usage,
            });

        self.buffers.push(Some(buffer));
        Ok(BufferId(id))
    }

    fn release_program(&mut self, program: RawProgram) {
        if let Some(slot) = self.programs.get_mut(program.0 as usize) {
            *slot = None;
        }
        self.pipelines.retain(|key, _| key.program != program);
        self.rejected.retain(|key| key.program != program);
    }

    fn release_buffer(&mut self, buffer: BufferId) {
        if let Some(b) = self.buffers.get_mut(buffer.0 as usize).and_then(Option::take) {
            b.destroy();
        }
    }

    fn present(&mut self, frame: &FrameRecording) -> Result<()> {
        for op in frame.ops() {
            if let FrameOp::Draw(draw) = op {
                self.ensure_pipeline(draw);
            }
        }
        self.upload_uniforms(frame.uniforms());
        let bind_groups = self.bind_groups(frame);

        let mut gpu = self.gpu.borrow_mut();
        let mut target = match gpu.begin_frame() {
            Ok(target) => target,
            Err(e) => {
                return match gpu.handle_surface_error(&e) {
                    SurfaceErrorAction::Fatal => Err(GfxError::Surface(e.to_string())),
                    action => {
                        log::warn!("frame skipped ({action:?}): {e}");
                        Ok(())
                    }
                };
            }
        };

        let viewport = gpu.viewport();

        for (clear, draws) in frame.passes() {
            let color_load = match clear {
                Some(c) => wgpu::LoadOp::Clear(c.color.to_wgpu()),
                None => wgpu::LoadOp::Load,
            };
            let depth_load = match clear.and_then(|c| c.depth) {
                Some(d) => wgpu::LoadOp::Clear(d),
                None => wgpu::LoadOp::Load,
            };
            let stencil_load = match clear.and_then(|c| c.stencil) {
                Some(s) => wgpu::LoadOp::Clear(s),
                None => wgpu::LoadOp::Load,
            };

            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("carrier pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations { load: color_load, store: wgpu::StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations { load: depth_load, store: wgpu::StoreOp::Store }),
                    stencil_ops: Some(wgpu::Operations { load: stencil_load, store: wgpu::StoreOp::Store }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if viewport.width == 0 || viewport.height == 0 {
                continue;
            }
            rpass.set_viewport(
                viewport.x as f32,
                viewport.y as f32,
                viewport.width as f32,
                viewport.height as f32,
                0.0,
                1.0,
            );

            for draw in draws {
                let Some(pipeline) = self.pipelines.get(&self.key(draw)) else { continue };
                let Some(vertices) = self.buffer(draw.vertex_buffer) else { continue };
                let end = draw.first.saturating_add(draw.count);

                rpass.set_pipeline(pipeline);
                if let (Some(offset), Some(group)) = (draw.uniform_offset, bind_groups.get(&draw.program)) {
                    rpass.set_bind_group(0, group, &[offset]);
                }
                rpass.set_vertex_buffer(0, vertices.slice(..));

                let indexed = matches!(draw.path, DrawPath::Elements | DrawPath::ElementsInstanced);
                match draw.index_buffer.and_then(|id| self.buffer(id)) {
                    Some(indices) if indexed => {
                        if u64::from(end) * 4 > indices.size() {
                            log::warn!("draw skipped: indices {}..{end} out of range", draw.first);
                            continue;
                        }
                        rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                        rpass.draw_indexed(draw.first..end, 0, 0..draw.instances);
                    }
                    _ => {
                        if u64::from(end) * VERTEX_STRIDE as u64 > vertices.size() {
                            log::warn!("draw skipped: vertices {}..{end} out of range", draw.first);
                            continue;
                        }
                        rpass.draw(draw.first..end, 0..draw.instances);
                    }
                }
            }
        }

        gpu.submit(target);
        Ok(())
    }
}
