//! WGSL compilation, reflection and link checks.
//!
//! Runs entirely on naga so a program is known to be valid before any GPU
//! object is created for it.

use std::io;
use std::path::Path;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, Module, Scalar, ScalarKind, Type, TypeInner, VectorSize};

use super::error::{GfxError, Result, ShaderStage};

/// Reads shader sources.
pub trait SourceLoader {
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// Reads sources from the file system as UTF-8.
#[derive(Debug, Default, Copy, Clone)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    Mat4,
    Vec4,
    Other,
}

/// One member of a uniform block.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformField {
    pub name: String,
    pub offset: u32,
    pub size: u32,
    pub kind: UniformKind,
}

/// Layout of the uniform block at `@group(0) @binding(0)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformBlock {
    pub fields: Vec<UniformField>,
    /// Total size in bytes, including trailing padding.
    pub size: u32,
}

impl UniformBlock {
    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A single stage that parsed and validated.
#[derive(Debug)]
pub struct CompiledStage {
    pub stage: ShaderStage,
    pub source: String,
    pub entry_point: String,
    inputs: Vec<(u32, TypeInner)>,
    outputs: Vec<(u32, TypeInner)>,
    uniform: Option<UniformBlock>,
}

/// A vertex and fragment stage that fit together.
#[derive(Debug, Clone)]
pub struct LinkedProgram {
    pub vertex_source: String,
    pub vertex_entry: String,
    pub fragment_source: String,
    pub fragment_entry: String,
    /// Uniform block shared by both stages, if either declares one.
    pub uniform: Option<UniformBlock>,
}

const POSITION: TypeInner = TypeInner::Vector { size: VectorSize::Tri, scalar: Scalar::F32 };
const COLOR: TypeInner = TypeInner::Vector { size: VectorSize::Quad, scalar: Scalar::F32 };

/// Shader capabilities a device with `features` and `downlevel` flags can run.
///
/// Covers what a vertex or fragment stage may use; everything else stays
/// disabled so the validator rejects it.
pub fn capabilities_for(features: wgpu::Features, downlevel: wgpu::DownlevelFlags) -> Capabilities {
    const FEATURE_CAPS: [(wgpu::Features, Capabilities); 9] = [
        (wgpu::Features::IMMEDIATES, Capabilities::IMMEDIATES),
        (wgpu::Features::SHADER_F64, Capabilities::FLOAT64),
        (wgpu::Features::SHADER_F16, Capabilities::SHADER_FLOAT16),
        (wgpu::Features::SHADER_INT64, Capabilities::SHADER_INT64),
        (wgpu::Features::SHADER_PRIMITIVE_INDEX, Capabilities::PRIMITIVE_INDEX),
        (wgpu::Features::SHADER_EARLY_DEPTH_TEST, Capabilities::EARLY_DEPTH_TEST),
        (wgpu::Features::MULTIVIEW, Capabilities::MULTIVIEW),
        (wgpu::Features::DUAL_SOURCE_BLENDING, Capabilities::DUAL_SOURCE_BLENDING),
        (wgpu::Features::CLIP_DISTANCES, Capabilities::CLIP_DISTANCE),
    ];

    let mut caps = Capabilities::empty();
    for (feature, cap) in FEATURE_CAPS {
        caps.set(cap, features.contains(feature));
    }
    caps.set(
        Capabilities::MULTISAMPLED_SHADING,
        downlevel.contains(wgpu::DownlevelFlags::MULTISAMPLED_SHADING),
    );
    caps.set(
        Capabilities::CUBE_ARRAY_TEXTURES,
        downlevel.contains(wgpu::DownlevelFlags::CUBE_ARRAY_TEXTURES),
    );
    caps
}

/// Parses one stage and validates it against `capabilities`.
pub fn compile(stage: ShaderStage, source: &str, capabilities: Capabilities) -> Result<CompiledStage> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| GfxError::Compile {
        stage,
        log: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), capabilities)
        .validate(&module)
        .map_err(|e| GfxError::Compile { stage, log: e.emit_to_string(source) })?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };
    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == wanted)
        .ok_or_else(|| GfxError::Compile {
            stage,
            log: format!("no @{stage} entry point"),
        })?;

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_locations(&module, arg.binding.as_ref(), arg.ty, &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_locations(&module, result.binding.as_ref(), result.ty, &mut outputs);
    }

    let uniform = reflect_uniform(&module).map_err(|log| GfxError::Compile { stage, log })?;

    Ok(CompiledStage {
        stage,
        source: source.to_owned(),
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        uniform,
    })
}

/// Checks that the stages fit the fixed vertex layout and each other.
pub fn link(vertex: CompiledStage, fragment: CompiledStage) -> Result<LinkedProgram> {
    let fail = |log: String| GfxError::Link { log };

    for (location, ty) in &vertex.inputs {
        if *location != 0 {
            return Err(fail(format!(
                "vertex input @location({location}) has no attribute; only the position at @location(0) is supplied"
            )));
        }
        if *ty != POSITION {
            return Err(fail("vertex input @location(0) must be vec3<f32>".to_owned()));
        }
    }

    for (location, ty) in &fragment.inputs {
        match vertex.outputs.iter().find(|(l, _)| l == location) {
            None => {
                return Err(fail(format!(
                    "fragment input @location({location}) is not written by the vertex stage"
                )));
            }
            Some((_, out_ty)) if out_ty != ty => {
                return Err(fail(format!(
                    "fragment input @location({location}) does not match the vertex output type"
                )));
            }
            Some(_) => {}
        }
    }

    match fragment.outputs.as_slice() {
        [(0, ty)] if *ty == COLOR => {}
        [(0, _)] => return Err(fail("fragment output @location(0) must be vec4<f32>".to_owned())),
        _ => {
            return Err(fail(
                "fragment stage must write exactly one colour output at @location(0)".to_owned(),
            ));
        }
    }

    let uniform = merge_uniforms(vertex.uniform, fragment.uniform).map_err(fail)?;

    Ok(LinkedProgram {
        vertex_source: vertex.source,
        vertex_entry: vertex.entry_point,
        fragment_source: fragment.source,
        fragment_entry: fragment.entry_point,
        uniform,
    })
}

fn collect_locations(
    module: &Module,
    binding: Option<&Binding>,
    ty: Handle<Type>,
    out: &mut Vec<(u32, TypeInner)>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.push((*location, module.types[ty].inner.clone()));
        }
        Some(_) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.binding.as_ref(), member.ty, out);
                }
            }
        }
    }
}

fn reflect_uniform(module: &Module) -> std::result::Result<Option<UniformBlock>, String> {
    let mut block = None;

    for (_, var) in module.global_variables.iter() {
        let Some(rb) = &var.binding else { continue };

        if var.space != AddressSpace::Uniform || rb.group != 0 || rb.binding != 0 {
            return Err(format!(
                "unsupported resource at @group({}) @binding({}); only a uniform block at @group(0) @binding(0) is allowed",
                rb.group, rb.binding
            ));
        }
        if block.is_some() {
            return Err("more than one uniform block at @group(0) @binding(0)".to_owned());
        }

        block = Some(describe_block(module, var.name.as_deref(), var.ty));
    }

    Ok(block)
}

fn describe_block(module: &Module, var_name: Option<&str>, ty: Handle<Type>) -> UniformBlock {
    let gctx = module.to_ctx();
    let inner = &module.types[ty].inner;

    match inner {
        TypeInner::Struct { members, span } => UniformBlock {
            fields: members
                .iter()
                .map(|m| {
                    let member_inner = &module.types[m.ty].inner;
                    UniformField {
                        name: m.name.clone().unwrap_or_default(),
                        offset: m.offset,
                        size: member_inner.size(gctx),
                        kind: kind_of(member_inner),
                    }
                })
                .collect(),
            size: *span,
        },
        // A bare `var<uniform> name: T` is a block with one member.
        other => {
            let size = other.size(gctx);
            UniformBlock {
                fields: vec![UniformField {
                    name: var_name.unwrap_or_default().to_owned(),
                    offset: 0,
                    size,
                    kind: kind_of(other),
                }],
                size,
            }
        }
    }
}

fn kind_of(inner: &TypeInner) -> UniformKind {
    match inner {
        TypeInner::Matrix { columns: VectorSize::Quad, rows: VectorSize::Quad, scalar }
            if scalar.kind == ScalarKind::Float && scalar.width == 4 =>
        {
            UniformKind::Mat4
        }
        TypeInner::Vector { size: VectorSize::Quad, scalar }
            if scalar.kind == ScalarKind::Float && scalar.width == 4 =>
        {
            UniformKind::Vec4
        }
        _ => UniformKind::Other,
    }
}

fn merge_uniforms(
    vertex: Option<UniformBlock>,
    fragment: Option<UniformBlock>,
) -> std::result::Result<Option<UniformBlock>, String> {
    match (vertex, fragment) {
        (None, None) => Ok(None),
        (Some(block), None) | (None, Some(block)) => Ok(Some(block)),
        (Some(mut merged), Some(fragment)) => {
            for field in fragment.fields {
                let existing = merged.field(&field.name).map(|f| (f.offset, f.kind));
                match existing {
                    Some((offset, kind)) if offset != field.offset || kind != field.kind => {
                        return Err(format!(
                            "uniform `{}` is at offset {} in the vertex stage but {} in the fragment stage",
                            field.name, offset, field.offset
                        ));
                    }
                    Some(_) => {}
                    None => merged.fields.push(field),
                }
            }
            merged.size = merged.size.max(fragment.size);
            Ok(Some(merged))
        }
    }
}
