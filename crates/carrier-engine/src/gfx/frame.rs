//! Frame recording: the ordered clears and draws collected between
//! `begin_pass` and `commit`, plus the uniform snapshots the draws reference.

use super::types::{BufferId, Color, FillMode, PassAction, Topology};
use super::backend::RawProgram;

/// Clears requested by one `begin_pass`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearOps {
    pub color: Color,
    pub depth: Option<f32>,
    pub stencil: Option<u32>,
}

impl ClearOps {
    pub fn from_action(action: &PassAction) -> Self {
        let depth = (0.0..=1.0)
            .contains(&action.clear_depth)
            .then_some(action.clear_depth);
        let stencil = u32::try_from(action.clear_stencil).ok();

        Self { color: action.clear_color, depth, stencil }
    }
}

/// Which draw entry point a draw uses.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawPath {
    Elements,
    ElementsInstanced,
    Arrays,
    ArraysInstanced,
}

/// Selects the draw path: indexed when the geometry has indices, instanced
/// when more than one instance is requested.
pub fn plan_draw(indexed: bool, instances: u32) -> DrawPath {
    match (indexed, instances > 1) {
        (true, true) => DrawPath::ElementsInstanced,
        (true, false) => DrawPath::Elements,
        (false, true) => DrawPath::ArraysInstanced,
        (false, false) => DrawPath::Arrays,
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCommand {
    pub program: RawProgram,
    pub topology: Topology,
    pub fill: FillMode,
    pub vertex_buffer: BufferId,
    pub index_buffer: Option<BufferId>,
    /// First index (indexed) or first vertex.
    pub first: u32,
    pub count: u32,
    /// Always at least 1.
    pub instances: u32,
    pub path: DrawPath,
    /// Offset of the uniform snapshot in [`FrameRecording::uniforms`].
    pub uniform_offset: Option<u32>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FrameOp {
    Clear(ClearOps),
    Draw(DrawCommand),
}

/// Everything `commit` replays into the swapchain image.
#[derive(Debug)]
pub struct FrameRecording {
    ops: Vec<FrameOp>,
    uniforms: Vec<u8>,
    alignment: u32,
}

impl FrameRecording {
    /// `alignment` is the backend's dynamic uniform offset alignment.
    pub fn new(alignment: u32) -> Self {
        Self { ops: Vec::new(), uniforms: Vec::new(), alignment: alignment.max(4) }
    }

    pub fn clear(&mut self, ops: ClearOps) {
        self.ops.push(FrameOp::Clear(ops));
    }

    pub fn draw(&mut self, cmd: DrawCommand) {
        self.ops.push(FrameOp::Draw(cmd));
    }

    /// Copies a uniform block into the frame and returns its offset.
    pub fn push_uniforms(&mut self, bytes: &[u8]) -> u32 {
        let align = self.alignment as usize;
        let offset = self.uniforms.len().div_ceil(align) * align;
        self.uniforms.resize(offset, 0);
        self.uniforms.extend_from_slice(bytes);

        // Keep the total a multiple of 4 for buffer writes.
        let padded = self.uniforms.len().div_ceil(4) * 4;
        self.uniforms.resize(padded, 0);

        offset as u32
    }

    pub fn ops(&self) -> &[FrameOp] {
        &self.ops
    }

    pub fn uniforms(&self) -> &[u8] {
        &self.uniforms
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn reset(&mut self) {
        self.ops.clear();
        self.uniforms.clear();
    }

    /// Splits the ops into render passes: a new pass starts at every clear.
    /// Draws recorded before the first clear form a pass that loads the
    /// previous contents.
    pub fn passes(&self) -> Vec<(Option<ClearOps>, Vec<&DrawCommand>)> {
        let mut passes: Vec<(Option<ClearOps>, Vec<&DrawCommand>)> = Vec::new();
        for op in &self.ops {
            match op {
                FrameOp::Clear(c) => passes.push((Some(*c), Vec::new())),
                FrameOp::Draw(d) => match passes.last_mut() {
                    Some((_, draws)) => draws.push(d),
                    None => passes.push((None, vec![d])),
                },
            }
        }
        passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(depth: f32, stencil: i32) -> PassAction {
        PassAction { clear_color: Color::BLACK, clear_depth: depth, clear_stencil: stencil }
    }

    #[test]
    fn depth_cleared_only_inside_unit_range() {
        assert_eq!(ClearOps::from_action(&action(1.0, -1)).depth, Some(1.0));
        assert_eq!(ClearOps::from_action(&action(0.0, -1)).depth, Some(0.0));
        assert_eq!(ClearOps::from_action(&action(-1.0, -1)).depth, None);
        assert_eq!(ClearOps::from_action(&action(1.5, -1)).depth, None);
    }

    #[test]
    fn stencil_cleared_only_when_non_negative() {
        assert_eq!(ClearOps::from_action(&action(-1.0, 0)).stencil, Some(0));
        assert_eq!(ClearOps::from_action(&action(-1.0, 7)).stencil, Some(7));
        assert_eq!(ClearOps::from_action(&action(-1.0, -1)).stencil, None);
    }

    #[test]
    fn draw_path_selection() {
        assert_eq!(plan_draw(true, 1), DrawPath::Elements);
        assert_eq!(plan_draw(true, 4), DrawPath::ElementsInstanced);
        assert_eq!(plan_draw(false, 0), DrawPath::Arrays);
        assert_eq!(plan_draw(false, 1), DrawPath::Arrays);
        assert_eq!(plan_draw(false, 2), DrawPath::ArraysInstanced);
    }

    #[test]
    fn uniform_snapshots_are_aligned() {
        let mut frame = FrameRecording::new(256);
        assert_eq!(frame.push_uniforms(&[1; 80]), 0);
        assert_eq!(frame.push_uniforms(&[2; 80]), 256);
        assert_eq!(frame.uniforms().len(), 336);
        assert_eq!(frame.uniforms()[256], 2);

        frame.reset();
        assert!(frame.uniforms().is_empty());
    }

    #[test]
    fn passes_split_at_clears() {
        let draw = DrawCommand {
            program: RawProgram(0),
            topology: Topology::Triangles,
            fill: FillMode::Fill,
            vertex_buffer: BufferId(0),
            index_buffer: None,
            first: 0,
            count: 3,
            instances: 1,
            path: DrawPath::Arrays,
            uniform_offset: None,
        };
        let clear = ClearOps::from_action(&PassAction::default());

        let mut frame = FrameRecording::new(256);
        frame.draw(draw);
        frame.clear(clear);
        frame.draw(draw);
        frame.draw(draw);

        let passes = frame.passes();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].0, None);
        assert_eq!(passes[0].1.len(), 1);
        assert_eq!(passes[1].0, Some(clear));
        assert_eq!(passes[1].1.len(), 2);
    }
}
