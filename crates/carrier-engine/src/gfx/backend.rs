use naga::valid::Capabilities;

use super::error::Result;
use super::frame::FrameRecording;
use super::shader::LinkedProgram;
use super::types::{BufferId, GraphicsConfig};

/// Backend-side handle of a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawProgram(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// GPU side of the graphics registry.
///
/// The registry validates everything it can before calling in here, and
/// only stores handles returned by successful calls.
pub trait RasterBackend {
    /// Alignment of uniform snapshot offsets.
    fn uniform_alignment(&self) -> u32;

    /// Whether line fill mode can be honoured.
    fn supports_wireframe(&self) -> bool;

    /// Shader features the device can run; shaders are validated against these.
    fn shader_capabilities(&self) -> Capabilities;

    /// Fixes the depth and blend state used by every pipeline.
    fn configure(&mut self, config: &GraphicsConfig);

    fn create_program(&mut self, program: &LinkedProgram) -> Result<RawProgram>;

    fn create_buffer(&mut self, kind: BufferKind, bytes: &[u8]) -> Result<BufferId>;

    fn release_program(&mut self, program: RawProgram);

    fn release_buffer(&mut self, buffer: BufferId);

    /// Replays the frame into the next swapchain image and presents it.
    ///
    /// A frame skipped because the surface was lost or outdated is not an
    /// error.
    fn present(&mut self, frame: &FrameRecording) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod recording {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::gfx::error::GfxError;
    use crate::gfx::frame::FrameOp;

    /// Calls observed by a [`RecordingBackend`].
    #[derive(Debug, Default)]
    pub(crate) struct Recorded {
        pub config: Option<GraphicsConfig>,
        pub programs: Vec<LinkedProgram>,
        pub buffers: Vec<(BufferKind, usize)>,
        pub released_programs: Vec<RawProgram>,
        pub released_buffers: Vec<BufferId>,
        pub presented: Vec<Vec<FrameOp>>,
        pub presented_uniforms: Vec<Vec<u8>>,
    }

    /// Headless backend; the log is shared so tests can inspect it after
    /// the registry is gone.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingBackend {
        pub log: Rc<RefCell<Recorded>>,
        pub wireframe: bool,
        pub capabilities: Capabilities,
        pub fail_buffers_after: Option<usize>,
        pub fail_present: bool,
    }

    impl RasterBackend for RecordingBackend {
        fn uniform_alignment(&self) -> u32 {
            256
        }

        fn supports_wireframe(&self) -> bool {
            self.wireframe
        }

        fn shader_capabilities(&self) -> Capabilities {
            self.capabilities
        }

        fn configure(&mut self, config: &GraphicsConfig) {
            self.log.borrow_mut().config = Some(*config);
        }

        fn create_program(&mut self, program: &LinkedProgram) -> Result<RawProgram> {
            let mut log = self.log.borrow_mut();
            log.programs.push(program.clone());
            Ok(RawProgram(log.programs.len() as u32 - 1))
        }

        fn create_buffer(&mut self, kind: BufferKind, bytes: &[u8]) -> Result<BufferId> {
            let mut log = self.log.borrow_mut();
            if self.fail_buffers_after.is_some_and(|n| log.buffers.len() >= n) {
                return Err(GfxError::Gpu("out of buffers".into()));
            }
            log.buffers.push((kind, bytes.len()));
            Ok(BufferId(log.buffers.len() as u32 - 1))
        }

        fn release_program(&mut self, program: RawProgram) {
            self.log.borrow_mut().released_programs.push(program);
        }

        fn release_buffer(&mut self, buffer: BufferId) {
            self.log.borrow_mut().released_buffers.push(buffer);
        }

        fn present(&mut self, frame: &FrameRecording) -> Result<()> {
            if self.fail_present {
                return Err(GfxError::Surface("out of memory".into()));
            }
            let mut log = self.log.borrow_mut();
            log.presented.push(frame.ops().to_vec());
            log.presented_uniforms.push(frame.uniforms().to_vec());
            Ok(())
        }
    }
}
