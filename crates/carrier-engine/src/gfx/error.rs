use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Shader stage, as named in compile errors.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Recoverable graphics errors.
///
/// Every failing registry operation logs its error once and returns it; the
/// registry is left exactly as it was before the call.
#[derive(Error, Debug)]
pub enum GfxError {
    /// A shader source file could not be read.
    #[error("failed to read shader file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stage failed to parse or validate. `log` starts with the
    /// compiler's one-line summary, followed by the annotated source.
    #[error("failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },

    /// The two stages do not fit together.
    #[error("failed to link shader program: {log}")]
    Link { log: String },

    /// Resource creation was rejected.
    #[error("GPU error: {0}")]
    Gpu(String),

    /// Presentation failed in a way the frame loop cannot recover from.
    #[error("surface error: {0}")]
    Surface(String),

    #[error("graphics module is not initialized")]
    NotInitialized,

    #[error("graphics module is already initialized")]
    AlreadyInitialized,
}

pub type Result<T> = std::result::Result<T, GfxError>;
