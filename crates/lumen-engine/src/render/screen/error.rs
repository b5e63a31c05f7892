use std::fmt;

use crate::coords::FrameSize;

/// Failure reported by the framebuffer presenter.
///
/// Severity:
/// - `PipelineCreation` and `SurfaceLost` are fatal; the renderer cannot continue.
/// - `DimensionMismatch` and `ResourceUnavailable` are per-frame; drop the frame
///   and keep the loop running.
/// - `NotReady` is a call-ordering bug in the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentError {
    /// Shader program failed to compile, validate, or match the binding ABI.
    PipelineCreation(String),
    /// Pixel buffer does not describe a frame of the texture's dimensions.
    DimensionMismatch {
        /// Dimensions of the frame texture.
        texture: FrameSize,
        /// Dimensions the caller declared.
        frame: FrameSize,
        /// Byte length the texture requires.
        expected_len: usize,
        /// Byte length the caller passed.
        actual_len: usize,
    },
    /// The frame texture is missing or cannot be written this frame.
    ResourceUnavailable(String),
    /// `render_frame` was called before `initialize` or after `shutdown`.
    NotReady,
    /// The surface reported an unrecoverable condition (out of memory).
    SurfaceLost,
}

impl PresentError {
    /// Returns true when the render loop must stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PipelineCreation(_) | Self::SurfaceLost)
    }

    pub(crate) fn pipeline(msg: impl Into<String>) -> Self {
        Self::PipelineCreation(msg.into())
    }

    pub(crate) fn unavailable(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable(msg.into())
    }
}

impl fmt::Display for PresentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PipelineCreation(msg) => write!(f, "pipeline creation failed: {msg}"),
            Self::DimensionMismatch { texture, frame, expected_len, actual_len } => write!(
                f,
                "frame {}x{} ({actual_len} bytes) does not match {}x{} texture ({expected_len} bytes)",
                frame.width, frame.height, texture.width, texture.height
            ),
            Self::ResourceUnavailable(msg) => write!(f, "frame texture unavailable: {msg}"),
            Self::NotReady => write!(f, "presenter is not initialized"),
            Self::SurfaceLost => write!(f, "surface lost (out of memory)"),
        }
    }
}

impl std::error::Error for PresentError {}
