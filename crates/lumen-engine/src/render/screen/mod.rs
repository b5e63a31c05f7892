//! Framebuffer presentation.
//!
//! Draws a software-rendered frame as one textured quad:
//! - `geometry`: the static quad, built once per native resolution
//! - `upload`: per-frame bulk copy of host pixels into the frame texture
//! - `presenter`: pipeline, bindings and the per-frame draw
//!
//! Slot numbers shared with the shader live in `abi`.

pub mod abi;
mod error;
mod geometry;
mod presenter;
mod scaling;
mod upload;

pub use error::PresentError;
pub use geometry::QuadGeometry;
pub use presenter::{
    frame_texture_format, FramePresenter, FrameStatus, PresenterConfig, PresenterState,
};
pub use scaling::{ScalingPolicy, UnknownScalingPolicy};
pub use upload::{FrameTexture, FrameUploader, GpuTextureWriter, TextureWriter, UploadStats};
