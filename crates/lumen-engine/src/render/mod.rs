//! GPU rendering subsystem.
//!
//! The only renderer is the framebuffer presenter in [`screen`]. It owns its
//! GPU resources (pipeline, buffers, texture) and draws into any
//! [`PresentSurface`](crate::device::PresentSurface).
//!
//! Convention:
//! - quad geometry is in native frame pixels (centre origin, +Y up).
//! - the vertex shader scales to NDC using a viewport uniform.

pub mod screen;

pub use screen::{FramePresenter, FrameStatus, PresentError, PresenterConfig, ScalingPolicy};
