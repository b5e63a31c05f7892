//! GPU device + presentable target management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the window Surface (swapchain), or an offscreen
//!   target when no window exists
//! - acquiring frames and providing encoders/views for rendering

mod context;
mod error;
mod frame;
mod headless;
mod init;
mod surface;
mod target;

pub use context::Gpu;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use headless::HeadlessGpu;
pub use init::GpuInit;
pub use target::PresentSurface;
