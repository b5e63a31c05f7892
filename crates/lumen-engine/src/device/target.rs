use crate::coords::ViewportSize;

use super::{GpuFrame, SurfaceErrorAction};

/// Something the presenter can draw a frame into.
///
/// Implemented by the windowed [`Gpu`](super::Gpu) and the offscreen
/// [`HeadlessGpu`](super::HeadlessGpu).
pub trait PresentSurface {
    fn device(&self) -> &wgpu::Device;

    fn queue(&self) -> &wgpu::Queue;

    /// Format of the color attachment returned by [`begin_frame`](Self::begin_frame).
    fn surface_format(&self) -> wgpu::TextureFormat;

    /// Current drawable size in physical pixels. May be zero.
    fn size(&self) -> ViewportSize;

    /// Acquires the next color target and creates an encoder.
    fn begin_frame(&mut self) -> Result<GpuFrame, wgpu::SurfaceError>;

    /// Submits the recorded commands and presents.
    fn submit(&mut self, frame: GpuFrame);

    /// Recovers from an acquire failure where possible.
    fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction;
}
