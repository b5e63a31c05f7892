/// Represents a single acquired frame.
///
/// This object is short-lived and must be finalized promptly. Holding the surface
/// texture prevents acquisition of subsequent frames.
pub struct GpuFrame {
    /// Swapchain image, or `None` when rendering into an offscreen target.
    pub surface_texture: Option<wgpu::SurfaceTexture>,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Submits the recorded commands and presents the swapchain image, if any.
    pub(crate) fn finish(self, queue: &wgpu::Queue) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = self;

        queue.submit(std::iter::once(encoder.finish()));
        drop(view);

        if let Some(surface_texture) = surface_texture {
            surface_texture.present();
        }
    }
}
