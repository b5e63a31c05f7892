use std::sync::mpsc;

use anyhow::{Context, Result};

use crate::coords::ViewportSize;
use crate::frame::BYTES_PER_PIXEL;

use super::context::request_device;
use super::{GpuFrame, GpuInit, PresentSurface, SurfaceErrorAction};

/// Offscreen render target with CPU readback.
///
/// Stands in for a window surface where none exists (CI, screenshots). Frames
/// are rendered into an RGBA8 texture that [`read_back`](Self::read_back)
/// copies to host memory.
pub struct HeadlessGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    target: Option<wgpu::Texture>,
    size: ViewportSize,
}

impl HeadlessGpu {
    /// Creates a device without a compatible surface.
    ///
    /// Fails when the platform exposes no adapter at all.
    pub async fn new(size: ViewportSize, init: GpuInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("no GPU adapter available for headless rendering")?;

        let (device, queue) = request_device(&adapter, &init, "lumen headless device").await?;

        let format = if init.prefer_srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let info = adapter.get_info();
        log::debug!("headless gpu: {} ({:?}) {:?}", info.name, info.backend, format);

        let mut gpu = Self {
            device,
            queue,
            format,
            target: None,
            size: ViewportSize::default(),
        };
        gpu.resize(size);
        Ok(gpu)
    }

    /// Reallocates the target. A zero-area size drops it.
    pub fn resize(&mut self, new_size: ViewportSize) {
        if new_size == self.size && self.target.is_some() {
            return;
        }

        if let Some(old) = self.target.take() {
            old.destroy();
        }
        self.size = new_size;

        if new_size.is_empty() {
            return;
        }

        self.target = Some(self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lumen headless target"),
            size: wgpu::Extent3d {
                width: new_size.width,
                height: new_size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        }));
    }

    /// Copies the target to host memory as tightly packed RGBA8 rows.
    pub fn read_back(&self) -> Result<Vec<u8>> {
        let target = self
            .target
            .as_ref()
            .context("headless target has zero area")?;

        let width = self.size.width;
        let height = self.size.height;
        let unpadded_bpr = width * BYTES_PER_PIXEL as u32;
        let padded_bpr = padded_bytes_per_row(unpadded_bpr);

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen readback buffer"),
            size: padded_bpr as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen readback encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bpr),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = sender.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("device poll failed during readback")?;

        receiver
            .recv()
            .context("readback callback dropped")?
            .context("readback map failed")?;

        let mapped = slice.get_mapped_range();
        let mut rgba = Vec::with_capacity(unpadded_bpr as usize * height as usize);
        for row in mapped.chunks_exact(padded_bpr as usize) {
            rgba.extend_from_slice(&row[..unpadded_bpr as usize]);
        }
        drop(mapped);
        readback.unmap();

        Ok(rgba)
    }
}

impl PresentSurface for HeadlessGpu {
    fn device(&self) -> &wgpu::Device {
        &self.device
    }

    fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    fn size(&self) -> ViewportSize {
        self.size
    }

    fn begin_frame(&mut self) -> Result<GpuFrame, wgpu::SurfaceError> {
        // Mirrors a minimized window: nothing to acquire.
        let target = self.target.as_ref().ok_or(wgpu::SurfaceError::Outdated)?;

        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen headless encoder"),
            });

        Ok(GpuFrame {
            surface_texture: None,
            view,
            encoder,
        })
    }

    fn submit(&mut self, frame: GpuFrame) {
        frame.finish(&self.queue);
    }

    fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        match err {
            wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            _ => SurfaceErrorAction::SkipFrame,
        }
    }
}

fn padded_bytes_per_row(unpadded: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}
