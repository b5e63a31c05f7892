use crate::coords::FrameSize;
use crate::frame::BYTES_PER_PIXEL;

use super::PresentError;

/// Destination of a whole-frame upload.
///
/// The GPU implementation is [`GpuTextureWriter`]; tests substitute a CPU
/// texture so the copy contract can be checked without an adapter.
pub trait TextureWriter {
    /// Dimensions of the destination texture.
    fn size(&self) -> FrameSize;

    /// Returns false when the destination cannot accept writes this frame.
    ///
    /// [`GpuTextureWriter`] always accepts: its texture lives exactly as long
    /// as the presenter's resources, and a presenter without resources fails
    /// with `NotReady` before uploading. Writers over storage that can go away
    /// independently (a CPU mirror, a shared texture) override this.
    fn is_writable(&self) -> bool {
        true
    }

    /// Replaces the whole texture with `pixels`.
    ///
    /// Callers guarantee `pixels.len() == size().pixel_count() * BYTES_PER_PIXEL`.
    fn write_frame(&mut self, pixels: &[u8]);
}

/// Counters kept by [`FrameUploader`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub frames_uploaded: u64,
    pub bytes_uploaded: u64,
    pub rejected: u64,
}

/// Validates host frames and copies them into the frame texture.
///
/// One call is one bulk copy of the caller's buffer; there is no per-pixel
/// work on this path. A rejected frame never reaches the writer, so the
/// previous contents stay intact.
#[derive(Debug, Default)]
pub struct FrameUploader {
    stats: UploadStats,
}

impl FrameUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> UploadStats {
        self.stats
    }

    pub fn upload<W>(
        &mut self,
        writer: &mut W,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), PresentError>
    where
        W: TextureWriter + ?Sized,
    {
        let texture = writer.size();
        let frame = FrameSize::new(width, height);
        let expected_len = texture.byte_len(BYTES_PER_PIXEL).unwrap_or(usize::MAX);

        if frame != texture || pixels.len() != expected_len {
            self.stats.rejected += 1;
            return Err(PresentError::DimensionMismatch {
                texture,
                frame,
                expected_len,
                actual_len: pixels.len(),
            });
        }

        if !writer.is_writable() {
            self.stats.rejected += 1;
            return Err(PresentError::unavailable("texture is not writable"));
        }

        writer.write_frame(pixels);

        self.stats.frames_uploaded += 1;
        self.stats.bytes_uploaded += pixels.len() as u64;
        Ok(())
    }
}

// ── GPU frame texture ─────────────────────────────────────────────────────

/// Sampled 2D texture holding the current frame.
///
/// Allocated once at the native resolution; never resized per frame.
pub struct FrameTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: FrameSize,
}

impl FrameTexture {
    pub fn new(
        device: &wgpu::Device,
        size: FrameSize,
        format: wgpu::TextureFormat,
    ) -> Result<Self, PresentError> {
        if size.is_empty() {
            return Err(PresentError::unavailable("frame texture cannot be zero-sized"));
        }

        let max = device.limits().max_texture_dimension_2d;
        if size.width > max || size.height > max {
            return Err(PresentError::unavailable(format!(
                "{}x{} exceeds the device limit of {max}",
                size.width, size.height
            )));
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lumen frame texture"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            size,
        })
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Binds the texture to `queue` for one upload.
    pub fn writer<'a>(&'a self, queue: &'a wgpu::Queue) -> GpuTextureWriter<'a> {
        GpuTextureWriter { queue, texture: self }
    }

    /// Frees the GPU allocation now instead of when the last handle drops.
    pub fn release(self) {
        self.texture.destroy();
    }
}

/// [`TextureWriter`] backed by `wgpu::Queue::write_texture`.
pub struct GpuTextureWriter<'a> {
    queue: &'a wgpu::Queue,
    texture: &'a FrameTexture,
}

impl TextureWriter for GpuTextureWriter<'_> {
    fn size(&self) -> FrameSize {
        self.texture.size
    }

    fn write_frame(&mut self, pixels: &[u8]) {
        let size = self.texture.size;
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.width * BYTES_PER_PIXEL as u32),
                rows_per_image: Some(size.height),
            },
            wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
        );
    }
}
