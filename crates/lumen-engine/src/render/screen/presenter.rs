use wgpu::util::DeviceExt;

use crate::coords::{FrameSize, ViewportSize};
use crate::device::{PresentSurface, SurfaceErrorAction};

use super::abi::{
    self, ScreenVertex, TextureIndex, VertexInput, ViewportUniform, FRAGMENT_STAGE_GROUP,
    VERTEX_STAGE_GROUP,
};
use super::geometry::QuadGeometry;
use super::scaling::ScalingPolicy;
use super::upload::{FrameTexture, FrameUploader, UploadStats};
use super::PresentError;

/// Lifecycle of a [`FramePresenter`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresenterState {
    /// Constructed; owns no GPU resources.
    Uninitialized,
    /// Resources built; frames may be rendered.
    Ready,
    /// Inside `render_frame`.
    Rendering,
    /// The last operation failed. Per-frame failures leave the presenter
    /// usable; a failed `initialize` does not.
    Failed,
    /// `shutdown` ran; every GPU resource has been released.
    Released,
}

/// Outcome of a successful [`FramePresenter::render_frame`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// The frame was drawn and handed to the compositor.
    Presented,
    /// The frame was uploaded but the surface could not take it this time
    /// (zero area, timeout, or reconfigured after loss).
    Dropped,
}

/// Presenter options.
#[derive(Debug, Clone)]
pub struct PresenterConfig {
    /// How the native frame is fitted onto the surface.
    pub scaling: ScalingPolicy,
    /// Color of the area outside the presented image.
    pub clear_color: wgpu::Color,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            scaling: ScalingPolicy::default(),
            clear_color: wgpu::Color::BLACK,
        }
    }
}

/// GPU objects owned by an initialized presenter.
struct Resources {
    pipeline: wgpu::RenderPipeline,
    geometry: QuadGeometry,
    vertex_buffer: wgpu::Buffer,
    viewport_ubo: wgpu::Buffer,
    vertex_bind_group: wgpu::BindGroup,
    texture: FrameTexture,
    texture_bind_group: wgpu::BindGroup,
}

impl Resources {
    fn release(self) {
        self.texture.release();
        self.vertex_buffer.destroy();
        self.viewport_ubo.destroy();
    }
}

/// Draws emulator frames as a single textured quad.
///
/// Owns every GPU object it uses: pipeline, quad vertex buffer, viewport
/// uniform, frame texture and sampler. Each call to
/// [`render_frame`](Self::render_frame) uploads the frame, clears the target,
/// issues one draw and presents.
pub struct FramePresenter {
    config: PresenterConfig,
    state: PresenterState,
    viewport: ViewportSize,
    uniform_dirty: bool,
    uploader: FrameUploader,
    resources: Option<Resources>,
}

impl FramePresenter {
    pub fn new(config: PresenterConfig) -> Self {
        Self {
            config,
            state: PresenterState::Uninitialized,
            viewport: ViewportSize::default(),
            uniform_dirty: false,
            uploader: FrameUploader::new(),
            resources: None,
        }
    }

    #[inline]
    pub fn state(&self) -> PresenterState {
        self.state
    }

    #[inline]
    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    #[inline]
    pub fn scaling(&self) -> ScalingPolicy {
        self.config.scaling
    }

    pub fn upload_stats(&self) -> UploadStats {
        self.uploader.stats()
    }

    /// Native resolution of the frame texture, once initialized.
    pub fn resolution(&self) -> Option<FrameSize> {
        self.resources.as_ref().map(|r| r.geometry.native_size())
    }

    /// Builds the pipeline and every per-presenter resource.
    ///
    /// Calling this on an initialized presenter rebuilds from scratch.
    pub fn initialize<S>(&mut self, surface: &S, resolution: FrameSize) -> Result<(), PresentError>
    where
        S: PresentSurface + ?Sized,
    {
        if let Some(old) = self.resources.take() {
            old.release();
        }

        match build_resources(surface, resolution) {
            Ok(resources) => {
                self.viewport = surface.size();
                write_viewport_uniform(
                    surface.queue(),
                    &resources,
                    self.config.scaling,
                    self.viewport,
                );
                self.resources = Some(resources);
                self.uniform_dirty = false;
                self.state = PresenterState::Ready;

                log::info!(
                    "presenter ready: {}x{} frame, {}x{} surface, {:?}",
                    resolution.width,
                    resolution.height,
                    self.viewport.width,
                    self.viewport.height,
                    self.config.scaling
                );
                Ok(())
            }
            Err(e) => {
                log::error!("presenter initialization failed: {e}");
                self.state = PresenterState::Failed;
                Err(e)
            }
        }
    }

    /// Records the new drawable size and updates the viewport uniform.
    ///
    /// This is the only way the viewport changes after `initialize`; frames
    /// are laid out against the last size passed here, whatever the surface
    /// reports. Geometry and the frame texture are untouched. A zero-area size
    /// is accepted and collapses the quad, so only the clear colour is drawn.
    pub fn resize<S>(&mut self, surface: &S, new_size: ViewportSize)
    where
        S: PresentSurface + ?Sized,
    {
        self.viewport = new_size;

        if let Some(resources) = self.resources.as_ref() {
            write_viewport_uniform(surface.queue(), resources, self.config.scaling, new_size);
            self.uniform_dirty = false;
        }
    }

    /// Switches the scaling policy. Takes effect on the next resize or frame.
    pub fn set_scaling(&mut self, scaling: ScalingPolicy) {
        if self.config.scaling != scaling {
            self.config.scaling = scaling;
            self.uniform_dirty = true;
        }
    }

    /// Uploads `pixels` and presents them.
    ///
    /// Fails with [`PresentError::NotReady`] before `initialize` or after
    /// `shutdown`, without touching `surface`.
    pub fn render_frame<S>(
        &mut self,
        surface: &mut S,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<FrameStatus, PresentError>
    where
        S: PresentSurface + ?Sized,
    {
        if matches!(
            self.state,
            PresenterState::Uninitialized | PresenterState::Released
        ) {
            return Err(PresentError::NotReady);
        }
        let Some(resources) = self.resources.as_ref() else {
            return Err(PresentError::NotReady);
        };

        self.state = PresenterState::Rendering;

        if let Err(e) =
            self.uploader
                .upload(&mut resources.texture.writer(surface.queue()), pixels, width, height)
        {
            self.state = PresenterState::Failed;
            return Err(e);
        }

        if self.uniform_dirty {
            write_viewport_uniform(surface.queue(), resources, self.config.scaling, self.viewport);
            self.uniform_dirty = false;
        }

        // Nothing to acquire from a zero-area surface.
        if surface.size().is_empty() {
            self.state = PresenterState::Ready;
            return Ok(FrameStatus::Dropped);
        }

        let mut frame = match surface.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::debug!("surface acquire failed: {err:?}");
                return match surface.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        self.state = PresenterState::Ready;
                        Ok(FrameStatus::Dropped)
                    }
                    SurfaceErrorAction::Fatal => {
                        self.state = PresenterState::Failed;
                        Err(PresentError::SurfaceLost)
                    }
                };
            }
        };

        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lumen present pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&resources.pipeline);
            rpass.set_bind_group(VERTEX_STAGE_GROUP, &resources.vertex_bind_group, &[]);
            rpass.set_bind_group(FRAGMENT_STAGE_GROUP, &resources.texture_bind_group, &[]);
            rpass.set_vertex_buffer(
                VertexInput::Vertices.index(),
                resources.vertex_buffer.slice(..),
            );
            rpass.draw(0..resources.geometry.vertex_count(), 0..1);
        }

        surface.submit(frame);
        self.state = PresenterState::Ready;
        Ok(FrameStatus::Presented)
    }

    /// Releases every GPU resource now.
    ///
    /// Idempotent. Afterwards `render_frame` fails with `NotReady` until
    /// `initialize` is called again.
    pub fn shutdown(&mut self) {
        if let Some(resources) = self.resources.take() {
            resources.release();
            let stats = self.uploader.stats();
            log::info!(
                "presenter released after {} frames ({} rejected)",
                stats.frames_uploaded,
                stats.rejected
            );
        }
        self.state = PresenterState::Released;
    }
}

/// Frame texture format that reproduces pixel bytes exactly on `surface_format`.
///
/// An sRGB target re-encodes on write, so the texture must decode on sample.
pub fn frame_texture_format(surface_format: wgpu::TextureFormat) -> wgpu::TextureFormat {
    if surface_format.is_srgb() {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

fn write_viewport_uniform(
    queue: &wgpu::Queue,
    resources: &Resources,
    scaling: ScalingPolicy,
    viewport: ViewportSize,
) {
    let uniform: ViewportUniform = scaling.uniform(resources.geometry.native_size(), viewport);
    queue.write_buffer(&resources.viewport_ubo, 0, bytemuck::bytes_of(&uniform));
}

fn build_resources<S>(surface: &S, resolution: FrameSize) -> Result<Resources, PresentError>
where
    S: PresentSurface + ?Sized,
{
    if resolution.is_empty() {
        return Err(PresentError::unavailable("native resolution has zero area"));
    }

    let source = abi::shader_source();
    abi::check_shader(&source)?;

    let device = surface.device();
    let surface_format = surface.surface_format();

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("lumen present shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let vertex_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("lumen present vertex bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: VertexInput::ViewportSize.index(),
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(abi::viewport_min_binding_size()),
            },
            count: None,
        }],
    });

    let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("lumen present texture bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: TextureIndex::BaseColor.index(),
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: TextureIndex::BaseColor.sampler_index(),
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("lumen present pipeline layout"),
        // Indexed by group number.
        bind_group_layouts: &[&vertex_bgl, &texture_bgl],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("lumen present pipeline"),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some(abi::VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers: &[ScreenVertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some(abi::FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    let geometry = QuadGeometry::new(resolution);

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("lumen present quad vbo"),
        contents: bytemuck::cast_slice(geometry.vertices()),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("lumen present viewport ubo"),
        size: std::mem::size_of::<ViewportUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let vertex_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("lumen present vertex bind group"),
        layout: &vertex_bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: VertexInput::ViewportSize.index(),
            resource: viewport_ubo.as_entire_binding(),
        }],
    });

    let texture = FrameTexture::new(device, resolution, frame_texture_format(surface_format))?;

    // Nearest keeps pixel edges sharp at any scale.
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("lumen present sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    });

    let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("lumen present texture bind group"),
        layout: &texture_bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: TextureIndex::BaseColor.index(),
                resource: wgpu::BindingResource::TextureView(texture.view()),
            },
            wgpu::BindGroupEntry {
                binding: TextureIndex::BaseColor.sampler_index(),
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    Ok(Resources {
        pipeline,
        geometry,
        vertex_buffer,
        viewport_ubo,
        vertex_bind_group,
        texture,
        texture_bind_group,
    })
}
