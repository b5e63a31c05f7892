use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use lumen_engine::coords::{FrameSize, ViewportSize};
use lumen_engine::core::{App, AppControl, FrameCtx};
use lumen_engine::device::Gpu;
use lumen_engine::handoff::{Frame, FrameConsumer};
use lumen_engine::render::screen::{FramePresenter, FrameStatus, PresenterConfig, ScalingPolicy};

/// How long a redraw waits for the emulator before re-presenting the last frame.
const FRAME_WAIT: Duration = Duration::from_millis(20);

const TITLE_INTERVAL: Duration = Duration::from_secs(1);

/// Front end: pulls frames from the emulator thread and presents them.
pub struct Viewer {
    title: String,
    resolution: FrameSize,
    presenter: FramePresenter,
    frames: FrameConsumer,
    /// Most recent frame, re-presented when the emulator has nothing new.
    last: Option<Frame>,
    running: Arc<AtomicBool>,

    presented: u64,
    dropped: u64,
    title_at: Instant,
}

impl Viewer {
    pub fn new(
        title: String,
        resolution: FrameSize,
        config: PresenterConfig,
        frames: FrameConsumer,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            title,
            resolution,
            presenter: FramePresenter::new(config),
            frames,
            last: None,
            running,
            presented: 0,
            dropped: 0,
            title_at: Instant::now(),
        }
    }

    fn cycle_scaling(&mut self) {
        let next = match self.presenter.scaling() {
            ScalingPolicy::Letterbox => ScalingPolicy::IntegerScale,
            ScalingPolicy::IntegerScale => ScalingPolicy::Stretch,
            ScalingPolicy::Stretch => ScalingPolicy::Letterbox,
        };
        log::info!("scaling: {next:?}");
        self.presenter.set_scaling(next);
    }
}

impl App for Viewer {
    fn on_gpu_ready(&mut self, gpu: &Gpu<'_>) -> AppControl {
        match self.presenter.initialize(gpu, self.resolution) {
            Ok(()) => AppControl::Continue,
            Err(e) => {
                log::error!("cannot present frames: {e}");
                AppControl::Exit
            }
        }
    }

    fn on_surface_resized(&mut self, gpu: &Gpu<'_>, size: ViewportSize) {
        self.presenter.resize(gpu, size);
    }

    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        if event.state != ElementState::Pressed || event.repeat {
            return AppControl::Continue;
        }

        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => AppControl::Exit,
            PhysicalKey::Code(KeyCode::KeyS) => {
                self.cycle_scaling();
                AppControl::Continue
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Some(frame) = self.frames.take_timeout(FRAME_WAIT) {
            if let Some(old) = self.last.replace(frame) {
                self.frames.recycle(old);
            }
        } else if self.frames.is_closed() {
            log::warn!("emulator thread ended");
            return AppControl::Exit;
        }

        let Some(frame) = self.last.as_ref() else {
            return AppControl::Continue;
        };

        ctx.window.pre_present_notify();
        match self.presenter.render_frame(
            &mut *ctx.gpu,
            &frame.pixels,
            frame.size.width,
            frame.size.height,
        ) {
            Ok(FrameStatus::Presented) => self.presented += 1,
            Ok(FrameStatus::Dropped) => self.dropped += 1,
            Err(e) if e.is_fatal() => {
                log::error!("presentation stopped: {e}");
                return AppControl::Exit;
            }
            Err(e) => {
                log::warn!("frame {} skipped: {e}", frame.sequence);
                self.dropped += 1;
            }
        }

        if self.title_at.elapsed() >= TITLE_INTERVAL {
            let handoff = self.frames.stats();
            ctx.runtime.set_title(format!(
                "{} | {} presented, {} dropped, {} overwritten",
                self.title, self.presented, self.dropped, handoff.dropped
            ));
            self.title_at = Instant::now();
        }

        AppControl::Continue
    }

    fn on_window_closing(&mut self, _window_id: WindowId) {
        self.running.store(false, Ordering::Release);
        if let Some(frame) = self.last.take() {
            self.frames.recycle(frame);
        }
        self.presenter.shutdown();
    }
}
