use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::coords::ViewportSize;
use crate::device::Gpu;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the front end.
///
/// Callback order for one window: `on_gpu_ready`, then any number of
/// `on_surface_resized` / `on_window_event` / `on_frame`, then
/// `on_window_closing` while the GPU context is still alive.
pub trait App {
    /// Called once after the window's GPU context is created.
    ///
    /// Build GPU resources here. Returning `Exit` stops the runtime.
    fn on_gpu_ready(&mut self, gpu: &Gpu<'_>) -> AppControl;

    /// Called after the runtime reconfigured the surface. `size` may be zero.
    fn on_surface_resized(&mut self, gpu: &Gpu<'_>, size: ViewportSize) {
        let _ = (gpu, size);
    }

    /// Called for window events.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called before the window and its GPU context are destroyed.
    ///
    /// Release GPU resources here.
    fn on_window_closing(&mut self, window_id: WindowId) {
        let _ = window_id;
    }
}
