use winit::window::{Window, WindowId};

use crate::coords::ViewportSize;
use crate::device::Gpu;
use crate::window::RuntimeCtx;

/// Window handle and metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Drawable size in physical pixels.
    pub fn physical_size(&self) -> ViewportSize {
        ViewportSize::from(self.window.inner_size())
    }

    /// Tells the compositor a present is imminent. Call right before presenting.
    pub fn pre_present_notify(&self) {
        self.window.pre_present_notify();
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    /// Monotonic redraw counter for this window.
    pub frame_index: u64,
    pub runtime: &'a mut RuntimeCtx,
}
