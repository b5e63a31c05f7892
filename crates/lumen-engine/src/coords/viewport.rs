use winit::dpi::PhysicalSize;

/// Drawable surface size in physical pixels.
///
/// Consumed by the vertex stage to scale the native-resolution quad onto the
/// surface. A zero-area size is valid: the surface is minimized or not yet
/// laid out, and the presenter draws nothing visible.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn as_f32(self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

impl From<PhysicalSize<u32>> for ViewportSize {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Native output resolution of the emulated display controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Game Boy (DMG) LCD.
    pub const DMG: FrameSize = FrameSize::new(160, 144);

    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels in one frame.
    #[inline]
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Exact byte length of a packed frame in `bytes_per_pixel` format.
    ///
    /// Returns `None` when the product does not fit in `usize`.
    pub fn byte_len(self, bytes_per_pixel: usize) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(bytes_per_pixel)
    }

    #[inline]
    pub fn as_f32(self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}
