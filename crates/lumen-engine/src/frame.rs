//! Host pixel format accepted by the presenter.
//!
//! Frames are packed 8-bit RGBA, row-major, top row first, with no row padding.
//! Emulator cores that produce a single shade byte per pixel can convert with
//! [`expand_shades`] before handing the frame off.

use std::fmt;

use crate::coords::FrameSize;

/// Bytes per packed RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Returns the exact buffer length for one RGBA8 frame of `size`.
#[inline]
pub fn rgba_len(size: FrameSize) -> usize {
    size.pixel_count() * BYTES_PER_PIXEL
}

/// Converts one shade byte per pixel into opaque RGBA8.
///
/// Shade `0` is the lightest ink and `255` the darkest; each output pixel is
/// `255 - shade` replicated into R, G and B with alpha `255`.
///
/// `rgba` must be exactly four times the length of `shades`; otherwise it is
/// left untouched and the mismatch is returned.
pub fn expand_shades(shades: &[u8], rgba: &mut [u8]) -> Result<(), ShadeLengthMismatch> {
    if rgba.len() != shades.len() * BYTES_PER_PIXEL {
        return Err(ShadeLengthMismatch {
            shades: shades.len(),
            rgba: rgba.len(),
        });
    }

    for (px, &shade) in rgba.chunks_exact_mut(BYTES_PER_PIXEL).zip(shades) {
        let hue = 255 - shade;
        px.copy_from_slice(&[hue, hue, hue, 255]);
    }
    Ok(())
}

/// Output buffer passed to [`expand_shades`] has the wrong length.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShadeLengthMismatch {
    pub shades: usize,
    pub rgba: usize,
}

impl fmt::Display for ShadeLengthMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} shades need {} rgba bytes, got {}",
            self.shades,
            self.shades * BYTES_PER_PIXEL,
            self.rgba
        )
    }
}

impl std::error::Error for ShadeLengthMismatch {}

/// Grayscale levels of the four DMG palette entries, indexed by 2-bit colour.
///
/// Index 0 is white; index 3 is black. Values are shade bytes suitable for
/// [`expand_shades`].
pub const DMG_SHADES: [u8; 4] = [0x00, 0x55, 0xAA, 0xFF];
