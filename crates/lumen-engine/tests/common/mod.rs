//! Shared helpers for `lumen-engine` integration tests.

use lumen_engine::coords::{FrameSize, ViewportSize};
use lumen_engine::device::{GpuInit, HeadlessGpu};

pub fn require_gpu() -> bool {
    let Ok(raw) = std::env::var("LUMEN_REQUIRE_GPU") else {
        return false;
    };

    let v = raw.trim();
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

pub fn skip_or_panic(test_name: &str, reason: &str) {
    if require_gpu() {
        panic!("LUMEN_REQUIRE_GPU is enabled but {test_name} cannot run: {reason}");
    }
    eprintln!("skipping {test_name}: {reason}");
}

/// Offscreen target of `width x height`, or `None` (after logging) without an adapter.
pub fn headless(test_name: &str, width: u32, height: u32) -> Option<HeadlessGpu> {
    lumen_engine::logging::init_logging(Default::default());

    match pollster::block_on(HeadlessGpu::new(
        ViewportSize::new(width, height),
        GpuInit::default(),
    )) {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            skip_or_panic(test_name, &format!("{e:#}"));
            None
        }
    }
}

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

pub fn solid(size: FrameSize, rgba: [u8; 4]) -> Vec<u8> {
    rgba.repeat(size.pixel_count())
}

pub fn pixel_at(rgba: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let off = ((y * width + x) * 4) as usize;
    [rgba[off], rgba[off + 1], rgba[off + 2], rgba[off + 3]]
}

/// Asserts every pixel of a `width`-wide readback equals `expected`.
pub fn assert_uniform(rgba: &[u8], width: u32, expected: [u8; 4]) {
    for (i, px) in rgba.chunks_exact(4).enumerate() {
        let (x, y) = (i as u32 % width, i as u32 / width);
        assert_eq!(px, expected, "pixel ({x}, {y})");
    }
}
