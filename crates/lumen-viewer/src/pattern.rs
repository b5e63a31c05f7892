//! Synthetic emulator: produces DMG-style shade frames on its own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};

use lumen_engine::coords::FrameSize;
use lumen_engine::frame::{expand_shades, DMG_SHADES};
use lumen_engine::handoff::FrameProducer;
use lumen_engine::time::{FramePacer, DMG_REFRESH_HZ};

/// Side of one checkerboard tile, in native pixels.
const TILE: u32 = 8;

/// Fills `shades` with frame `n` of the test pattern.
///
/// A checkerboard scrolling diagonally at one pixel per frame, with a
/// four-shade gradient bar along the bottom row of tiles so every palette
/// entry is on screen.
pub fn render_pattern(size: FrameSize, n: u64, shades: &mut [u8]) {
    let offset = (n % (2 * TILE as u64)) as u32;
    let bar_top = size.height.saturating_sub(TILE);

    for (i, px) in shades.iter_mut().enumerate() {
        let x = i as u32 % size.width;
        let y = i as u32 / size.width;

        let index = if y >= bar_top {
            (x * DMG_SHADES.len() as u32 / size.width) as usize
        } else {
            let tx = (x + offset) / TILE;
            let ty = (y + offset) / TILE;
            if (tx + ty) % 2 == 0 { 0 } else { 2 }
        };

        *px = DMG_SHADES[index];
    }
}

/// Runs the pattern generator until `running` is cleared.
pub fn spawn(mut producer: FrameProducer, running: Arc<AtomicBool>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("lumen-emu".into())
        .spawn(move || {
            let size = producer.size();
            let mut shades = vec![0u8; size.pixel_count()];
            let mut pixels = producer.buffer();
            let mut pacer = FramePacer::new(DMG_REFRESH_HZ);

            log::info!("emulator thread started at {DMG_REFRESH_HZ:.4} Hz");

            while running.load(Ordering::Acquire) {
                render_pattern(size, pacer.frame_index(), &mut shades);
                if let Err(e) = expand_shades(&shades, &mut pixels) {
                    log::error!("emulator frame conversion failed: {e}");
                    break;
                }
                pixels = producer.publish(pixels);
                pacer.wait();
            }

            log::info!(
                "emulator thread stopped after {} frames ({} skipped)",
                pacer.frame_index(),
                pacer.skipped()
            );
        })
        .context("failed to spawn emulator thread")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_uses_every_shade() {
        let size = FrameSize::DMG;
        let mut shades = vec![0u8; size.pixel_count()];
        render_pattern(size, 0, &mut shades);

        for shade in DMG_SHADES {
            assert!(shades.contains(&shade), "shade {shade:#04x} missing");
        }
    }

    #[test]
    fn pattern_scrolls_and_wraps() {
        let size = FrameSize::DMG;
        let mut a = vec![0u8; size.pixel_count()];
        let mut b = vec![0u8; size.pixel_count()];

        render_pattern(size, 0, &mut a);
        render_pattern(size, 1, &mut b);
        assert_ne!(a, b);

        render_pattern(size, 2 * TILE as u64, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn pattern_expands_into_a_publishable_frame() {
        let size = FrameSize::DMG;
        let mut shades = vec![0u8; size.pixel_count()];
        render_pattern(size, 3, &mut shades);

        let mut pixels = vec![0u8; lumen_engine::frame::rgba_len(size)];
        expand_shades(&shades, &mut pixels).unwrap();
        assert!(pixels.chunks_exact(4).all(|px| px[3] == 255));
    }
}
