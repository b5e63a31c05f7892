//! Single-slot frame handoff between the emulator thread and the render thread.
//!
//! The producer publishes whole frames; the consumer takes the most recent one.
//! A frame that is not taken before the next publish is dropped, never queued,
//! so presentation latency stays at most one frame regardless of how far the
//! two threads drift apart.
//!
//! Pixel buffers move between the threads by value and are recycled, so the
//! producer never writes into a buffer the consumer is still uploading.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::coords::FrameSize;
use crate::frame::rgba_len;

/// Buffers kept for reuse beyond the one in the slot.
const SPARE_BUFFERS: usize = 2;

/// One published frame.
#[derive(Debug)]
pub struct Frame {
    pub size: FrameSize,
    /// Packed RGBA8, top row first.
    pub pixels: Vec<u8>,
    /// Producer-side sequence number, starting at 0.
    pub sequence: u64,
}

/// Handoff counters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct HandoffStats {
    pub published: u64,
    /// Frames replaced before the consumer took them.
    pub dropped: u64,
}

#[derive(Default)]
struct Slot {
    latest: Option<Frame>,
    spare: Vec<Vec<u8>>,
    stats: HandoffStats,
    closed: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        // Slot state is consistent after every statement; a panic elsewhere
        // cannot leave it half-updated.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates a connected producer/consumer pair for frames of `size`.
pub fn frame_slot(size: FrameSize) -> (FrameProducer, FrameConsumer) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot::default()),
        ready: Condvar::new(),
    });

    (
        FrameProducer {
            shared: Arc::clone(&shared),
            size,
            sequence: 0,
        },
        FrameConsumer { shared },
    )
}

/// Emulator-side end of the slot. Dropping it closes the slot.
pub struct FrameProducer {
    shared: Arc<Shared>,
    size: FrameSize,
    sequence: u64,
}

impl FrameProducer {
    #[inline]
    pub fn size(&self) -> FrameSize {
        self.size
    }

    /// Returns a frame-sized buffer, recycled when one is available.
    ///
    /// Contents of a recycled buffer are the pixels of an older frame.
    pub fn buffer(&self) -> Vec<u8> {
        let len = rgba_len(self.size);
        match self.shared.lock().spare.pop() {
            Some(mut buf) => {
                buf.resize(len, 0);
                buf
            }
            None => vec![0; len],
        }
    }

    /// Makes `pixels` the latest frame and returns a buffer for the next one.
    ///
    /// An untaken frame in the slot is replaced and counted as dropped; its
    /// buffer is the one returned.
    pub fn publish(&mut self, pixels: Vec<u8>) -> Vec<u8> {
        let frame = Frame {
            size: self.size,
            pixels,
            sequence: self.sequence,
        };
        self.sequence += 1;

        let replaced = {
            let mut slot = self.shared.lock();
            slot.stats.published += 1;
            let replaced = slot.latest.replace(frame);
            if replaced.is_some() {
                slot.stats.dropped += 1;
            }
            replaced
        };
        self.shared.ready.notify_one();

        match replaced {
            Some(old) => old.pixels,
            None => self.buffer(),
        }
    }
}

impl Drop for FrameProducer {
    fn drop(&mut self) {
        self.shared.lock().closed = true;
        self.shared.ready.notify_all();
    }
}

/// Render-side end of the slot.
pub struct FrameConsumer {
    shared: Arc<Shared>,
}

impl FrameConsumer {
    /// Takes the latest frame, if one was published since the last take.
    pub fn take(&self) -> Option<Frame> {
        self.shared.lock().latest.take()
    }

    /// Like [`take`](Self::take), but waits up to `budget` for a frame.
    ///
    /// Returns early with `None` when the producer is gone.
    pub fn take_timeout(&self, budget: Duration) -> Option<Frame> {
        let slot = self.shared.lock();
        let (mut slot, _) = self
            .shared
            .ready
            .wait_timeout_while(slot, budget, |s| s.latest.is_none() && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);
        slot.latest.take()
    }

    /// Returns a consumed frame's buffer to the producer.
    pub fn recycle(&self, frame: Frame) {
        let mut slot = self.shared.lock();
        if slot.spare.len() < SPARE_BUFFERS {
            slot.spare.push(frame.pixels);
        }
    }

    /// True once the producer has been dropped.
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    pub fn stats(&self) -> HandoffStats {
        self.shared.lock().stats
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Instant;

    use super::*;

    const SIZE: FrameSize = FrameSize::new(2, 2);

    fn filled(byte: u8) -> Vec<u8> {
        vec![byte; rgba_len(SIZE)]
    }

    #[test]
    fn empty_slot_yields_nothing() {
        let (_tx, rx) = frame_slot(SIZE);
        assert!(rx.take().is_none());
    }

    #[test]
    fn latest_frame_wins() {
        let (mut tx, rx) = frame_slot(SIZE);
        tx.publish(filled(1));
        tx.publish(filled(2));
        tx.publish(filled(3));

        let frame = rx.take().unwrap();
        assert_eq!(frame.pixels, filled(3));
        assert_eq!(frame.sequence, 2);
        assert!(rx.take().is_none(), "slot holds at most one frame");
        assert_eq!(rx.stats(), HandoffStats { published: 3, dropped: 2 });
    }

    #[test]
    fn replaced_buffer_is_handed_back() {
        let (mut tx, _rx) = frame_slot(SIZE);
        let first = filled(1);
        let ptr = first.as_ptr();

        tx.publish(first);
        let back = tx.publish(filled(2));
        assert_eq!(back.as_ptr(), ptr);
    }

    #[test]
    fn recycled_buffer_is_reused() {
        let (mut tx, rx) = frame_slot(SIZE);
        tx.publish(filled(7));

        let frame = rx.take().unwrap();
        let ptr = frame.pixels.as_ptr();
        rx.recycle(frame);

        let buf = tx.buffer();
        assert_eq!(buf.as_ptr(), ptr);
        assert_eq!(buf.len(), rgba_len(SIZE));
    }

    #[test]
    fn take_timeout_gives_up() {
        let (_tx, rx) = frame_slot(SIZE);
        let start = Instant::now();
        assert!(rx.take_timeout(Duration::from_millis(10)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn take_timeout_wakes_on_publish() {
        let (mut tx, rx) = frame_slot(SIZE);
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            tx.publish(filled(9));
            tx
        });

        let frame = rx.take_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(frame.pixels, filled(9));
        drop(producer.join().unwrap());
    }

    #[test]
    fn dropping_producer_closes_slot() {
        let (tx, rx) = frame_slot(SIZE);
        assert!(!rx.is_closed());
        drop(tx);
        assert!(rx.is_closed());

        let start = Instant::now();
        assert!(rx.take_timeout(Duration::from_secs(5)).is_none());
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
