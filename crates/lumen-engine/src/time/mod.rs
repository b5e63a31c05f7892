//! Time subsystem.
//!
//! Fixed-rate pacing for the emulator thread, independent of the display's
//! refresh rate. Intended usage:
//! - one `FramePacer` per producer thread
//! - call `wait()` (or `advance(now)`) once per produced frame

mod pacer;

pub use pacer::{FramePacer, DMG_REFRESH_HZ};
