//! Size types shared by the presenter, the device layer and the runtime.
//!
//! Two pixel spaces meet here:
//! - native frame pixels (the emulator's fixed output resolution)
//! - physical surface pixels (whatever the window currently measures)

mod viewport;

pub use viewport::{FrameSize, ViewportSize};
