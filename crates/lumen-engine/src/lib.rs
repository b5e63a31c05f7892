//! Lumen engine crate.
//!
//! Presents a software-rendered emulator framebuffer on a GPU surface: the
//! frame is uploaded into a texture every refresh and drawn as one textured
//! quad scaled onto the window. Also owns the platform + GPU runtime pieces
//! that drive it (window loop, device, frame handoff from the emulator
//! thread, pacing).

pub mod coords;
pub mod core;
pub mod device;
pub mod frame;
pub mod handoff;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
