use crate::coords::FrameSize;

use super::abi::ScreenVertex;

/// Static display quad covering the native frame.
///
/// Two triangles (triangle list, six vertices) centred at the origin and
/// spanning `±width/2, ±height/2` in pixel space with +Y up. Texture
/// coordinate (0, 0) sits on the top-left corner and (1, 1) on the
/// bottom-right, so row 0 of the uploaded frame appears at the top.
///
/// Built once; scaling onto the surface happens in the vertex stage.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadGeometry {
    native: FrameSize,
    vertices: [ScreenVertex; 6],
}

impl QuadGeometry {
    pub fn new(native: FrameSize) -> Self {
        let hx = native.width as f32 / 2.0;
        let hy = native.height as f32 / 2.0;

        let top_left = ScreenVertex::new([-hx, hy], [0.0, 0.0]);
        let top_right = ScreenVertex::new([hx, hy], [1.0, 0.0]);
        let bottom_left = ScreenVertex::new([-hx, -hy], [0.0, 1.0]);
        let bottom_right = ScreenVertex::new([hx, -hy], [1.0, 1.0]);

        // Counter-clockwise in clip space.
        let vertices = [
            bottom_right,
            top_left,
            bottom_left,
            bottom_right,
            top_right,
            top_left,
        ];

        Self { native, vertices }
    }

    /// The fixed vertex list.
    #[inline]
    pub fn vertices(&self) -> &[ScreenVertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    #[inline]
    pub fn native_size(&self) -> FrameSize {
        self.native
    }
}
