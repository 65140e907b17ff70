//! Orthographic 2D camera.
//!
//! The view volume is always [`HALF_HEIGHT`] world units above and below
//! the center at zoom 1, widened horizontally by the viewport aspect ratio.
//! Screen coordinates are pixels with a top-left origin and +Y down; world
//! coordinates are +Y up.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

/// Column-major 4x4 matrix, laid out exactly as uploaded to the GPU.
pub type Mat4 = [f32; 16];

/// Half-height of the visible world at zoom 1.
pub const HALF_HEIGHT: f32 = 25.0;

/// Camera state read by every flush.
///
/// `width` and `height` must be positive; zero-sized viewports are a caller
/// error (the aspect ratio divides by `height`).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World-space point at the center of the viewport.
    pub center: Vec2,
    /// Scale of the view volume. Larger values show more of the world.
    pub zoom: f32,
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
}

impl Camera {
    /// Camera centered on the world origin at zoom 1.
    pub fn new(width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0, "camera viewport must be non-empty");
        Self {
            center: Vec2::ZERO,
            zoom: 1.0,
            width,
            height,
        }
    }

    /// Update the viewport after a window resize. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
        }
    }

    /// Half-extents of the visible world.
    pub fn extents(&self) -> Vec2 {
        let ratio = self.width as f32 / self.height as f32;
        Vec2::new(ratio * HALF_HEIGHT, HALF_HEIGHT) * self.zoom
    }

    /// Lower-left and upper-right corners of the visible world.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let extents = self.extents();
        (self.center - extents, self.center + extents)
    }

    /// Map a pixel position (top-left origin) to world space.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let w = self.width as f32;
        let h = self.height as f32;
        let u = screen.x / w;
        let v = (h - screen.y) / h;

        let (lower, upper) = self.bounds();
        Vec2::new(
            (1.0 - u) * lower.x + u * upper.x,
            (1.0 - v) * lower.y + v * upper.y,
        )
    }

    /// Map a world position to pixels (top-left origin).
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let w = self.width as f32;
        let h = self.height as f32;

        let (lower, upper) = self.bounds();
        let u = (world.x - lower.x) / (upper.x - lower.x);
        let v = (world.y - lower.y) / (upper.y - lower.y);
        Vec2::new(u * w, (1.0 - v) * h)
    }

    /// Orthographic projection from world space to normalized device
    /// coordinates, with every vertex pushed to depth `z_bias`.
    pub fn build_projection_matrix(&self, z_bias: f32) -> Mat4 {
        let (lower, upper) = self.bounds();

        let sx = 2.0 / (upper.x - lower.x);
        let sy = 2.0 / (upper.y - lower.y);
        let tx = -(upper.x + lower.x) / (upper.x - lower.x);
        let ty = -(upper.y + lower.y) / (upper.y - lower.y);

        // col0     col1     col2     col3
        [
            sx, 0.0, 0.0, 0.0, //
            0.0, sy, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            tx, ty, z_bias, 1.0, //
        ]
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

/// Multiply a column-major matrix by the point `(x, y, 0, 1)`.
pub fn transform_point(m: &Mat4, p: Vec2) -> [f32; 4] {
    [
        m[0] * p.x + m[4] * p.y + m[12],
        m[1] * p.x + m[5] * p.y + m[13],
        m[2] * p.x + m[6] * p.y + m[14],
        m[3] * p.x + m[7] * p.y + m[15],
    ]
}
