//! Testbed Draw -- batched debug rendering for a 2D physics testbed.
//!
//! Simulation code describes what it wants to see in world space (polygons,
//! circles, segments, transforms, points, boxes, text) and this crate turns
//! it into a handful of GPU draw calls per frame. Geometry accumulates in
//! three fixed-capacity batches (points, lines, triangles) that flush when
//! full and once more at the end of the frame.
//!
//! # Quick Start
//!
//! ```
//! use testbed_draw::prelude::*;
//!
//! let mut draw = DebugDraw::new(HeadlessContext::new(), DebugDrawConfig::default())?;
//! let camera = Camera::new(800, 600);
//!
//! let mut frame = draw.begin(&camera);
//! frame.draw_segment(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), Color::WHITE);
//! frame.draw_circle(Vec2::ZERO, 2.0, Color::rgb(0.9, 0.7, 0.7));
//! frame.finish()?;
//!
//! assert_eq!(draw.context().draw_count(), 1);
//! # Ok::<(), testbed_draw::RenderError>(())
//! ```

#![deny(unsafe_code)]

pub mod camera;
pub mod color;
pub mod config;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod render;
pub mod text;

#[cfg(feature = "renderer")]
pub mod testbed;

pub use error::RenderError;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::camera::{Camera, Mat4};
    pub use crate::color::Color;
    pub use crate::config::DebugDrawConfig;
    pub use crate::draw::{DebugDraw, DebugFrame};
    pub use crate::error::RenderError;
    pub use crate::geometry::{Aabb, Rot, Transform, Vec2};
    pub use crate::render::batch::{BatchRenderer, BatchVertex, ColorVertex, PointVertex};
    pub use crate::render::gfx::{GraphicsContext, PrimitiveKind, ShaderStage};
    pub use crate::render::headless::{DrawEvent, HeadlessContext};
    pub use crate::text::TextOverlay;

    #[cfg(feature = "renderer")]
    pub use crate::render::wgpu_backend::WgpuContext;
    #[cfg(feature = "renderer")]
    pub use crate::testbed::{run_windowed, Scene, TestbedConfig};
}
