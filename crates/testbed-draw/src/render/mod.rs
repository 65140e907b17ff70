//! Batched primitive rendering.
//!
//! Three [`BatchRenderer`](batch::BatchRenderer)s (points, lines, triangles)
//! each own one program and one vertex buffer obtained from a
//! [`GraphicsContext`](gfx::GraphicsContext). The headless context is always
//! available; the wgpu context is feature-gated behind `renderer`.

pub mod batch;
pub mod gfx;
pub mod headless;
pub mod shader;

#[cfg(feature = "renderer")]
pub mod wgpu_backend;
