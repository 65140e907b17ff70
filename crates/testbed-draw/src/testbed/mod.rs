//! Windowed testbed harness.
//!
//! [`run_windowed`] opens a window, owns the [`Camera`] and the
//! [`DebugDraw`](crate::draw::DebugDraw), and drives a [`Scene`] once per
//! frame: step, clear, draw, flush, present.
//!
//! This module is feature-gated behind `renderer`.

mod app;
pub mod input;
mod surface;

use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::color::Color;
use crate::draw::DebugFrame;
use crate::geometry::Vec2;
use crate::render::wgpu_backend::WgpuContext;

pub use app::run_windowed;
pub use input::CameraAction;

/// A simulation the testbed can step and draw.
pub trait Scene {
    /// Window title.
    fn title(&self) -> &str {
        "Testbed"
    }

    /// Advance the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Submit this frame's debug geometry.
    fn draw(&self, frame: &mut DebugFrame<'_, WgpuContext>);
}

/// Window and camera settings for [`run_windowed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestbedConfig {
    /// Overrides [`Scene::title`] when set.
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    pub clear_color: Color,
    /// Fixed simulation step in seconds.
    pub time_step: f32,
    /// Camera placement restored by the Home key.
    pub home_center: Vec2,
    pub home_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Multiplier applied per mouse wheel notch.
    pub zoom_step: f32,
    /// World units moved per arrow key press at zoom 1.
    pub pan_step: f32,
    /// Check for GPU validation errors after every flush.
    pub check_gpu_errors: bool,
}

impl Default for TestbedConfig {
    fn default() -> Self {
        Self {
            title: None,
            width: 1280,
            height: 800,
            clear_color: Color::rgb(0.1, 0.1, 0.12),
            time_step: 1.0 / 60.0,
            home_center: Vec2::new(0.0, 20.0),
            home_zoom: 1.0,
            min_zoom: 0.05,
            max_zoom: 20.0,
            zoom_step: 1.1,
            pan_step: 0.5,
            check_gpu_errors: cfg!(debug_assertions),
        }
    }
}

impl TestbedConfig {
    /// Camera at the home position for a `width` x `height` viewport.
    pub fn home_camera(&self, width: u32, height: u32) -> Camera {
        let mut camera = Camera::new(width.max(1), height.max(1));
        camera.center = self.home_center;
        camera.zoom = self.home_zoom;
        camera
    }
}
