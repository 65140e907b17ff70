//! Camera controls, independent of the windowing layer.

use super::TestbedConfig;
use crate::camera::Camera;
use crate::geometry::Vec2;

/// A user request that moves the camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CameraAction {
    /// Wheel notches; positive zooms in.
    Zoom(f32),
    /// Pan by whole steps along each axis.
    Pan(Vec2),
    /// Back to the configured home position.
    Home,
}

impl CameraAction {
    pub fn apply(self, camera: &mut Camera, config: &TestbedConfig) {
        match self {
            CameraAction::Zoom(notches) => {
                let zoom = camera.zoom * config.zoom_step.powf(-notches);
                camera.zoom = zoom.clamp(config.min_zoom, config.max_zoom);
            }
            CameraAction::Pan(steps) => {
                camera.center = camera.center + steps * (config.pan_step * camera.zoom);
            }
            CameraAction::Home => {
                camera.center = config.home_center;
                camera.zoom = config.home_zoom;
            }
        }
        tracing::trace!(?camera, "camera moved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_in_shrinks_view_and_clamps() {
        let config = TestbedConfig::default();
        let mut camera = config.home_camera(800, 600);

        CameraAction::Zoom(1.0).apply(&mut camera, &config);
        assert!(camera.zoom < 1.0);

        CameraAction::Zoom(1000.0).apply(&mut camera, &config);
        assert_eq!(camera.zoom, config.min_zoom);

        CameraAction::Zoom(-1000.0).apply(&mut camera, &config);
        assert_eq!(camera.zoom, config.max_zoom);
    }

    #[test]
    fn pan_scales_with_zoom() {
        let config = TestbedConfig::default();
        let mut camera = config.home_camera(800, 600);
        camera.zoom = 2.0;

        CameraAction::Pan(Vec2::new(1.0, 0.0)).apply(&mut camera, &config);
        assert_eq!(camera.center, config.home_center + Vec2::new(1.0, 0.0));
    }

    #[test]
    fn home_restores_placement() {
        let config = TestbedConfig::default();
        let mut camera = config.home_camera(800, 600);
        camera.center = Vec2::new(-30.0, 4.0);
        camera.zoom = 7.0;

        CameraAction::Home.apply(&mut camera, &config);
        assert_eq!(camera.center, config.home_center);
        assert_eq!(camera.zoom, config.home_zoom);
        assert_eq!((camera.width, camera.height), (800, 600));
    }
}
