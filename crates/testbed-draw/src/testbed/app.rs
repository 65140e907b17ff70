//! winit event loop driving a [`Scene`].

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{WindowAttributes, WindowId};

use super::input::CameraAction;
use super::surface::SurfaceState;
use super::{Scene, TestbedConfig};
use crate::camera::Camera;
use crate::config::DebugDrawConfig;
use crate::draw::DebugDraw;
use crate::geometry::Vec2;
use crate::logging;
use crate::render::wgpu_backend::WgpuContext;

/// Pixel scroll distance treated as one wheel notch.
const PIXELS_PER_NOTCH: f64 = 40.0;

/// Run `scene` in a window until it is closed or Escape is pressed.
///
/// Installs the default tracing subscriber if none is set.
///
/// # Errors
///
/// Returns an error if the event loop cannot be created, or if the window,
/// GPU device or debug renderers fail to initialize.
pub fn run_windowed<S: Scene + 'static>(
    scene: S,
    config: TestbedConfig,
) -> Result<(), anyhow::Error> {
    logging::init_tracing();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        state: AppState::Pending { scene },
        config,
        init_failed: false,
    };
    event_loop.run_app(&mut app)?;

    if app.init_failed {
        return Err(anyhow::anyhow!(
            "failed to initialize testbed window (see logs for details)"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal state machine
// ---------------------------------------------------------------------------

/// Windows may only be created from `resumed`, so the app starts `Pending`
/// and becomes `Running` once the window and GPU state exist.
enum AppState<S> {
    Pending {
        scene: S,
    },
    Running {
        scene: S,
        surface: SurfaceState,
        draw: DebugDraw<WgpuContext>,
        camera: Camera,
    },
    Transitioning,
}

type RunningParts = (SurfaceState, DebugDraw<WgpuContext>, Camera);

struct App<S> {
    state: AppState<S>,
    config: TestbedConfig,
    init_failed: bool,
}

impl<S: Scene> App<S> {
    /// Create the window, GPU device and debug renderers.
    fn start(&self, event_loop: &ActiveEventLoop, scene: &S) -> Result<RunningParts, anyhow::Error> {
        let title = self.config.title.as_deref().unwrap_or_else(|| scene.title());
        let attrs = WindowAttributes::default()
            .with_title(title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.width,
                self.config.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let surface = pollster::block_on(SurfaceState::new(window))?;
        let gfx = WgpuContext::new(surface.device(), surface.queue(), surface.format())
            .with_error_checks(self.config.check_gpu_errors);
        let draw = DebugDraw::new(gfx, DebugDrawConfig::default())?;

        let (width, height) = surface.size();
        let camera = self.config.home_camera(width, height);
        Ok((surface, draw, camera))
    }
}

impl<S: Scene> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let state = std::mem::replace(&mut self.state, AppState::Transitioning);
        match state {
            AppState::Pending { scene } => match self.start(event_loop, &scene) {
                Ok((surface, draw, camera)) => {
                    tracing::info!(
                        width = camera.width,
                        height = camera.height,
                        "testbed window created"
                    );
                    surface.window().request_redraw();
                    self.state = AppState::Running {
                        scene,
                        surface,
                        draw,
                        camera,
                    };
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to initialize testbed -- exiting");
                    self.init_failed = true;
                    self.state = AppState::Pending { scene };
                    event_loop.exit();
                }
            },
            running @ AppState::Running { .. } => self.state = running,
            AppState::Transitioning => {
                tracing::warn!("resumed called during state transition");
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let AppState::Running {
            scene,
            surface,
            draw,
            camera,
        } = &mut self.state
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("window close requested -- shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                tracing::debug!(width = size.width, height = size.height, "window resized");
                surface.resize(size.width, size.height);
                camera.resize(size.width, size.height);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_NOTCH) as f32,
                };
                CameraAction::Zoom(notches).apply(camera, &self.config);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                let action = match logical_key {
                    Key::Named(NamedKey::Escape) => {
                        event_loop.exit();
                        return;
                    }
                    Key::Named(NamedKey::ArrowLeft) => CameraAction::Pan(Vec2::new(-1.0, 0.0)),
                    Key::Named(NamedKey::ArrowRight) => CameraAction::Pan(Vec2::new(1.0, 0.0)),
                    Key::Named(NamedKey::ArrowUp) => CameraAction::Pan(Vec2::new(0.0, 1.0)),
                    Key::Named(NamedKey::ArrowDown) => CameraAction::Pan(Vec2::new(0.0, -1.0)),
                    Key::Named(NamedKey::Home) => CameraAction::Home,
                    _ => return,
                };
                action.apply(camera, &self.config);
            }
            WindowEvent::RedrawRequested => {
                scene.step(self.config.time_step);

                let output = match surface.acquire() {
                    Ok(output) => output,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        surface.reconfigure();
                        surface.window().request_redraw();
                        return;
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("GPU out of memory -- exiting");
                        event_loop.exit();
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "surface error during render");
                        surface.window().request_redraw();
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                let clear = self.config.clear_color;
                let gfx = draw.context_mut();
                gfx.set_target(view);
                if let Err(e) = gfx.clear(wgpu::Color {
                    r: f64::from(clear.r),
                    g: f64::from(clear.g),
                    b: f64::from(clear.b),
                    a: f64::from(clear.a),
                }) {
                    tracing::warn!(error = %e, "failed to clear frame");
                }

                let mut frame = draw.begin(camera);
                scene.draw(&mut frame);
                if let Err(e) = frame.finish() {
                    tracing::warn!(error = %e, "debug draw flush failed");
                }

                drop(draw.context_mut().take_target());
                output.present();
                surface.window().request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let AppState::Running { draw, .. } =
            std::mem::replace(&mut self.state, AppState::Transitioning)
        {
            draw.destroy();
            tracing::debug!("testbed renderers released");
        }
    }
}
