use std::sync::Arc;

use pollster::FutureExt;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use watchtower_core::{PointerEvent, WatchtowerError};
use watchtower_render::RenderEngine;

use super::{App, PIXELS_PER_WHEEL_STEP};

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: WatchtowerError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let settings = &self.session.config().window;
        let window_attributes = Window::default_attributes()
            .with_title(settings.title.clone())
            .with_inner_size(LogicalSize::new(settings.width, settings.height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, WatchtowerError::Render(format!("window: {e}")));
                return;
            }
        };

        let engine =
            match RenderEngine::new_windowed(window.clone(), self.session.compositor().slots())
                .block_on()
            {
                Ok(engine) => engine,
                Err(e) => {
                    self.fail(event_loop, e.into());
                    return;
                }
            };

        let (width, height) = engine.dimensions();
        self.session.resize(width, height);
        window.request_redraw();

        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
                self.session.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match (button, state) {
                (MouseButton::Left, ElementState::Pressed) => {
                    self.left_mouse_down = true;
                    let (width, height) = self.viewport();
                    let (x, y) = self.mouse_pos;
                    self.session.handle_pointer_down(PointerEvent::new(
                        x as f32, y as f32, width, height,
                    ));
                }
                (MouseButton::Left, ElementState::Released) => {
                    self.left_mouse_down = false;
                }
                (MouseButton::Right, ElementState::Pressed) => {
                    self.right_mouse_down = true;
                }
                (MouseButton::Right, ElementState::Released) => {
                    self.right_mouse_down = false;
                }
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = (position.x - self.mouse_pos.0) as f32;
                let delta_y = (position.y - self.mouse_pos.1) as f32;
                self.mouse_pos = (position.x, position.y);

                let viewport_height = self.viewport().1 as f32;
                let (controls, camera) = self.session.rig_mut().controls_mut();
                if self.left_mouse_down {
                    controls.rotate_by_pixels(delta_x, delta_y, viewport_height);
                } else if self.right_mouse_down {
                    controls.pan_by_pixels(camera, delta_x, delta_y, viewport_height);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_WHEEL_STEP) as f32,
                };
                let (controls, _) = self.session.rig_mut().controls_mut();
                controls.zoom(steps);
            }
            _ => {}
        }
    }
}
