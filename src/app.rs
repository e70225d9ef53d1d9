//! Windowed front end: a winit event loop driving a [`Viewer`] on a
//! [`WgpuDevice`].

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Vec2;
use log::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::clock::FrameClock;
use crate::config::ViewerConfig;
use crate::input::{PointerButton, PointerTracker};
use crate::render::WgpuDevice;
use crate::viewer::Viewer;

/// No display (or no usable GPU) was available. Callers may fall back to a
/// headless run.
#[derive(Debug)]
pub struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

/// Opens a window and renders until it is closed, or until `frame_limit`
/// frames have been presented.
pub fn run_windowed(config: ViewerConfig, frame_limit: Option<u64>) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp {
        config,
        frame_limit,
        viewer: None,
        pointer: PointerTracker::new(),
        clock: FrameClock::new(),
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    if let Some(viewer) = app.viewer.as_mut() {
        viewer.shutdown();
        println!("Rendered {} frame(s)", viewer.frames());
    }
    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct ViewerApp {
    config: ViewerConfig,
    frame_limit: Option<u64>,
    viewer: Option<Viewer<WgpuDevice>>,
    pointer: PointerTracker,
    clock: FrameClock,
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = config_window(&self.config);
        let window = Arc::new(
            event_loop
                .create_window(window)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );
        let device = pollster::block_on(WgpuDevice::new(Arc::clone(&window)))
            .map_err(|err| WindowInitError::from_error("GPU device", format!("{err:#}")))?;
        let mut viewer = Viewer::new(device, &self.config)?;

        let size = window.inner_size();
        viewer.on_resize(size.width, size.height);
        window.request_redraw();
        self.clock = FrameClock::new();
        self.viewer = Some(viewer);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }
}

fn config_window(config: &ViewerConfig) -> winit::window::WindowAttributes {
    Window::default_attributes()
        .with_title(config.window.title.as_str())
        .with_inner_size(LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ))
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Tertiary,
        MouseButton::Back | MouseButton::Forward | MouseButton::Other(_) => PointerButton::None,
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() || self.error.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        if id != viewer.device().window_id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => viewer.on_resize(size.width, size.height),
            WindowEvent::MouseInput { state, button, .. } => {
                let button = pointer_button(button);
                let pointer = match state {
                    ElementState::Pressed => self.pointer.button_down(button),
                    ElementState::Released => self.pointer.button_up(button),
                };
                viewer.on_pointer_event(pointer);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pointer = self
                    .pointer
                    .moved(Vec2::new(position.x as f32, position.y as f32));
                viewer.on_pointer_event(pointer);
            }
            WindowEvent::RedrawRequested => {
                let dt = self.clock.tick();
                if let Err(err) = viewer.render(dt) {
                    self.fail(event_loop, err.into());
                    return;
                }
                if self
                    .frame_limit
                    .is_some_and(|limit| viewer.frames() >= limit)
                {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = self.viewer.as_ref() {
            viewer.device().window().request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_buttons_map_to_pointer_buttons() {
        assert_eq!(pointer_button(MouseButton::Left), PointerButton::Primary);
        assert_eq!(pointer_button(MouseButton::Right), PointerButton::Secondary);
        assert_eq!(pointer_button(MouseButton::Middle), PointerButton::Tertiary);
        assert_eq!(pointer_button(MouseButton::Back), PointerButton::None);
        for index in 0..3 {
            assert_eq!(pointer_button(MouseButton::Other(index)), PointerButton::None);
        }
    }

    #[test]
    fn panic_payloads_become_messages() {
        let err = WindowInitError::from_panic("event loop", Box::new("no display"));
        assert_eq!(err.to_string(), "failed to initialize event loop: no display");
    }
}
