//! retrodesk: a Windows 1.0 style desktop environment simulator.
//!
//! The desktop, taskbar, application windows and widgets are all rendered
//! by this crate into one CPU framebuffer; the host window only displays
//! it. Everything below `main.rs` is toolkit-free and runs headless in
//! tests.

mod apps;
mod desktop;
mod dialog;
mod surface;
mod theme;
mod windows;

use std::num::NonZeroU32;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::desktop::{Desktop, SCREEN_H, SCREEN_W};
use crate::surface::Surface;
use crate::windows::KeyEvent;

struct App {
    desktop: Desktop,
    frame: Surface,
    window: Option<Arc<Window>>,
    context: Option<softbuffer::Context<Arc<Window>>>,
    gfx: Option<softbuffer::Surface<Arc<Window>, Arc<Window>>>,
}

impl App {
    fn new() -> Self {
        Self {
            desktop: Desktop::new(SCREEN_W, SCREEN_H),
            frame: Surface::new(SCREEN_W, SCREEN_H, 0),
            window: None,
            context: None,
            gfx: None,
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Map a physical cursor position onto desktop coordinates. The host
    /// window is not resizable, but hidpi still scales its inner size.
    fn desktop_pos(&self, px: f64, py: f64) -> (i32, i32) {
        let Some(window) = &self.window else {
            return (px as i32, py as i32);
        };
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return (px as i32, py as i32);
        }
        let x = px * SCREEN_W as f64 / size.width as f64;
        let y = py * SCREEN_H as f64 / size.height as f64;
        (x as i32, y as i32)
    }

    fn present(&mut self) {
        let (Some(window), Some(gfx)) = (&self.window, &mut self.gfx) else {
            return;
        };
        self.desktop.composite(&mut self.frame);
        let size = window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };
        if let Err(err) = gfx.resize(w, h) {
            log::error!("surface resize failed: {err}");
            return;
        }
        let mut buffer = match gfx.buffer_mut() {
            Ok(buffer) => buffer,
            Err(err) => {
                log::error!("buffer acquisition failed: {err}");
                return;
            }
        };
        let (w, h) = (w.get(), h.get());
        let pixels = self.frame.pixels();
        for y in 0..h {
            let sy = (y as u64 * SCREEN_H as u64 / h as u64) as u32;
            let src_row = (sy * SCREEN_W) as usize;
            let dst_row = (y * w) as usize;
            for x in 0..w {
                let sx = (x as u64 * SCREEN_W as u64 / w as u64) as usize;
                buffer[dst_row + x as usize] = pixels[src_row + sx];
            }
        }
        if let Err(err) = buffer.present() {
            log::error!("present failed: {err}");
        }
    }
}

fn translate_named(key: NamedKey) -> Option<KeyEvent> {
    match key {
        NamedKey::Backspace => Some(KeyEvent::Backspace),
        NamedKey::Delete => Some(KeyEvent::Delete),
        NamedKey::Enter => Some(KeyEvent::Enter),
        NamedKey::Space => Some(KeyEvent::Char(' ')),
        NamedKey::ArrowLeft => Some(KeyEvent::Left),
        NamedKey::ArrowRight => Some(KeyEvent::Right),
        NamedKey::ArrowUp => Some(KeyEvent::Up),
        NamedKey::ArrowDown => Some(KeyEvent::Down),
        NamedKey::Home => Some(KeyEvent::Home),
        NamedKey::End => Some(KeyEvent::End),
        NamedKey::Escape => Some(KeyEvent::Escape),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title("retrodesk")
            .with_inner_size(LogicalSize::new(SCREEN_W as f64, SCREEN_H as f64))
            .with_resizable(false);
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .expect("failed to create the host window"),
        );
        let context =
            softbuffer::Context::new(window.clone()).expect("failed to create a render context");
        let gfx = softbuffer::Surface::new(&context, window.clone())
            .expect("failed to create a render surface");
        self.window = Some(window);
        self.context = Some(context);
        self.gfx = Some(gfx);
        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("shutting down");
                event_loop.exit();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = self.desktop_pos(position.x, position.y);
                if self.desktop.pointer_moved(x, y) {
                    self.request_redraw();
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let updated = match state {
                    ElementState::Pressed => self.desktop.button_pressed(),
                    ElementState::Released => self.desktop.button_released(),
                };
                if updated {
                    self.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let mut updated = false;
                match &event.logical_key {
                    Key::Named(named) => {
                        if let Some(evt) = translate_named(*named) {
                            updated = self.desktop.key_event(evt);
                        }
                    }
                    Key::Character(text) => {
                        for ch in text.chars().filter(|ch| !ch.is_control()) {
                            updated |= self.desktop.key_event(KeyEvent::Char(ch));
                        }
                    }
                    _ => {}
                }
                if updated {
                    self.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                self.present();
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting retrodesk ({SCREEN_W}x{SCREEN_H})");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
