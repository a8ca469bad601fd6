use std::path::Path;

use crate::surface::Surface;
use crate::theme;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && py >= self.y
            && px < self.x.saturating_add(self.w as i32)
            && py < self.y.saturating_add(self.h as i32)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MouseEventKind {
    Down,
    Move,
    Up,
}

/// Mouse event in content-local coordinates. Coordinates may fall outside
/// the content area while the pointer is captured mid-drag.
#[derive(Copy, Clone, Debug)]
pub struct MouseEvent {
    pub x: i32,
    pub y: i32,
    pub kind: MouseEventKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Char(char),
    Backspace,
    Delete,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Escape,
}

#[derive(Copy, Clone)]
pub enum AppEventResult {
    Ignored,
    Handled,
    HandledRedraw,
}

impl AppEventResult {
    pub fn handled(&self) -> bool {
        !matches!(*self, AppEventResult::Ignored)
    }

    pub fn needs_redraw(&self) -> bool {
        matches!(*self, AppEventResult::HandledRedraw)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppAction {
    Close,
    PromptSave {
        title: &'static str,
        default_ext: &'static str,
    },
    /// Show a notice box without prompting, e.g. when a save capability
    /// is compiled out.
    Notice {
        title: &'static str,
        message: &'static str,
    },
}

/// Drawing context handed to an app: the window surface restricted to the
/// content area below the title bar. All coordinates are content-local.
pub struct AppContext<'a> {
    surface: &'a mut Surface,
    content: Rect,
}

impl<'a> AppContext<'a> {
    pub fn new(surface: &'a mut Surface, content: Rect) -> Self {
        Self { surface, content }
    }

    pub fn content_w(&self) -> u32 {
        self.content.w
    }

    pub fn content_h(&self) -> u32 {
        self.content.h
    }

    pub fn clear(&mut self, color: u32) {
        let r = self.content;
        self.surface.fill_rect(r.x, r.y, r.w, r.h, color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: u32) {
        self.surface
            .fill_rect(x + self.content.x, y + self.content.y, w, h, color);
    }

    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, fg: u32) {
        self.surface
            .draw_text(x + self.content.x, y + self.content.y, text, fg);
    }

    pub fn blit(&mut self, src: &Surface, x: i32, y: i32) {
        self.surface.blit(src, x + self.content.x, y + self.content.y);
    }

    pub fn draw_button(&mut self, r: Rect, label: &str) {
        theme::draw_button(self.surface, self.offset(r), label);
    }

    pub fn draw_button_face(&mut self, r: Rect, label: &str, bg: u32, fg: u32) {
        theme::draw_button_face(self.surface, self.offset(r), label, bg, fg);
    }

    pub fn draw_raised_frame(&mut self, r: Rect) {
        theme::draw_raised_frame(self.surface, self.offset(r));
    }

    pub fn draw_sunken_frame(&mut self, r: Rect) {
        theme::draw_sunken_frame(self.surface, self.offset(r));
    }

    pub fn draw_entry(&mut self, r: Rect, text: &str, show_cursor: bool) {
        theme::draw_entry(self.surface, self.offset(r), text, show_cursor);
    }

    pub fn draw_entry_right(&mut self, r: Rect, text: &str) {
        theme::draw_entry_right(self.surface, self.offset(r), text);
    }

    fn offset(&self, r: Rect) -> Rect {
        Rect::new(r.x + self.content.x, r.y + self.content.y, r.w, r.h)
    }
}

pub trait WindowApp {
    fn draw(&mut self, ctx: &mut AppContext<'_>, input_focus: bool);

    fn handle_mouse(&mut self, _evt: &MouseEvent) -> AppEventResult {
        AppEventResult::Ignored
    }

    fn handle_key(&mut self, _evt: &KeyEvent) -> AppEventResult {
        AppEventResult::Ignored
    }

    fn take_action(&mut self) -> Option<AppAction> {
        None
    }

    /// Invoked by the shell once a save prompt has been confirmed.
    fn write_file(&mut self, _path: &Path) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct AppDescriptor {
    pub label: &'static str,
    pub default_title: &'static str,
    pub width: u32,
    pub height: u32,
    pub factory: fn() -> Box<dyn WindowApp>,
}
