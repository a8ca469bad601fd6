//! Windows 1.0 palette and the beveled widget faces shared by every app.

use crate::surface::{text_width, Surface, GLYPH_H};
use crate::windows::Rect;

pub const WIN_BG: u32 = 0xC0C0C0;
pub const TITLE_BG: u32 = 0x000080;
pub const TITLE_FG: u32 = 0xFFFFFF;
pub const BORDER_LIGHT: u32 = 0xFFFFFF;
pub const BORDER_DARK: u32 = 0x808080;
pub const BUTTON_FG: u32 = 0x000000;
pub const ENTRY_BG: u32 = 0xFFFFFF;
pub const ENTRY_FG: u32 = 0x000000;
pub const DESKTOP_FG: u32 = 0x000000;

/// Raised 3-D edge: light on top/left, dark on bottom/right.
pub fn draw_raised_frame(s: &mut Surface, r: Rect) {
    draw_frame(s, r, BORDER_LIGHT, BORDER_DARK);
}

/// Sunken 3-D edge, used for entry fields and the paint canvas well.
pub fn draw_sunken_frame(s: &mut Surface, r: Rect) {
    draw_frame(s, r, BORDER_DARK, BORDER_LIGHT);
}

fn draw_frame(s: &mut Surface, r: Rect, top_left: u32, bottom_right: u32) {
    if r.w == 0 || r.h == 0 {
        return;
    }
    s.fill_rect(r.x, r.y, r.w, 1, top_left);
    s.fill_rect(r.x, r.y, 1, r.h, top_left);
    s.fill_rect(r.x, r.y + r.h as i32 - 1, r.w, 1, bottom_right);
    s.fill_rect(r.x + r.w as i32 - 1, r.y, 1, r.h, bottom_right);
}

pub fn draw_button(s: &mut Surface, r: Rect, label: &str) {
    draw_button_face(s, r, label, WIN_BG, BUTTON_FG);
}

pub fn draw_button_face(s: &mut Surface, r: Rect, label: &str, bg: u32, fg: u32) {
    s.fill_rect(r.x, r.y, r.w, r.h, bg);
    draw_raised_frame(s, r);
    let tw = text_width(label);
    let tx = r.x + ((r.w.saturating_sub(tw)) / 2) as i32;
    let ty = r.y + ((r.h.saturating_sub(GLYPH_H)) / 2) as i32;
    s.draw_text(tx, ty, label, fg);
}

pub fn draw_entry(s: &mut Surface, r: Rect, text: &str, show_cursor: bool) {
    s.fill_rect(r.x, r.y, r.w, r.h, ENTRY_BG);
    draw_sunken_frame(s, r);
    let ty = r.y + ((r.h.saturating_sub(GLYPH_H)) / 2) as i32;
    s.draw_text(r.x + 3, ty, text, ENTRY_FG);
    if show_cursor {
        let cx = r.x + 3 + text_width(text) as i32;
        s.fill_rect(cx, r.y + 2, 1, r.h.saturating_sub(4), ENTRY_FG);
    }
}

/// Right-justified entry, used by the calculator display.
pub fn draw_entry_right(s: &mut Surface, r: Rect, text: &str) {
    s.fill_rect(r.x, r.y, r.w, r.h, ENTRY_BG);
    draw_sunken_frame(s, r);
    let tw = text_width(text);
    let tx = r.x + r.w as i32 - 3 - tw as i32;
    let ty = r.y + ((r.h.saturating_sub(GLYPH_H)) / 2) as i32;
    s.draw_text(tx, ty, text, ENTRY_FG);
}
