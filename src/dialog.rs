//! Modal dialogs: the save-path prompt and the OK-only notice box.

use std::path::PathBuf;

use crate::surface::{text_width, Surface};
use crate::theme;
use crate::windows::{KeyEvent, MouseEvent, MouseEventKind, Rect};

const SAVE_W: u32 = 300;
const SAVE_H: u32 = 130;
const NOTICE_W: u32 = 300;
const NOTICE_LINE_H: u32 = 11;
const MAX_NOTICE_LINES: usize = 8;
const TITLE_H: u32 = 18;
const MAX_PATH_CHARS: usize = 120;

#[derive(Debug, PartialEq, Eq)]
pub enum DialogOutcome {
    None,
    Redraw,
    /// Save prompt confirmed with a usable path.
    Confirmed(PathBuf),
    /// Cancelled, or a notice was dismissed. The dialog closes with no
    /// further effect.
    Dismissed,
}

pub enum Dialog {
    Save(SaveDialog),
    Notice(NoticeDialog),
}

impl Dialog {
    pub fn draw(&self, frame: &mut Surface) {
        match self {
            Dialog::Save(d) => d.draw(frame),
            Dialog::Notice(d) => d.draw(frame),
        }
    }

    pub fn handle_mouse(&mut self, frame_w: u32, frame_h: u32, evt: &MouseEvent) -> DialogOutcome {
        match self {
            Dialog::Save(d) => d.handle_mouse(frame_w, frame_h, evt),
            Dialog::Notice(d) => d.handle_mouse(frame_w, frame_h, evt),
        }
    }

    pub fn handle_key(&mut self, evt: &KeyEvent) -> DialogOutcome {
        match self {
            Dialog::Save(d) => d.handle_key(evt),
            Dialog::Notice(d) => d.handle_key(evt),
        }
    }
}

pub struct SaveDialog {
    title: &'static str,
    default_ext: &'static str,
    /// Window the confirmed path is delivered to.
    pub owner: u32,
    input: String,
}

fn centered(frame_w: u32, frame_h: u32, w: u32, h: u32) -> Rect {
    Rect::new(
        ((frame_w.saturating_sub(w)) / 2) as i32,
        ((frame_h.saturating_sub(h)) / 2) as i32,
        w,
        h,
    )
}

fn draw_dialog_frame(frame: &mut Surface, r: Rect, title: &str) {
    frame.fill_rect(r.x, r.y, r.w, r.h, theme::WIN_BG);
    theme::draw_raised_frame(frame, r);
    frame.fill_rect(r.x + 2, r.y + 2, r.w - 4, TITLE_H, theme::TITLE_BG);
    frame.draw_text(r.x + 6, r.y + 2 + 5, title, theme::TITLE_FG);
}

impl SaveDialog {
    pub fn new(title: &'static str, default_ext: &'static str, owner: u32) -> Self {
        Self {
            title,
            default_ext,
            owner,
            input: String::new(),
        }
    }

    fn rect(frame_w: u32, frame_h: u32) -> Rect {
        centered(frame_w, frame_h, SAVE_W, SAVE_H)
    }

    fn entry_rect(r: Rect) -> Rect {
        Rect::new(r.x + 10, r.y + 52, r.w - 20, 18)
    }

    fn ok_rect(r: Rect) -> Rect {
        Rect::new(r.x + r.w as i32 - 136, r.y + r.h as i32 - 30, 60, 20)
    }

    fn cancel_rect(r: Rect) -> Rect {
        Rect::new(r.x + r.w as i32 - 70, r.y + r.h as i32 - 30, 60, 20)
    }

    /// The confirmed destination. An all-whitespace entry yields nothing;
    /// a file name without an extension gets the default suffix appended.
    pub fn resolve(&self) -> Option<PathBuf> {
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            return None;
        }
        let path = PathBuf::from(trimmed);
        let has_ext = path.extension().is_some();
        if has_ext {
            Some(path)
        } else {
            let mut name = trimmed.to_string();
            name.push_str(self.default_ext);
            Some(PathBuf::from(name))
        }
    }

    fn draw(&self, frame: &mut Surface) {
        let r = Self::rect(frame.width(), frame.height());
        draw_dialog_frame(frame, r, self.title);
        frame.draw_text(r.x + 10, r.y + 30, "Save as:", theme::BUTTON_FG);
        // Show the tail when the typed path is wider than the entry.
        let entry = Self::entry_rect(r);
        let max_chars = ((entry.w.saturating_sub(8)) / 8) as usize;
        let shown: String = if self.input.chars().count() > max_chars {
            let skip = self.input.chars().count() - max_chars;
            self.input.chars().skip(skip).collect()
        } else {
            self.input.clone()
        };
        theme::draw_entry(frame, entry, &shown, true);
        theme::draw_button(frame, Self::ok_rect(r), "OK");
        theme::draw_button(frame, Self::cancel_rect(r), "Cancel");
    }

    fn handle_mouse(&mut self, frame_w: u32, frame_h: u32, evt: &MouseEvent) -> DialogOutcome {
        if evt.kind != MouseEventKind::Down {
            return DialogOutcome::None;
        }
        let r = Self::rect(frame_w, frame_h);
        if Self::ok_rect(r).contains(evt.x, evt.y) {
            return match self.resolve() {
                Some(path) => DialogOutcome::Confirmed(path),
                None => DialogOutcome::None,
            };
        }
        if Self::cancel_rect(r).contains(evt.x, evt.y) {
            return DialogOutcome::Dismissed;
        }
        DialogOutcome::None
    }

    fn handle_key(&mut self, evt: &KeyEvent) -> DialogOutcome {
        match evt {
            KeyEvent::Char(ch) if !ch.is_control() => {
                if self.input.chars().count() < MAX_PATH_CHARS {
                    self.input.push(*ch);
                    return DialogOutcome::Redraw;
                }
                DialogOutcome::None
            }
            KeyEvent::Backspace => {
                self.input.pop();
                DialogOutcome::Redraw
            }
            KeyEvent::Enter => match self.resolve() {
                Some(path) => DialogOutcome::Confirmed(path),
                None => DialogOutcome::None,
            },
            KeyEvent::Escape => DialogOutcome::Dismissed,
            _ => DialogOutcome::None,
        }
    }
}

pub struct NoticeDialog {
    title: &'static str,
    message: String,
}

impl NoticeDialog {
    pub fn new(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            title,
            message: message.into(),
        }
    }

    fn lines(&self) -> Vec<String> {
        let max_chars = ((NOTICE_W - 20) / 8) as usize;
        let mut lines = wrap_chars(&self.message, max_chars);
        lines.truncate(MAX_NOTICE_LINES);
        lines
    }

    /// The box grows with the wrapped message so long error texts are
    /// shown in full.
    fn rect(&self, frame_w: u32, frame_h: u32) -> Rect {
        let rows = self.lines().len().max(1) as u32;
        centered(frame_w, frame_h, NOTICE_W, 60 + rows * NOTICE_LINE_H)
    }

    fn ok_rect(r: Rect) -> Rect {
        Rect::new(r.x + (r.w as i32 - 60) / 2, r.y + r.h as i32 - 28, 60, 20)
    }

    fn draw(&self, frame: &mut Surface) {
        let r = self.rect(frame.width(), frame.height());
        draw_dialog_frame(frame, r, self.title);
        let mut y = r.y + 26;
        for line in self.lines() {
            let tw = text_width(&line);
            frame.draw_text(r.x + (r.w.saturating_sub(tw) / 2) as i32, y, &line, theme::BUTTON_FG);
            y += NOTICE_LINE_H as i32;
        }
        theme::draw_button(frame, Self::ok_rect(r), "OK");
    }

    fn handle_mouse(&mut self, frame_w: u32, frame_h: u32, evt: &MouseEvent) -> DialogOutcome {
        if evt.kind != MouseEventKind::Down {
            return DialogOutcome::None;
        }
        let r = self.rect(frame_w, frame_h);
        if Self::ok_rect(r).contains(evt.x, evt.y) {
            return DialogOutcome::Dismissed;
        }
        DialogOutcome::None
    }

    fn handle_key(&mut self, evt: &KeyEvent) -> DialogOutcome {
        match evt {
            KeyEvent::Enter | KeyEvent::Escape => DialogOutcome::Dismissed,
            _ => DialogOutcome::None,
        }
    }
}

fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for part in text.split('\n') {
        let chars: Vec<char> = part.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            lines.push(chunk.iter().collect());
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(dialog: &mut SaveDialog, text: &str) {
        for ch in text.chars() {
            dialog.handle_key(&KeyEvent::Char(ch));
        }
    }

    #[test]
    fn default_extension_is_appended() {
        let mut d = SaveDialog::new("Notepad", ".txt", 1);
        typed(&mut d, "note");
        assert_eq!(d.resolve(), Some(PathBuf::from("note.txt")));
    }

    #[test]
    fn explicit_extension_is_kept() {
        let mut d = SaveDialog::new("Paint", ".png", 1);
        typed(&mut d, "drawing.png");
        assert_eq!(d.resolve(), Some(PathBuf::from("drawing.png")));
    }

    #[test]
    fn empty_entry_does_not_confirm() {
        let mut d = SaveDialog::new("Notepad", ".txt", 1);
        assert_eq!(d.resolve(), None);
        assert_eq!(d.handle_key(&KeyEvent::Enter), DialogOutcome::None);
        typed(&mut d, "   ");
        assert_eq!(d.handle_key(&KeyEvent::Enter), DialogOutcome::None);
    }

    #[test]
    fn escape_dismisses_without_a_path() {
        let mut d = SaveDialog::new("Notepad", ".txt", 1);
        typed(&mut d, "note");
        assert_eq!(d.handle_key(&KeyEvent::Escape), DialogOutcome::Dismissed);
    }

    #[test]
    fn enter_confirms_with_resolved_path() {
        let mut d = SaveDialog::new("Notepad", ".txt", 1);
        typed(&mut d, "dir/note");
        assert_eq!(
            d.handle_key(&KeyEvent::Enter),
            DialogOutcome::Confirmed(PathBuf::from("dir/note.txt"))
        );
    }

    #[test]
    fn wrap_chars_splits_long_messages() {
        let lines = wrap_chars("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn notice_box_grows_to_fit_the_message() {
        let short = NoticeDialog::new("Saved", "ok");
        let long = NoticeDialog::new("Save failed", "e".repeat(200));
        let rs = short.rect(600, 400);
        let rl = long.rect(600, 400);
        assert!(rl.h > rs.h);
        // 200 chars wrap to 6 rows at 35 chars per row; none are dropped.
        assert_eq!(long.lines().len(), 6);
        assert_eq!(long.lines().concat().chars().count(), 200);
    }
}
