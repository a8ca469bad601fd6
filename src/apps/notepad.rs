use std::path::Path;

use anyhow::Context;

use crate::surface::{GLYPH_H, GLYPH_W};
use crate::theme;
use crate::windows::{
    AppAction, AppContext, AppEventResult, KeyEvent, MouseEvent, MouseEventKind, Rect, WindowApp,
};

pub const WIDTH: u32 = 350;
pub const HEIGHT: u32 = 220;

const TEXT_AREA: Rect = Rect { x: 5, y: 4, w: 336, h: 160 };
const TEXT_PAD: i32 = 3;
const LINE_H: u32 = GLYPH_H + 2;
const OK_BUTTON: Rect = Rect { x: 223, y: 170, w: 56, h: 18 };
const SAVE_BUTTON: Rect = Rect { x: 285, y: 170, w: 56, h: 18 };

/// Plain multi-line edit buffer. Rows are lines, columns are char indices.
pub struct TextBuffer {
    lines: Vec<String>,
    cursor_row: usize,
    cursor_col: usize,
    scroll: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
            scroll: 0,
        }
    }

    /// The document text as a native text widget would hand it back:
    /// every line terminated, including the last.
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map(|l| l.chars().count()).unwrap_or(0)
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map(|(idx, _)| idx)
            .unwrap_or(line.len())
    }

    pub fn insert_char(&mut self, ch: char) {
        let col = self.cursor_col.min(self.line_len(self.cursor_row));
        let line = &mut self.lines[self.cursor_row];
        let at = Self::byte_index(line, col);
        line.insert(at, ch);
        self.cursor_col = col + 1;
    }

    pub fn newline(&mut self) {
        let col = self.cursor_col.min(self.line_len(self.cursor_row));
        let line = &mut self.lines[self.cursor_row];
        let at = Self::byte_index(line, col);
        let rest = line.split_off(at);
        self.lines.insert(self.cursor_row + 1, rest);
        self.cursor_row += 1;
        self.cursor_col = 0;
    }

    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            let col = self.cursor_col - 1;
            let line = &mut self.lines[self.cursor_row];
            let at = Self::byte_index(line, col);
            line.remove(at);
            self.cursor_col = col;
        } else if self.cursor_row > 0 {
            let current = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.line_len(self.cursor_row);
            self.lines[self.cursor_row].push_str(&current);
        }
    }

    pub fn delete(&mut self) {
        let len = self.line_len(self.cursor_row);
        if self.cursor_col < len {
            let line = &mut self.lines[self.cursor_row];
            let at = Self::byte_index(line, self.cursor_col);
            line.remove(at);
        } else if self.cursor_row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.line_len(self.cursor_row);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_col < self.line_len(self.cursor_row) {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_row));
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_row));
        }
    }

    pub fn set_cursor(&mut self, row: usize, col: usize) {
        self.cursor_row = row.min(self.lines.len().saturating_sub(1));
        self.cursor_col = col.min(self.line_len(self.cursor_row));
    }

    fn ensure_cursor_visible(&mut self, visible_rows: usize) {
        if visible_rows == 0 {
            return;
        }
        if self.cursor_row < self.scroll {
            self.scroll = self.cursor_row;
        } else if self.cursor_row >= self.scroll + visible_rows {
            self.scroll = self.cursor_row + 1 - visible_rows;
        }
    }
}

pub struct NotepadApp {
    buffer: TextBuffer,
    pending: Option<AppAction>,
}

impl NotepadApp {
    pub fn new() -> Self {
        Self {
            buffer: TextBuffer::new(),
            pending: None,
        }
    }

    fn visible_rows() -> usize {
        ((TEXT_AREA.h as i32 - TEXT_PAD * 2) / LINE_H as i32).max(0) as usize
    }

    fn visible_cols() -> usize {
        ((TEXT_AREA.w as i32 - TEXT_PAD * 2) / GLYPH_W as i32).max(0) as usize
    }
}

impl WindowApp for NotepadApp {
    fn draw(&mut self, ctx: &mut AppContext<'_>, input_focus: bool) {
        ctx.clear(theme::WIN_BG);
        ctx.fill_rect(TEXT_AREA.x, TEXT_AREA.y, TEXT_AREA.w, TEXT_AREA.h, theme::ENTRY_BG);
        ctx.draw_sunken_frame(TEXT_AREA);

        let rows = Self::visible_rows();
        let cols = Self::visible_cols();
        let x0 = TEXT_AREA.x + TEXT_PAD;
        let y0 = TEXT_AREA.y + TEXT_PAD;
        for (idx, line) in self
            .buffer
            .lines
            .iter()
            .enumerate()
            .skip(self.buffer.scroll)
            .take(rows)
        {
            let y = y0 + ((idx - self.buffer.scroll) as i32) * LINE_H as i32;
            // Overlong lines must not spill past the sunken frame.
            let shown: String = line.chars().take(cols).collect();
            ctx.draw_text(x0, y, &shown, theme::ENTRY_FG);
        }

        if input_focus
            && self.buffer.cursor_col <= cols
            && self.buffer.cursor_row >= self.buffer.scroll
            && self.buffer.cursor_row < self.buffer.scroll + rows
        {
            let cy = y0 + ((self.buffer.cursor_row - self.buffer.scroll) as i32) * LINE_H as i32;
            let cx = x0 + (self.buffer.cursor_col as u32 * GLYPH_W) as i32;
            ctx.fill_rect(cx, cy, 1, GLYPH_H, theme::ENTRY_FG);
        }

        ctx.draw_button(OK_BUTTON, "OK");
        ctx.draw_button(SAVE_BUTTON, "Save");
    }

    fn handle_mouse(&mut self, evt: &MouseEvent) -> AppEventResult {
        if evt.kind != MouseEventKind::Down {
            return AppEventResult::Ignored;
        }
        if OK_BUTTON.contains(evt.x, evt.y) {
            self.pending = Some(AppAction::Close);
            return AppEventResult::Handled;
        }
        if SAVE_BUTTON.contains(evt.x, evt.y) {
            self.pending = Some(AppAction::PromptSave {
                title: "Notepad",
                default_ext: ".txt",
            });
            return AppEventResult::Handled;
        }
        if TEXT_AREA.contains(evt.x, evt.y) {
            let row = self.buffer.scroll
                + ((evt.y - TEXT_AREA.y - TEXT_PAD).max(0) as usize) / LINE_H as usize;
            let col = ((evt.x - TEXT_AREA.x - TEXT_PAD).max(0) as usize) / GLYPH_W as usize;
            self.buffer.set_cursor(row, col);
            return AppEventResult::HandledRedraw;
        }
        AppEventResult::Ignored
    }

    fn handle_key(&mut self, evt: &KeyEvent) -> AppEventResult {
        match evt {
            KeyEvent::Char(ch) => self.buffer.insert_char(*ch),
            KeyEvent::Enter => self.buffer.newline(),
            KeyEvent::Backspace => self.buffer.backspace(),
            KeyEvent::Delete => self.buffer.delete(),
            KeyEvent::Left => self.buffer.move_left(),
            KeyEvent::Right => self.buffer.move_right(),
            KeyEvent::Up => self.buffer.move_up(),
            KeyEvent::Down => self.buffer.move_down(),
            KeyEvent::Home => self.buffer.cursor_col = 0,
            KeyEvent::End => {
                self.buffer.cursor_col = self.buffer.line_len(self.buffer.cursor_row)
            }
            KeyEvent::Escape => return AppEventResult::Ignored,
        }
        self.buffer.ensure_cursor_visible(Self::visible_rows());
        AppEventResult::HandledRedraw
    }

    fn take_action(&mut self) -> Option<AppAction> {
        self.pending.take()
    }

    fn write_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let contents = self.buffer.contents();
        std::fs::write(path, contents.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("notepad: saved {} bytes to {}", contents.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(buf: &mut TextBuffer, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                buf.newline();
            } else {
                buf.insert_char(ch);
            }
        }
    }

    #[test]
    fn contents_carry_a_trailing_newline() {
        let buf = TextBuffer::new();
        assert_eq!(buf.contents(), "\n");
        let mut buf = TextBuffer::new();
        type_str(&mut buf, "hello\nworld");
        assert_eq!(buf.contents(), "hello\nworld\n");
    }

    #[test]
    fn backspace_joins_lines() {
        let mut buf = TextBuffer::new();
        type_str(&mut buf, "ab\ncd");
        buf.set_cursor(1, 0);
        buf.backspace();
        assert_eq!(buf.contents(), "abcd\n");
        assert_eq!((buf.cursor_row, buf.cursor_col), (0, 2));
    }

    #[test]
    fn delete_at_line_end_joins_next_line() {
        let mut buf = TextBuffer::new();
        type_str(&mut buf, "ab\ncd");
        buf.set_cursor(0, 2);
        buf.delete();
        assert_eq!(buf.contents(), "abcd\n");
    }

    #[test]
    fn insert_in_middle_respects_utf8() {
        let mut buf = TextBuffer::new();
        type_str(&mut buf, "aé");
        buf.set_cursor(0, 1);
        buf.insert_char('ö');
        assert_eq!(buf.contents(), "aöé\n");
    }

    #[test]
    fn save_round_trips_utf8_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("note.txt");
        let mut app = NotepadApp::new();
        for ch in "héllo\nwörld".chars() {
            if ch == '\n' {
                app.buffer.newline();
            } else {
                app.buffer.insert_char(ch);
            }
        }
        app.write_file(&path).expect("write");
        let read_back = std::fs::read_to_string(&path).expect("read");
        assert_eq!(read_back, app.buffer.contents());
        assert_eq!(read_back, "héllo\nwörld\n");
    }

    #[test]
    fn save_failure_surfaces_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("note.txt");
        let mut app = NotepadApp::new();
        assert!(app.write_file(&path).is_err());
    }

    #[test]
    fn long_lines_clip_to_the_text_area() {
        use crate::surface::Surface;

        let mut surface = Surface::new(WIDTH, HEIGHT, 0);
        let mut app = NotepadApp::new();
        for _ in 0..60 {
            app.buffer.insert_char('x');
        }
        let content = Rect::new(0, 0, WIDTH, HEIGHT);
        let mut ctx = AppContext::new(&mut surface, content);
        app.draw(&mut ctx, true);

        // The margin right of the sunken frame must stay window face.
        let margin_x = (TEXT_AREA.x + TEXT_AREA.w as i32 + 4) as u32;
        let y = (TEXT_AREA.y + TEXT_PAD + 2) as u32;
        assert_eq!(surface.pixel(margin_x, y), Some(theme::WIN_BG));
    }

    #[test]
    fn ok_button_requests_close() {
        let mut app = NotepadApp::new();
        let evt = MouseEvent {
            x: OK_BUTTON.x + 2,
            y: OK_BUTTON.y + 2,
            kind: MouseEventKind::Down,
        };
        assert!(app.handle_mouse(&evt).handled());
        assert_eq!(app.take_action(), Some(AppAction::Close));
        assert_eq!(app.take_action(), None);
    }
}
