use heapless::String as HString;

use crate::apps;
use crate::dialog::{Dialog, DialogOutcome, NoticeDialog, SaveDialog};
use crate::surface::Surface;
use crate::theme;
use crate::windows::{
    AppAction, AppContext, AppDescriptor, KeyEvent, MouseEvent, MouseEventKind, Rect, WindowApp,
};

pub const SCREEN_W: u32 = 600;
pub const SCREEN_H: u32 = 400;

const TASKBAR_H: u32 = 28;
const BORDER: i32 = 2;
const TITLE_H: u32 = 22;
const CLOSE_SIZE: u32 = 16;
const SPAWN_X: i32 = 120;
const SPAWN_Y: i32 = 120;
const ICON_X: i32 = 12;
const ICON_W: u32 = 104;
const ICON_H: u32 = 32;
const ICON_Y0: i32 = 50;
const ICON_STEP: i32 = 60;
const TASKBAR_BTN_W: u32 = 96;
const TASKBAR_BTN_H: u32 = 22;

struct DesktopWindow {
    id: u32,
    rect: Rect,
    title: HString<32>,
    surface: Surface,
    app: Box<dyn WindowApp>,
}

impl DesktopWindow {
    fn title_bar_rect(&self) -> Rect {
        // Window-local; excludes the close control on the right.
        Rect::new(
            BORDER,
            BORDER,
            self.rect.w.saturating_sub((BORDER as u32) * 2 + CLOSE_SIZE + 6),
            TITLE_H,
        )
    }

    fn close_rect(&self) -> Rect {
        Rect::new(
            self.rect.w as i32 - BORDER - CLOSE_SIZE as i32 - 3,
            BORDER + 3,
            CLOSE_SIZE,
            CLOSE_SIZE,
        )
    }

    fn content_rect(&self) -> Rect {
        Rect::new(
            BORDER,
            BORDER + TITLE_H as i32,
            self.rect.w.saturating_sub((BORDER as u32) * 2),
            self.rect.h.saturating_sub((BORDER as u32) * 2 + TITLE_H),
        )
    }

    fn render(&mut self, input_focus: bool) {
        self.surface.clear(theme::WIN_BG);
        let w = self.rect.w;
        let h = self.rect.h;
        theme::draw_raised_frame(&mut self.surface, Rect::new(0, 0, w, h));
        theme::draw_sunken_frame(&mut self.surface, Rect::new(1, 1, w - 2, h - 2));
        self.surface.fill_rect(
            BORDER,
            BORDER,
            w.saturating_sub(BORDER as u32 * 2),
            TITLE_H,
            theme::TITLE_BG,
        );
        self.surface
            .draw_text(BORDER + 6, BORDER + 7, &self.title, theme::TITLE_FG);

        let close = self.close_rect();
        theme::draw_button(&mut self.surface, close, "");
        self.surface.fill_rect(
            close.x + (close.w as i32 - 6) / 2,
            close.y + (close.h as i32 - 6) / 2,
            6,
            6,
            theme::BUTTON_FG,
        );

        let content = self.content_rect();
        let mut ctx = AppContext::new(&mut self.surface, content);
        self.app.draw(&mut ctx, input_focus);
    }
}

struct LaunchButton {
    rect: Rect,
    app_idx: usize,
}

struct DragState {
    window: u32,
    grab_x: i32,
    grab_y: i32,
}

pub struct Desktop {
    screen_w: u32,
    screen_h: u32,
    background: Surface,
    apps: &'static [AppDescriptor],
    icon_buttons: Vec<LaunchButton>,
    taskbar_buttons: Vec<LaunchButton>,
    /// Stacking order: last entry is topmost. Raise-to-front is a reorder.
    windows: Vec<DesktopWindow>,
    next_id: u32,
    focused: Option<u32>,
    drag: Option<DragState>,
    /// Window receiving motion/release while the button stays down.
    capture: Option<u32>,
    dialog: Option<Dialog>,
    pointer_x: i32,
    pointer_y: i32,
}

impl Desktop {
    pub fn new(screen_w: u32, screen_h: u32) -> Self {
        let apps = apps::builtin_apps();
        let mut background = Surface::new(screen_w, screen_h, theme::WIN_BG);
        background.draw_text(10, 10, "retrodesk", theme::DESKTOP_FG);

        let mut icon_buttons = Vec::new();
        let mut taskbar_buttons = Vec::new();
        let taskbar_y = screen_h.saturating_sub(TASKBAR_H) as i32;
        background.fill_rect(0, taskbar_y, screen_w, TASKBAR_H, theme::TITLE_BG);
        for (idx, app) in apps.iter().enumerate() {
            let icon = Rect::new(ICON_X, ICON_Y0 + idx as i32 * ICON_STEP, ICON_W, ICON_H);
            theme::draw_button(&mut background, icon, app.label);
            icon_buttons.push(LaunchButton { rect: icon, app_idx: idx });

            let btn = Rect::new(
                6 + idx as i32 * (TASKBAR_BTN_W as i32 + 6),
                taskbar_y + ((TASKBAR_H - TASKBAR_BTN_H) / 2) as i32,
                TASKBAR_BTN_W,
                TASKBAR_BTN_H,
            );
            theme::draw_button(&mut background, btn, app.label);
            taskbar_buttons.push(LaunchButton { rect: btn, app_idx: idx });
        }

        Self {
            screen_w,
            screen_h,
            background,
            apps,
            icon_buttons,
            taskbar_buttons,
            windows: Vec::new(),
            next_id: 1,
            focused: None,
            drag: None,
            capture: None,
            dialog: None,
            pointer_x: 0,
            pointer_y: 0,
        }
    }

    pub fn launch(&mut self, app_idx: usize) -> Option<u32> {
        let desc = self.apps.get(app_idx)?;
        let id = self.next_id;
        self.next_id += 1;
        let mut title = HString::new();
        for ch in desc.default_title.chars().take(32) {
            let _ = title.push(ch);
        }
        log::info!("launching {} (window {})", desc.label, id);
        self.windows.push(DesktopWindow {
            id,
            rect: Rect::new(SPAWN_X, SPAWN_Y, desc.width, desc.height),
            title,
            surface: Surface::new(desc.width, desc.height, theme::WIN_BG),
            app: (desc.factory)(),
        });
        self.focused = Some(id);
        Some(id)
    }

    fn window_index(&self, id: u32) -> Option<usize> {
        self.windows.iter().position(|w| w.id == id)
    }

    fn raise(&mut self, id: u32) {
        if let Some(idx) = self.window_index(id) {
            if idx + 1 != self.windows.len() {
                let win = self.windows.remove(idx);
                self.windows.push(win);
            }
        }
    }

    fn close_window(&mut self, id: u32) {
        if let Some(idx) = self.window_index(id) {
            let win = self.windows.remove(idx);
            log::info!("closed {} (window {})", win.title, win.id);
        }
        if self.focused == Some(id) {
            self.focused = self.windows.last().map(|w| w.id);
        }
        if self.capture == Some(id) {
            self.capture = None;
        }
        if self.drag.as_ref().map(|d| d.window) == Some(id) {
            self.drag = None;
        }
    }

    fn window_at(&self, x: i32, y: i32) -> Option<u32> {
        self.windows
            .iter()
            .rev()
            .find(|w| w.rect.contains(x, y))
            .map(|w| w.id)
    }

    fn content_event(win: &DesktopWindow, x: i32, y: i32, kind: MouseEventKind) -> MouseEvent {
        let content = win.content_rect();
        MouseEvent {
            x: x - win.rect.x - content.x,
            y: y - win.rect.y - content.y,
            kind,
        }
    }

    fn forward_mouse(&mut self, id: u32, evt: MouseEvent) -> bool {
        let Some(idx) = self.window_index(id) else {
            return false;
        };
        let result = self.windows[idx].app.handle_mouse(&evt);
        let action = self.windows[idx].app.take_action();
        let mut updated = result.needs_redraw();
        if let Some(action) = action {
            self.handle_app_action(id, action);
            updated = true;
        }
        updated
    }

    fn handle_app_action(&mut self, id: u32, action: AppAction) {
        match action {
            AppAction::Close => self.close_window(id),
            AppAction::PromptSave { title, default_ext } => {
                self.dialog = Some(Dialog::Save(SaveDialog::new(title, default_ext, id)));
            }
            AppAction::Notice { title, message } => {
                self.dialog = Some(Dialog::Notice(NoticeDialog::new(title, message)));
            }
        }
    }

    fn perform_save(&mut self, dialog: SaveDialog, path: std::path::PathBuf) {
        let Some(idx) = self.window_index(dialog.owner) else {
            return;
        };
        let title = self.windows[idx].title.clone();
        match self.windows[idx].app.write_file(&path) {
            Ok(()) => {
                self.dialog = Some(Dialog::Notice(NoticeDialog::new(
                    "Saved",
                    format!("{}: saved {}", title, path.display()),
                )));
            }
            Err(err) => {
                log::warn!("{title}: save failed: {err:#}");
                self.dialog = Some(Dialog::Notice(NoticeDialog::new(
                    "Save failed",
                    format!("{err:#}"),
                )));
            }
        }
    }

    fn dialog_mouse(&mut self, evt: MouseEvent) -> bool {
        let Some(mut dialog) = self.dialog.take() else {
            return false;
        };
        let outcome = dialog.handle_mouse(self.screen_w, self.screen_h, &evt);
        self.finish_dialog(dialog, outcome)
    }

    fn dialog_key(&mut self, evt: &KeyEvent) -> bool {
        let Some(mut dialog) = self.dialog.take() else {
            return false;
        };
        let outcome = dialog.handle_key(evt);
        self.finish_dialog(dialog, outcome)
    }

    fn finish_dialog(&mut self, dialog: Dialog, outcome: DialogOutcome) -> bool {
        match outcome {
            DialogOutcome::None => {
                self.dialog = Some(dialog);
                false
            }
            DialogOutcome::Redraw => {
                self.dialog = Some(dialog);
                true
            }
            DialogOutcome::Dismissed => true,
            DialogOutcome::Confirmed(path) => {
                if let Dialog::Save(save) = dialog {
                    self.perform_save(save, path);
                }
                true
            }
        }
    }

    pub fn pointer_moved(&mut self, x: i32, y: i32) -> bool {
        self.pointer_x = x;
        self.pointer_y = y;
        if self.dialog.is_some() {
            return false;
        }
        if let Some(drag) = &self.drag {
            let id = drag.window;
            let new_x = x - drag.grab_x;
            let new_y = y - drag.grab_y;
            if let Some(idx) = self.window_index(id) {
                let win = &mut self.windows[idx];
                if new_x != win.rect.x || new_y != win.rect.y {
                    // No clamping: windows may leave the screen entirely.
                    win.rect.x = new_x;
                    win.rect.y = new_y;
                    return true;
                }
            }
            return false;
        }
        if let Some(id) = self.capture {
            if let Some(idx) = self.window_index(id) {
                let evt = Self::content_event(&self.windows[idx], x, y, MouseEventKind::Move);
                return self.forward_mouse(id, evt);
            }
        }
        false
    }

    pub fn button_pressed(&mut self) -> bool {
        let (x, y) = (self.pointer_x, self.pointer_y);
        if self.dialog.is_some() {
            return self.dialog_mouse(MouseEvent { x, y, kind: MouseEventKind::Down });
        }

        if let Some(id) = self.window_at(x, y) {
            // Last-clicked always wins the stacking order.
            self.raise(id);
            self.focused = Some(id);
            let idx = self.windows.len() - 1;
            let win = &self.windows[idx];
            let local_x = x - win.rect.x;
            let local_y = y - win.rect.y;
            if win.close_rect().contains(local_x, local_y) {
                self.close_window(id);
                return true;
            }
            if win.title_bar_rect().contains(local_x, local_y) {
                self.drag = Some(DragState {
                    window: id,
                    grab_x: x - win.rect.x,
                    grab_y: y - win.rect.y,
                });
                return true;
            }
            if win.content_rect().contains(local_x, local_y) {
                self.capture = Some(id);
                let evt = Self::content_event(win, x, y, MouseEventKind::Down);
                self.forward_mouse(id, evt);
            }
            return true;
        }

        let hit = self
            .icon_buttons
            .iter()
            .chain(self.taskbar_buttons.iter())
            .find(|btn| btn.rect.contains(x, y))
            .map(|btn| btn.app_idx);
        if let Some(app_idx) = hit {
            self.launch(app_idx);
            return true;
        }

        if self.focused.take().is_some() {
            return true;
        }
        false
    }

    pub fn button_released(&mut self) -> bool {
        if self.dialog.is_some() {
            // The dialog owns all input; drop any press state from the
            // click that opened it.
            self.drag = None;
            self.capture = None;
            return false;
        }
        if self.drag.take().is_some() {
            return false;
        }
        if let Some(id) = self.capture.take() {
            if let Some(idx) = self.window_index(id) {
                let evt = Self::content_event(
                    &self.windows[idx],
                    self.pointer_x,
                    self.pointer_y,
                    MouseEventKind::Up,
                );
                return self.forward_mouse(id, evt);
            }
        }
        false
    }

    pub fn key_event(&mut self, evt: KeyEvent) -> bool {
        if self.dialog.is_some() {
            return self.dialog_key(&evt);
        }
        let Some(id) = self.focused else {
            return false;
        };
        let Some(idx) = self.window_index(id) else {
            self.focused = None;
            return false;
        };
        let result = self.windows[idx].app.handle_key(&evt);
        let action = self.windows[idx].app.take_action();
        let mut updated = result.needs_redraw();
        if let Some(action) = action {
            self.handle_app_action(id, action);
            updated = true;
        }
        updated
    }

    /// Render the whole desktop into `frame`: wallpaper, windows in
    /// stacking order, then any modal dialog on top.
    pub fn composite(&mut self, frame: &mut Surface) {
        frame.blit(&self.background, 0, 0);
        let focused = self.focused;
        for win in &mut self.windows {
            let input_focus = focused == Some(win.id);
            win.render(input_focus);
            frame.blit(&win.surface, win.rect.x, win.rect.y);
        }
        if let Some(dialog) = &self.dialog {
            dialog.draw(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> Desktop {
        Desktop::new(SCREEN_W, SCREEN_H)
    }

    fn press_at(d: &mut Desktop, x: i32, y: i32) -> bool {
        d.pointer_moved(x, y);
        d.button_pressed()
    }

    fn window_origin(d: &Desktop, id: u32) -> (i32, i32) {
        let idx = d.window_index(id).expect("window exists");
        (d.windows[idx].rect.x, d.windows[idx].rect.y)
    }

    const APP_NOTEPAD: usize = 0;
    const APP_CALCULATOR: usize = 1;

    #[test]
    fn launch_spawns_at_default_offset_without_singleton_enforcement() {
        let mut d = desktop();
        let a = d.launch(APP_NOTEPAD).unwrap();
        let b = d.launch(APP_NOTEPAD).unwrap();
        assert_ne!(a, b);
        assert_eq!(d.windows.len(), 2);
        assert_eq!(window_origin(&d, a), (SPAWN_X, SPAWN_Y));
        assert_eq!(window_origin(&d, b), (SPAWN_X, SPAWN_Y));
    }

    #[test]
    fn taskbar_button_launches_a_window() {
        let mut d = desktop();
        let btn = d.taskbar_buttons[APP_CALCULATOR].rect;
        assert!(press_at(&mut d, btn.x + 2, btn.y + 2));
        assert_eq!(d.windows.len(), 1);
    }

    #[test]
    fn drag_translates_exactly_by_pointer_delta() {
        let mut d = desktop();
        let id = d.launch(APP_NOTEPAD).unwrap();
        let (x0, y0) = window_origin(&d, id);

        // Press on the title bar, then two motions.
        press_at(&mut d, x0 + 30, y0 + 10);
        d.pointer_moved(x0 + 90, y0 + 45);
        d.pointer_moved(x0 + 150, y0 + 20);
        d.button_released();

        assert_eq!(window_origin(&d, id), (x0 + 120, y0 + 10));
    }

    #[test]
    fn each_press_resets_the_drag_reference() {
        let mut d = desktop();
        let id = d.launch(APP_NOTEPAD).unwrap();
        let (x0, y0) = window_origin(&d, id);

        press_at(&mut d, x0 + 10, y0 + 10);
        d.pointer_moved(x0 + 20, y0 + 10);
        d.button_released();
        let (x1, y1) = window_origin(&d, id);
        assert_eq!((x1, y1), (x0 + 10, y0));

        press_at(&mut d, x1 + 10, y1 + 10);
        d.pointer_moved(x1 + 10 + 5, y1 + 10 + 7);
        d.button_released();
        assert_eq!(window_origin(&d, id), (x1 + 5, y1 + 7));
    }

    #[test]
    fn windows_may_be_dragged_off_screen() {
        let mut d = desktop();
        let id = d.launch(APP_CALCULATOR).unwrap();
        let (x0, y0) = window_origin(&d, id);
        press_at(&mut d, x0 + 10, y0 + 10);
        d.pointer_moved(-500, -300);
        assert_eq!(window_origin(&d, id), (-510, -310));

        // Compositing a fully off-screen window must not panic.
        let mut frame = Surface::new(SCREEN_W, SCREEN_H, 0);
        d.composite(&mut frame);
    }

    #[test]
    fn click_raises_window_to_front() {
        let mut d = desktop();
        let a = d.launch(APP_NOTEPAD).unwrap();
        let b = d.launch(APP_CALCULATOR).unwrap();
        assert_eq!(d.windows.last().unwrap().id, b);

        // Both spawn at the same offset; move the top one aside first.
        let (bx, by) = window_origin(&d, b);
        press_at(&mut d, bx + 30, by + 10);
        d.pointer_moved(bx + 280, by + 10);
        d.button_released();

        let (ax, ay) = window_origin(&d, a);
        press_at(&mut d, ax + 5, ay + 40);
        assert_eq!(d.windows.last().unwrap().id, a);
        assert_eq!(d.focused, Some(a));
    }

    #[test]
    fn close_control_destroys_only_that_window() {
        let mut d = desktop();
        let a = d.launch(APP_NOTEPAD).unwrap();
        let b = d.launch(APP_CALCULATOR).unwrap();
        let idx = d.window_index(b).unwrap();
        let close = d.windows[idx].close_rect();
        let (wx, wy) = window_origin(&d, b);
        press_at(&mut d, wx + close.x + 2, wy + close.y + 2);

        assert_eq!(d.windows.len(), 1);
        assert_eq!(d.windows[0].id, a);
        assert_eq!(d.focused, Some(a));
    }

    #[test]
    fn save_prompt_cancel_is_a_no_op() {
        let mut d = desktop();
        let id = d.launch(APP_NOTEPAD).unwrap();
        let (wx, wy) = window_origin(&d, id);
        let idx = d.window_index(id).unwrap();
        let content = d.windows[idx].content_rect();

        // Notepad's Save button sits at (285, 170) in content coordinates.
        press_at(&mut d, wx + content.x + 285 + 2, wy + content.y + 170 + 2);
        assert!(matches!(d.dialog, Some(Dialog::Save(_))));

        assert!(d.key_event(KeyEvent::Escape));
        assert!(d.dialog.is_none());
        assert_eq!(d.windows.len(), 1);
    }

    #[test]
    fn confirmed_save_writes_file_and_reports_success() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("note");
        let mut d = desktop();
        let id = d.launch(APP_NOTEPAD).unwrap();
        assert_eq!(d.focused, Some(id));

        for ch in "hello".chars() {
            assert!(d.key_event(KeyEvent::Char(ch)));
        }

        let (wx, wy) = window_origin(&d, id);
        let idx = d.window_index(id).unwrap();
        let content = d.windows[idx].content_rect();
        press_at(&mut d, wx + content.x + 285 + 2, wy + content.y + 170 + 2);
        assert!(matches!(d.dialog, Some(Dialog::Save(_))));

        for ch in path.display().to_string().chars() {
            d.key_event(KeyEvent::Char(ch));
        }
        assert!(d.key_event(KeyEvent::Enter));

        let saved = path.with_extension("txt");
        let contents = std::fs::read_to_string(&saved).expect("saved file");
        assert_eq!(contents, "hello\n");
        assert!(matches!(d.dialog, Some(Dialog::Notice(_))));

        // Dismiss the success notice.
        assert!(d.key_event(KeyEvent::Enter));
        assert!(d.dialog.is_none());
    }

    #[test]
    fn failed_save_reports_error_and_keeps_shell_alive() {
        let mut d = desktop();
        let id = d.launch(APP_NOTEPAD).unwrap();
        let (wx, wy) = window_origin(&d, id);
        let idx = d.window_index(id).unwrap();
        let content = d.windows[idx].content_rect();
        press_at(&mut d, wx + content.x + 285 + 2, wy + content.y + 170 + 2);

        for ch in "/nonexistent-dir-for-test/note.txt".chars() {
            d.key_event(KeyEvent::Char(ch));
        }
        assert!(d.key_event(KeyEvent::Enter));
        assert!(matches!(d.dialog, Some(Dialog::Notice(_))));
        assert_eq!(d.windows.len(), 1);

        assert!(d.key_event(KeyEvent::Enter));
        assert!(d.dialog.is_none());
    }

    #[test]
    fn modal_dialog_captures_keystrokes_away_from_the_app() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.txt");
        let mut d = desktop();
        let id = d.launch(APP_NOTEPAD).unwrap();
        let (wx, wy) = window_origin(&d, id);
        let idx = d.window_index(id).unwrap();
        let content = d.windows[idx].content_rect();
        let save_x = wx + content.x + 285 + 2;
        let save_y = wy + content.y + 170 + 2;

        // Open the prompt, type into it, cancel.
        press_at(&mut d, save_x, save_y);
        d.key_event(KeyEvent::Char('x'));
        d.key_event(KeyEvent::Escape);
        assert!(d.dialog.is_none());

        // Save for real: the buffer must still be empty, proving the 'x'
        // went to the dialog and not the notepad.
        press_at(&mut d, save_x, save_y);
        for ch in path.display().to_string().chars() {
            d.key_event(KeyEvent::Char(ch));
        }
        d.key_event(KeyEvent::Enter);
        assert_eq!(std::fs::read_to_string(&path).expect("saved"), "\n");
    }

    #[test]
    fn release_while_dialog_is_open_stays_with_the_dialog() {
        let mut d = desktop();
        let id = d.launch(APP_NOTEPAD).unwrap();
        let (wx, wy) = window_origin(&d, id);
        let idx = d.window_index(id).unwrap();
        let content = d.windows[idx].content_rect();

        // The press that opens the prompt captures the pointer.
        press_at(&mut d, wx + content.x + 285 + 2, wy + content.y + 170 + 2);
        assert!(matches!(d.dialog, Some(Dialog::Save(_))));
        assert!(d.capture.is_some());

        assert!(!d.button_released());
        assert!(d.capture.is_none());
        assert!(matches!(d.dialog, Some(Dialog::Save(_))));
    }

    #[test]
    fn desktop_click_clears_focus() {
        let mut d = desktop();
        let id = d.launch(APP_CALCULATOR).unwrap();
        assert_eq!(d.focused, Some(id));
        // Empty desktop area, right side.
        assert!(press_at(&mut d, 560, 40));
        assert_eq!(d.focused, None);
    }

    #[test]
    fn composite_draws_windows_over_wallpaper() {
        let mut d = desktop();
        d.launch(APP_CALCULATOR).unwrap();
        let mut frame = Surface::new(SCREEN_W, SCREEN_H, 0);
        d.composite(&mut frame);
        // Title bar pixel of the spawned window, clear of the label text
        // and the close control.
        assert_eq!(
            frame.pixel((SPAWN_X + 100) as u32, (SPAWN_Y + 10) as u32),
            Some(theme::TITLE_BG)
        );
    }
}
