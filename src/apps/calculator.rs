use crate::apps::calc;
use crate::windows::{
    AppContext, AppEventResult, KeyEvent, MouseEvent, MouseEventKind, Rect, WindowApp,
};

pub const WIDTH: u32 = 172;
pub const HEIGHT: u32 = 226;

const DISPLAY: Rect = Rect { x: 10, y: 8, w: 148, h: 18 };
const KEY_W: u32 = 34;
const KEY_H: u32 = 26;
const KEY_GAP: i32 = 4;
const KEYPAD_X: i32 = 10;
const KEYPAD_Y: i32 = 34;
const CLEAR_ROW_Y: i32 = 158;
const CLEAR_W: u32 = 71;
const CLEAR_H: u32 = 22;

const KEYS: [[&str; 4]; 4] = [
    ["7", "8", "9", "/"],
    ["4", "5", "6", "*"],
    ["1", "2", "3", "-"],
    ["0", ".", "=", "+"],
];

/// Keypad-facing calculator state, kept apart from the widget so the
/// append/evaluate contract is directly testable.
#[derive(Default)]
pub struct CalcState {
    pub expression: String,
    pub display: String,
}

impl CalcState {
    pub fn append(&mut self, token: &str) {
        self.expression.push_str(token);
        self.display = self.expression.clone();
    }

    pub fn backspace(&mut self) {
        self.expression.pop();
        self.display = self.expression.clone();
    }

    pub fn clear_all(&mut self) {
        self.expression.clear();
        self.display.clear();
    }

    pub fn evaluate(&mut self) {
        match calc::evaluate(&self.expression) {
            Ok(value) => {
                let text = calc::format_result(value);
                self.display = text.clone();
                self.expression = text;
            }
            Err(err) => {
                log::debug!("calculator: {err}");
                self.display = String::from("Error");
                self.expression.clear();
            }
        }
    }
}

pub struct CalculatorApp {
    state: CalcState,
}

impl CalculatorApp {
    pub fn new() -> Self {
        Self { state: CalcState::default() }
    }

    fn key_rect(row: usize, col: usize) -> Rect {
        Rect::new(
            KEYPAD_X + col as i32 * (KEY_W as i32 + KEY_GAP),
            KEYPAD_Y + row as i32 * (KEY_H as i32 + KEY_GAP),
            KEY_W,
            KEY_H,
        )
    }

    fn ce_rect() -> Rect {
        Rect::new(KEYPAD_X, CLEAR_ROW_Y, CLEAR_W, CLEAR_H)
    }

    fn c_rect() -> Rect {
        Rect::new(KEYPAD_X + CLEAR_W as i32 + 6, CLEAR_ROW_Y, CLEAR_W, CLEAR_H)
    }

    fn press(&mut self, label: &str) {
        match label {
            "=" => self.state.evaluate(),
            "CE" => self.state.clear_all(),
            "C" => self.state.backspace(),
            token => self.state.append(token),
        }
    }
}

impl WindowApp for CalculatorApp {
    fn draw(&mut self, ctx: &mut AppContext<'_>, _input_focus: bool) {
        ctx.draw_entry_right(DISPLAY, &self.state.display);
        for (row, labels) in KEYS.iter().enumerate() {
            for (col, label) in labels.iter().enumerate() {
                ctx.draw_button(Self::key_rect(row, col), label);
            }
        }
        ctx.draw_button(Self::ce_rect(), "CE");
        ctx.draw_button(Self::c_rect(), "C");
    }

    fn handle_mouse(&mut self, evt: &MouseEvent) -> AppEventResult {
        if evt.kind != MouseEventKind::Down {
            return AppEventResult::Ignored;
        }
        for (row, labels) in KEYS.iter().enumerate() {
            for (col, label) in labels.iter().enumerate() {
                if Self::key_rect(row, col).contains(evt.x, evt.y) {
                    self.press(label);
                    return AppEventResult::HandledRedraw;
                }
            }
        }
        if Self::ce_rect().contains(evt.x, evt.y) {
            self.press("CE");
            return AppEventResult::HandledRedraw;
        }
        if Self::c_rect().contains(evt.x, evt.y) {
            self.press("C");
            return AppEventResult::HandledRedraw;
        }
        AppEventResult::Ignored
    }

    fn handle_key(&mut self, evt: &KeyEvent) -> AppEventResult {
        match evt {
            KeyEvent::Char(ch) if matches!(*ch, '0'..='9' | '.' | '+' | '-' | '*' | '/') => {
                let mut buf = [0u8; 4];
                self.state.append(ch.encode_utf8(&mut buf));
                AppEventResult::HandledRedraw
            }
            KeyEvent::Char('=') | KeyEvent::Enter => {
                self.state.evaluate();
                AppEventResult::HandledRedraw
            }
            KeyEvent::Backspace => {
                self.state.backspace();
                AppEventResult::HandledRedraw
            }
            _ => AppEventResult::Ignored,
        }
    }
}
