use std::path::Path;

use crate::surface::Surface;
use crate::theme;
use crate::windows::{
    AppAction, AppContext, AppEventResult, KeyEvent, MouseEvent, MouseEventKind, Rect, WindowApp,
};

pub const WIDTH: u32 = 384;
pub const HEIGHT: u32 = 280;

pub const CANVAS_W: u32 = 340;
pub const CANVAS_H: u32 = 170;
const CANVAS_BG: u32 = 0xFFFFFF;

const DEFAULT_WIDTH: u32 = 2;
const MIN_WIDTH: u32 = 1;
const MAX_WIDTH: u32 = 10;

const PALETTE: [u32; 7] = [
    0x000000, 0x0000FF, 0xFF0000, 0x008000, 0xFFFF00, 0xFFA500, 0xFFFFFF,
];

const TOOLBAR_Y: i32 = 4;
const SWATCH_X: i32 = 56;
const SWATCH_SIZE: u32 = 16;
const SWATCH_STEP: i32 = 18;
const WIDTH_ENTRY: Rect = Rect { x: 206, y: 4, w: 22, h: 16 };
const CLEAR_BUTTON: Rect = Rect { x: 264, y: 3, w: 52, h: 18 };
const SAVE_BUTTON: Rect = Rect { x: 322, y: 3, w: 52, h: 18 };
// Sunken well around the raster; the raster itself sits one pixel inside.
const CANVAS_WELL: Rect = Rect { x: 18, y: 30, w: CANVAS_W + 2, h: CANVAS_H + 2 };
const CANVAS_X: i32 = CANVAS_WELL.x + 1;
const CANVAS_Y: i32 = CANVAS_WELL.y + 1;

pub struct PaintApp {
    raster: Surface,
    current_color: u32,
    width_text: String,
    pen_width: u32,
    width_focus: bool,
    anchor: Option<(i32, i32)>,
    pending: Option<AppAction>,
}

impl PaintApp {
    pub fn new() -> Self {
        Self {
            raster: Surface::new(CANVAS_W, CANVAS_H, CANVAS_BG),
            current_color: PALETTE[0],
            width_text: DEFAULT_WIDTH.to_string(),
            pen_width: DEFAULT_WIDTH,
            width_focus: false,
            anchor: None,
            pending: None,
        }
    }

    fn swatch_rect(idx: usize) -> Rect {
        Rect::new(SWATCH_X + idx as i32 * SWATCH_STEP, TOOLBAR_Y, SWATCH_SIZE, SWATCH_SIZE)
    }

    fn canvas_point(evt: &MouseEvent) -> (i32, i32) {
        (evt.x - CANVAS_X, evt.y - CANVAS_Y)
    }

    fn in_canvas(evt: &MouseEvent) -> bool {
        Rect::new(CANVAS_X, CANVAS_Y, CANVAS_W, CANVAS_H).contains(evt.x, evt.y)
    }

    /// Re-parse the width entry. Parse failure silently falls back to the
    /// default width; out-of-range values clamp to the spinner bounds.
    fn set_width(&mut self) {
        self.pen_width = self
            .width_text
            .trim()
            .parse::<u32>()
            .unwrap_or(DEFAULT_WIDTH)
            .clamp(MIN_WIDTH, MAX_WIDTH);
    }

    fn clear_canvas(&mut self) {
        self.raster.clear(CANVAS_BG);
    }

    fn stroke_to(&mut self, x: i32, y: i32) -> bool {
        let Some((ax, ay)) = self.anchor else {
            return false;
        };
        self.set_width();
        self.raster.draw_line(ax, ay, x, y, self.current_color, self.pen_width);
        self.anchor = Some((x, y));
        true
    }
}

impl WindowApp for PaintApp {
    fn draw(&mut self, ctx: &mut AppContext<'_>, _input_focus: bool) {
        ctx.clear(theme::WIN_BG);
        ctx.draw_text(6, TOOLBAR_Y + 4, "Color:", theme::BUTTON_FG);
        for (idx, &color) in PALETTE.iter().enumerate() {
            let r = Self::swatch_rect(idx);
            ctx.fill_rect(r.x, r.y, r.w, r.h, color);
            if color == self.current_color {
                ctx.draw_sunken_frame(r);
            } else {
                ctx.draw_raised_frame(r);
            }
        }
        ctx.draw_text(188, TOOLBAR_Y + 4, "W:", theme::BUTTON_FG);
        ctx.draw_entry(WIDTH_ENTRY, &self.width_text, self.width_focus);
        ctx.draw_button(CLEAR_BUTTON, "Clear");
        ctx.draw_button(SAVE_BUTTON, "Save");

        ctx.draw_sunken_frame(CANVAS_WELL);
        ctx.blit(&self.raster, CANVAS_X, CANVAS_Y);
    }

    fn handle_mouse(&mut self, evt: &MouseEvent) -> AppEventResult {
        match evt.kind {
            MouseEventKind::Down => {
                for (idx, &color) in PALETTE.iter().enumerate() {
                    if Self::swatch_rect(idx).contains(evt.x, evt.y) {
                        self.current_color = color;
                        self.width_focus = false;
                        return AppEventResult::HandledRedraw;
                    }
                }
                if WIDTH_ENTRY.contains(evt.x, evt.y) {
                    self.width_focus = true;
                    return AppEventResult::HandledRedraw;
                }
                if CLEAR_BUTTON.contains(evt.x, evt.y) {
                    self.clear_canvas();
                    self.width_focus = false;
                    return AppEventResult::HandledRedraw;
                }
                if SAVE_BUTTON.contains(evt.x, evt.y) {
                    #[cfg(feature = "png-export")]
                    {
                        self.pending = Some(AppAction::PromptSave {
                            title: "Paint",
                            default_ext: ".png",
                        });
                    }
                    #[cfg(not(feature = "png-export"))]
                    {
                        self.pending = Some(AppAction::Notice {
                            title: "Paint",
                            message: "PNG export is not available in this build",
                        });
                    }
                    self.width_focus = false;
                    return AppEventResult::Handled;
                }
                if Self::in_canvas(evt) {
                    self.anchor = Some(Self::canvas_point(evt));
                    self.width_focus = false;
                    return AppEventResult::Handled;
                }
                AppEventResult::Ignored
            }
            MouseEventKind::Move => {
                let (x, y) = Self::canvas_point(evt);
                if self.stroke_to(x, y) {
                    AppEventResult::HandledRedraw
                } else {
                    AppEventResult::Ignored
                }
            }
            MouseEventKind::Up => {
                if self.anchor.take().is_some() {
                    AppEventResult::Handled
                } else {
                    AppEventResult::Ignored
                }
            }
        }
    }

    fn handle_key(&mut self, evt: &KeyEvent) -> AppEventResult {
        if !self.width_focus {
            return AppEventResult::Ignored;
        }
        match evt {
            KeyEvent::Char(ch) if ch.is_ascii_digit() && self.width_text.len() < 2 => {
                self.width_text.push(*ch);
            }
            KeyEvent::Backspace => {
                self.width_text.pop();
            }
            KeyEvent::Enter | KeyEvent::Escape => {
                self.width_focus = false;
            }
            _ => return AppEventResult::Ignored,
        }
        self.set_width();
        AppEventResult::HandledRedraw
    }

    fn take_action(&mut self) -> Option<AppAction> {
        self.pending.take()
    }

    #[cfg(feature = "png-export")]
    fn write_file(&mut self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        let img = image::RgbImage::from_fn(CANVAS_W, CANVAS_H, |x, y| {
            let px = self.raster.pixel(x, y).unwrap_or(CANVAS_BG);
            image::Rgb([
                ((px >> 16) & 0xFF) as u8,
                ((px >> 8) & 0xFF) as u8,
                (px & 0xFF) as u8,
            ])
        });
        img.save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("paint: saved {}x{} PNG to {}", CANVAS_W, CANVAS_H, path.display());
        Ok(())
    }

    #[cfg(not(feature = "png-export"))]
    fn write_file(&mut self, _path: &Path) -> anyhow::Result<()> {
        anyhow::bail!("PNG export is not available in this build")
    }
}
