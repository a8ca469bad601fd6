//! CPU pixel surface: the whole desktop is software-rendered into these.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::{OriginDimensions, Point, Size};
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::primitives::{Line, Primitive, PrimitiveStyle};
use embedded_graphics::Drawable;
use embedded_graphics::Pixel;
use font8x8::legacy::BASIC_LEGACY;

pub const GLYPH_W: u32 = 8;
pub const GLYPH_H: u32 = 8;

pub struct Surface {
    w: u32,
    h: u32,
    pixels: Vec<u32>,
}

impl Surface {
    pub fn new(w: u32, h: u32, fill: u32) -> Self {
        Self {
            w,
            h,
            pixels: vec![fill & 0x00FF_FFFF; (w as usize) * (h as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.w
    }

    pub fn height(&self) -> u32 {
        self.h
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.w || y >= self.h {
            return None;
        }
        Some(self.pixels[y as usize * self.w as usize + x as usize])
    }

    pub fn clear(&mut self, color: u32) {
        let color = color & 0x00FF_FFFF;
        self.pixels.fill(color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: u32) {
        let color = color & 0x00FF_FFFF;
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x.saturating_add(w as i32)).min(self.w as i32);
        let y1 = (y.saturating_add(h as i32)).min(self.h as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for row in y0..y1 {
            let start = row as usize * self.w as usize + x0 as usize;
            let end = row as usize * self.w as usize + x1 as usize;
            self.pixels[start..end].fill(color);
        }
    }

    /// Copy `src` onto this surface with its top-left corner at (x, y).
    /// Fully clipped; the destination may be partially or wholly off-surface.
    pub fn blit(&mut self, src: &Surface, x: i32, y: i32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x.saturating_add(src.w as i32)).min(self.w as i32);
        let y1 = (y.saturating_add(src.h as i32)).min(self.h as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for dy in y0..y1 {
            let sy = (dy - y) as usize;
            let sx = (x0 - x) as usize;
            let count = (x1 - x0) as usize;
            let src_start = sy * src.w as usize + sx;
            let dst_start = dy as usize * self.w as usize + x0 as usize;
            self.pixels[dst_start..dst_start + count]
                .copy_from_slice(&src.pixels[src_start..src_start + count]);
        }
    }

    /// Draw `text` with the 8x8 bitmap font, foreground-only (background
    /// pixels are left untouched).
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, fg: u32) {
        let mut cx = x;
        for ch in text.chars() {
            self.draw_glyph(cx, y, ch, fg);
            cx = cx.saturating_add(GLYPH_W as i32);
        }
    }

    fn draw_glyph(&mut self, x: i32, y: i32, ch: char, fg: u32) {
        let idx = ch as usize;
        let glyph = if idx < BASIC_LEGACY.len() {
            BASIC_LEGACY[idx]
        } else {
            BASIC_LEGACY[b'?' as usize]
        };
        for (row, bits) in glyph.iter().enumerate() {
            let py = y.saturating_add(row as i32);
            if py < 0 || py >= self.h as i32 {
                continue;
            }
            for col in 0..8 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = x.saturating_add(col as i32);
                if px < 0 || px >= self.w as i32 {
                    continue;
                }
                self.pixels[py as usize * self.w as usize + px as usize] = fg & 0x00FF_FFFF;
            }
        }
    }

    /// Stroke a line segment with the given pen width.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32, width: u32) {
        let style = PrimitiveStyle::with_stroke(rgb888(color), width.max(1));
        let segment = Line::new(Point::new(x0, y0), Point::new(x1, y1)).into_styled(style);
        // The draw target is infallible.
        let _ = segment.draw(self);
    }
}

pub fn text_width(text: &str) -> u32 {
    text.chars().count() as u32 * GLYPH_W
}

fn rgb888(color: u32) -> Rgb888 {
    Rgb888::new(
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    )
}

impl OriginDimensions for Surface {
    fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }
}

impl DrawTarget for Surface {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x >= self.w as i32 || point.y >= self.h as i32 {
                continue;
            }
            let value = ((color.r() as u32) << 16) | ((color.g() as u32) << 8) | color.b() as u32;
            self.pixels[point.y as usize * self.w as usize + point.x as usize] = value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut s = Surface::new(10, 10, 0x000000);
        s.fill_rect(-5, -5, 8, 8, 0xFF0000);
        assert_eq!(s.pixel(0, 0), Some(0xFF0000));
        assert_eq!(s.pixel(2, 2), Some(0xFF0000));
        assert_eq!(s.pixel(3, 3), Some(0x000000));
        s.fill_rect(8, 8, 100, 100, 0x00FF00);
        assert_eq!(s.pixel(9, 9), Some(0x00FF00));
    }

    #[test]
    fn blit_supports_negative_destination() {
        let src = Surface::new(4, 4, 0x0000FF);
        let mut dst = Surface::new(10, 10, 0x000000);
        dst.blit(&src, -2, -2);
        assert_eq!(dst.pixel(0, 0), Some(0x0000FF));
        assert_eq!(dst.pixel(1, 1), Some(0x0000FF));
        assert_eq!(dst.pixel(2, 2), Some(0x000000));
    }

    #[test]
    fn blit_fully_off_surface_is_a_no_op() {
        let src = Surface::new(4, 4, 0x0000FF);
        let mut dst = Surface::new(10, 10, 0x111111);
        dst.blit(&src, -10, 0);
        dst.blit(&src, 0, 20);
        assert!(dst.pixels().iter().all(|&p| p == 0x111111));
    }

    #[test]
    fn line_stroke_marks_endpoints() {
        let mut s = Surface::new(20, 20, 0xFFFFFF);
        s.draw_line(2, 2, 12, 2, 0x000000, 1);
        assert_eq!(s.pixel(2, 2), Some(0x000000));
        assert_eq!(s.pixel(12, 2), Some(0x000000));
        assert_eq!(s.pixel(2, 5), Some(0xFFFFFF));
    }

    #[test]
    fn wide_line_covers_more_rows() {
        let mut s = Surface::new(20, 20, 0xFFFFFF);
        s.draw_line(2, 10, 17, 10, 0x000000, 5);
        assert_eq!(s.pixel(10, 8), Some(0x000000));
        assert_eq!(s.pixel(10, 12), Some(0x000000));
    }

    #[test]
    fn glyphs_render_within_bounds() {
        let mut s = Surface::new(40, 12, 0x000000);
        s.draw_text(0, 2, "A", 0xFFFFFF);
        assert!(s.pixels().iter().any(|&p| p == 0xFFFFFF));
        // Off-surface text must not panic.
        s.draw_text(-100, -100, "clip", 0xFFFFFF);
    }
}
