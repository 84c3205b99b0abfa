use icicle_core::DrawSurface;
use icicle_protocol::{Color, Rect, RenderCommand};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as Area;
use ratatui::style::Color as TermColor;

/// Draws partition cells into a region of a ratatui buffer, one terminal
/// cell per pixel.
pub struct TerminalSurface<'a> {
    buf: &'a mut Buffer,
    area: Area,
}

impl<'a> TerminalSurface<'a> {
    pub fn new(buf: &'a mut Buffer, area: Area) -> Self {
        Self { buf, area }
    }

    fn put(&mut self, x: i64, y: i64, ch: char, fg: TermColor, bg: TermColor) {
        if x < 0 || y < 0 || x >= i64::from(self.area.width) || y >= i64::from(self.area.height) {
            return;
        }
        // Both offsets are below the area size, so they fit in u16.
        let pos = (self.area.x + x as u16, self.area.y + y as u16);
        if let Some(cell) = self.buf.cell_mut(pos) {
            cell.set_char(ch).set_fg(fg).set_bg(bg);
        }
    }

    fn draw_cell(&mut self, rect: &Rect, fill: Color, border: Option<Color>, label: Option<&str>) {
        let left = rect.x as i64;
        let top = rect.y as i64;
        let right = left + rect.w as i64;
        let bottom = top + rect.h as i64;
        let bg = term_color(fill);
        let fg = border.map_or(TermColor::Black, term_color);

        // Box-drawing outlines need a row and column of interior to read.
        let boxed = border.is_some() && right - left >= 2 && bottom - top >= 2;

        for y in top.max(0)..=bottom.min(i64::from(self.area.height) - 1) {
            for x in left.max(0)..=right.min(i64::from(self.area.width) - 1) {
                let ch = if boxed {
                    match (x == left, x == right, y == top, y == bottom) {
                        (true, _, true, _) => '┌',
                        (_, true, true, _) => '┐',
                        (true, _, _, true) => '└',
                        (_, true, _, true) => '┘',
                        (true, _, _, _) | (_, true, _, _) => '│',
                        (_, _, true, _) | (_, _, _, true) => '─',
                        _ => ' ',
                    }
                } else {
                    ' '
                };
                self.put(x, y, ch, fg, bg);
            }
        }

        let Some(label) = label else {
            return;
        };
        let (x0, y0, room) = if boxed {
            (left + 1, top + 1, right - left - 1)
        } else {
            (left, top, right - left + 1)
        };
        for (i, ch) in label.chars().take(room.max(0) as usize).enumerate() {
            self.put(x0 + i as i64, y0, ch, TermColor::Black, bg);
        }
    }
}

impl DrawSurface for TerminalSurface<'_> {
    fn window_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.area.width),
            f64::from(self.area.height),
        )
    }

    fn submit(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::Clear { color } => {
                let bg = term_color(color);
                for y in 0..i64::from(self.area.height) {
                    for x in 0..i64::from(self.area.width) {
                        self.put(x, y, ' ', TermColor::Reset, bg);
                    }
                }
            }
            RenderCommand::DrawRect {
                rect,
                fill,
                border,
                label,
                ..
            } => self.draw_cell(&rect, fill, border, label.as_deref()),
        }
    }
}

pub fn term_color(color: Color) -> TermColor {
    let [r, g, b] = color.to_rgb8();
    TermColor::Rgb(r, g, b)
}
