use egui::{CornerRadius, FontId, Painter, Pos2, Rect, Stroke, StrokeKind};
use icicle_core::DrawSurface;
use icicle_protocol::{Color, RenderCommand};

/// Draws partition cells with an egui `Painter` inside `area`.
pub struct PainterSurface<'p> {
    painter: &'p Painter,
    area: Rect,
}

impl<'p> PainterSurface<'p> {
    pub fn new(painter: &'p Painter, area: Rect) -> Self {
        Self { painter, area }
    }

    fn draw_label(&self, cell: Rect, label: &str) {
        let w = cell.width();
        let h = cell.height();
        if label.is_empty() || w <= 6.0 || h <= 8.0 {
            return;
        }
        let font_size = (h - 4.0).clamp(6.0, 11.0);
        let text_rect = cell.shrink2(egui::vec2(3.0, 0.0));
        let galley = self.painter.layout_no_wrap(
            label.to_string(),
            FontId::proportional(font_size),
            egui::Color32::BLACK,
        );
        // Truncate: only draw if text fits
        if galley.size().x <= text_rect.width() {
            let pos = Pos2::new(text_rect.left(), text_rect.center().y - galley.size().y / 2.0);
            self.painter.galley(pos, galley, egui::Color32::BLACK);
        }
    }
}

impl DrawSurface for PainterSurface<'_> {
    fn window_rect(&self) -> icicle_protocol::Rect {
        icicle_protocol::Rect::new(
            0.0,
            0.0,
            f64::from(self.area.width()),
            f64::from(self.area.height()),
        )
    }

    fn submit(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::Clear { color } => {
                self.painter
                    .rect_filled(self.area, CornerRadius::ZERO, color32(color));
            }
            RenderCommand::DrawRect {
                rect,
                fill,
                border,
                label,
                ..
            } => {
                let cell = cell_rect(self.area.min, &rect);

                // Cull off-screen
                if !self.painter.clip_rect().intersects(cell) {
                    return;
                }

                self.painter
                    .rect_filled(cell, CornerRadius::ZERO, color32(fill));
                if let Some(border) = border {
                    self.painter.rect_stroke(
                        cell,
                        CornerRadius::ZERO,
                        Stroke::new(1.0, color32(border)),
                        StrokeKind::Inside,
                    );
                }
                if let Some(label) = label {
                    self.draw_label(cell, &label);
                }
            }
        }
    }
}

/// The egui rect covering the pixels `x..=x+w`, `y..=y+h` of a cell,
/// offset by the drawing area's origin.
pub fn cell_rect(origin: Pos2, rect: &icicle_protocol::Rect) -> Rect {
    Rect::from_min_size(
        Pos2::new(origin.x + rect.x as f32, origin.y + rect.y as f32),
        egui::vec2(rect.w as f32 + 1.0, rect.h as f32 + 1.0),
    )
}

pub fn color32(color: Color) -> egui::Color32 {
    let [r, g, b] = color.to_rgb8();
    let a = (color.a.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_convert() {
        assert_eq!(color32(Color::WHITE), egui::Color32::WHITE);
        assert_eq!(color32(Color::BLACK), egui::Color32::BLACK);
        assert_eq!(
            color32(Color::rgba(1.0, 0.0, 0.0, 1.0)),
            egui::Color32::from_rgb(255, 0, 0)
        );
    }

    #[test]
    fn cells_cover_their_edge_pixels() {
        let r = cell_rect(
            Pos2::new(10.0, 20.0),
            &icicle_protocol::Rect::new(0.0, 5.0, 49.0, 9.0),
        );
        assert_eq!(r.min, Pos2::new(10.0, 25.0));
        assert_eq!(r.max, Pos2::new(60.0, 35.0));
    }

    #[test]
    fn paints_into_a_frame() {
        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            let area = Rect::from_min_size(Pos2::ZERO, egui::vec2(200.0, 100.0));
            let mut surface = PainterSurface::new(&painter, area);
            assert_eq!(
                surface.window_rect(),
                icicle_protocol::Rect::new(0.0, 0.0, 200.0, 100.0)
            );
            surface.submit(RenderCommand::Clear {
                color: Color::WHITE,
            });
            surface.submit(RenderCommand::DrawRect {
                rect: icicle_protocol::Rect::new(0.0, 0.0, 99.0, 49.0),
                fill: Color::rgba(0.2, 0.6, 0.4, 1.0),
                border: Some(Color::BLACK),
                label: Some("main".into()),
                node_key: Some(0),
            });
        });
        // background, fill and outline at least; the label needs fonts
        assert!(output.shapes.len() >= 3, "{}", output.shapes.len());
    }
}
