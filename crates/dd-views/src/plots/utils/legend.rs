//! Continuous color bar shared by the map and the heatmap

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke};

use super::colors::yl_or_rd_color;

/// Paint a vertical YlOrRd color bar, `max` at the top
pub fn paint_color_bar(painter: &Painter, rect: Rect, min: f64, max: f64) {
    let steps = 100;
    for i in 0..steps {
        let t = i as f32 / (steps - 1) as f32;
        let y = rect.max.y - t * rect.height();
        painter.line_segment(
            [Pos2::new(rect.min.x, y), Pos2::new(rect.max.x, y)],
            Stroke::new(2.0, yl_or_rd_color(t)),
        );
    }

    let label_x = rect.max.x + 5.0;
    let ticks = [
        (rect.min.y, Align2::LEFT_TOP, max),
        (rect.center().y, Align2::LEFT_CENTER, (min + max) / 2.0),
        (rect.max.y, Align2::LEFT_BOTTOM, min),
    ];
    for (y, align, value) in ticks {
        painter.text(
            Pos2::new(label_x, y),
            align,
            format!("{:.2}", value),
            FontId::proportional(11.0),
            Color32::BLACK,
        );
    }
}
