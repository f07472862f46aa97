//! Annotated heatmap of a square matrix

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Ui, Vec2};
use ndarray::Array2;

use super::utils::{finite_range, normalize, paint_color_bar, text_color_for, yl_or_rd_color, CHART_BACKGROUND};

/// Heatmap with one annotated cell per matrix entry
#[derive(Debug, Clone)]
pub struct HeatmapChart {
    title: String,
    labels: Vec<String>,
    matrix: Array2<f64>,
    /// Color scale limits, the finite extremes of the matrix
    range: (f64, f64),
}

impl HeatmapChart {
    pub fn new(title: impl Into<String>, labels: Vec<String>, matrix: Array2<f64>) -> Self {
        let range = finite_range(matrix.iter().copied()).unwrap_or((0.0, 1.0));
        Self {
            title: title.into(),
            labels,
            matrix,
            range,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Fill of a cell; `None` leaves it empty
    pub fn cell_color(&self, value: f64) -> Option<Color32> {
        if value.is_nan() {
            return None;
        }
        Some(yl_or_rd_color(normalize(value, self.range.0, self.range.1)))
    }

    /// Two-decimal annotation of a cell
    pub fn annotation(value: f64) -> String {
        if value.is_nan() {
            "nan".to_string()
        } else {
            format!("{:.2}", value)
        }
    }

    pub fn show(&self, ui: &mut Ui) {
        let available = ui.available_size();
        let (rect, _) = ui.allocate_exact_size(available, Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, CHART_BACKGROUND);

        painter.text(
            Pos2::new(rect.center().x, rect.top() + 6.0),
            Align2::CENTER_TOP,
            &self.title,
            FontId::proportional(16.0),
            Color32::BLACK,
        );

        let n = self.labels.len();
        if n == 0 {
            return;
        }

        // Space for labels
        let margin = Vec2::new(110.0, 40.0);
        let bottom_margin = 60.0;
        let legend_width = 90.0;
        let cell_size = ((rect.width() - margin.x - legend_width) / n as f32)
            .min((rect.height() - margin.y - bottom_margin) / n as f32)
            .max(1.0);
        let grid = Rect::from_min_size(rect.min + margin, Vec2::splat(cell_size * n as f32));

        for i in 0..n {
            for j in 0..n {
                let value = self.matrix[[i, j]];
                let cell = Rect::from_min_size(
                    grid.min + Vec2::new(j as f32 * cell_size, i as f32 * cell_size),
                    Vec2::splat(cell_size),
                );

                let text_color = match self.cell_color(value) {
                    Some(color) => {
                        painter.rect_filled(cell, 0.0, color);
                        text_color_for(color)
                    }
                    None => Color32::BLACK,
                };
                if cell_size > 20.0 {
                    painter.text(
                        cell.center(),
                        Align2::CENTER_CENTER,
                        Self::annotation(value),
                        FontId::proportional((cell_size / 5.0).clamp(9.0, 14.0)),
                        text_color,
                    );
                }
            }
        }

        for (i, label) in self.labels.iter().enumerate() {
            let offset = (i as f32 + 0.5) * cell_size;
            painter.text(
                Pos2::new(grid.min.x - 6.0, grid.min.y + offset),
                Align2::RIGHT_CENTER,
                label,
                FontId::proportional(11.0),
                Color32::BLACK,
            );
            painter.text(
                Pos2::new(grid.min.x + offset, grid.max.y + 6.0),
                Align2::CENTER_TOP,
                label,
                FontId::proportional(11.0),
                Color32::BLACK,
            );
        }

        // Shrunk color bar, as tall as three quarters of the grid
        let bar = Rect::from_min_size(
            Pos2::new(grid.max.x + 20.0, grid.min.y + grid.height() * 0.125),
            Vec2::new(18.0, grid.height() * 0.75),
        );
        paint_color_bar(&painter, bar, self.range.0, self.range.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_nan_cells_stay_empty() {
        let chart = HeatmapChart::new(
            "t",
            vec!["a".into(), "b".into()],
            array![[1.0, f64::NAN], [f64::NAN, 1.0]],
        );
        assert_eq!(chart.cell_color(f64::NAN), None);
        assert_eq!(HeatmapChart::annotation(f64::NAN), "nan");
        assert_eq!(HeatmapChart::annotation(-0.456), "-0.46");
    }

    #[test]
    fn test_color_scale_spans_matrix() {
        let chart = HeatmapChart::new(
            "t",
            vec!["a".into(), "b".into()],
            array![[1.0, -0.5], [-0.5, 1.0]],
        );
        assert_eq!(chart.cell_color(1.0), Some(yl_or_rd_color(1.0)));
        assert_eq!(chart.cell_color(-0.5), Some(yl_or_rd_color(0.0)));
    }
}
