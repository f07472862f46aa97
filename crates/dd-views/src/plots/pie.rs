//! Donut pie chart

use std::f32::consts::TAU;

use egui::{Align2, Color32, FontId, Mesh, Pos2, Sense, Shape, Stroke, Ui, Vec2};

use super::utils::{alternating_color, CHART_BACKGROUND};

/// Angle of the first slice edge, in degrees counterclockwise from east
pub const START_ANGLE: f32 = 90.0;

/// Ring width as a fraction of the radius
pub const RING_WIDTH: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub fraction: f64,
    pub color: Color32,
    /// Slice start, radians counterclockwise from east
    pub start: f32,
    /// Slice end, radians counterclockwise from east
    pub end: f32,
}

/// Donut chart, slices laid out counterclockwise from the top
#[derive(Debug, Clone)]
pub struct PieChart {
    slices: Vec<PieSlice>,
}

impl PieChart {
    /// Slices for `(label, value)` pairs; values are normalized by their sum
    pub fn new(entries: impl IntoIterator<Item = (String, f64)>) -> Self {
        let entries: Vec<(String, f64)> = entries.into_iter().collect();
        let total: f64 = entries.iter().map(|(_, v)| v.max(0.0)).sum();

        let mut angle = START_ANGLE.to_radians();
        let slices = entries
            .into_iter()
            .enumerate()
            .map(|(i, (label, value))| {
                let fraction = if total > 0.0 { value.max(0.0) / total } else { 0.0 };
                let start = angle;
                angle += fraction as f32 * TAU;
                PieSlice {
                    label,
                    fraction,
                    color: alternating_color(i),
                    start,
                    end: angle,
                }
            })
            .collect();

        Self { slices }
    }

    pub fn slices(&self) -> &[PieSlice] {
        &self.slices
    }

    pub fn show(&self, ui: &mut Ui, size: Vec2) {
        let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, CHART_BACKGROUND);

        // Room for the outside labels
        let radius = (rect.height() / 2.0 - 24.0).min(rect.width() / 4.0).max(4.0);
        let inner = radius * (1.0 - RING_WIDTH);
        let center = rect.center();
        let at = |angle: f32, r: f32| center + Vec2::new(angle.cos(), -angle.sin()) * r;

        for slice in self.slices.iter().filter(|s| s.end > s.start) {
            let steps = (((slice.end - slice.start) / TAU) * 128.0).ceil().max(1.0) as u32;
            let mut mesh = Mesh::default();
            for k in 0..=steps {
                let angle = slice.start + (slice.end - slice.start) * k as f32 / steps as f32;
                mesh.colored_vertex(at(angle, radius), slice.color);
                mesh.colored_vertex(at(angle, inner), slice.color);
            }
            for k in 0..steps {
                let base = 2 * k;
                mesh.add_triangle(base, base + 1, base + 2);
                mesh.add_triangle(base + 1, base + 3, base + 2);
            }
            painter.add(Shape::mesh(mesh));
        }

        // White wedge edges
        for slice in &self.slices {
            painter.line_segment([at(slice.start, inner), at(slice.start, radius)], Stroke::new(1.5, Color32::WHITE));
        }

        for slice in &self.slices {
            let mid = (slice.start + slice.end) / 2.0;
            let align = if mid.cos() >= 0.0 { Align2::LEFT_CENTER } else { Align2::RIGHT_CENTER };
            painter.text(
                at(mid, radius * 1.1),
                align,
                &slice.label,
                FontId::proportional(13.0),
                Color32::BLACK,
            );
        }
    }
}

/// Label of a class slice, e.g. `Class 1: 62.50%`
pub fn class_label(class: &impl std::fmt::Display, probability: f64) -> String {
    format!("Class {}: {:.2}%", class, probability * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plots::utils::{HIGHLIGHT, SECONDARY};

    #[test]
    fn test_slices_start_at_top() {
        let chart = PieChart::new(vec![
            (class_label(&0, 0.25), 0.25),
            (class_label(&1, 0.75), 0.75),
        ]);
        let slices = chart.slices();

        assert_eq!(slices[0].label, "Class 0: 25.00%");
        assert_eq!(slices[1].label, "Class 1: 75.00%");
        assert!((slices[0].start - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((slices[0].end - std::f32::consts::PI).abs() < 1e-6);
        assert!((slices[1].end - slices[0].start - TAU).abs() < 1e-5);
        assert_eq!((slices[0].color, slices[1].color), (HIGHLIGHT, SECONDARY));
    }

    #[test]
    fn test_zero_total_has_empty_slices() {
        let chart = PieChart::new(vec![("a".to_string(), 0.0), ("b".to_string(), 0.0)]);
        assert!(chart.slices().iter().all(|s| s.fraction == 0.0 && s.start == s.end));
    }
}
