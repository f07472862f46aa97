//! Small widgets shared by the pages

use egui::{Button, Color32, Frame, Margin, Response, RichText, Rounding, Stroke, Ui};

use crate::theme::{error_color, warning_color, Theme};

fn banner(ui: &mut Ui, icon: &str, message: &str, color: Color32) {
    Frame::none()
        .fill(color.linear_multiply(0.12))
        .stroke(Stroke::new(1.0, color))
        .rounding(Rounding::same(6.0))
        .inner_margin(Margin::same(10.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(format!("{} {}", icon, message)).color(color));
        });
}

/// Non-fatal notice, e.g. an unknown commune code
pub fn warning_banner(ui: &mut Ui, message: &str) {
    banner(ui, "⚠", message, warning_color());
}

/// Failure of the last action
pub fn error_banner(ui: &mut Ui, message: &str) {
    banner(ui, "✖", message, error_color());
}

/// Bold action button in the accent color
pub fn primary_button(ui: &mut Ui, text: &str) -> Response {
    let theme = Theme::default();
    ui.add(
        Button::new(RichText::new(text).strong().color(theme.text))
            .fill(theme.accent)
            .rounding(Rounding::same(8.0)),
    )
}
