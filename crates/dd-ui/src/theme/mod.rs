use egui::{Color32, Context, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};
use std::collections::BTreeMap;

/// Theme configuration
pub struct Theme {
    pub name: String,
    /// Main page background
    pub background: Color32,
    /// Sidebar and slider color
    pub sidebar: Color32,
    /// Buttons and selected radio entries
    pub accent: Color32,
    /// Highlight color of the charts
    pub highlight: Color32,
    pub text: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "Drought Light".to_string(),
            background: Color32::from_rgb(0xFE, 0xF3, 0xE2),
            sidebar: Color32::from_rgb(0xF5, 0xB6, 0x47),
            accent: Color32::from_rgb(0xFA, 0x81, 0x2F),
            highlight: Color32::from_rgb(0xFA, 0x40, 0x32),
            text: Color32::BLACK,
        }
    }
}

/// Apply the warm light theme: cream page, amber sidebar, orange buttons
pub fn apply_theme(ctx: &Context, theme: &Theme) {
    let mut style = Style::default();
    let mut visuals = Visuals::light();

    let white = Color32::WHITE;

    // Window and panel styling
    visuals.window_fill = theme.background;
    visuals.panel_fill = theme.background;
    visuals.extreme_bg_color = white; // Text edits
    visuals.faint_bg_color = theme.background;
    visuals.override_text_color = Some(theme.text);

    // Widget styling
    visuals.widgets.noninteractive.bg_fill = theme.background;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, theme.text);

    visuals.widgets.inactive.bg_fill = theme.accent;
    visuals.widgets.inactive.weak_bg_fill = theme.accent;
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, theme.sidebar);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, theme.text);
    visuals.widgets.inactive.rounding = Rounding::same(8.0);

    visuals.widgets.hovered.bg_fill = theme.accent;
    visuals.widgets.hovered.weak_bg_fill = theme.accent;
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, theme.accent);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, theme.background);
    visuals.widgets.hovered.rounding = Rounding::same(8.0);

    visuals.widgets.active.bg_fill = theme.accent;
    visuals.widgets.active.weak_bg_fill = theme.accent;
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, theme.accent);
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, theme.text);
    visuals.widgets.active.rounding = Rounding::same(8.0);

    // Selected radio entries and the slider rail
    visuals.selection.bg_fill = theme.accent;
    visuals.selection.stroke = Stroke::new(1.0, theme.text);
    visuals.hyperlink_color = theme.highlight;

    // Apply spacing
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.spacing.slider_width = 260.0;

    // Font sizes
    let mut font_sizes = BTreeMap::new();
    font_sizes.insert(TextStyle::Small, FontId::new(12.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Body, FontId::new(16.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Button, FontId::new(16.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Heading, FontId::new(26.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace));
    style.text_styles = font_sizes;

    style.visuals = visuals;
    ctx.set_style(style);
}

/// Fill of the navigation sidebar
pub fn sidebar_color() -> Color32 {
    Theme::default().sidebar
}

/// Get the error color for the theme
pub fn error_color() -> Color32 {
    Color32::from_rgb(0xB0, 0x1E, 0x1E)
}

/// Get the warning color for the theme
pub fn warning_color() -> Color32 {
    Color32::from_rgb(0x8A, 0x5A, 0x00)
}
