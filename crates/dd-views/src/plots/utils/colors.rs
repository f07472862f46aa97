//! Color utilities for plots

use egui::Color32;

/// Highlight color, first of the two-color chart palette (#FA4032)
pub const HIGHLIGHT: Color32 = Color32::from_rgb(0xFA, 0x40, 0x32);

/// Second color of the chart palette, shared with the sidebar (#F5B647)
pub const SECONDARY: Color32 = Color32::from_rgb(0xF5, 0xB6, 0x47);

/// Background behind the charts (#FEF3E2)
pub const CHART_BACKGROUND: Color32 = Color32::from_rgb(0xFE, 0xF3, 0xE2);

/// ColorBrewer YlOrRd, 9 classes
const YL_OR_RD: [[u8; 3]; 9] = [
    [255, 255, 204],
    [255, 237, 160],
    [254, 217, 118],
    [254, 178, 76],
    [253, 141, 60],
    [252, 78, 42],
    [227, 26, 28],
    [189, 0, 38],
    [128, 0, 38],
];

/// Two-color palette cycled over pie slices and bars
pub fn alternating_color(index: usize) -> Color32 {
    if index % 2 == 0 {
        HIGHLIGHT
    } else {
        SECONDARY
    }
}

/// Yellow-orange-red sequential color map, `t` in [0, 1]
pub fn yl_or_rd_color(t: f32) -> Color32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    let scaled = t * (YL_OR_RD.len() - 1) as f32;
    let lower = (scaled.floor() as usize).min(YL_OR_RD.len() - 2);
    let s = scaled - lower as f32;

    let [r0, g0, b0] = YL_OR_RD[lower];
    let [r1, g1, b1] = YL_OR_RD[lower + 1];
    let lerp = |a: u8, b: u8| (a as f32 * (1.0 - s) + b as f32 * s).round() as u8;

    Color32::from_rgb(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Position of `value` in `[min, max]`; a degenerate range maps to 0
pub fn normalize(value: f64, min: f64, max: f64) -> f32 {
    if max > min {
        ((value - min) / (max - min)) as f32
    } else {
        0.0
    }
}

/// Black or white, whichever reads better on `background`
pub fn text_color_for(background: Color32) -> Color32 {
    let channel = |c: u8| {
        let c = c as f32 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    let luminance = 0.2126 * channel(background.r())
        + 0.7152 * channel(background.g())
        + 0.0722 * channel(background.b());

    if luminance > 0.408 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yl_or_rd_endpoints() {
        assert_eq!(yl_or_rd_color(0.0), Color32::from_rgb(255, 255, 204));
        assert_eq!(yl_or_rd_color(1.0), Color32::from_rgb(128, 0, 38));
        assert_eq!(yl_or_rd_color(-3.0), yl_or_rd_color(0.0));
        assert_eq!(yl_or_rd_color(f32::NAN), yl_or_rd_color(0.0));
    }

    #[test]
    fn test_normalize_degenerate_range() {
        assert_eq!(normalize(5.0, 5.0, 5.0), 0.0);
        assert_eq!(normalize(7.5, 5.0, 10.0), 0.5);
    }

    #[test]
    fn test_text_contrast() {
        assert_eq!(text_color_for(yl_or_rd_color(0.0)), Color32::BLACK);
        assert_eq!(text_color_for(yl_or_rd_color(1.0)), Color32::WHITE);
    }

    #[test]
    fn test_palette_alternates() {
        assert_eq!(alternating_color(0), HIGHLIGHT);
        assert_eq!(alternating_color(1), SECONDARY);
        assert_eq!(alternating_color(4), HIGHLIGHT);
    }
}
