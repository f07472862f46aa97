//! Horizontal bar chart of feature importances

use egui::{Align2, Color32, RichText, Ui, Vec2};
use egui_plot::{Bar, BarChart, Plot, PlotPoint, Text};

use dd_model::FeatureImportance;

use super::utils::alternating_color;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportanceBar {
    pub name: String,
    pub value: f64,
    pub color: Color32,
}

/// Bars in ranking order, the most important first
#[derive(Debug, Clone)]
pub struct ImportanceBarChart {
    bars: Vec<ImportanceBar>,
}

impl ImportanceBarChart {
    pub fn new(ranking: &[FeatureImportance]) -> Self {
        let bars = ranking
            .iter()
            .enumerate()
            .map(|(i, feature)| ImportanceBar {
                name: feature.covariate.column_name().to_string(),
                value: feature.importance,
                color: alternating_color(i),
            })
            .collect();
        Self { bars }
    }

    pub fn bars(&self) -> &[ImportanceBar] {
        &self.bars
    }

    /// Draw the bars top-down without axes, grid or interaction
    pub fn show(&self, ui: &mut Ui, size: Vec2) {
        let n = self.bars.len();
        let max = self.bars.iter().map(|b| b.value).fold(0.0, f64::max).max(f64::EPSILON);

        let plot = Plot::new("feature_importances")
            .width(size.x)
            .height(size.y)
            .show_axes([false, false])
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .include_x(-0.45 * max)
            .include_x(max * 1.05);

        plot.show(ui, |plot_ui| {
            let bars = self
                .bars
                .iter()
                .enumerate()
                .map(|(i, bar)| {
                    Bar::new((n - 1 - i) as f64, bar.value)
                        .width(0.7)
                        .name(&bar.name)
                        .fill(bar.color)
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).horizontal());

            for (i, bar) in self.bars.iter().enumerate() {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(-0.02 * max, (n - 1 - i) as f64),
                        RichText::new(&bar.name).color(Color32::BLACK),
                    )
                    .anchor(Align2::RIGHT_CENTER),
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plots::utils::{HIGHLIGHT, SECONDARY};
    use dd_core::Covariate;

    #[test]
    fn test_bars_follow_ranking() {
        let ranking = vec![
            FeatureImportance { covariate: Covariate::SoilWetness, importance: 0.5 },
            FeatureImportance { covariate: Covariate::Temperature, importance: 0.3 },
            FeatureImportance { covariate: Covariate::Precipitation, importance: 0.2 },
        ];
        let chart = ImportanceBarChart::new(&ranking);

        let names: Vec<&str> = chart.bars().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["SWI_MENS", "T_MENS", "PRELIQ_MENS"]);
        let colors: Vec<Color32> = chart.bars().iter().map(|b| b.color).collect();
        assert_eq!(colors, vec![HIGHLIGHT, SECONDARY, HIGHLIGHT]);
    }
}
