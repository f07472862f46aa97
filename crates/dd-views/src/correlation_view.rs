//! Correlation page: Pearson heatmap of the numeric columns

use egui::Ui;

use dd_core::{AppState, Page, CORRELATION_COLUMNS};
use dd_data::DroughtDataset;

use crate::plots::utils::correlation_matrix;
use crate::plots::HeatmapChart;
use crate::{DashboardView, ViewerContext};

/// Heatmap of the pairwise correlations over the whole dataset
pub fn build_correlation_chart(dataset: &DroughtDataset) -> HeatmapChart {
    let columns: Vec<Vec<Option<f64>>> = CORRELATION_COLUMNS
        .iter()
        .map(|column| dataset.values(*column))
        .collect();
    let labels = CORRELATION_COLUMNS
        .iter()
        .map(|column| column.column_name().to_string())
        .collect();

    HeatmapChart::new("Linear Correlation Heatmap", labels, correlation_matrix(&columns))
}

/// Correlation page
#[derive(Default)]
pub struct CorrelationView {
    /// Computed on first display; the dataset never changes
    chart: Option<HeatmapChart>,
}

impl CorrelationView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DashboardView for CorrelationView {
    fn page(&self) -> Page {
        Page::Correlation
    }

    fn title(&self) -> &str {
        Page::Correlation.label()
    }

    fn ui(&mut self, ctx: &ViewerContext, _state: &mut AppState, ui: &mut Ui) {
        ui.heading(self.title());
        ui.add_space(8.0);

        let chart = self.chart.get_or_insert_with(|| {
            tracing::info!("Computing correlation matrix over {} rows", ctx.dataset.num_rows());
            build_correlation_chart(&ctx.dataset)
        });
        chart.show(ui);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_dataset;

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let chart = build_correlation_chart(&sample_dataset());
        let matrix = chart.matrix();

        assert_eq!(chart.labels().len(), 7);
        assert_eq!(chart.labels()[0], "dry");
        assert_eq!(chart.title(), "Linear Correlation Heatmap");
        for i in 0..7 {
            assert_eq!(matrix[[i, i]], 1.0);
            for j in 0..7 {
                assert_eq!(matrix[[i, j]].to_bits(), matrix[[j, i]].to_bits());
            }
        }
        // EVAP_MENS is dry + 1.2
        assert!((matrix[[0, 3]] - 1.0).abs() < 1e-9);
    }
}
