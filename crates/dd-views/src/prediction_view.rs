//! Prediction page: classifier output for one commune and year

use egui::{RichText, Slider, TextEdit, Ui, Vec2};
use ndarray::Array2;
use thiserror::Error;

use dd_core::events::events::{PredictionCompleted, ViewFailed};
use dd_core::{AppState, Page};
use dd_data::{DataError, DroughtDataset};
use dd_model::{importance_ranking, ClassLabel, Classifier, ModelError};
use dd_ui::{error_banner, primary_button, warning_banner};

use crate::map_view::map_title;
use crate::plots::pie::class_label;
use crate::plots::{ChoroplethChart, ImportanceBarChart, PieChart, RegionValue};
use crate::{DashboardView, ViewError, ViewerContext};

/// Name of the predicted-label column on the small map
const PREDICTED_COLUMN: &str = "temporaire";

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Invalid INSEE code.")]
    InvalidCode,

    #[error("No data for this year.")]
    NoDataForYear,

    #[error("Model input error: {0}")]
    Input(#[from] DataError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl PredictionError {
    /// Expected bad input, shown as a warning rather than an error
    pub fn is_warning(&self) -> bool {
        matches!(self, PredictionError::InvalidCode | PredictionError::NoDataForYear)
    }
}

/// Everything the prediction page draws after a successful lookup
pub struct PredictionOutcome {
    pub code: String,
    pub year: i32,
    /// One predicted label per matching row
    pub labels: Vec<ClassLabel>,
    /// One row of class probabilities per matching row
    pub probabilities: Array2<f64>,
    /// Absent when no matching row has a fillable geometry
    pub map: Option<ChoroplethChart>,
    /// Class probabilities of the first matching row
    pub pie: PieChart,
    pub importances: ImportanceBarChart,
}

/// Look up `code` and `year`, then run the classifier on the matching rows
pub fn run_prediction(
    dataset: &DroughtDataset,
    model: &dyn Classifier,
    code: &str,
    year: i32,
) -> Result<PredictionOutcome, PredictionError> {
    let code = code.trim();

    let commune = dataset.filter_code(code)?;
    if commune.is_empty() {
        return Err(PredictionError::InvalidCode);
    }
    let rows = commune.filter_year(year)?;
    if rows.is_empty() {
        return Err(PredictionError::NoDataForYear);
    }

    let features = rows.feature_matrix()?;
    let labels = model.predict(features.view())?;
    let probabilities = model.predict_proba(features.view())?;

    let map = predicted_label_map(&rows, model.classes(), &labels, year)
        .map_err(|e| tracing::warn!("No map for {} in {}: {}", code, year, e))
        .ok();

    let pie = PieChart::new(
        model
            .classes()
            .iter()
            .zip(probabilities.row(0))
            .map(|(class, p)| (class_label(class, *p), *p)),
    );
    let importances = ImportanceBarChart::new(&importance_ranking(model));

    Ok(PredictionOutcome {
        code: code.to_string(),
        year,
        labels,
        probabilities,
        map,
        pie,
        importances,
    })
}

/// Regions colored by the index of their predicted class
fn predicted_label_map(
    rows: &DroughtDataset,
    classes: &[ClassLabel],
    labels: &[ClassLabel],
    year: i32,
) -> Result<ChoroplethChart, ViewError> {
    let codes = rows.codes();
    let regions: Vec<RegionValue<'_>> = rows
        .geometries()
        .iter()
        .zip(labels)
        .enumerate()
        .filter_map(|(row, (geometry, label))| {
            let index = classes.iter().position(|c| c == label).unwrap_or_default();
            Some(RegionValue {
                code: codes.value(row),
                value: index as f64,
                label: format!("{}: {}", PREDICTED_COLUMN, label),
                geometry: geometry.as_ref()?,
            })
        })
        .collect();

    Ok(ChoroplethChart::build(map_title(PREDICTED_COLUMN, year), regions)?.with_legend(false))
}

/// Prediction page
#[derive(Default)]
pub struct PredictionView {
    /// Result of the last "Predict" press
    outcome: Option<Result<PredictionOutcome, PredictionError>>,
}

impl PredictionView {
    pub fn new() -> Self {
        Self::default()
    }

    fn predict(&mut self, ctx: &ViewerContext, model: &dyn Classifier, code: &str, year: i32) {
        tracing::info!("Predicting for {} in {}", code.trim(), year);
        let outcome = run_prediction(&ctx.dataset, model, code, year);

        match &outcome {
            Ok(prediction) => {
                let label = prediction
                    .labels
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                ctx.event_bus.publish(PredictionCompleted {
                    code: prediction.code.clone(),
                    year,
                    label,
                });
            }
            Err(e) => {
                if e.is_warning() {
                    tracing::warn!("{} ({}, {})", e, code.trim(), year);
                } else {
                    tracing::error!("Prediction failed: {}", e);
                }
                ctx.event_bus.publish(ViewFailed {
                    page: Page::Prediction,
                    message: e.to_string(),
                });
            }
        }
        self.outcome = Some(outcome);
    }

    fn show_outcome(&self, ui: &mut Ui) {
        match &self.outcome {
            None => {}
            Some(Err(e)) if e.is_warning() => warning_banner(ui, &e.to_string()),
            Some(Err(e)) => error_banner(ui, &e.to_string()),
            Some(Ok(prediction)) => {
                if let Some(map) = &prediction.map {
                    map.show(ui, Vec2::new(480.0, 240.0));
                }

                ui.add_space(12.0);
                ui.label(RichText::new("Probability of a CATNAT drought decree:").heading());
                prediction.pie.show(ui, Vec2::new(ui.available_width().min(640.0), 320.0));

                ui.add_space(12.0);
                ui.label(RichText::new("Main features driving the prediction:").heading());
                prediction
                    .importances
                    .show(ui, Vec2::new(ui.available_width().min(640.0), 300.0));
            }
        }
    }
}

impl DashboardView for PredictionView {
    fn page(&self) -> Page {
        Page::Prediction
    }

    fn title(&self) -> &str {
        "Drought Decree Prediction"
    }

    fn ui(&mut self, ctx: &ViewerContext, state: &mut AppState, ui: &mut Ui) {
        ui.heading(self.title());
        ui.add_space(8.0);

        let model = match &ctx.model {
            Ok(model) => model.clone(),
            Err(reason) => {
                error_banner(ui, &format!("The prediction model is unavailable: {}", reason));
                return;
            }
        };

        let years = state.settings.years;
        let controls = &mut state.prediction;
        ui.horizontal(|ui| {
            ui.label("Enter the INSEE code");
            ui.add(TextEdit::singleline(&mut controls.code).desired_width(120.0));
        });
        ui.add(Slider::new(&mut controls.year, years.min()..=years.max()).text("Select the year"));

        if primary_button(ui, "Predict").clicked() {
            let (code, year) = (controls.code.clone(), controls.year);
            self.predict(ctx, model.as_ref(), &code, year);
        }

        ui.add_space(8.0);
        egui::ScrollArea::vertical().show(ui, |ui| self.show_outcome(ui));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_dataset;
    use dd_core::Covariate;
    use ndarray::ArrayView2;

    /// Probabilities driven by the dryness proxy EVAP_MENS (1.2 wet, 2.2 dry)
    struct ThresholdModel {
        classes: Vec<ClassLabel>,
        importances: Vec<f64>,
    }

    impl ThresholdModel {
        fn new() -> Self {
            Self {
                classes: vec![ClassLabel::Integer(0), ClassLabel::Integer(1)],
                importances: vec![0.05, 0.25, 0.4, 0.1, 0.15, 0.05],
            }
        }
    }

    impl Classifier for ThresholdModel {
        fn classes(&self) -> &[ClassLabel] {
            &self.classes
        }

        fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
            let mut out = Array2::zeros((features.nrows(), 2));
            for (i, row) in features.rows().into_iter().enumerate() {
                let dry = if row[Covariate::Evaporation.index()] > 1.7 { 0.7 } else { 0.2 };
                out[[i, 0]] = 1.0 - dry;
                out[[i, 1]] = dry;
            }
            Ok(out)
        }

        fn feature_importances(&self) -> &[f64] {
            &self.importances
        }
    }

    #[test]
    fn test_prediction_for_known_commune() {
        let dataset = sample_dataset();
        let model = ThresholdModel::new();
        let outcome = run_prediction(&dataset, &model, "75056", 2019).unwrap();

        assert_eq!(outcome.labels, vec![ClassLabel::Integer(0)]);
        assert_eq!(outcome.probabilities.shape(), &[1, model.classes().len()]);
        assert!((outcome.probabilities.row(0).sum() - 1.0).abs() < 1e-6);

        let map = outcome.map.unwrap();
        assert_eq!(map.title(), "Thematic map: temporaire for 2019");
        assert!(!map.has_legend());

        let labels: Vec<&str> = outcome.pie.slices().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Class 0: 80.00%", "Class 1: 20.00%"]);
    }

    #[test]
    fn test_code_is_trimmed() {
        let dataset = sample_dataset();
        let outcome = run_prediction(&dataset, &ThresholdModel::new(), "  13055 ", 2019).unwrap();
        assert_eq!(outcome.code, "13055");
        assert_eq!(outcome.labels, vec![ClassLabel::Integer(1)]);
    }

    #[test]
    fn test_unknown_code_warns() {
        let result = run_prediction(&sample_dataset(), &ThresholdModel::new(), "00000", 2019);
        let err = result.err().unwrap();
        assert!(matches!(err, PredictionError::InvalidCode));
        assert!(err.is_warning());
        assert_eq!(err.to_string(), "Invalid INSEE code.");
    }

    #[test]
    fn test_known_code_without_year_warns() {
        let result = run_prediction(&sample_dataset(), &ThresholdModel::new(), "75056", 2022);
        let err = result.err().unwrap();
        assert!(matches!(err, PredictionError::NoDataForYear));
        assert_eq!(err.to_string(), "No data for this year.");
    }

    #[test]
    fn test_importance_bars_descending() {
        let outcome = run_prediction(&sample_dataset(), &ThresholdModel::new(), "75056", 2020).unwrap();
        let bars = outcome.importances.bars();

        assert_eq!(bars[0].name, "EVAP_MENS");
        assert!(bars.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn test_missing_covariate_is_an_input_error() {
        let mut record = crate::fixtures::record("2A004", 2021, 1.0);
        record.covariates[Covariate::SoilWetness.index()] = None;
        let dataset = DroughtDataset::from_records(vec![record]).unwrap();

        let result = run_prediction(&dataset, &ThresholdModel::new(), "2A004", 2021);
        let err = result.err().unwrap();
        assert!(matches!(err, PredictionError::Input(DataError::MissingValue { .. })));
        assert!(!err.is_warning());
    }
}
