//! Page views of the drought dashboard

mod correlation_view;
mod dashboard_view;
mod map_view;
pub mod plots;
mod prediction_view;

pub use correlation_view::{build_correlation_chart, CorrelationView};
pub use dashboard_view::DashboardView;
pub use map_view::{build_map_chart, map_title, MapView};
pub use prediction_view::{run_prediction, PredictionError, PredictionOutcome, PredictionView};

use std::sync::Arc;

use dd_core::EventBus;
use dd_data::{DataError, DroughtDataset};
use dd_model::{Classifier, ModelError};
use thiserror::Error;

/// Errors raised while building a chart
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("no rows for year {year}")]
    EmptySelection { year: i32 },

    #[error("no row has both a geometry and a value")]
    NoDrawableRegions,

    #[error("no fillable polygon among the selected geometries")]
    NoFillablePolygon,

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Context passed to views during rendering
#[derive(Clone)]
pub struct ViewerContext {
    /// The dataset, loaded once at startup
    pub dataset: Arc<DroughtDataset>,

    /// The classifier, or why it could not be loaded
    pub model: Result<Arc<dyn Classifier>, String>,

    /// The event bus
    pub event_bus: Arc<EventBus>,
}
