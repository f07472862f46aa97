//! Data handling and sources for the drought dashboard

pub mod config;
pub mod dataset;
pub mod sources;
pub mod wkb;

use arrow::error::ArrowError;
use thiserror::Error;

// Re-exports
pub use config::DashboardConfig;
pub use dataset::{DroughtDataset, DroughtRecord};
pub use sources::{open_source, DatasetSource, GeoJsonSource, GeoPackageSource};
pub use wkb::GeometryError;

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid geometry in row {row}: {source}")]
    Geometry {
        row: usize,
        #[source]
        source: GeometryError,
    },

    #[error("Column '{column}' not found in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("No features layer found in {0}")]
    NoFeatureLayer(String),

    #[error("Missing value for '{column}' in row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
