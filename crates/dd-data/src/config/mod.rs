//! Dashboard configuration

use std::path::{Path, PathBuf};

use dd_core::{YearRange, DEFAULT_COMMUNE_CODE};
use serde::{Deserialize, Serialize};

use crate::DataError;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "DROUGHT_DASHBOARD_CONFIG";
/// Environment override of `dataset_path`
pub const DATASET_ENV: &str = "DROUGHT_DATASET";
/// Environment override of `model_path`
pub const MODEL_ENV: &str = "DROUGHT_MODEL";
/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

/// Configuration of the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// GeoPackage or GeoJSON file with the drought dataset
    pub dataset_path: PathBuf,

    /// Random forest exported to JSON
    pub model_path: PathBuf,

    /// Feature layer inside the GeoPackage
    pub layer: Option<String>,

    pub min_year: i32,
    pub max_year: i32,

    /// Code pre-filled in the prediction page
    pub default_code: String,

    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("output_2.gpkg"),
            model_path: PathBuf::from("random_forest_classification_model.json"),
            layer: None,
            min_year: YearRange::MIN_YEAR,
            max_year: YearRange::MAX_YEAR,
            default_code: DEFAULT_COMMUNE_CODE.to_string(),
            window_width: 1280.0,
            window_height: 800.0,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON configuration file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Defaults, then the configuration file, then environment overrides
    pub fn resolve() -> Result<Self, DataError> {
        Self::resolve_with(|key| std::env::var(key).ok())
    }

    /// [`resolve`](Self::resolve) with an injectable environment
    pub fn resolve_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, DataError> {
        let config = match env(CONFIG_ENV) {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path);
                Self::from_file(Path::new(&path))?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::info!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        let config = config.with_overrides(env);
        config.year_range()?;
        Ok(config)
    }

    fn with_overrides(mut self, env: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dataset) = env(DATASET_ENV) {
            self.dataset_path = PathBuf::from(dataset);
        }
        if let Some(model) = env(MODEL_ENV) {
            self.model_path = PathBuf::from(model);
        }
        self
    }

    /// Validated slider range
    pub fn year_range(&self) -> Result<YearRange, DataError> {
        YearRange::new(self.min_year, self.max_year).map_err(|e| DataError::Config(e.to_string()))
    }
}
