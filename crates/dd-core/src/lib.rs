//! Core functionality for the drought dashboard
//!
//! This crate provides the domain vocabulary (columns, pages, years),
//! the UI-independent application state and the event bus shared by
//! the other crates.

pub mod columns;
pub mod events;
pub mod navigation;
pub mod state;

// Re-export commonly used types
pub use columns::{DatasetColumn, Covariate, COVARIATES, MAP_COLUMNS, CORRELATION_COLUMNS};
pub use events::{EventBus, Event, EventHandler, handler_from_fn};
pub use navigation::{Page, YearRange, YearError};
pub use state::{AppState, AppSettings, MapControls, PredictionControls};

/// Commune code used as the default prediction lookup (Paris)
pub const DEFAULT_COMMUNE_CODE: &str = "75056";
