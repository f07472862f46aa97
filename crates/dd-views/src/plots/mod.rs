//! Chart models and their painters

pub mod bar;
pub mod choropleth;
pub mod heatmap;
pub mod pie;

// Utilities
pub mod utils;

// Re-exports
pub use bar::{ImportanceBar, ImportanceBarChart};
pub use choropleth::{ChoroplethChart, Region, RegionValue};
pub use heatmap::HeatmapChart;
pub use pie::{PieChart, PieSlice};
