//! Utilities for plot views

pub mod colors;
pub mod legend;
pub mod stats;

// Re-export commonly used items
pub use colors::{alternating_color, normalize, text_color_for, yl_or_rd_color, CHART_BACKGROUND, HIGHLIGHT, SECONDARY};
pub use legend::paint_color_bar;
pub use stats::{correlation_matrix, finite_range, pearson_pairwise};
