//! User interface components for the drought dashboard
//!
//! This crate provides the egui theme, the navigation sidebar, inline
//! message banners and the status bar shared by the pages.

pub mod navigation_panel;
pub mod shell;
pub mod theme;
pub mod widget_utils;

/// Re-export commonly used types
pub use navigation_panel::NavigationPanel;
pub use shell::{status_bar, StatusLine};
pub use theme::{apply_theme, Theme};
pub use widget_utils::{error_banner, primary_button, warning_banner};
