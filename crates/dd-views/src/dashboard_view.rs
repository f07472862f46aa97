//! Page abstraction - base trait for the dashboard pages

use egui::Ui;

use dd_core::{AppState, Page};

use crate::ViewerContext;

/// Base trait for the pages shown in the central panel
pub trait DashboardView {
    /// The navigation target this view renders
    fn page(&self) -> Page;

    /// Get the title of this view
    fn title(&self) -> &str;

    /// Draw the UI; controls read and write `state`
    fn ui(&mut self, ctx: &ViewerContext, state: &mut AppState, ui: &mut Ui);
}
