//! eframe application: sidebar, status bar and the active page

use std::sync::Arc;

use eframe::egui::{self, Context};

use dd_core::{AppSettings, AppState, Page};
use dd_data::{DashboardConfig, DroughtDataset};
use dd_model::Classifier;
use dd_ui::{NavigationPanel, StatusLine, Theme};
use dd_views::{CorrelationView, DashboardView, MapView, PredictionView, ViewerContext};

/// Main application state
pub struct DashboardApp {
    state: AppState,

    /// Viewer context shared between all views
    viewer_context: ViewerContext,

    navigation_panel: NavigationPanel,
    status: StatusLine,

    map_view: MapView,
    correlation_view: CorrelationView,
    prediction_view: PredictionView,
}

impl DashboardApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        state: AppState,
        status: StatusLine,
        dataset: DroughtDataset,
        model: Result<Arc<dyn Classifier>, String>,
    ) -> Self {
        dd_ui::apply_theme(&cc.egui_ctx, &Theme::default());

        let viewer_context = ViewerContext {
            dataset: Arc::new(dataset),
            model,
            event_bus: state.event_bus.clone(),
        };

        Self {
            state,
            viewer_context,
            navigation_panel: NavigationPanel::default(),
            status,
            map_view: MapView::new(),
            correlation_view: CorrelationView::new(),
            prediction_view: PredictionView::new(),
        }
    }

    /// Application state with the configured year range and default code
    pub fn initial_state(config: &DashboardConfig) -> anyhow::Result<AppState> {
        let settings = AppSettings {
            years: config.year_range()?,
            ..Default::default()
        };
        Ok(AppState::new(settings, config.default_code.clone()))
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.navigation_panel.show(ctx, &mut self.state);

        if self.state.settings.show_status_bar {
            dd_ui::status_bar(ctx, &self.status);
        }

        let viewer_context = self.viewer_context.clone();
        egui::CentralPanel::default().show(ctx, |ui| {
            let page = self.state.page();
            let view: &mut dyn DashboardView = match page {
                Page::Map => &mut self.map_view,
                Page::Correlation => &mut self.correlation_view,
                Page::Prediction => &mut self.prediction_view,
            };
            view.ui(&viewer_context, &mut self.state, ui);
        });
    }
}
