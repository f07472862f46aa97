use std::sync::Arc;

use crate::columns::DatasetColumn;
use crate::events::{events::PageChanged, EventBus};
use crate::navigation::{Page, YearRange};
use crate::DEFAULT_COMMUNE_CODE;

/// Controls of the map page
#[derive(Debug, Clone, PartialEq)]
pub struct MapControls {
    /// Column colored on the map
    pub column: DatasetColumn,

    /// Year shown on the map
    pub year: i32,
}

/// Controls of the prediction page
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionControls {
    /// INSEE code typed by the user
    pub code: String,

    pub year: i32,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Years offered by the sliders
    pub years: YearRange,

    /// Whether to show the status bar
    pub show_status_bar: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            years: YearRange::default(),
            show_status_bar: true,
        }
    }
}

/// The main application state
pub struct AppState {
    /// The page selected in the sidebar
    page: Page,

    pub map: MapControls,

    pub prediction: PredictionControls,

    pub settings: AppSettings,

    /// The event bus
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// Create a new application state
    pub fn new(settings: AppSettings, default_code: impl Into<String>) -> Self {
        let first_year = settings.years.min();

        Self {
            page: Page::default(),
            map: MapControls {
                column: DatasetColumn::Dry,
                year: first_year,
            },
            prediction: PredictionControls {
                code: default_code.into(),
                year: first_year,
            },
            settings,
            event_bus: Arc::new(EventBus::new()),
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Switch page, publishing `PageChanged` when it actually changes
    pub fn set_page(&mut self, page: Page) {
        if self.page == page {
            return;
        }

        let previous = std::mem::replace(&mut self.page, page);
        tracing::info!("Page changed: {:?} -> {:?}", previous, page);

        self.event_bus.publish(PageChanged {
            from: previous,
            to: page,
        });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppSettings::default(), DEFAULT_COMMUNE_CODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{handler_from_fn, Event};
    use parking_lot::Mutex;

    #[test]
    fn test_defaults() {
        let state = AppState::default();
        assert_eq!(state.page(), Page::Map);
        assert_eq!(state.map.year, 2019);
        assert_eq!(state.prediction.code, "75056");
        assert_eq!(state.prediction.year, 2019);
    }

    #[test]
    fn test_page_change_is_published_once() {
        let mut state = AppState::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        state.event_bus.subscribe::<PageChanged>(handler_from_fn(move |event: &dyn Event| {
            if let Some(changed) = event.as_any().downcast_ref::<PageChanged>() {
                sink.lock().push(changed.to);
            }
        }));

        state.set_page(Page::Prediction);
        state.set_page(Page::Prediction);
        state.set_page(Page::Correlation);

        assert_eq!(*seen.lock(), vec![Page::Prediction, Page::Correlation]);
    }
}
