use std::sync::Arc;

use egui::{Context, RichText, TopBottomPanel};
use parking_lot::Mutex;

use dd_core::events::events::{
    DatasetLoaded, MapGenerated, ModelLoaded, PageChanged, PredictionCompleted, ViewFailed,
};
use dd_core::{handler_from_fn, Event, EventBus};

/// Last event summary, shown in the status bar
#[derive(Clone, Default)]
pub struct StatusLine {
    text: Arc<Mutex<String>>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow every dashboard event published on `bus`
    pub fn subscribe(&self, bus: &EventBus) {
        self.follow::<DatasetLoaded>(bus);
        self.follow::<ModelLoaded>(bus);
        self.follow::<PageChanged>(bus);
        self.follow::<MapGenerated>(bus);
        self.follow::<PredictionCompleted>(bus);
        self.follow::<ViewFailed>(bus);
    }

    fn follow<E: Event>(&self, bus: &EventBus) {
        let text = self.text.clone();
        bus.subscribe::<E>(handler_from_fn(move |event: &dyn Event| {
            *text.lock() = event.summary();
        }));
    }

    pub fn text(&self) -> String {
        self.text.lock().clone()
    }
}

/// Bottom status bar with the last event summary
pub fn status_bar(ctx: &Context, status: &StatusLine) {
    TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(RichText::new(status.text()).small());
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::Page;

    #[test]
    fn test_status_follows_latest_event() {
        let bus = EventBus::new();
        let status = StatusLine::new();
        status.subscribe(&bus);
        assert_eq!(status.text(), "");

        bus.publish(ModelLoaded { tree_count: 100, class_count: 2 });
        assert_eq!(status.text(), "Model ready: 100 trees, 2 classes");

        bus.publish(ViewFailed {
            page: Page::Prediction,
            message: "Invalid INSEE code.".to_string(),
        });
        assert_eq!(status.text(), "Comparative charts: Invalid INSEE code.");
    }
}
