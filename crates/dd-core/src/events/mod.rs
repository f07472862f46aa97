use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// System-wide event bus
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;

    /// One-line description for the status bar
    fn summary(&self) -> String;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Dashboard events
pub mod events {
    use super::Event;
    use crate::navigation::Page;

    /// Dataset loaded at startup
    #[derive(Debug, Clone)]
    pub struct DatasetLoaded {
        pub source_name: String,
        pub row_count: usize,
    }

    /// Classifier loaded at startup
    #[derive(Debug, Clone)]
    pub struct ModelLoaded {
        pub tree_count: usize,
        pub class_count: usize,
    }

    #[derive(Debug, Clone)]
    pub struct PageChanged {
        pub from: Page,
        pub to: Page,
    }

    /// A choropleth was generated on the map page
    #[derive(Debug, Clone)]
    pub struct MapGenerated {
        pub column: String,
        pub year: i32,
        pub region_count: usize,
    }

    #[derive(Debug, Clone)]
    pub struct PredictionCompleted {
        pub code: String,
        pub year: i32,
        pub label: String,
    }

    /// A page reported a warning or an error to the user
    #[derive(Debug, Clone)]
    pub struct ViewFailed {
        pub page: Page,
        pub message: String,
    }

    impl Event for DatasetLoaded {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn summary(&self) -> String {
            format!("Loaded {} rows from {}", self.row_count, self.source_name)
        }
    }

    impl Event for ModelLoaded {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn summary(&self) -> String {
            format!("Model ready: {} trees, {} classes", self.tree_count, self.class_count)
        }
    }

    impl Event for PageChanged {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn summary(&self) -> String {
            self.to.label().to_string()
        }
    }

    impl Event for MapGenerated {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn summary(&self) -> String {
            format!("Map of {} for {}: {} regions", self.column, self.year, self.region_count)
        }
    }

    impl Event for PredictionCompleted {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn summary(&self) -> String {
            format!("Prediction for {} in {}: class {}", self.code, self.year, self.label)
        }
    }

    impl Event for ViewFailed {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn summary(&self) -> String {
            format!("{}: {}", self.page.label(), self.message)
        }
    }
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

#[cfg(test)]
mod tests {
    use super::events::{DatasetLoaded, ModelLoaded};
    use super::*;

    #[test]
    fn test_handlers_only_receive_their_type() {
        let bus = EventBus::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let sink = received.clone();
        bus.subscribe::<DatasetLoaded>(handler_from_fn(move |event| {
            sink.lock().push(event.summary());
        }));

        bus.publish(ModelLoaded { tree_count: 10, class_count: 2 });
        bus.publish(DatasetLoaded {
            source_name: "output_2.gpkg".to_string(),
            row_count: 4,
        });

        assert_eq!(*received.lock(), vec!["Loaded 4 rows from output_2.gpkg".to_string()]);
    }
}
