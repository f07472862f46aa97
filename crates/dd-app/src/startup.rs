//! Loading of the dataset and the model at startup

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use dd_core::events::events::{DatasetLoaded, ModelLoaded};
use dd_core::EventBus;
use dd_data::{open_source, DashboardConfig, DroughtDataset};
use dd_model::{Classifier, RandomForest};

/// Read the whole dataset; failure aborts startup
pub fn load_dataset(config: &DashboardConfig, bus: &EventBus) -> Result<DroughtDataset> {
    let source = open_source(&config.dataset_path, config.layer.as_deref())
        .with_context(|| format!("Cannot open dataset {}", config.dataset_path.display()))?;
    let dataset = source
        .load()
        .with_context(|| format!("Cannot read dataset {}", source.source_name()))?;

    info!("Dataset ready: {} rows, years {:?}", dataset.num_rows(), dataset.distinct_years());
    bus.publish(DatasetLoaded {
        source_name: source.source_name().to_string(),
        row_count: dataset.num_rows(),
    });
    Ok(dataset)
}

/// Load the classifier; a failure only disables the prediction page
pub fn load_model(config: &DashboardConfig, bus: &EventBus) -> Result<Arc<dyn Classifier>, String> {
    match RandomForest::load(&config.model_path) {
        Ok(forest) => {
            bus.publish(ModelLoaded {
                tree_count: forest.tree_count(),
                class_count: forest.classes().len(),
            });
            Ok(Arc::new(forest))
        }
        Err(e) => {
            let reason = format!("{}: {}", config.model_path.display(), e);
            error!("Failed to load model {}", reason);
            Err(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::handler_from_fn;
    use parking_lot::Mutex;

    fn write_dataset(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("communes.geojson");
        let collection = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[2.25, 48.81], [2.42, 48.81], [2.42, 48.90], [2.25, 48.90], [2.25, 48.81]]]
                },
                "properties": {
                    "codgeo": "75056", "year": 2019, "dry": 0,
                    "PRELIQ_MENS": 48.2, "T_MENS": 13.1, "EVAP_MENS": 1.7,
                    "ETP_MENS": 2.6, "PE_MENS": -22.0, "SWI_MENS": 0.55
                }
            }]
        });
        std::fs::write(&path, collection.to_string()).unwrap();
        path
    }

    #[test]
    fn test_dataset_loaded_event() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            dataset_path: write_dataset(dir.path()),
            ..Default::default()
        };
        let bus = EventBus::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        bus.subscribe::<DatasetLoaded>(handler_from_fn(move |e| sink.lock().push(e.summary())));

        let dataset = load_dataset(&config, &bus).unwrap();
        assert_eq!(dataset.num_rows(), 1);
        assert_eq!(received.lock().len(), 1);
    }

    #[test]
    fn test_missing_dataset_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            dataset_path: dir.path().join("missing.gpkg"),
            ..Default::default()
        };
        assert!(load_dataset(&config, &EventBus::new()).is_err());
    }

    #[test]
    fn test_missing_model_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            model_path: dir.path().join("missing.json"),
            ..Default::default()
        };
        let reason = load_model(&config, &EventBus::new()).err().unwrap();
        assert!(reason.contains("missing.json"));
    }
}
