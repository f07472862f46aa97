//! GeoJSON FeatureCollection data source

use std::path::{Path, PathBuf};

use dd_core::columns::{CODE_COLUMN, YEAR_COLUMN};
use dd_core::COVARIATES;
use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue};

use super::{report_quality, required_columns, DatasetSource};
use crate::{DataError, DroughtDataset, DroughtRecord};

/// Drought dataset stored as a GeoJSON FeatureCollection
pub struct GeoJsonSource {
    path: PathBuf,
    name: String,
}

impl GeoJsonSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.geojson")
            .to_string();

        Self { path, name }
    }

    /// Parse an already-read document
    pub fn parse(&self, text: &str) -> Result<DroughtDataset, DataError> {
        let collection = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => collection,
            _ => {
                return Err(DataError::UnsupportedFormat(format!(
                    "{}: expected a FeatureCollection",
                    self.name
                )))
            }
        };

        self.check_properties(&collection)?;

        let mut records = Vec::with_capacity(collection.features.len());
        let mut skipped = 0usize;

        for (index, feature) in collection.features.into_iter().enumerate() {
            let properties = feature.properties.unwrap_or_default();

            let (Some(codgeo), Some(year)) = (
                json_to_code(properties.get(CODE_COLUMN)),
                json_to_year(properties.get(YEAR_COLUMN)),
            ) else {
                tracing::debug!("Skipping feature {} without code or year", index);
                skipped += 1;
                continue;
            };

            let mut covariates = [None; 6];
            for covariate in COVARIATES {
                covariates[covariate.index()] = json_to_f64(properties.get(covariate.column_name()));
            }

            let geometry = feature
                .geometry
                .map(|g| geo_types::Geometry::<f64>::try_from(g.value))
                .transpose()?;

            records.push(DroughtRecord {
                codgeo,
                year,
                dry: json_to_f64(properties.get("dry")),
                covariates,
                geometry,
            });
        }

        if skipped > 0 {
            tracing::warn!("{}: skipped {} features without code or year", self.name, skipped);
        }

        let dataset = DroughtDataset::from_records(records)?;
        report_quality(&dataset, &self.name);
        Ok(dataset)
    }

    /// Properties are checked on the first feature only
    fn check_properties(&self, collection: &FeatureCollection) -> Result<(), DataError> {
        let Some(first) = collection.features.first() else {
            return Ok(());
        };
        let empty = JsonObject::new();
        let properties = first.properties.as_ref().unwrap_or(&empty);

        match required_columns().find(|column| !properties.contains_key(*column)) {
            Some(column) => Err(DataError::MissingColumn {
                column: column.to_string(),
                source_name: self.name.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DatasetSource for GeoJsonSource {
    fn load(&self) -> Result<DroughtDataset, DataError> {
        let text = std::fs::read_to_string(&self.path)?;
        let dataset = self.parse(&text)?;
        tracing::info!("Loaded {} rows from {}", dataset.num_rows(), self.name);
        Ok(dataset)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

fn json_to_code(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        JsonValue::Number(n) => n.as_i64().map(|i| i.to_string()),
        _ => None,
    }
}

fn json_to_year(value: Option<&JsonValue>) -> Option<i64> {
    match value? {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_to_f64(value: Option<&JsonValue>) -> Option<f64> {
    match value? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::{Covariate, DatasetColumn};
    use geo_types::Geometry;

    const DOCUMENT: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Polygon", "coordinates": [[[2.2, 48.8], [2.4, 48.8], [2.3, 48.9], [2.2, 48.8]]]},
                "properties": {
                    "codgeo": "75056", "year": 2019, "dry": true,
                    "PRELIQ_MENS": 60.5, "T_MENS": 11.0, "EVAP_MENS": 1.2,
                    "ETP_MENS": 2.4, "PE_MENS": -20.0, "SWI_MENS": null
                }
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": {
                    "codgeo": 13055, "year": "2020", "dry": 0,
                    "PRELIQ_MENS": 10, "T_MENS": 15.5, "EVAP_MENS": 2.0,
                    "ETP_MENS": 3.1, "PE_MENS": -50.0, "SWI_MENS": 0.3
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_feature_collection() {
        let source = GeoJsonSource::new("communes.geojson");
        let dataset = source.parse(DOCUMENT).unwrap();

        assert_eq!(dataset.num_rows(), 2);
        assert_eq!(dataset.codes().value(1), "13055");
        assert_eq!(dataset.distinct_years(), vec![2019, 2020]);
        assert_eq!(dataset.values(DatasetColumn::Dry), vec![Some(1.0), Some(0.0)]);
        assert_eq!(
            dataset.values(DatasetColumn::Covariate(Covariate::SoilWetness)),
            vec![None, Some(0.3)]
        );
        assert!(matches!(dataset.geometries()[0], Some(Geometry::Polygon(_))));
        assert!(dataset.geometries()[1].is_none());
    }

    #[test]
    fn test_missing_property() {
        let source = GeoJsonSource::new("communes.geojson");
        let document = DOCUMENT.replace("\"T_MENS\": 11.0,", "");

        match source.parse(&document) {
            Err(DataError::MissingColumn { column, .. }) => assert_eq!(column, "T_MENS"),
            other => panic!("unexpected result: {:?}", other.map(|d| d.num_rows())),
        }
    }

    #[test]
    fn test_rejects_single_geometry() {
        let source = GeoJsonSource::new("point.geojson");
        let result = source.parse(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#);
        assert!(matches!(result, Err(DataError::UnsupportedFormat(_))));
    }
}
