//! Dataset sources

pub mod geojson_source;
pub mod gpkg_source;

use std::path::Path;

pub use geojson_source::GeoJsonSource;
pub use gpkg_source::GeoPackageSource;

use dd_core::columns::{CODE_COLUMN, YEAR_COLUMN};
use dd_core::MAP_COLUMNS;

use crate::{DataError, DroughtDataset};

/// Trait for drought dataset sources
pub trait DatasetSource: Send + Sync {
    /// Read the whole dataset into memory
    fn load(&self) -> Result<DroughtDataset, DataError>;

    /// Get the source name/path
    fn source_name(&self) -> &str;
}

/// Attribute columns every source must provide
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    [CODE_COLUMN, YEAR_COLUMN]
        .into_iter()
        .chain(MAP_COLUMNS.iter().map(|c| c.column_name()))
}

/// Pick a source from the file extension
pub fn open_source(path: &Path, layer: Option<&str>) -> Result<Box<dyn DatasetSource>, DataError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "gpkg" => Ok(Box::new(GeoPackageSource::new(path, layer.map(str::to_string)))),
        "geojson" | "json" => Ok(Box::new(GeoJsonSource::new(path))),
        _ => Err(DataError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Log data-quality issues of a freshly loaded dataset
pub(crate) fn report_quality(dataset: &DroughtDataset, source_name: &str) {
    let duplicates = dataset.duplicate_keys();
    if !duplicates.is_empty() {
        tracing::warn!(
            "{}: {} (codgeo, year) keys appear more than once, first: {:?}",
            source_name,
            duplicates.len(),
            duplicates[0]
        );
    }

    let missing_geometries = dataset.geometries().iter().filter(|g| g.is_none()).count();
    if missing_geometries > 0 {
        tracing::warn!("{}: {} rows without geometry", source_name, missing_geometries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_source_by_extension() {
        assert_eq!(
            open_source(Path::new("output_2.gpkg"), None).unwrap().source_name(),
            "output_2.gpkg"
        );
        assert_eq!(
            open_source(Path::new("communes.GeoJSON"), None).unwrap().source_name(),
            "communes.GeoJSON"
        );
        assert!(matches!(
            open_source(Path::new("data.shp"), None),
            Err(DataError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_required_columns() {
        let columns: Vec<_> = required_columns().collect();
        assert_eq!(columns.len(), 9);
        assert_eq!(columns[0], "codgeo");
        assert!(columns.contains(&"SWI_MENS"));
    }
}
