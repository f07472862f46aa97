//! GeoPackage data source implementation

use std::path::{Path, PathBuf};

use dd_core::columns::{CODE_COLUMN, YEAR_COLUMN};
use dd_core::COVARIATES;
use rusqlite::{types::ValueRef, Connection, OpenFlags, OptionalExtension};

use super::{report_quality, required_columns, DatasetSource};
use crate::wkb::decode_gpkg_geometry;
use crate::{DataError, DroughtDataset, DroughtRecord};

/// GeoPackage (SQLite) data source
pub struct GeoPackageSource {
    path: PathBuf,
    name: String,
    /// Feature table to read; the first features layer when unset
    layer: Option<String>,
}

impl GeoPackageSource {
    pub fn new<P: AsRef<Path>>(path: P, layer: Option<String>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.gpkg")
            .to_string();

        Self { path, name, layer }
    }

    fn open(&self) -> Result<Connection, DataError> {
        if !self.path.exists() {
            return Err(DataError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", self.path.display()),
            )));
        }

        Ok(Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?)
    }

    /// Find the feature table to read
    fn resolve_layer(&self, conn: &Connection) -> Result<String, DataError> {
        let layer = match &self.layer {
            Some(layer) => conn
                .query_row(
                    "SELECT table_name FROM gpkg_contents WHERE table_name = ?1 AND data_type = 'features'",
                    [layer],
                    |row| row.get::<_, String>(0),
                )
                .optional()?,
            None => conn
                .query_row(
                    "SELECT table_name FROM gpkg_contents WHERE data_type = 'features' ORDER BY rowid LIMIT 1",
                    [],
                    |row| row.get::<_, String>(0),
                )
                .optional()?,
        };

        layer.ok_or_else(|| DataError::NoFeatureLayer(self.name.clone()))
    }

    fn geometry_column(&self, conn: &Connection, table: &str) -> Result<String, DataError> {
        conn.query_row(
            "SELECT column_name FROM gpkg_geometry_columns WHERE table_name = ?1",
            [table],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .ok_or_else(|| DataError::MissingColumn {
            column: "geometry".to_string(),
            source_name: format!("{}:{}", self.name, table),
        })
    }

    /// Check that the attribute columns exist
    fn check_columns(&self, conn: &Connection, table: &str) -> Result<(), DataError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote(table)))?;
        let present = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;

        for column in required_columns() {
            if !present.iter().any(|p| p == column) {
                return Err(DataError::MissingColumn {
                    column: column.to_string(),
                    source_name: format!("{}:{}", self.name, table),
                });
            }
        }
        Ok(())
    }
}

impl DatasetSource for GeoPackageSource {
    fn load(&self) -> Result<DroughtDataset, DataError> {
        let conn = self.open()?;
        let table = self.resolve_layer(&conn)?;
        let geometry_column = self.geometry_column(&conn, &table)?;
        self.check_columns(&conn, &table)?;

        let mut selected: Vec<String> = vec![quote(CODE_COLUMN), quote(YEAR_COLUMN), quote("dry")];
        selected.extend(COVARIATES.iter().map(|c| quote(c.column_name())));
        selected.push(quote(&geometry_column));

        let query = format!("SELECT {} FROM {}", selected.join(", "), quote(&table));
        tracing::info!("Reading layer '{}' from {}", table, self.name);

        let mut stmt = conn.prepare(&query)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        let mut skipped = 0usize;
        let mut row_idx = 0usize;

        while let Some(row) = rows.next()? {
            let index = row_idx;
            row_idx += 1;

            let (Some(codgeo), Some(year)) = (value_to_code(row.get_ref(0)?), value_to_year(row.get_ref(1)?)) else {
                tracing::debug!("Skipping row {} without code or year", index);
                skipped += 1;
                continue;
            };

            let dry = value_to_f64(row.get_ref(2)?);
            let mut covariates = [None; 6];
            for (i, slot) in covariates.iter_mut().enumerate() {
                *slot = value_to_f64(row.get_ref(3 + i)?);
            }

            let geometry = match row.get_ref(3 + COVARIATES.len())? {
                ValueRef::Blob(blob) => decode_gpkg_geometry(blob)
                    .map_err(|source| DataError::Geometry { row: index, source })?,
                _ => None,
            };

            records.push(DroughtRecord {
                codgeo,
                year,
                dry,
                covariates,
                geometry,
            });
        }

        if skipped > 0 {
            tracing::warn!("{}: skipped {} rows without code or year", self.name, skipped);
        }

        let dataset = DroughtDataset::from_records(records)?;
        report_quality(&dataset, &self.name);
        tracing::info!("Loaded {} rows from {}", dataset.num_rows(), self.name);

        Ok(dataset)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Commune codes may have been stored as integers
fn value_to_code(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Text(text) => {
            let text = String::from_utf8_lossy(text).trim().to_string();
            (!text.is_empty()).then_some(text)
        }
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) if f.fract() == 0.0 => Some(format!("{}", f as i64)),
        _ => None,
    }
}

fn value_to_year(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) if f.fract() == 0.0 => Some(f as i64),
        ValueRef::Text(text) => std::str::from_utf8(text).ok()?.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_f64(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(text) => {
            let text = std::str::from_utf8(text).ok()?.trim();
            match text.to_ascii_lowercase().as_str() {
                "true" => Some(1.0),
                "false" => Some(0.0),
                _ => text.parse().ok(),
            }
        }
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}
