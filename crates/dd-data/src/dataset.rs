//! In-memory drought dataset
//!
//! Attribute columns are held in an Arrow [`RecordBatch`]; geometries sit in a
//! parallel vector with the same row order. Filters build one boolean mask and
//! apply it to both.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use ahash::AHashMap;
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, Float64Builder, Int64Array,
    Int64Builder, StringArray, StringBuilder,
};
use arrow::compute::filter_record_batch;
use arrow::compute::kernels::cmp;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use dd_core::columns::{CODE_COLUMN, YEAR_COLUMN};
use dd_core::{DatasetColumn, COVARIATES, MAP_COLUMNS};
use geo_types::Geometry;
use ndarray::Array2;

use crate::DataError;

const CODE_IDX: usize = 0;
const YEAR_IDX: usize = 1;
const DRY_IDX: usize = 2;
const FIRST_COVARIATE_IDX: usize = 3;

/// One row of the drought dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DroughtRecord {
    /// INSEE commune code
    pub codgeo: String,
    pub year: i64,
    /// Drought label (0/1)
    pub dry: Option<f64>,
    /// Covariates in model feature order
    pub covariates: [Option<f64>; 6],
    pub geometry: Option<Geometry<f64>>,
}

/// Arrow schema shared by every dataset
pub fn dataset_schema() -> SchemaRef {
    static SCHEMA: OnceLock<SchemaRef> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            let mut fields = vec![
                Field::new(CODE_COLUMN, DataType::Utf8, false),
                Field::new(YEAR_COLUMN, DataType::Int64, false),
            ];
            fields.extend(
                MAP_COLUMNS
                    .iter()
                    .map(|column| Field::new(column.column_name(), DataType::Float64, true)),
            );
            Arc::new(Schema::new(fields))
        })
        .clone()
}

/// Column index of a numeric column in [`dataset_schema`]
fn column_index(column: DatasetColumn) -> usize {
    match column {
        DatasetColumn::Dry => DRY_IDX,
        DatasetColumn::Covariate(c) => FIRST_COVARIATE_IDX + c.index(),
    }
}

/// Read-only drought dataset; filters return new datasets
#[derive(Debug, Clone)]
pub struct DroughtDataset {
    batch: RecordBatch,
    geometries: Vec<Option<Geometry<f64>>>,
}

impl DroughtDataset {
    /// Build a dataset from individual records
    pub fn from_records(records: Vec<DroughtRecord>) -> Result<Self, DataError> {
        let mut codes = StringBuilder::new();
        let mut years = Int64Builder::with_capacity(records.len());
        let mut numeric: Vec<Float64Builder> = (0..MAP_COLUMNS.len())
            .map(|_| Float64Builder::with_capacity(records.len()))
            .collect();
        let mut geometries = Vec::with_capacity(records.len());

        for record in records {
            codes.append_value(&record.codgeo);
            years.append_value(record.year);
            numeric[0].append_option(record.dry);
            for (builder, value) in numeric[1..].iter_mut().zip(record.covariates) {
                builder.append_option(value);
            }
            geometries.push(record.geometry);
        }

        let mut columns: Vec<ArrayRef> = vec![Arc::new(codes.finish()), Arc::new(years.finish())];
        columns.extend(numeric.iter_mut().map(|b| Arc::new(b.finish()) as ArrayRef));

        let batch = RecordBatch::try_new(dataset_schema(), columns)?;
        Ok(Self { batch, geometries })
    }

    pub fn empty() -> Self {
        Self {
            batch: RecordBatch::new_empty(dataset_schema()),
            geometries: Vec::new(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn geometries(&self) -> &[Option<Geometry<f64>>] {
        &self.geometries
    }

    pub fn codes(&self) -> &StringArray {
        self.batch.column(CODE_IDX).as_string::<i32>()
    }

    pub fn years(&self) -> &Int64Array {
        self.batch.column(YEAR_IDX).as_primitive::<Int64Type>()
    }

    /// Numeric column as an Arrow array
    pub fn column(&self, column: DatasetColumn) -> &Float64Array {
        self.batch.column(column_index(column)).as_primitive::<Float64Type>()
    }

    /// Numeric column values, nulls as `None`
    pub fn values(&self, column: DatasetColumn) -> Vec<Option<f64>> {
        self.column(column).iter().collect()
    }

    /// Rows of the given year
    pub fn filter_year(&self, year: i32) -> Result<Self, DataError> {
        let mask = cmp::eq(self.years(), &Int64Array::new_scalar(year as i64))?;
        self.filter(&mask)
    }

    /// Rows of the given commune code (exact match)
    pub fn filter_code(&self, code: &str) -> Result<Self, DataError> {
        let mask = cmp::eq(self.codes(), &StringArray::new_scalar(code))?;
        self.filter(&mask)
    }

    /// Keep the rows where `mask` is true; nulls count as false
    pub fn filter(&self, mask: &BooleanArray) -> Result<Self, DataError> {
        let batch = filter_record_batch(&self.batch, mask)?;
        let geometries = self
            .geometries
            .iter()
            .enumerate()
            .filter(|(i, _)| mask.is_valid(*i) && mask.value(*i))
            .map(|(_, geometry)| geometry.clone())
            .collect();

        Ok(Self { batch, geometries })
    }

    /// Distinct years present, ascending
    pub fn distinct_years(&self) -> Vec<i64> {
        self.years()
            .values()
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// (code, year) keys that appear more than once
    pub fn duplicate_keys(&self) -> Vec<(String, i64)> {
        let mut counts: AHashMap<(&str, i64), usize> = AHashMap::new();
        for (code, year) in self.codes().iter().zip(self.years().values().iter()) {
            *counts.entry((code.unwrap_or_default(), *year)).or_default() += 1;
        }

        let mut duplicates: Vec<_> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|((code, year), _)| (code.to_string(), year))
            .collect();
        duplicates.sort();
        duplicates
    }

    /// Model input matrix: one row per dataset row, one column per covariate
    pub fn feature_matrix(&self) -> Result<Array2<f64>, DataError> {
        let mut matrix = Array2::zeros((self.num_rows(), COVARIATES.len()));

        for covariate in COVARIATES {
            let array = self.column(DatasetColumn::Covariate(covariate));
            for row in 0..array.len() {
                if array.is_null(row) {
                    return Err(DataError::MissingValue {
                        column: covariate.column_name().to_string(),
                        row,
                    });
                }
                matrix[[row, covariate.index()]] = array.value(row);
            }
        }

        Ok(matrix)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dd_core::Covariate;
    use geo_types::{polygon, Geometry};

    pub(crate) fn square(x: f64, y: f64) -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
            (x: x, y: y),
        ])
    }

    pub(crate) fn record(code: &str, year: i64, dry: f64) -> DroughtRecord {
        DroughtRecord {
            codgeo: code.to_string(),
            year,
            dry: Some(dry),
            covariates: [Some(50.0), Some(12.0), Some(1.5), Some(2.0), Some(-10.0), Some(0.6)],
            geometry: Some(square(year as f64, 0.0)),
        }
    }

    fn sample() -> DroughtDataset {
        DroughtDataset::from_records(vec![
            record("75056", 2019, 0.0),
            record("75056", 2020, 1.0),
            record("13055", 2019, 1.0),
            record("13055", 2021, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_schema_columns() {
        let dataset = sample();
        let names: Vec<_> = dataset
            .batch()
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(
            names,
            vec!["codgeo", "year", "dry", "PRELIQ_MENS", "T_MENS", "EVAP_MENS", "ETP_MENS", "PE_MENS", "SWI_MENS"]
        );
    }

    #[test]
    fn test_filter_year_keeps_geometries_aligned() {
        let dataset = sample();
        let filtered = dataset.filter_year(2019).unwrap();

        assert_eq!(filtered.num_rows(), 2);
        assert_eq!(filtered.geometries().len(), 2);
        assert_eq!(filtered.codes().value(0), "75056");
        assert_eq!(filtered.codes().value(1), "13055");
        assert_eq!(filtered.geometries()[0], Some(square(2019.0, 0.0)));
    }

    #[test]
    fn test_filter_code_then_year() {
        let dataset = sample();
        let by_code = dataset.filter_code("13055").unwrap();
        assert_eq!(by_code.num_rows(), 2);
        assert!(by_code.filter_year(2020).unwrap().is_empty());
        assert!(dataset.filter_code("00000").unwrap().is_empty());
    }

    #[test]
    fn test_distinct_years_and_duplicates() {
        let mut records = vec![record("75056", 2019, 0.0), record("75056", 2019, 1.0)];
        records.push(record("13055", 2022, 0.0));
        let dataset = DroughtDataset::from_records(records).unwrap();

        assert_eq!(dataset.distinct_years(), vec![2019, 2022]);
        assert_eq!(dataset.duplicate_keys(), vec![("75056".to_string(), 2019)]);
        assert!(sample().duplicate_keys().is_empty());
    }

    #[test]
    fn test_feature_matrix_order_and_nulls() {
        let dataset = sample();
        let matrix = dataset.feature_matrix().unwrap();
        assert_eq!(matrix.shape(), &[4, 6]);
        assert_eq!(matrix[[0, Covariate::Temperature.index()]], 12.0);

        let mut incomplete = record("01001", 2019, 0.0);
        incomplete.covariates[Covariate::SoilWetness.index()] = None;
        let dataset = DroughtDataset::from_records(vec![incomplete]).unwrap();
        match dataset.feature_matrix() {
            Err(DataError::MissingValue { column, row }) => {
                assert_eq!(column, "SWI_MENS");
                assert_eq!(row, 0);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
