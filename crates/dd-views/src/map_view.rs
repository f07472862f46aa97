//! Geospatial page: choropleth of one column for one year

use std::fmt::Display;

use arrow::array::Array;
use egui::{ComboBox, Slider, Ui};

use dd_core::events::events::{MapGenerated, ViewFailed};
use dd_core::{AppState, DatasetColumn, Page, MAP_COLUMNS};
use dd_data::DroughtDataset;
use dd_ui::{error_banner, primary_button};

use crate::plots::{ChoroplethChart, RegionValue};
use crate::{DashboardView, ViewError, ViewerContext};

pub fn map_title(column: impl Display, year: i32) -> String {
    format!("Thematic map: {} for {}", column, year)
}

/// Choropleth of `column` over the rows of `year`
pub fn build_map_chart(
    dataset: &DroughtDataset,
    column: DatasetColumn,
    year: i32,
) -> Result<ChoroplethChart, ViewError> {
    let rows = dataset.filter_year(year)?;
    if rows.is_empty() {
        return Err(ViewError::EmptySelection { year });
    }

    let codes = rows.codes();
    let values = rows.column(column);
    let mut skipped = 0usize;

    let regions: Vec<RegionValue<'_>> = rows
        .geometries()
        .iter()
        .enumerate()
        .filter_map(|(row, geometry)| match geometry {
            Some(geometry) if values.is_valid(row) => {
                let value = values.value(row);
                Some(RegionValue {
                    code: codes.value(row),
                    value,
                    label: format!("{}: {:.2}", column, value),
                    geometry,
                })
            }
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        tracing::debug!("Skipped {} rows without geometry or {} value", skipped, column);
    }
    if regions.is_empty() {
        return Err(ViewError::NoDrawableRegions);
    }

    ChoroplethChart::build(map_title(column, year), regions)
}

/// Map page
#[derive(Default)]
pub struct MapView {
    /// Result of the last "Generate map" press
    outcome: Option<Result<ChoroplethChart, ViewError>>,
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate(&mut self, ctx: &ViewerContext, column: DatasetColumn, year: i32) {
        tracing::info!("Generating map of {} for {}", column, year);
        let outcome = build_map_chart(&ctx.dataset, column, year);

        match &outcome {
            Ok(chart) => ctx.event_bus.publish(MapGenerated {
                column: column.to_string(),
                year,
                region_count: chart.regions().len(),
            }),
            Err(e) => {
                tracing::error!("Map generation failed: {}", e);
                ctx.event_bus.publish(ViewFailed {
                    page: Page::Map,
                    message: e.to_string(),
                });
            }
        }
        self.outcome = Some(outcome);
    }
}

impl DashboardView for MapView {
    fn page(&self) -> Page {
        Page::Map
    }

    fn title(&self) -> &str {
        Page::Map.label()
    }

    fn ui(&mut self, ctx: &ViewerContext, state: &mut AppState, ui: &mut Ui) {
        let mut generate = false;
        ui.horizontal(|ui| {
            ui.heading(self.title());
            ui.add_space(24.0);
            generate = primary_button(ui, "Generate map").clicked();
        });

        let years = state.settings.years;
        let controls = &mut state.map;
        ComboBox::from_label("Select a column to display:")
            .selected_text(controls.column.column_name())
            .show_ui(ui, |ui| {
                for column in MAP_COLUMNS {
                    ui.selectable_value(&mut controls.column, column, column.column_name());
                }
            });
        ui.add(Slider::new(&mut controls.year, years.min()..=years.max()).text("Select a year:"));

        if generate {
            let (column, year) = (controls.column, controls.year);
            self.generate(ctx, column, year);
        }

        ui.add_space(8.0);
        match &self.outcome {
            Some(Ok(chart)) => chart.show(ui, ui.available_size()),
            Some(Err(e)) => error_banner(ui, &format!("An error occurred: {}", e)),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{record, sample_dataset};
    use dd_core::Covariate;
    use dd_data::DroughtDataset;

    #[test]
    fn test_every_column_and_year_with_rows() {
        let dataset = sample_dataset();
        for column in MAP_COLUMNS {
            for year in 2019..=2020 {
                let chart = build_map_chart(&dataset, column, year).unwrap();
                assert!(!chart.regions().is_empty());
                assert_eq!(chart.title(), map_title(column, year));
            }
        }
    }

    #[test]
    fn test_title_format() {
        assert_eq!(
            map_title(DatasetColumn::Covariate(Covariate::Temperature), 2021),
            "Thematic map: T_MENS for 2021"
        );
    }

    #[test]
    fn test_year_without_rows_is_an_error() {
        let dataset = sample_dataset();
        for year in 2021..=2022 {
            assert!(matches!(
                build_map_chart(&dataset, DatasetColumn::Dry, year),
                Err(ViewError::EmptySelection { .. })
            ));
        }
    }

    #[test]
    fn test_rows_without_value_or_geometry_are_skipped() {
        let mut no_value = record("01001", 2019, 0.0);
        no_value.dry = None;
        let mut no_geometry = record("01002", 2019, 1.0);
        no_geometry.geometry = None;
        let dataset = DroughtDataset::from_records(vec![no_value.clone(), no_geometry.clone()]).unwrap();
        assert!(matches!(
            build_map_chart(&dataset, DatasetColumn::Dry, 2019),
            Err(ViewError::NoDrawableRegions)
        ));

        let dataset = DroughtDataset::from_records(vec![no_value, no_geometry, record("01003", 2019, 1.0)]).unwrap();
        let chart = build_map_chart(&dataset, DatasetColumn::Dry, 2019).unwrap();
        assert_eq!(chart.regions().len(), 1);
        assert_eq!(chart.regions()[0].code, "01003");
    }
}
