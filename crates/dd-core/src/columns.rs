//! Column vocabulary of the drought dataset

use serde::{Deserialize, Serialize};
use std::fmt;

/// Commune code column (INSEE code)
pub const CODE_COLUMN: &str = "codgeo";

/// Year column
pub const YEAR_COLUMN: &str = "year";

/// Numeric columns that can be mapped, correlated or fed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetColumn {
    Dry,
    Covariate(Covariate),
}

/// The six climate covariates, in model feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Covariate {
    /// Monthly liquid precipitation
    Precipitation,
    /// Monthly mean temperature
    Temperature,
    /// Monthly evaporation
    Evaporation,
    /// Monthly evapotranspiration
    Evapotranspiration,
    /// Monthly potential evaporation
    PotentialEvaporation,
    /// Soil wetness index
    SoilWetness,
}

/// Model feature schema, in order.
pub const COVARIATES: [Covariate; 6] = [
    Covariate::Precipitation,
    Covariate::Temperature,
    Covariate::Evaporation,
    Covariate::Evapotranspiration,
    Covariate::PotentialEvaporation,
    Covariate::SoilWetness,
];

/// Allow-list of the map view column selector.
pub const MAP_COLUMNS: [DatasetColumn; 7] = [
    DatasetColumn::Dry,
    DatasetColumn::Covariate(Covariate::Precipitation),
    DatasetColumn::Covariate(Covariate::Temperature),
    DatasetColumn::Covariate(Covariate::Evaporation),
    DatasetColumn::Covariate(Covariate::Evapotranspiration),
    DatasetColumn::Covariate(Covariate::PotentialEvaporation),
    DatasetColumn::Covariate(Covariate::SoilWetness),
];

/// Columns of the correlation heatmap.
pub const CORRELATION_COLUMNS: [DatasetColumn; 7] = MAP_COLUMNS;

impl Covariate {
    /// Column name in the dataset
    pub fn column_name(&self) -> &'static str {
        match self {
            Covariate::Precipitation => "PRELIQ_MENS",
            Covariate::Temperature => "T_MENS",
            Covariate::Evaporation => "EVAP_MENS",
            Covariate::Evapotranspiration => "ETP_MENS",
            Covariate::PotentialEvaporation => "PE_MENS",
            Covariate::SoilWetness => "SWI_MENS",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        COVARIATES.iter().copied().find(|c| c.column_name() == name)
    }

    /// Position in the model feature vector
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl DatasetColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            DatasetColumn::Dry => "dry",
            DatasetColumn::Covariate(c) => c.column_name(),
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        if name == "dry" {
            Some(DatasetColumn::Dry)
        } else {
            Covariate::from_column_name(name).map(DatasetColumn::Covariate)
        }
    }
}

impl fmt::Display for Covariate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl fmt::Display for DatasetColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}
