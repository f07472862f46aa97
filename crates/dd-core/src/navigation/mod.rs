//! Page navigation and year selection

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three mutually exclusive pages of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Page {
    /// Choropleth of one column for one year
    #[default]
    Map,
    /// Correlation heatmap of the numeric columns
    Correlation,
    /// Model prediction for one commune
    Prediction,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Map, Page::Correlation, Page::Prediction];

    /// Label shown in the navigation sidebar
    pub fn label(&self) -> &'static str {
        match self {
            Page::Map => "Geospatial data visualisation",
            Page::Correlation => "Correlation Heatmap",
            Page::Prediction => "Comparative charts",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YearError {
    #[error("year {year} is outside {min}..={max}")]
    OutOfRange { year: i32, min: i32, max: i32 },

    #[error("invalid year range {min}..={max}")]
    InvalidRange { min: i32, max: i32 },
}

/// Inclusive range of selectable years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    pub const MIN_YEAR: i32 = 2019;
    pub const MAX_YEAR: i32 = 2022;

    pub fn new(min: i32, max: i32) -> Result<Self, YearError> {
        if min > max {
            return Err(YearError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// Validate a year picked by the user
    pub fn check(&self, year: i32) -> Result<i32, YearError> {
        if self.contains(year) {
            Ok(year)
        } else {
            Err(YearError::OutOfRange { year, min: self.min, max: self.max })
        }
    }

    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.min, self.max)
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            min: Self::MIN_YEAR,
            max: Self::MAX_YEAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range() {
        let range = YearRange::default();
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![2019, 2020, 2021, 2022]);
        assert!(range.check(2018).is_err());
        assert_eq!(range.check(2021), Ok(2021));
        assert_eq!(range.clamp(2030), 2022);
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert_eq!(
            YearRange::new(2022, 2019),
            Err(YearError::InvalidRange { min: 2022, max: 2019 })
        );
    }
}
