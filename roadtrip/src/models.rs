use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, RoadTripError};

/// Layouts Road Trip has used for the `Date` column, most specific first.
const DATETIME_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// The raw date text of a fuel record.
///
/// Road Trip writes dates without zero padding (`2024-3-5 12:30`), so the value is kept
/// verbatim and only interpreted when a caller asks for a calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoadTripDate(pub String);

impl RoadTripDate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the date, failing on empty or unrecognized text.
    pub fn parse(&self) -> Result<NaiveDate> {
        let raw = self.0.trim();
        if raw.is_empty() {
            return Err(RoadTripError::InvalidDate(self.0.clone()));
        }

        for layout in DATETIME_LAYOUTS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, layout) {
                return Ok(datetime.date());
            }
        }
        for layout in DATE_LAYOUTS {
            if let Ok(date) = NaiveDate::parse_from_str(raw, layout) {
                return Ok(date);
            }
        }

        Err(RoadTripError::InvalidDate(self.0.clone()))
    }
}

/// One row of the `FUEL RECORDS` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelRecord {
    #[serde(rename = "Odometer", deserialize_with = "lenient_f64", default)]
    pub odometer: f64,
    #[serde(rename = "Date", alias = "Fill Date", default)]
    pub date: RoadTripDate,
    #[serde(rename = "Fill Amount", deserialize_with = "lenient_f64", default)]
    pub fill_amount: f64,
    #[serde(rename = "Price per Unit", deserialize_with = "lenient_f64", default)]
    pub price_per_unit: f64,
    #[serde(rename = "Total Price", deserialize_with = "lenient_f64", default)]
    pub total_price: f64,
    #[serde(rename = "Partial Fill", default)]
    pub partial_fill: String,
    #[serde(
        rename = "MPG",
        alias = "L/100km",
        alias = "km/L",
        deserialize_with = "lenient_f64",
        default
    )]
    pub mpg: f64,
    #[serde(rename = "Note", default)]
    pub note: String,
    #[serde(rename = "Location", default)]
    pub location: String,
}

impl FuelRecord {
    /// Road Trip marks a partial fill with any non-empty text in `Partial Fill`.
    pub fn is_partial_fill(&self) -> bool {
        !self.partial_fill.is_empty()
    }
}

/// A vehicle as described by one Road Trip export file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadTripVehicle {
    pub name: Option<String>,
    pub fuel_records: Vec<FuelRecord>,
}

/// Road Trip leaves numeric cells empty when a value was never entered.
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| serde::de::Error::custom(format!("Cannot parse '{}' as f64", raw)))
}
