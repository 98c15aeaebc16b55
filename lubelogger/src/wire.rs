//! String encodings LubeLogger expects for gas record fields.
//!
//! Every numeric and boolean field travels as text, and the API is picky about precision
//! and casing, so each field gets its own formatter instead of a generic `to_string`.

use chrono::NaiveDate;

use crate::error::{LubeLoggerError, Result};

/// `M/D/YYYY`, no zero padding.
pub const DATE_FORMAT: &str = "%-m/%-d/%Y";

pub const TRUE: &str = "True";
pub const FALSE: &str = "False";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y").map_err(|_| LubeLoggerError::InvalidField {
        field: "date",
        value: raw.to_string(),
    })
}

pub fn format_odometer(miles: u64) -> String {
    miles.to_string()
}

pub fn parse_odometer(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| LubeLoggerError::InvalidField {
            field: "odometer",
            value: raw.to_string(),
        })
}

pub fn format_fuel_consumed(amount: f64) -> String {
    format!("{amount:.3}")
}

pub fn format_cost(cost: f64) -> String {
    format!("{cost:.2}")
}

/// Six fractional digits, the same text a C-style `%f` produces.
pub fn format_fuel_economy(economy: f64) -> String {
    format!("{economy:.6}")
}

pub fn format_flag(value: bool) -> &'static str {
    if value {
        TRUE
    } else {
        FALSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_are_unpadded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date(date), "3/5/2024");
        let date = NaiveDate::from_ymd_opt(2023, 11, 28).unwrap();
        assert_eq!(format_date(date), "11/28/2023");
    }

    #[test]
    fn parses_padded_and_unpadded_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date("3/5/2024").unwrap(), date);
        assert_eq!(parse_date("03/05/2024").unwrap(), date);
        assert!(parse_date("2024-03-05").is_err());
    }

    #[test]
    fn decimals_use_field_specific_precision() {
        assert_eq!(format_fuel_consumed(12.345), "12.345");
        assert_eq!(format_fuel_consumed(10.0), "10.000");
        assert_eq!(format_cost(38.5), "38.50");
        assert_eq!(format_fuel_economy(25.5), "25.500000");
        assert_eq!(format_odometer(45231), "45231");
    }

    #[test]
    fn flags_are_capitalized() {
        assert_eq!(format_flag(true), "True");
        assert_eq!(format_flag(false), "False");
    }

    #[test]
    fn odometer_accepts_decimal_text() {
        assert_eq!(parse_odometer("45231").unwrap(), 45231.0);
        assert_eq!(parse_odometer(" 1200.7 ").unwrap(), 1200.7);
        assert!(parse_odometer("").is_err());
    }
}
