//! Identity keys used to decide whether two fillups are the same.

use std::fmt;

use chrono::NaiveDate;
use lubelogger::{wire, GasRecord};
use roadtrip::FuelRecord;

use crate::error::{Result, SyncError};

/// Width the odometer is zero-padded to.
pub const KEY_WIDTH: usize = 7;

/// Anything that describes a fillup: a Road Trip row or a LubeLogger gas record.
///
/// Both sides go through the same key functions below, so the derivation cannot drift
/// between them.
pub trait Fillup {
    fn odometer_reading(&self) -> Result<f64>;

    fn fill_date(&self) -> Result<NaiveDate>;
}

impl Fillup for FuelRecord {
    fn odometer_reading(&self) -> Result<f64> {
        Ok(self.odometer)
    }

    fn fill_date(&self) -> Result<NaiveDate> {
        Ok(self.date.parse()?)
    }
}

impl Fillup for GasRecord {
    fn odometer_reading(&self) -> Result<f64> {
        Ok(wire::parse_odometer(&self.odometer)?)
    }

    fn fill_date(&self) -> Result<NaiveDate> {
        Ok(wire::parse_date(&self.date)?)
    }
}

/// Canonical identity of a fillup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComparatorKey(String);

impl ComparatorKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComparatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whole distance units of an odometer reading.
///
/// Negative, non-finite and out-of-range readings are rejected rather than truncated.
pub fn truncate_odometer(odometer: f64) -> Result<u64> {
    // u64::MAX as f64 rounds up to 2^64, the first value that no longer fits.
    if !odometer.is_finite() || odometer < 0.0 || odometer >= u64::MAX as f64 {
        return Err(SyncError::InvalidOdometer(odometer));
    }
    Ok(odometer.trunc() as u64)
}

/// `99.9` becomes `0000099`.
pub fn odometer_key<F: Fillup + ?Sized>(fillup: &F) -> Result<ComparatorKey> {
    let miles = truncate_odometer(fillup.odometer_reading()?)?;
    Ok(ComparatorKey(format!("{miles:0width$}", width = KEY_WIDTH)))
}

/// How fillups are matched across the two systems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Same truncated odometer reading. Road Trip and LubeLogger both record the odometer
    /// reliably, unlike dates and amounts which get edited.
    #[default]
    Odometer,
    /// Same truncated odometer reading and same calendar day.
    OdometerAndDate,
}

impl MatchStrategy {
    pub fn key<F: Fillup + ?Sized>(&self, fillup: &F) -> Result<ComparatorKey> {
        let odometer = odometer_key(fillup)?;
        match self {
            MatchStrategy::Odometer => Ok(odometer),
            MatchStrategy::OdometerAndDate => {
                let date = fillup.fill_date()?;
                Ok(ComparatorKey(format!(
                    "{}@{}",
                    odometer,
                    date.format("%Y-%m-%d")
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadtrip::RoadTripDate;

    fn fuel(odometer: f64) -> FuelRecord {
        FuelRecord {
            odometer,
            date: RoadTripDate::new("2024-3-5"),
            ..FuelRecord::default()
        }
    }

    fn gas(odometer: &str, date: &str) -> GasRecord {
        GasRecord {
            odometer: odometer.into(),
            date: date.into(),
            ..GasRecord::default()
        }
    }

    #[test]
    fn key_is_zero_padded_truncation() {
        assert_eq!(odometer_key(&fuel(99.0)).unwrap().as_str(), "0000099");
        assert_eq!(odometer_key(&fuel(0.0)).unwrap().as_str(), "0000000");
        assert_eq!(odometer_key(&fuel(45231.97)).unwrap().as_str(), "0045231");
        assert_eq!(odometer_key(&fuel(1234567.0)).unwrap().as_str(), "1234567");
    }

    #[test]
    fn key_holds_for_a_range_of_readings() {
        for miles in [0u64, 1, 9, 10, 999, 65_535, 999_999, 9_999_999] {
            let key = odometer_key(&fuel(miles as f64 + 0.5)).unwrap();
            assert_eq!(key.as_str().len(), KEY_WIDTH);
            assert_eq!(key.as_str().parse::<u64>().unwrap(), miles);
        }
    }

    #[test]
    fn rejects_negative_and_non_finite_readings() {
        for bad in [
            -1.0,
            -0.5,
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
            1e30,
            2f64.powi(64),
        ] {
            assert!(matches!(
                odometer_key(&fuel(bad)),
                Err(SyncError::InvalidOdometer(_))
            ));
        }
    }

    #[test]
    fn largest_representable_reading_keeps_its_value() {
        let below_limit = 2f64.powi(63);
        assert_eq!(truncate_odometer(below_limit).unwrap(), 1u64 << 63);
    }

    #[test]
    fn both_sides_derive_the_same_key() {
        assert_eq!(
            odometer_key(&fuel(45231.4)).unwrap(),
            odometer_key(&gas("45231", "3/5/2024")).unwrap()
        );
        assert_eq!(
            odometer_key(&gas("45231.9", "3/5/2024")).unwrap().as_str(),
            "0045231"
        );
    }

    #[test]
    fn malformed_destination_odometer_is_an_error() {
        assert!(matches!(
            odometer_key(&gas("n/a", "3/5/2024")),
            Err(SyncError::Destination(_))
        ));
    }

    #[test]
    fn stricter_strategy_includes_the_date() {
        let strategy = MatchStrategy::OdometerAndDate;
        let source = strategy.key(&fuel(45231.0)).unwrap();
        assert_eq!(source.as_str(), "0045231@2024-03-05");
        assert_eq!(source, strategy.key(&gas("45231", "3/5/2024")).unwrap());
        assert_ne!(source, strategy.key(&gas("45231", "3/6/2024")).unwrap());

        let loose = MatchStrategy::Odometer;
        assert_eq!(
            loose.key(&fuel(45231.0)).unwrap(),
            loose.key(&gas("45231", "3/6/2024")).unwrap()
        );
    }
}
