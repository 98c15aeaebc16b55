use lubelogger::{wire, ExtraField, GasRecord};
use roadtrip::FuelRecord;

use crate::comparator::truncate_odometer;
use crate::error::Result;

pub const LOCATION_FIELD: &str = "Location";

const NOTE_TRIM: &[char] = &[' ', '\t', '\r', '\n'];

/// Converts a Road Trip fuel record into the gas record LubeLogger expects.
///
/// Nothing is returned if the date or odometer cannot be interpreted.
pub fn to_gas_record(fuel: &FuelRecord) -> Result<GasRecord> {
    let date = fuel.date.parse()?;
    let odometer = truncate_odometer(fuel.odometer)?;

    Ok(GasRecord {
        id: String::new(),
        date: wire::format_date(date),
        odometer: wire::format_odometer(odometer),
        fuel_consumed: wire::format_fuel_consumed(fuel.fill_amount),
        cost: wire::format_cost(fuel.total_price),
        fuel_economy: wire::format_fuel_economy(fuel.mpg),
        is_fill_to_full: wire::format_flag(!fuel.is_partial_fill()).to_string(),
        missed_fuel_up: wire::format_flag(false).to_string(),
        notes: gas_record_notes(fuel),
        tags: String::new(),
        extra_fields: vec![ExtraField::new(LOCATION_FIELD, fuel.location.clone())],
    })
}

/// The Road Trip note followed by a purchase summary line.
pub fn gas_record_notes(fuel: &FuelRecord) -> String {
    let notes = format!(
        "{}\n{:.2} gallons @ ${:.2} from {}",
        fuel.note, fuel.fill_amount, fuel.price_per_unit, fuel.location
    );
    notes.trim_matches(NOTE_TRIM).to_string()
}
