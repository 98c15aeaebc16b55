//! Reader for Road Trip CSV exports.
//!
//! An export is a concatenation of CSV tables. Each table starts with a title line such as
//! `FUEL RECORDS` followed by its own header row. Only the fuel and vehicle tables are read;
//! the others (maintenance, trips, tire log, ...) are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::debug;

use crate::error::{Result, RoadTripError};
use crate::models::{FuelRecord, RoadTripVehicle};

pub const FUEL_SECTION: &str = "FUEL RECORDS";
pub const VEHICLE_SECTION: &str = "VEHICLE";

const UTF8_BOM: char = '\u{feff}';

/// Loads a Road Trip export from disk.
pub fn load_vehicle(path: impl AsRef<Path>) -> Result<RoadTripVehicle> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let vehicle = parse_export(&text)?;
    debug!(
        "Loaded Road Trip export {} with {} fuel records",
        path.display(),
        vehicle.fuel_records.len()
    );
    Ok(vehicle)
}

/// Parses the text of a Road Trip export.
///
/// A missing `FUEL RECORDS` table yields a vehicle without fuel records.
pub fn parse_export(text: &str) -> Result<RoadTripVehicle> {
    let sections = split_sections(text.trim_start_matches(UTF8_BOM));

    let fuel_records = match sections.get(FUEL_SECTION) {
        Some(body) => parse_fuel_records(body)?,
        None => Vec::new(),
    };

    let name = match sections.get(VEHICLE_SECTION) {
        Some(body) => parse_vehicle_name(body)?,
        None => None,
    };

    Ok(RoadTripVehicle { name, fuel_records })
}

fn parse_fuel_records(body: &str) -> Result<Vec<FuelRecord>> {
    let mut reader = section_reader(body)?;
    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<FuelRecord>().enumerate() {
        let record = result.map_err(|err| {
            RoadTripError::Malformed(format!("{FUEL_SECTION} row {}: {err}", row + 1))
        })?;
        records.push(record);
    }
    Ok(records)
}

fn parse_vehicle_name(body: &str) -> Result<Option<String>> {
    let mut reader = section_reader(body)?;
    let headers = reader.headers()?.clone();
    let Some(column) = headers.iter().position(|h| h == "Name") else {
        return Ok(None);
    };

    let mut row = StringRecord::new();
    if !reader.read_record(&mut row)? {
        return Ok(None);
    }
    Ok(row
        .get(column)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string))
}

/// Builds a reader over one table with unit suffixes removed from its headers.
fn section_reader(body: &str) -> Result<csv::Reader<&[u8]>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(body.as_bytes());
    let headers: StringRecord = reader.headers()?.iter().map(normalize_header).collect();
    reader.set_headers(headers);
    Ok(reader)
}

/// `Odometer (mi)` and `Odometer (km)` both become `Odometer`.
fn normalize_header(header: &str) -> String {
    let header = header.trim();
    match header.rfind(" (") {
        Some(idx) if header.ends_with(')') => header[..idx].to_string(),
        _ => header.to_string(),
    }
}

/// Splits an export into `title -> table text`.
///
/// A title is a bare upper-case line outside of any quoted field. Blank lines trailing a
/// table are dropped; blank lines inside quoted notes are preserved.
fn split_sections(text: &str) -> HashMap<String, String> {
    let mut sections: HashMap<String, String> = HashMap::new();
    let mut current: Option<String> = None;
    let mut body = String::new();
    let mut in_quotes = false;

    for line in text.lines() {
        if !in_quotes && is_section_title(line) {
            if let Some(title) = current.take() {
                sections.insert(title, finish_section(&body));
            }
            current = Some(line.trim().to_string());
            body.clear();
            continue;
        }

        if current.is_some() {
            body.push_str(line);
            body.push('\n');
        }

        if line.chars().filter(|&c| c == '"').count() % 2 == 1 {
            in_quotes = !in_quotes;
        }
    }

    if let Some(title) = current {
        sections.insert(title, finish_section(&body));
    }

    sections
}

fn finish_section(body: &str) -> String {
    let mut text = body.trim_end_matches(['\r', '\n']).to_string();
    text.push('\n');
    text
}

fn is_section_title(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3
        && line.chars().any(|c| c.is_ascii_uppercase())
        && line
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == ' ')
}
