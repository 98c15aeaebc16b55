use serde::{Deserialize, Deserializer, Serialize};

/// Extra field names that may carry the Road Trip export filename of a vehicle.
pub const CSV_FILENAME_FIELDS: &[&str] = &["CSVFilename", "filename"];

/// Name/value pair LubeLogger attaches to vehicles and records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraField {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
}

impl ExtraField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Vehicle data structure
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub year: i64,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub extra_fields: Vec<ExtraField>,
}

impl Vehicle {
    /// Filename of the Road Trip export associated with this vehicle, if any.
    pub fn csv_filename(&self) -> Option<&str> {
        self.extra_fields
            .iter()
            .find(|field| CSV_FILENAME_FIELDS.contains(&field.name.as_str()))
            .map(|field| field.value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Gas record as exchanged with the LubeLogger API.
///
/// All values are strings on the wire; see [`crate::wire`] for the encodings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub odometer: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuel_consumed: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cost: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuel_economy: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub is_fill_to_full: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub missed_fuel_up: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tags: String,
    #[serde(default)]
    pub extra_fields: Vec<ExtraField>,
}

impl GasRecord {
    /// Form body for `vehicle/gasrecords/add`. The identifier is assigned by the server.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("date".to_string(), self.date.clone()),
            ("odometer".to_string(), self.odometer.clone()),
            ("fuelConsumed".to_string(), self.fuel_consumed.clone()),
            ("cost".to_string(), self.cost.clone()),
            ("fuelEconomy".to_string(), self.fuel_economy.clone()),
            ("isFillToFull".to_string(), self.is_fill_to_full.clone()),
            ("missedFuelUp".to_string(), self.missed_fuel_up.clone()),
            ("notes".to_string(), self.notes.clone()),
        ];
        if !self.tags.is_empty() {
            fields.push(("tags".to_string(), self.tags.clone()));
        }
        for (idx, extra) in self.extra_fields.iter().enumerate() {
            fields.push((format!("extraFields[{idx}][name]"), extra.name.clone()));
            fields.push((format!("extraFields[{idx}][value]"), extra.value.clone()));
        }
        fields
    }
}

/// Body of a LubeLogger write endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    #[serde(alias = "Success")]
    pub success: bool,
    #[serde(default, alias = "Message")]
    pub message: String,
}

/// Accepts strings, numbers and booleans; booleans become `True`/`False`.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;

    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(crate::wire::format_flag(b).to_string()),
        serde_json::Value::Null => Ok(String::new()),
        _ => Err(serde::de::Error::custom(
            "Expected string, number or boolean",
        )),
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;

    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("Cannot read '{}' as i64", n))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("Cannot parse '{}' as i64", s))),
        serde_json::Value::Null => Ok(0),
        _ => Err(serde::de::Error::custom("Expected number or string")),
    }
}
