use std::path::Path;

use serde_json::Value as JsonValue;

use crate::error::{DashboardError, Result};
use crate::payload::WeatherLookup;

/// Load the optional postcode → weather mapping.
///
/// A missing file yields an empty mapping. Keys are upper-cased and entries
/// whose value is not a JSON object are dropped. A file that is present but
/// not a JSON object is fatal.
pub fn load_weather_lookup(path: &Path) -> Result<WeatherLookup> {
    if !path.exists() {
        log::debug!("No weather lookup at {}; using an empty mapping", path.display());
        return Ok(WeatherLookup::new());
    }

    let text = std::fs::read_to_string(path).map_err(|source| DashboardError::LookupRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_weather_lookup(&text, path)
}

pub fn parse_weather_lookup(text: &str, path: &Path) -> Result<WeatherLookup> {
    let root: JsonValue =
        serde_json::from_str(text).map_err(|source| DashboardError::MalformedLookup {
            path: path.to_path_buf(),
            source,
        })?;

    let JsonValue::Object(entries) = root else {
        return Err(DashboardError::LookupNotObject {
            path: path.to_path_buf(),
        });
    };

    let total = entries.len();
    let lookup: WeatherLookup = entries
        .into_iter()
        .filter(|(_, value)| value.is_object())
        .map(|(key, value)| (key.to_uppercase(), value))
        .collect();

    if lookup.len() < total {
        log::debug!(
            "Weather lookup: kept {} of {} entries from {}",
            lookup.len(),
            total,
            path.display()
        );
    }
    Ok(lookup)
}
