//! `GeoJSON` file reading.

use std::path::Path;

use serde_json::Value;

use crate::LayerError;

/// Reads and parses a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`LayerError::Io`] if the file cannot be read, or
/// [`LayerError::Json`] if it is not valid JSON.
pub fn try_read_geojson(path: &Path) -> Result<Value, LayerError> {
    let contents = std::fs::read_to_string(path).map_err(|e| LayerError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&contents).map_err(|e| LayerError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

/// Reads a `GeoJSON` file, returning an empty object if it is missing or
/// unreadable.
#[must_use]
pub fn read_geojson(path: &Path) -> Value {
    match try_read_geojson(path) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Skipping unreadable GeoJSON: {e}");
            Value::Object(serde_json::Map::new())
        }
    }
}

/// Whether a parsed file is the empty object [`read_geojson`] returns on
/// failure (or genuinely empty).
#[must_use]
pub fn is_empty_geojson(value: &Value) -> bool {
    value.as_object().is_none_or(serde_json::Map::is_empty)
}
