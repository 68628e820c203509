//! Shared parsing utilities for remote JSON responses.
//!
//! List endpoints answer either with a bare array or with an object that
//! wraps the array under a named key (`{"safeZones": [...]}`). Individual
//! records are decoded leniently: a record that fails to deserialize is
//! logged and skipped rather than failing the whole response.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::SourceError;

/// Extracts the record array from a bare-array or wrapped response.
///
/// # Errors
///
/// Returns [`SourceError::Unexpected`] if the body is neither an array nor
/// an object holding an array under `key`.
pub fn unwrap_records(body: Value, key: &str) -> Result<Vec<Value>, SourceError> {
    match body {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(records)) => Ok(records),
            Some(other) => Err(SourceError::Unexpected {
                message: format!("'{key}' is not an array (got {})", json_kind(&other)),
            }),
            None => Err(SourceError::Unexpected {
                message: format!("response object has no '{key}' field"),
            }),
        },
        other => Err(SourceError::Unexpected {
            message: format!("expected array or object, got {}", json_kind(&other)),
        }),
    }
}

/// Deserializes each record, dropping the ones that fail with a warning.
#[must_use]
pub fn parse_records<T: DeserializeOwned>(records: Vec<Value>, label: &str) -> Vec<T> {
    let total = records.len();
    let parsed: Vec<T> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("[{label}] Skipping malformed record #{index}: {e}");
                None
            }
        })
        .collect();

    if parsed.len() < total {
        log::warn!(
            "[{label}] Parsed {} of {total} records",
            parsed.len()
        );
    }

    parsed
}

/// Unwraps and leniently parses a list response in one step.
///
/// # Errors
///
/// Returns [`SourceError::Unexpected`] if the record array is missing.
pub fn parse_list<T: DeserializeOwned>(body: Value, key: &str) -> Result<Vec<T>, SourceError> {
    Ok(parse_records(unwrap_records(body, key)?, key))
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use safe_zone_models::{ClimateAlert, Zone};
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_bare_arrays() {
        let records = unwrap_records(json!([{"id": 1}, {"id": 2}]), "safeZones").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn unwraps_named_envelope() {
        let body = json!({"safeZones": [{"id": 1}], "total": 1});
        let records = unwrap_records(body, "safeZones").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn rejects_missing_or_mistyped_envelope() {
        assert!(matches!(
            unwrap_records(json!({"zones": []}), "safeZones"),
            Err(SourceError::Unexpected { .. })
        ));
        assert!(matches!(
            unwrap_records(json!({"safeZones": "none"}), "safeZones"),
            Err(SourceError::Unexpected { .. })
        ));
        assert!(matches!(
            unwrap_records(json!("oops"), "safeZones"),
            Err(SourceError::Unexpected { .. })
        ));
    }

    #[test]
    fn skips_malformed_records() {
        let body = json!({"safeZones": [
            {"id": 1, "name": "Hall"},
            {"name": "No id"},
            {"id": "b", "recyclingCenters": "many"},
            {"id": "c", "name": "Depot"}
        ]});
        let zones: Vec<Zone> = parse_list(body, "safeZones").unwrap();
        let names: Vec<&str> = zones.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, vec!["Hall", "Depot"]);
    }

    #[test]
    fn parses_alerts_with_type_field() {
        let body = json!({"alerts": [
            {"id": 7, "type": "Flood Warning", "severity": "High", "text": "Heavy rain"}
        ]});
        let alerts: Vec<ClimateAlert> = parse_list(body, "alerts").unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "Flood Warning");
    }
}
