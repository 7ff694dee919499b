// Location payload validation
//
// Every field rule runs on every request; violations are collected rather than
// returned at the first failure, so a caller sees everything wrong with a
// payload in one response. A record is only produced when no rule failed.

use chrono::DateTime;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::types::LocationRecord;

/// Itemized validation failure, serialized as `{ formErrors, fieldErrors }`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Problems with the payload as a whole (not an object, malformed JSON)
    pub form_errors: Vec<String>,
    /// Problems keyed by field name, in stable order
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form_errors: vec![message.into()],
            field_errors: BTreeMap::new(),
        }
    }

    fn field(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Messages recorded against a field, if any
    pub fn field_messages(&self, field: &str) -> Option<&[String]> {
        self.field_errors.get(field).map(Vec::as_slice)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            parts.push(format!("{}: {}", field, messages.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Inclusive numeric range for a coordinate field
struct Bounds {
    field: &'static str,
    min: f64,
    max: f64,
}

const USER_ID: &str = "user_id";
const CREATED_AT: &str = "created_at";

const LATITUDE: Bounds = Bounds {
    field: "latitude",
    min: -90.0,
    max: 90.0,
};

const LONGITUDE: Bounds = Bounds {
    field: "longitude",
    min: -180.0,
    max: 180.0,
};

/// Parse a raw request body and validate it as a location record.
///
/// An empty body is reported the same way as a missing object; malformed
/// JSON becomes a form-level error rather than a server fault.
pub fn parse_location(body: &[u8]) -> Result<LocationRecord, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return validate_location(None);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::form(format!("Malformed JSON body: {}", e)))?;

    validate_location(Some(&value))
}

/// Whether a `Content-Type` value names a JSON body.
///
/// Only `application/json` (with any parameters) is parsed; any other type,
/// or none at all, leaves the body unread.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Validate an already-parsed JSON body.
pub fn validate_location(body: Option<&Value>) -> Result<LocationRecord, ValidationError> {
    let obj = match body {
        Some(Value::Object(obj)) => obj,
        other => {
            return Err(ValidationError::form(format!(
                "Expected object, received {}",
                received(other)
            )))
        }
    };

    let mut errors = ValidationError::default();

    let user_id = check_user_id(obj, &mut errors);
    let latitude = check_bounded(obj, &LATITUDE, &mut errors);
    let longitude = check_bounded(obj, &LONGITUDE, &mut errors);
    let created_at = check_created_at(obj, &mut errors);

    match (user_id, latitude, longitude, created_at) {
        (Some(user_id), Some(latitude), Some(longitude), Some(created_at)) if errors.is_empty() => {
            Ok(LocationRecord {
                user_id,
                latitude,
                longitude,
                created_at,
            })
        }
        _ => Err(errors),
    }
}

fn check_user_id(obj: &Map<String, Value>, errors: &mut ValidationError) -> Option<String> {
    match obj.get(USER_ID) {
        None => {
            errors.field(USER_ID, "Required");
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            errors.field(USER_ID, "user_id is required");
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            errors.field(USER_ID, format!("Expected string, received {}", received(Some(other))));
            None
        }
    }
}

fn check_bounded(
    obj: &Map<String, Value>,
    bounds: &Bounds,
    errors: &mut ValidationError,
) -> Option<f64> {
    let value = match obj.get(bounds.field) {
        None => {
            errors.field(bounds.field, "Required");
            return None;
        }
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        Some(other) => {
            errors.field(
                bounds.field,
                format!("Expected number, received {}", received(Some(other))),
            );
            return None;
        }
    };

    match value {
        Some(v) if v >= bounds.min && v <= bounds.max => Some(v),
        Some(_) => {
            errors.field(
                bounds.field,
                format!(
                    "{} must be between {} and {}",
                    bounds.field, bounds.min, bounds.max
                ),
            );
            None
        }
        None => {
            errors.field(bounds.field, "Expected finite number");
            None
        }
    }
}

/// Outer `None` means the field failed; `Some(None)` means it was absent.
fn check_created_at(
    obj: &Map<String, Value>,
    errors: &mut ValidationError,
) -> Option<Option<String>> {
    match obj.get(CREATED_AT) {
        None => Some(None),
        Some(Value::String(s)) if is_utc_datetime(s) => Some(Some(s.clone())),
        Some(Value::String(_)) => {
            errors.field(CREATED_AT, "Invalid datetime");
            None
        }
        Some(other) => {
            errors.field(
                CREATED_AT,
                format!("Expected string, received {}", received(Some(other))),
            );
            None
        }
    }
}

/// RFC 3339 date-time in UTC: `YYYY-MM-DDTHH:MM:SS[.fff]Z`
fn is_utc_datetime(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 20
        && bytes[10] == b'T'
        && s.ends_with('Z')
        && DateTime::parse_from_rfc3339(s).is_ok()
}

fn received(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}
