use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Json,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::validation::{is_json_content_type, parse_location, validate_location};
use crate::AppState;

/// POST /api/locations - validate the payload and insert it as one new row.
///
/// Body:
/// ```json
/// { "user_id": "abc123", "latitude": -6.2001, "longitude": 106.8167,
///   "created_at": "2025-08-14T05:00:00.000Z" }
/// ```
/// `created_at` is optional; when omitted the datastore default applies.
/// Nothing is deduplicated: identical requests produce distinct rows.
/// A body sent without an `application/json` content type is treated as missing.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());

    let record = if is_json_content_type(content_type) {
        parse_location(&body)?
    } else {
        validate_location(None)?
    };

    debug!(user_id = %record.user_id, "Storing location");

    let row = state.store.insert(&record).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Location stored",
            "data": row,
        })),
    ))
}
