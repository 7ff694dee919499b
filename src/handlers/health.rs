use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::AppState;

/// GET /health - static liveness indicator plus the active environment name.
///
/// Does not call the datastore.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "env": &*state.environment,
    }))
}
