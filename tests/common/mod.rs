use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use fi_location_api::config::AppConfig;
use fi_location_api::database::SupabaseClient;
use fi_location_api::{app, AppState};

pub const SERVICE_KEY: &str = "integration-service-key";

/// One insert request as seen by the mock datastore
#[derive(Debug, Clone)]
pub struct CapturedInsert {
    pub headers: HeaderMap,
    pub query: Option<String>,
    pub body: Value,
}

/// Minimal PostgREST stand-in for the `fi_location` table
#[derive(Clone, Default)]
pub struct MockSupabase {
    next_id: Arc<AtomicI64>,
    inserts: Arc<Mutex<Vec<CapturedInsert>>>,
}

impl MockSupabase {
    pub fn inserts(&self) -> Vec<CapturedInsert> {
        self.inserts.lock().unwrap().clone()
    }
}

async fn insert_location(
    State(mock): State<MockSupabase>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    Json(body): Json<Value>,
) -> Response {
    mock.inserts.lock().unwrap().push(CapturedInsert {
        headers: headers.clone(),
        query,
        body: body.clone(),
    });

    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(SERVICE_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid API key", "hint": "Double check your Supabase `anon` or `service_role` API key."})),
        )
            .into_response();
    }

    // Simulated unique violation
    if body["user_id"] == "duplicate" {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "code": "23505",
                "details": "Key (user_id)=(duplicate) already exists.",
                "hint": null,
                "message": "duplicate key value violates unique constraint \"fi_location_user_id_key\""
            })),
        )
            .into_response();
    }

    let mut row = body;
    row["id"] = json!(mock.next_id.fetch_add(1, Ordering::SeqCst) + 1);
    if row.get("created_at").is_none() {
        row["created_at"] = json!(chrono::Utc::now().to_rfc3339());
    }

    (StatusCode::CREATED, Json(row)).into_response()
}

/// Mock datastore and the real application, each on its own local port
pub struct TestStack {
    pub base_url: String,
    pub supabase: MockSupabase,
}

async fn serve(router: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(format!("http://127.0.0.1:{}", port))
}

pub async fn spawn_stack() -> Result<TestStack> {
    spawn_stack_with(SERVICE_KEY).await
}

/// Like [`spawn_stack`] but the app authenticates with `service_key`
pub async fn spawn_stack_with(service_key: &str) -> Result<TestStack> {
    let supabase = MockSupabase::default();
    let mock_router = Router::new()
        .route("/rest/v1/fi_location", post(insert_location))
        .with_state(supabase.clone());
    let supabase_url = serve(mock_router).await?;

    let service_key = service_key.to_string();
    let config = AppConfig::from_lookup(|name| match name {
        "SUPABASE_URL" => Some(supabase_url.clone()),
        "SUPABASE_SERVICE_ROLE" => Some(service_key.clone()),
        "APP_ENV" => Some("integration".to_string()),
        _ => None,
    })?;

    let client = SupabaseClient::new(&config.supabase)?;
    let state = AppState::new(Arc::new(client), config.environment.as_str());
    let base_url = serve(app(state, &config)).await?;

    Ok(TestStack { base_url, supabase })
}
