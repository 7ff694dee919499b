use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::database::{LocationStore, StoreError};
use crate::types::LocationRecord;
use crate::AppState;

/// In-memory stand-in for the remote table.
///
/// Assigns an id and a `created_at` default the way the real table does, and
/// keeps every row it was asked to write.
#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicI64,
    writes: Mutex<Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Rows exactly as they were submitted (before server defaults)
    pub fn writes(&self) -> Vec<Value> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn insert(&self, record: &LocationRecord) -> Result<Value, StoreError> {
        let submitted = serde_json::to_value(record).unwrap();
        self.writes.lock().unwrap().push(submitted.clone());

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut row = submitted;
        row["id"] = json!(id);
        if row.get("created_at").is_none() {
            row["created_at"] = json!("2025-08-14T05:00:00.000000+00:00");
        }
        Ok(row)
    }
}

/// Store that always reports a remote rejection
pub struct FailingStore(pub &'static str);

#[async_trait]
impl LocationStore for FailingStore {
    async fn insert(&self, _record: &LocationRecord) -> Result<Value, StoreError> {
        Err(StoreError::Remote {
            status: 409,
            code: Some("23505".into()),
            message: self.0.to_string(),
        })
    }
}

/// Store that panics, to exercise the unhandled-fault path
pub struct PanickingStore;

#[async_trait]
impl LocationStore for PanickingStore {
    async fn insert(&self, _record: &LocationRecord) -> Result<Value, StoreError> {
        panic!("store exploded")
    }
}

/// Configuration with placeholder credentials plus any extra variables
pub fn test_config(extra: &[(&str, &str)]) -> AppConfig {
    AppConfig::from_lookup(|name| match name {
        "SUPABASE_URL" => Some("http://127.0.0.1:9/".to_string()),
        "SUPABASE_SERVICE_ROLE" => Some("test-service-key".to_string()),
        _ => extra
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string()),
    })
    .expect("test config")
}

pub fn test_state(store: Arc<dyn LocationStore>) -> AppState {
    AppState::new(store, "test")
}
