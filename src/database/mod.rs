pub mod supabase;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::types::LocationRecord;

pub use supabase::SupabaseClient;

/// Errors from the remote datastore. Callers surface the message as-is and
/// do not branch on the kind of failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The datastore answered with an error payload
    #[error("{message}")]
    Remote {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid datastore configuration: {0}")]
    Config(String),
}

/// Insert target for validated location records.
///
/// Exactly one row is written per call. Implementations hold no per-request
/// state so a single instance is shared by all handlers.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Insert one record and return the row as persisted, including any
    /// server-generated columns.
    async fn insert(&self, record: &LocationRecord) -> Result<Value, StoreError>;
}
