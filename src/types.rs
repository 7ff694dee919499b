/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Collection that location records are written to
pub const LOCATION_TABLE: &str = "fi_location";

/// A location record that has passed validation and is ready to persist.
///
/// `created_at` is left out of the serialized row when absent so the
/// datastore applies its own default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
