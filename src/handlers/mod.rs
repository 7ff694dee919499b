// handlers/mod.rs - HTTP handlers
//
// GET  /health          liveness probe
// POST /api/locations   validate and store one location record
// anything else         404 NOT_FOUND

pub mod health;
pub mod locations;

pub use health::health;

use crate::error::ApiError;

/// Fallback for unmatched paths and unsupported methods on known paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
