use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

/// Response for a handler that panicked, for `CatchPanicLayer::custom`.
///
/// The panic message is logged; the caller only sees `INTERNAL_ERROR`.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };

    tracing::error!("UNHANDLED_ERROR: {}", detail);

    ApiError::Internal.into_response()
}
