pub mod body_limit;
pub mod cors;
pub mod panic;
pub mod security_headers;

pub use body_limit::json_payload_too_large;
pub use cors::cors_layer;
pub use panic::handle_panic;
pub use security_headers::security_headers;
