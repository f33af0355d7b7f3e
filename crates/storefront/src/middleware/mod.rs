//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. Session layer (tower-sessions, records kept in cart storage)
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded into the request span)

pub mod request_id;
pub mod session;
pub mod session_store;

pub use request_id::request_id_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
pub use session_store::{SESSION_KEY_PREFIX, StorageSessionStore, is_session_key};
