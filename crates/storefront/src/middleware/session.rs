//! Session middleware configuration.
//!
//! Sessions only carry the cart token; cart contents live in cart storage.
//! Session records are stored beside the carts, so both survive a restart.

use tower_sessions::{Expiry, SessionManagerLayer};

use super::session_store::StorageSessionStore;
use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cm_session";

/// Session expiry time in seconds (30 days).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Create the session layer over `store`.
///
/// # Arguments
///
/// * `config` - Storefront configuration (for the secure cookie flag)
/// * `store` - Session records, kept in cart storage
#[must_use]
pub fn create_session_layer(
    config: &StorefrontConfig,
    store: StorageSessionStore,
) -> SessionManagerLayer<StorageSessionStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
