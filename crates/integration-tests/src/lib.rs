//! Integration tests for Campus Market.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p campus-market-integration-tests
//! ```
//!
//! The storefront runs in-process: requests go through the full router
//! (sessions, request IDs, tracing) via `tower::ServiceExt::oneshot`, so no
//! server or network is needed.
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart HTTP flows across a session
//! - `cart_persistence` - File-backed carts and sessions surviving a restart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use campus_market_storefront::cart::{MemoryStorage, SharedStorage};
use campus_market_storefront::config::StorefrontConfig;
use campus_market_storefront::middleware::SESSION_COOKIE_NAME;
use campus_market_storefront::routes;
use campus_market_storefront::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

/// Storefront configuration for tests, with in-memory cart storage.
///
/// # Panics
///
/// Panics if the fixed test environment fails to parse.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig::from_lookup(|key| match key {
        "STOREFRONT_BASE_URL" => Some("http://localhost:3000".to_string()),
        "CART_STORAGE" => Some("memory".to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}

/// A response reduced to what the tests inspect.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// One browser session against an in-process storefront.
///
/// Carries the session cookie between requests the way a browser would.
pub struct TestClient {
    app: Router,
    storage: SharedStorage,
    cookie: Option<String>,
}

impl TestClient {
    /// Start a storefront over fresh in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    /// Start a storefront over an explicit storage backend.
    #[must_use]
    pub fn with_storage(storage: SharedStorage) -> Self {
        let state = AppState::with_storage(test_config(), Arc::clone(&storage));
        Self {
            app: routes::app(state),
            storage,
            cookie: None,
        }
    }

    /// A second browser session against the same storefront.
    #[must_use]
    pub fn new_session(&self) -> Self {
        Self {
            app: self.app.clone(),
            storage: Arc::clone(&self.storage),
            cookie: None,
        }
    }

    /// The same browser, keeping its cookie, against a storefront rebuilt
    /// over the same storage (as after a restart).
    #[must_use]
    pub fn restart(&self) -> Self {
        Self {
            cookie: self.cookie.clone(),
            ..Self::with_storage(Arc::clone(&self.storage))
        }
    }

    /// The session cookie pair (`name=value`), once the server has set one.
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Send a GET request.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.get_with_headers(path, &[]).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&mut self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let request = headers
            .iter()
            .fold(self.request("GET", path), |builder, (name, value)| {
                builder.header(*name, *value)
            })
            .body(Body::empty());
        self.send(request.expect("valid request")).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&mut self, path: &str, body: &Value) -> TestResponse {
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()));
        self.send(request.expect("valid request")).await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();

        let session_cookie = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
        if let Some(pair) = session_cookie {
            self.cookie = Some(pair.to_string());
        }

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
