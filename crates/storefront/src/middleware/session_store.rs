//! Session records kept in cart storage.
//!
//! Each session is one `session-<id>` value next to the carts, so a shopper's
//! cookie keeps naming the same cart token across restarts. Storage calls run
//! on the blocking pool.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, Error};
use tower_sessions::{ExpiredDeletion, SessionStore};
use tracing::{debug, warn};

use crate::cart::{SharedStorage, StorageError};

/// Prefix of the storage key for a session record.
pub const SESSION_KEY_PREFIX: &str = "session-";

/// The storage key holding session `id`.
#[must_use]
pub fn session_key(id: &Id) -> String {
    format!("{SESSION_KEY_PREFIX}{id}")
}

/// Whether `key` holds a session record rather than a cart.
#[must_use]
pub fn is_session_key(key: &str) -> bool {
    key.starts_with(SESSION_KEY_PREFIX)
}

/// On-disk layout of a session record. The id is the storage key.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    /// Unix timestamp (seconds) after which the record is dead.
    expires_at: i64,
    data: HashMap<String, Value>,
}

impl StoredSession {
    fn from_record(record: &Record) -> Self {
        Self {
            expires_at: record.expiry_date.unix_timestamp(),
            data: record.data.clone(),
        }
    }

    const fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    fn into_record(self, id: Id) -> session_store::Result<Record> {
        let expiry_date = OffsetDateTime::from_unix_timestamp(self.expires_at)
            .map_err(|e| Error::Decode(e.to_string()))?;
        Ok(Record {
            id,
            data: self.data,
            expiry_date,
        })
    }
}

fn backend(err: StorageError) -> Error {
    Error::Backend(err.to_string())
}

fn write(storage: &SharedStorage, record: &Record) -> session_store::Result<()> {
    let json = serde_json::to_string(&StoredSession::from_record(record))
        .map_err(|e| Error::Encode(e.to_string()))?;
    storage.set(&session_key(&record.id), &json).map_err(backend)
}

/// Read a session value, treating unreadable records as absent.
fn read(storage: &SharedStorage, key: &str) -> session_store::Result<Option<StoredSession>> {
    let Some(raw) = storage.get(key).map_err(backend)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(stored) => Ok(Some(stored)),
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable session record");
            storage.remove(key).map_err(backend)?;
            Ok(None)
        }
    }
}

/// tower-sessions store over the cart [`KeyValueStorage`](crate::cart::KeyValueStorage).
#[derive(Clone)]
pub struct StorageSessionStore {
    storage: SharedStorage,
}

impl StorageSessionStore {
    #[must_use]
    pub const fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// Run a storage operation on the blocking pool.
    async fn blocking<T, F>(&self, op: F) -> session_store::Result<T>
    where
        F: FnOnce(&SharedStorage) -> session_store::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || op(&storage))
            .await
            .map_err(|e| Error::Backend(format!("session storage task failed: {e}")))?
    }

    /// Delete expired sessions every `period` until the task is aborted.
    pub fn spawn_cleanup(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = self.delete_expired().await {
                    warn!(error = %e, "Expired session cleanup failed");
                }
            }
        })
    }
}

impl fmt::Debug for StorageSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSessionStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionStore for StorageSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut candidate = record.clone();
        let id = self
            .blocking(move |storage| {
                while storage
                    .get(&session_key(&candidate.id))
                    .map_err(backend)?
                    .is_some()
                {
                    candidate.id = Id::default();
                }
                write(storage, &candidate)?;
                Ok(candidate.id)
            })
            .await?;
        record.id = id;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let record = record.clone();
        self.blocking(move |storage| write(storage, &record)).await
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let id = *id;
        self.blocking(move |storage| {
            let key = session_key(&id);
            let Some(stored) = read(storage, &key)? else {
                return Ok(None);
            };
            if stored.is_expired(OffsetDateTime::now_utc().unix_timestamp()) {
                storage.remove(&key).map_err(backend)?;
                return Ok(None);
            }
            stored.into_record(id).map(Some)
        })
        .await
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        let key = session_key(id);
        self.blocking(move |storage| storage.remove(&key).map_err(backend))
            .await
    }
}

#[async_trait]
impl ExpiredDeletion for StorageSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let removed = self
            .blocking(|storage| {
                let now = OffsetDateTime::now_utc().unix_timestamp();
                let mut removed = 0_usize;
                for key in storage.keys().map_err(backend)? {
                    if !is_session_key(&key) {
                        continue;
                    }
                    let expired =
                        read(storage, &key)?.is_some_and(|stored| stored.is_expired(now));
                    if expired {
                        storage.remove(&key).map_err(backend)?;
                        removed += 1;
                    }
                }
                Ok(removed)
            })
            .await?;
        debug!(removed, "Deleted expired sessions");
        Ok(())
    }
}
