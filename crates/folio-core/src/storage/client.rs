//! Typed content store client
//!
//! Wraps a `DocumentStore` with JSON encoding and the "not configured" state.
//! The client holds no cached tags: every tag it hands out came from the most
//! recent store response for that document.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{Error, Result};

use super::github::GitHubStore;
use super::{DocumentStore, VersionTag, VersionedDocument};

/// Client for reading and conditionally writing JSON documents
#[derive(Clone)]
pub struct ContentStoreClient {
    store: Option<Arc<dyn DocumentStore>>,
    missing: Vec<String>,
}

impl std::fmt::Debug for ContentStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStoreClient")
            .field("store", &self.store.as_ref().map(|s| s.describe()))
            .field("missing", &self.missing)
            .finish()
    }
}

impl ContentStoreClient {
    /// Build a client for the configured GitHub repository
    ///
    /// Missing credentials do not fail construction; the client is created in
    /// the unconfigured state and every call reports which settings are absent.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let missing = config.missing();
        if !missing.is_empty() {
            debug!(missing = ?missing, "Content store not configured");
            return Ok(Self::unconfigured(missing));
        }

        let store = GitHubStore::new(config)?;
        info!(store = %store.describe(), "Content store configured");
        Ok(Self::with_store(Arc::new(store)))
    }

    /// Use an explicit store implementation
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store: Some(store),
            missing: Vec::new(),
        }
    }

    /// A client with no store; every call fails with `NotConfigured`
    pub fn unconfigured<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store: None,
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// Settings that must be provided before the store can be used
    pub fn missing_settings(&self) -> &[String] {
        &self.missing
    }

    fn store(&self) -> Result<&Arc<dyn DocumentStore>> {
        self.store
            .as_ref()
            .ok_or_else(|| Error::not_configured(self.missing.iter().cloned()))
    }

    /// Fetch and decode the document at `name` with its current tag
    pub async fn fetch_document<T>(&self, name: &str) -> Result<VersionedDocument<T>>
    where
        T: DeserializeOwned,
    {
        let store = self.store()?;
        let raw = store.get_document(name).await?;
        let value = decode_document(name, &raw.bytes)?;

        debug!(document = %name, version = %raw.version, bytes = raw.bytes.len(), "Fetched document");

        Ok(VersionedDocument {
            value,
            version: raw.version,
        })
    }

    /// Write `value` to `name` if the store is still at `expected`
    ///
    /// Fails with `VersionConflict` when another write landed first; that
    /// failure is final for this call and is never retried here.
    pub async fn write_document<T>(
        &self,
        name: &str,
        value: &T,
        expected: &VersionTag,
        message: &str,
    ) -> Result<VersionTag>
    where
        T: Serialize + ?Sized,
    {
        let store = self.store()?;
        let bytes = encode_document(value)?;

        debug!(document = %name, expected = %expected, bytes = bytes.len(), "Writing document");

        let version = store.put_document(name, bytes, expected, message).await?;

        info!(document = %name, version = %version, message = %message, "Committed document");
        Ok(version)
    }
}

/// Pretty-printed JSON with two-space indentation
pub fn encode_document<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    serde_json::to_vec_pretty(value)
        .map_err(|e| Error::Other(format!("Failed to encode document: {}", e)))
}

/// Decode stored bytes, reporting malformed content as a decode failure
pub fn decode_document<T>(name: &str, bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(|e| Error::DecodeFailure {
        document: name.to_string(),
        reason: e.to_string(),
    })
}
