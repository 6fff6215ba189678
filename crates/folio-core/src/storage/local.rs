//! Bundled local copy of the content documents
//!
//! Display paths read from here when the content store is not configured or
//! cannot be reached. Reads never fail: a missing or malformed file yields the
//! document's empty value and a warning in the log.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ContentConfig;
use crate::domain::{PortfolioDocument, Project, sort_newest_first};

use super::DocumentKind;

/// Read-only access to the local data directory
#[derive(Debug, Clone)]
pub struct LocalFallbackReader {
    content: ContentConfig,
}

impl LocalFallbackReader {
    pub fn new(content: ContentConfig) -> Self {
        Self { content }
    }

    /// File the reader consults for `kind`
    pub fn path_for(&self, kind: DocumentKind) -> PathBuf {
        self.content.local_path_for(kind)
    }

    /// Whether a local copy of `kind` exists on disk
    pub async fn is_available(&self, kind: DocumentKind) -> bool {
        tokio::fs::metadata(self.path_for(kind))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    /// Read and decode the local copy of `kind`, or `T::default()` on any failure
    pub async fn read_local<T>(&self, kind: DocumentKind) -> T
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path_for(kind);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(document = %kind, path = %path.display(), error = %e, "Local copy unreadable, using empty document");
                return T::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!(document = %kind, path = %path.display(), "Read local copy");
                value
            }
            Err(e) => {
                warn!(document = %kind, path = %path.display(), error = %e, "Local copy malformed, using empty document");
                T::default()
            }
        }
    }

    /// Local projects in display order
    pub async fn read_projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.read_local(DocumentKind::Projects).await;
        sort_newest_first(&mut projects);
        projects
    }

    pub async fn read_portfolio(&self) -> PortfolioDocument {
        self.read_local(DocumentKind::Portfolio).await
    }
}
