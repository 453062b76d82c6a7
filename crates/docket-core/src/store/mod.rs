//! Object storage collaborator: an opaque key/blob store with per-object
//! string metadata and server-side copy.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// String metadata attached to a stored object.
pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),
    #[error("object not found: {container}/{key}")]
    ObjectNotFound { container: String, key: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// State of a server-side copy, observed on the destination object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyState {
    Pending,
    Success,
    Failed,
}

impl CopyState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CopyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to an in-flight copy operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyHandle {
    pub id: String,
}

/// Key/blob store collaborator consumed by the pipeline.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create a container if absent; already-present is not an error.
    async fn ensure_container(&self, container: &str) -> StoreResult<()>;

    /// Keys of the objects currently in a container.
    async fn list(&self, container: &str) -> StoreResult<Vec<String>>;

    async fn put(
        &self,
        container: &str,
        key: &str,
        data: Vec<u8>,
        metadata: Metadata,
    ) -> StoreResult<()>;

    async fn get(&self, container: &str, key: &str) -> StoreResult<Vec<u8>>;

    async fn metadata(&self, container: &str, key: &str) -> StoreResult<Metadata>;

    /// Replace the object's metadata wholesale, in one call.
    async fn set_metadata(&self, container: &str, key: &str, metadata: Metadata)
        -> StoreResult<()>;

    /// Start a server-side copy to a same-named key in another container,
    /// preserving the source's metadata.
    async fn start_copy(
        &self,
        src_container: &str,
        key: &str,
        dst_container: &str,
    ) -> StoreResult<CopyHandle>;

    /// Copy state observed on the destination object.
    async fn copy_status(&self, container: &str, key: &str) -> StoreResult<CopyState>;

    async fn delete(&self, container: &str, key: &str) -> StoreResult<()>;

    /// Resolvable location of an object, suitable for handing to external
    /// services.
    fn url(&self, container: &str, key: &str) -> String;
}
