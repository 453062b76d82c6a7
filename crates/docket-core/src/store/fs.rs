//! Filesystem-backed object store.
//!
//! Containers are directories under a root; object bytes live in the file
//! itself and metadata in a `<key>.meta.json` sidecar next to it.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use uuid::Uuid;

use super::{CopyHandle, CopyState, Metadata, ObjectStore, StoreError, StoreResult};

const SIDECAR_SUFFIX: &str = ".meta.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Sidecar {
    #[serde(default)]
    metadata: Metadata,
    copy_status: Option<CopyState>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Sidecar {
    fn new(metadata: Metadata) -> Self {
        let now = Utc::now();
        Self {
            metadata,
            copy_status: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, container: &str, key: &str) -> PathBuf {
        self.root.join(container).join(key)
    }

    fn sidecar_path(&self, container: &str, key: &str) -> PathBuf {
        self.root.join(container).join(format!("{key}{SIDECAR_SUFFIX}"))
    }

    async fn read_sidecar(&self, container: &str, key: &str) -> StoreResult<Sidecar> {
        let raw = fs::read(self.sidecar_path(container, key))
            .await
            .map_err(|err| not_found(err, container, key))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn write_sidecar(
        &self,
        container: &str,
        key: &str,
        sidecar: &Sidecar,
    ) -> StoreResult<()> {
        let raw = serde_json::to_vec_pretty(sidecar)?;
        fs::write(self.sidecar_path(container, key), raw).await?;
        Ok(())
    }

    async fn require_object(&self, container: &str, key: &str) -> StoreResult<()> {
        let container_dir = self.root.join(container);
        if !container_dir.is_dir() {
            return Err(StoreError::ContainerNotFound(container.to_string()));
        }
        if !self.object_path(container, key).is_file() {
            return Err(StoreError::ObjectNotFound {
                container: container.to_string(),
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ObjectStore for FsStore {
    async fn ensure_container(&self, container: &str) -> StoreResult<()> {
        fs::create_dir_all(self.root.join(container)).await?;
        Ok(())
    }

    async fn list(&self, container: &str) -> StoreResult<Vec<String>> {
        let dir = self.root.join(container);
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|_| StoreError::ContainerNotFound(container.to_string()))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(SIDECAR_SUFFIX) {
                keys.push(name);
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn put(
        &self,
        container: &str,
        key: &str,
        data: Vec<u8>,
        metadata: Metadata,
    ) -> StoreResult<()> {
        let path = self.object_path(container, key);
        if !self.root.join(container).is_dir() {
            return Err(StoreError::ContainerNotFound(container.to_string()));
        }

        fs::write(&path, data).await?;
        self.write_sidecar(container, key, &Sidecar::new(metadata))
            .await
    }

    async fn get(&self, container: &str, key: &str) -> StoreResult<Vec<u8>> {
        fs::read(self.object_path(container, key))
            .await
            .map_err(|err| not_found(err, container, key))
    }

    async fn metadata(&self, container: &str, key: &str) -> StoreResult<Metadata> {
        self.require_object(container, key).await?;

        match self.read_sidecar(container, key).await {
            Ok(sidecar) => Ok(sidecar.metadata),
            Err(StoreError::ObjectNotFound { .. }) => Ok(Metadata::new()),
            Err(err) => Err(err),
        }
    }

    async fn set_metadata(
        &self,
        container: &str,
        key: &str,
        metadata: Metadata,
    ) -> StoreResult<()> {
        self.require_object(container, key).await?;

        let mut sidecar = match self.read_sidecar(container, key).await {
            Ok(sidecar) => sidecar,
            Err(StoreError::ObjectNotFound { .. }) => Sidecar::new(Metadata::new()),
            Err(err) => return Err(err),
        };
        sidecar.metadata = metadata;
        sidecar.updated_at = Utc::now();

        self.write_sidecar(container, key, &sidecar).await
    }

    async fn start_copy(
        &self,
        src_container: &str,
        key: &str,
        dst_container: &str,
    ) -> StoreResult<CopyHandle> {
        self.require_object(src_container, key).await?;
        if !self.root.join(dst_container).is_dir() {
            return Err(StoreError::ContainerNotFound(dst_container.to_string()));
        }

        let data = self.get(src_container, key).await?;
        let metadata = self.metadata(src_container, key).await?;

        fs::write(self.object_path(dst_container, key), data).await?;
        let mut sidecar = Sidecar::new(metadata);
        sidecar.copy_status = Some(CopyState::Success);
        self.write_sidecar(dst_container, key, &sidecar).await?;

        Ok(CopyHandle {
            id: Uuid::new_v4().to_string(),
        })
    }

    async fn copy_status(&self, container: &str, key: &str) -> StoreResult<CopyState> {
        self.require_object(container, key).await?;

        match self.read_sidecar(container, key).await {
            Ok(sidecar) => Ok(sidecar.copy_status.unwrap_or(CopyState::Pending)),
            Err(StoreError::ObjectNotFound { .. }) => Ok(CopyState::Pending),
            Err(err) => Err(err),
        }
    }

    async fn delete(&self, container: &str, key: &str) -> StoreResult<()> {
        fs::remove_file(self.object_path(container, key))
            .await
            .map_err(|err| not_found(err, container, key))?;

        match fs::remove_file(self.sidecar_path(container, key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn url(&self, container: &str, key: &str) -> String {
        format!("file://{}", self.object_path(container, key).display())
    }
}

fn not_found(err: std::io::Error, container: &str, key: &str) -> StoreError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StoreError::ObjectNotFound {
            container: container.to_string(),
            key: key.to_string(),
        }
    } else {
        StoreError::Io(err)
    }
}
