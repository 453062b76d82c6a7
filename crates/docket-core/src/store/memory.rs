//! In-memory object store for tests and local runs.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{CopyHandle, CopyState, Metadata, ObjectStore, StoreError, StoreResult};

#[derive(Debug, Clone, Default)]
struct ObjectEntry {
    data: Vec<u8>,
    metadata: Metadata,
}

/// Mutex-guarded map-of-maps store. Copies complete immediately unless a
/// scripted sequence of copy states is configured.
#[derive(Default)]
pub struct MemoryStore {
    containers: Mutex<HashMap<String, HashMap<String, ObjectEntry>>>,
    copy_script: Mutex<VecDeque<CopyState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the states reported by successive `copy_status` calls; once the
    /// queue is drained, copies report `Success`.
    #[must_use]
    pub fn with_copy_states(mut self, states: impl IntoIterator<Item = CopyState>) -> Self {
        self.copy_script = Mutex::new(states.into_iter().collect());
        self
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn ensure_container(&self, container: &str) -> StoreResult<()> {
        let mut containers = self.containers.lock().await;
        containers.entry(container.to_string()).or_default();
        Ok(())
    }

    async fn list(&self, container: &str) -> StoreResult<Vec<String>> {
        let containers = self.containers.lock().await;
        let objects = containers
            .get(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;

        let mut keys: Vec<String> = objects.keys().cloned().collect();
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
        let mut containers = self.containers.lock().await;
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;

        objects.insert(key.to_string(), ObjectEntry { data, metadata });
        Ok(())
    }

    async fn get(&self, container: &str, key: &str) -> StoreResult<Vec<u8>> {
        let containers = self.containers.lock().await;
        let entry = lookup(&containers, container, key)?;
        Ok(entry.data.clone())
    }

    async fn metadata(&self, container: &str, key: &str) -> StoreResult<Metadata> {
        let containers = self.containers.lock().await;
        let entry = lookup(&containers, container, key)?;
        Ok(entry.metadata.clone())
    }

    async fn set_metadata(
        &self,
        container: &str,
        key: &str,
        metadata: Metadata,
    ) -> StoreResult<()> {
        let mut containers = self.containers.lock().await;
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        let entry = objects
            .get_mut(key)
            .ok_or_else(|| StoreError::ObjectNotFound {
                container: container.to_string(),
                key: key.to_string(),
            })?;

        entry.metadata = metadata;
        Ok(())
    }

    async fn start_copy(
        &self,
        src_container: &str,
        key: &str,
        dst_container: &str,
    ) -> StoreResult<CopyHandle> {
        let mut containers = self.containers.lock().await;
        let entry = lookup(&containers, src_container, key)?.clone();

        let objects = containers
            .get_mut(dst_container)
            .ok_or_else(|| StoreError::ContainerNotFound(dst_container.to_string()))?;
        objects.insert(key.to_string(), entry);

        Ok(CopyHandle {
            id: Uuid::new_v4().to_string(),
        })
    }

    async fn copy_status(&self, container: &str, key: &str) -> StoreResult<CopyState> {
        {
            let containers = self.containers.lock().await;
            lookup(&containers, container, key)?;
        }

        let mut script = self.copy_script.lock().await;
        Ok(script.pop_front().unwrap_or(CopyState::Success))
    }

    async fn delete(&self, container: &str, key: &str) -> StoreResult<()> {
        let mut containers = self.containers.lock().await;
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;

        objects
            .remove(key)
            .ok_or_else(|| StoreError::ObjectNotFound {
                container: container.to_string(),
                key: key.to_string(),
            })?;
        Ok(())
    }

    fn url(&self, container: &str, key: &str) -> String {
        format!("memory://{container}/{key}")
    }
}

fn lookup<'a>(
    containers: &'a HashMap<String, HashMap<String, ObjectEntry>>,
    container: &str,
    key: &str,
) -> StoreResult<&'a ObjectEntry> {
    containers
        .get(container)
        .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?
        .get(key)
        .ok_or_else(|| StoreError::ObjectNotFound {
            container: container.to_string(),
            key: key.to_string(),
        })
}
