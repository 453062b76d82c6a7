//! Verified move of an object between containers.
//!
//! The source is deleted only after the destination copy has been observed in
//! the `Success` state; a failed or still-pending copy leaves it in place.

use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};

use crate::store::{CopyState, ObjectStore, StoreError};

#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("copy finished in state {0}")]
    CopyFailed(CopyState),
    #[error("copy still pending after {0:?}")]
    CopyTimedOut(Duration),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type RelocateResult<T> = Result<T, RelocateError>;

#[derive(Debug, Clone)]
pub struct RelocateSettings {
    /// Wall-clock budget for the copy to leave the pending state.
    pub max_wait: Duration,
    /// Fixed delay between copy-status checks.
    pub interval: Duration,
}

impl Default for RelocateSettings {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(30),
            interval: Duration::from_secs(1),
        }
    }
}

/// Move an object to a same-named key in another container, preserving its
/// metadata. The caller decides whether to retry on failure; nothing is
/// retried here.
pub async fn relocate(
    store: &dyn ObjectStore,
    key: &str,
    src_container: &str,
    dst_container: &str,
    settings: &RelocateSettings,
) -> RelocateResult<()> {
    tracing::info!(key, dst = dst_container, "moving object");

    store.ensure_container(dst_container).await?;
    store.start_copy(src_container, key, dst_container).await?;

    wait_for_copy(store, dst_container, key, settings).await?;

    store.delete(src_container, key).await?;
    tracing::info!(key, dst = dst_container, "object moved");
    Ok(())
}

async fn wait_for_copy(
    store: &dyn ObjectStore,
    container: &str,
    key: &str,
    settings: &RelocateSettings,
) -> RelocateResult<()> {
    let deadline = Instant::now() + settings.max_wait;

    let mut state = store.copy_status(container, key).await?;
    while state == CopyState::Pending && Instant::now() < deadline {
        sleep(settings.interval).await;
        state = store.copy_status(container, key).await?;
    }

    match state {
        CopyState::Success => Ok(()),
        CopyState::Pending => {
            tracing::error!(key, "copy still pending at deadline");
            Err(RelocateError::CopyTimedOut(settings.max_wait))
        }
        CopyState::Failed => {
            tracing::error!(key, "copy did not complete successfully");
            Err(RelocateError::CopyFailed(CopyState::Failed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Metadata};

    async fn seeded_store(store: MemoryStore) -> MemoryStore {
        store.ensure_container("incoming").await.unwrap();
        store
            .put(
                "incoming",
                "notice.pdf",
                b"bytes".to_vec(),
                Metadata::new(),
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn moves_object_when_copy_succeeds() {
        let store = seeded_store(MemoryStore::new()).await;

        relocate(
            &store,
            "notice.pdf",
            "incoming",
            "processed",
            &RelocateSettings::default(),
        )
        .await
        .unwrap();

        assert_eq!(
            store.get("processed", "notice.pdf").await.unwrap(),
            b"bytes"
        );
        assert!(store.get("incoming", "notice.pdf").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_out_pending_states_before_deleting() {
        let store = seeded_store(
            MemoryStore::new().with_copy_states([CopyState::Pending, CopyState::Pending]),
        )
        .await;

        relocate(
            &store,
            "notice.pdf",
            "incoming",
            "processed",
            &RelocateSettings::default(),
        )
        .await
        .unwrap();

        assert!(store.get("incoming", "notice.pdf").await.is_err());
    }

    #[tokio::test]
    async fn failed_copy_keeps_source() {
        let store =
            seeded_store(MemoryStore::new().with_copy_states([CopyState::Failed])).await;

        let result = relocate(
            &store,
            "notice.pdf",
            "incoming",
            "processed",
            &RelocateSettings::default(),
        )
        .await;

        assert!(matches!(result, Err(RelocateError::CopyFailed(_))));
        assert_eq!(store.get("incoming", "notice.pdf").await.unwrap(), b"bytes");
    }

    #[tokio::test(start_paused = true)]
    async fn pending_at_deadline_keeps_source() {
        let pending = std::iter::repeat(CopyState::Pending).take(64);
        let store = seeded_store(MemoryStore::new().with_copy_states(pending)).await;

        let result = relocate(
            &store,
            "notice.pdf",
            "incoming",
            "processed",
            &RelocateSettings::default(),
        )
        .await;

        assert!(matches!(result, Err(RelocateError::CopyTimedOut(_))));
        assert_eq!(store.get("incoming", "notice.pdf").await.unwrap(), b"bytes");
    }
}
