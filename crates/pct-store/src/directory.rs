//! The directory store interface.

use crate::dn::Dn;
use crate::entry::{Entry, SearchRequest};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;

/// Trait for hierarchical directory stores.
///
/// Implementations own their timeout and retry policy. Callers hold no
/// locks across calls.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Create an entry. Fails with `AlreadyExists` if the DN is taken and
    /// `NoSuchParent` if the parent does not exist.
    async fn create(&self, entry: Entry) -> StoreResult<()>;

    /// Return one chunk of entries matching the request, ordered by DN.
    async fn find(&self, request: &SearchRequest) -> StoreResult<Vec<Entry>>;

    /// Replace an existing entry. Fails with `NotFound` if it is absent.
    async fn update(&self, entry: Entry) -> StoreResult<()>;

    /// Remove an entry. Fails with `NotFound` if it is absent.
    async fn delete(&self, dn: &Dn) -> StoreResult<()>;

    /// Whether an entry exists at `dn`.
    async fn exists(&self, dn: &Dn) -> StoreResult<bool>;

    /// Create the entry if absent, otherwise replace it.
    async fn upsert(&self, entry: Entry) -> StoreResult<()> {
        match self.update(entry.clone()).await {
            Err(e) if e.is_not_found() => match self.create(entry.clone()).await {
                // Lost a create race: the entry exists now, so replace it.
                Err(e) if e.is_already_exists() => self.update(entry).await,
                other => other,
            },
            other => other,
        }
    }

    /// Make sure the organizational branch at `dn` exists.
    ///
    /// A concurrent creator winning the race counts as success.
    async fn ensure_branch(&self, dn: &Dn, ou: &str) -> StoreResult<()> {
        if self.exists(dn).await? {
            return Ok(());
        }
        match self.create(Entry::branch(dn.clone(), ou)).await {
            Err(StoreError::AlreadyExists { .. }) => {
                tracing::debug!("Branch {} created concurrently", dn);
                Ok(())
            }
            Ok(()) => {
                tracing::info!("Created branch {}", dn);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
