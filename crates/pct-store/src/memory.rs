//! In-memory directory store.

use crate::directory::DirectoryStore;
use crate::dn::Dn;
use crate::entry::{Entry, SearchRequest};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Directory store held in process memory.
///
/// Entries can only be created below an existing entry or one of the
/// configured naming contexts.
#[derive(Debug)]
pub struct MemoryDirectory {
    naming_contexts: Vec<Dn>,
    entries: RwLock<BTreeMap<Dn, Entry>>,
}

impl MemoryDirectory {
    /// Create an empty directory rooted at the given naming contexts.
    pub fn new(naming_contexts: impl IntoIterator<Item = Dn>) -> Self {
        Self {
            naming_contexts: naming_contexts.into_iter().collect(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a directory pre-populated with `entries`.
    pub fn with_entries(
        naming_contexts: impl IntoIterator<Item = Dn>,
        entries: impl IntoIterator<Item = Entry>,
    ) -> Self {
        let directory = Self::new(naming_contexts);
        if let Ok(mut map) = directory.entries.write() {
            for entry in entries {
                map.insert(entry.dn.clone(), entry);
            }
        }
        directory
    }

    /// All entries, ordered by DN.
    pub fn snapshot(&self) -> StoreResult<Vec<Entry>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.values().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_naming_context(&self, dn: &Dn) -> bool {
        self.naming_contexts.contains(dn)
    }

    /// Detached copy to apply a mutation to before publishing it.
    pub(crate) fn staged(&self) -> StoreResult<MemoryDirectory> {
        Ok(Self::with_entries(
            self.naming_contexts.clone(),
            self.snapshot()?,
        ))
    }

    /// Replace all entries with those of `staged`.
    pub(crate) fn commit(&self, staged: MemoryDirectory) -> StoreResult<()> {
        let next = staged
            .entries
            .into_inner()
            .map_err(|_| StoreError::LockPoisoned)?;
        *self.entries.write().map_err(|_| StoreError::LockPoisoned)? = next;
        Ok(())
    }

    pub(crate) fn create_sync(&self, entry: Entry) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        if entries.contains_key(&entry.dn) || self.is_naming_context(&entry.dn) {
            return Err(StoreError::already_exists(&entry.dn));
        }
        let parent_exists = entry
            .dn
            .parent()
            .is_some_and(|p| self.is_naming_context(&p) || entries.contains_key(&p));
        if !parent_exists {
            return Err(StoreError::NoSuchParent {
                dn: entry.dn.to_string(),
            });
        }
        entries.insert(entry.dn.clone(), entry);
        Ok(())
    }

    pub(crate) fn find_sync(&self, request: &SearchRequest) -> StoreResult<Vec<Entry>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        let matching = entries
            .values()
            .filter(|e| request.accepts(e))
            .skip(request.offset);
        Ok(match request.limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        })
    }

    pub(crate) fn update_sync(&self, entry: Entry) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        match entries.get_mut(&entry.dn) {
            Some(existing) => {
                *existing = entry;
                Ok(())
            }
            None => Err(StoreError::not_found(&entry.dn)),
        }
    }

    pub(crate) fn delete_sync(&self, dn: &Dn) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries
            .remove(dn)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(dn))
    }

    pub(crate) fn exists_sync(&self, dn: &Dn) -> StoreResult<bool> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(self.is_naming_context(dn) || entries.contains_key(dn))
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectory {
    async fn create(&self, entry: Entry) -> StoreResult<()> {
        self.create_sync(entry)
    }

    async fn find(&self, request: &SearchRequest) -> StoreResult<Vec<Entry>> {
        self.find_sync(request)
    }

    async fn update(&self, entry: Entry) -> StoreResult<()> {
        self.update_sync(entry)
    }

    async fn delete(&self, dn: &Dn) -> StoreResult<()> {
        self.delete_sync(dn)
    }

    async fn exists(&self, dn: &Dn) -> StoreResult<bool> {
        self.exists_sync(dn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Filter;

    fn root() -> Dn {
        Dn::new("o=gluu")
    }

    fn directory() -> MemoryDirectory {
        MemoryDirectory::new([root()])
    }

    fn item(parent: &Dn, name: &str) -> Entry {
        Entry::new(parent.child("cn", name), "item").with("cn", name)
    }

    #[tokio::test]
    async fn test_create_requires_parent() {
        let dir = directory();
        let branch = root().child("ou", "pct");

        let err = dir.create(item(&branch, "a")).await.unwrap_err();
        assert!(matches!(err, StoreError::NoSuchParent { .. }));

        dir.ensure_branch(&branch, "pct").await.unwrap();
        dir.create(item(&branch, "a")).await.unwrap();
        assert!(dir.exists(&branch.child("cn", "a")).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let dir = directory();
        dir.create(item(&root(), "a")).await.unwrap();
        let err = dir.create(item(&root(), "a")).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_ensure_branch_is_idempotent() {
        let dir = directory();
        let branch = root().child("ou", "pct");

        dir.ensure_branch(&branch, "pct").await.unwrap();
        dir.ensure_branch(&branch, "pct").await.unwrap();
        assert_eq!(dir.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let dir = directory();
        let entry = item(&root(), "ghost");

        assert!(dir.update(entry.clone()).await.unwrap_err().is_not_found());
        assert!(dir.delete(&entry.dn).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_upsert_creates_then_replaces() {
        let dir = directory();
        let entry = item(&root(), "a");

        dir.upsert(entry.clone()).await.unwrap();
        dir.upsert(entry.clone().with("note", "second")).await.unwrap();

        let found = dir
            .find(&SearchRequest::new(root(), Filter::equals("cn", "a")))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("note"), Some("second"));
    }

    #[tokio::test]
    async fn test_find_chunks() {
        let dir = directory();
        for name in ["a", "b", "c", "d", "e"] {
            dir.create(item(&root(), name)).await.unwrap();
        }

        let request = SearchRequest::new(root(), Filter::present("cn")).object_class("item");
        let first = dir.find(&request.clone().chunk(0, 2)).await.unwrap();
        let last = dir.find(&request.clone().chunk(4, 2)).await.unwrap();
        let past = dir.find(&request.chunk(5, 2)).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first[0].get("cn"), Some("a"));
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].get("cn"), Some("e"));
        assert!(past.is_empty());
    }
}
