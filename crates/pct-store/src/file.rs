//! File-backed directory store.
//!
//! Entries live in memory and are written to a JSON Lines file (one entry
//! per line) after every mutation. The file is read back on open.
//!
//! A mutation is applied to a staged copy, written to a temp file next to
//! the snapshot and renamed over it. Memory is updated only once the rename
//! succeeds, so a failed write leaves both memory and disk unchanged.

use crate::directory::DirectoryStore;
use crate::dn::Dn;
use crate::entry::{Entry, SearchRequest};
use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryDirectory;
use async_trait::async_trait;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Directory store persisted as a JSON Lines snapshot.
pub struct FileDirectory {
    path: PathBuf,
    inner: MemoryDirectory,
    /// Serializes stage-write-commit so snapshots never interleave.
    write_lock: Mutex<()>,
}

impl FileDirectory {
    /// Open (or create) the snapshot at `path`.
    pub fn open(
        path: impl AsRef<Path>,
        naming_contexts: impl IntoIterator<Item = Dn>,
    ) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let entries = Self::load_from_file(&path)?;
        tracing::info!("Loaded {} directory entries from {}", entries.len(), path.display());

        Ok(Self {
            inner: MemoryDirectory::with_entries(naming_contexts, entries),
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> StoreResult<Vec<Entry>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(path)?);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Entry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse directory entry on line {} of {}: {}",
                        line_num + 1,
                        path.display(),
                        e
                    );
                }
            }
        }

        Ok(entries)
    }

    fn rewrite_file(&self, entries: &[Entry]) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(dir)?;

        {
            let mut writer = BufWriter::new(temp.as_file());
            for entry in entries {
                let json = serde_json::to_string(entry)?;
                writeln!(writer, "{}", json)?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn mutate<F>(&self, op: F) -> StoreResult<()>
    where
        F: FnOnce(&MemoryDirectory) -> StoreResult<()>,
    {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let staged = self.inner.staged()?;
        op(&staged)?;
        self.rewrite_file(&staged.snapshot()?)?;
        self.inner.commit(staged)
    }
}

#[async_trait]
impl DirectoryStore for FileDirectory {
    async fn create(&self, entry: Entry) -> StoreResult<()> {
        self.mutate(|dir| dir.create_sync(entry))
    }

    async fn find(&self, request: &SearchRequest) -> StoreResult<Vec<Entry>> {
        self.inner.find_sync(request)
    }

    async fn update(&self, entry: Entry) -> StoreResult<()> {
        self.mutate(|dir| dir.update_sync(entry))
    }

    async fn delete(&self, dn: &Dn) -> StoreResult<()> {
        self.mutate(|dir| dir.delete_sync(dn))
    }

    async fn exists(&self, dn: &Dn) -> StoreResult<bool> {
        self.inner.exists_sync(dn)
    }
}
