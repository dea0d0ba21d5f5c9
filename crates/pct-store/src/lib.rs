//! # pct-store
//!
//! Directory store adapter used to persist claims tokens.
//!
//! The store is a hierarchical namespace of flat entries addressed by
//! distinguished names ([`Dn`]). Callers create, find (by filter, in
//! chunks), update and delete entries through the [`DirectoryStore`] trait.
//!
//! ## Backends
//!
//! | Backend | Persistence | Use |
//! |---------|-------------|-----|
//! | [`MemoryDirectory`] | none | tests, embedded use |
//! | [`FileDirectory`] | JSON Lines snapshot | single-node deployments, CLI |
//!
//! Timestamps are stored as generalized time (see [`time`]).

pub mod directory;
pub mod dn;
pub mod entry;
pub mod error;
pub mod file;
pub mod memory;
pub mod time;

pub use directory::DirectoryStore;
pub use dn::Dn;
pub use entry::{Entry, Filter, ORGANIZATIONAL_UNIT, SearchRequest, SearchScope};
pub use error::{StoreError, StoreResult};
pub use file::FileDirectory;
pub use memory::MemoryDirectory;
pub use time::{decode_generalized_time, encode_generalized_time};
