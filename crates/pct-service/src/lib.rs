//! # pct-service
//!
//! Lifecycle of persisted claims tokens (PCTs) on a directory store.
//!
//! This crate provides:
//! - [`TokenRepository`]: create, look up, save and delete tokens under the
//!   `ou=pct` branch of a tenant's base namespace
//! - [`ClaimsMerger`]: merges ticket, current and identity claims into the
//!   authoritative token of an authorization flow
//! - [`ExpirySweeper`]: chunked deletion of expired tokens, plus
//!   [`spawn_periodic`] for running it on a timer
//! - [`PctService`]: one facade over all three
//!
//! ## Failure Policy
//!
//! Store failures are logged and absorbed. Lookups read as not-found,
//! deletes and saves become no-ops, and a merge that cannot be persisted
//! comes back as [`MergeOutcome::Degraded`]. Callers needing strict
//! consistency use the `try_*` repository methods or
//! [`MergeOutcome::into_result`].
//!
//! No locks are held: concurrent merges of the same token race and the
//! last writer wins.

pub mod error;
pub mod merge;
pub mod repository;
pub mod service;
pub mod sweep;

pub use error::PctError;
pub use merge::{ClaimsMerger, MergeOutcome};
pub use repository::{BRANCH_OU, TOKEN_OBJECT_CLASS, TokenRepository};
pub use service::PctService;
pub use sweep::{DEFAULT_BATCH_SIZE, ExpirySweeper, SweepReport, spawn_periodic};
