//! # pct-core
//!
//! Domain types for persisted claims tokens (PCTs).
//!
//! A PCT is a server-side record that accumulates identity and authorization
//! claims across a multi-step authorization flow. This crate provides:
//! - The [`Claims`] set with its overwrite-on-merge rule
//! - The [`ClaimsToken`] record and its lifetime rule
//! - [`PermissionGrant`], the read-only input that may point at a ticket-scoped token
//! - The opaque code generator
//! - [`PctConfig`], loaded from TOML
//!
//! ## Token Lifecycle
//!
//! | State | Entered By | Left By |
//! |-------|------------|---------|
//! | **live** | creation, or promotion of a ticket-scoped token | expiry sweep, explicit delete |
//! | **deleted** | expiry sweep, explicit delete | - |
//!
//! A token is never renewed: its expiration is fixed at creation.

pub mod claims;
pub mod code;
pub mod config;
pub mod grant;
pub mod token;

pub use claims::Claims;
pub use code::generate_code;
pub use config::{CleanupConfig, PctConfig, StoreBackend, StoreConfig, TokenConfig};
pub use grant::{PermissionGrant, TICKET_TOKEN_ATTRIBUTE};
pub use token::{ClaimsToken, DEFAULT_LIFETIME_SECS, MAX_LIFETIME_SECS, effective_lifetime};
