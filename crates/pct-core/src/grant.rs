//! Pending permission grants.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute on a permission grant naming its ticket-scoped token code.
pub const TICKET_TOKEN_ATTRIBUTE: &str = "pct";

/// A pending permission grant. Read-only here; only its ticket-scoped
/// token code is consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl PermissionGrant {
    pub fn new() -> Self {
        Self::default()
    }

    /// A grant tagged with a ticket-scoped token code.
    pub fn with_ticket_token(code: impl Into<String>) -> Self {
        let mut grant = Self::new();
        grant
            .attributes
            .insert(TICKET_TOKEN_ATTRIBUTE.to_string(), code.into());
        grant
    }

    /// The ticket-scoped token code, if present and not blank.
    pub fn ticket_token_code(&self) -> Option<&str> {
        self.attributes
            .get(TICKET_TOKEN_ATTRIBUTE)
            .map(String::as_str)
            .filter(|code| !code.trim().is_empty())
    }
}
