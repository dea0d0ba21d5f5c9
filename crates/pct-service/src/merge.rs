//! Claims merge engine.
//!
//! Combines the claims of up to three sources into the authoritative token
//! of an authorization flow:
//!
//! 1. The ticket-scoped token named by the first pending grant (if any).
//! 2. The caller's current token (if any).
//! 3. A fresh identity assertion (if any).
//!
//! ## Resolution
//!
//! | Current | Ticket | Working token |
//! |---------|--------|---------------|
//! | absent | found | the ticket token, as stored |
//! | absent | absent | a brand-new token for the client |
//! | present | absent | the current token |
//! | present | found | the ticket token, with the current token's claims copied onto it |
//!
//! In the last row claims flow current -> ticket, while the surviving record
//! is the ticket token. The identity assertion's claims are then copied onto
//! the working token and the result is upserted.
//!
//! Every copy replaces values wholesale (see [`Claims::merge_from`]).

use crate::error::PctError;
use crate::repository::TokenRepository;
use pct_core::{Claims, ClaimsToken, PermissionGrant};

/// Result of a claims merge.
#[derive(Debug)]
pub enum MergeOutcome {
    /// The merged token was persisted.
    Success(ClaimsToken),
    /// Persisting failed; `token` is the best-known working token with the
    /// merged claims held only in memory.
    Degraded { token: ClaimsToken, cause: PctError },
}

impl MergeOutcome {
    pub fn token(&self) -> &ClaimsToken {
        match self {
            MergeOutcome::Success(token) => token,
            MergeOutcome::Degraded { token, .. } => token,
        }
    }

    pub fn into_token(self) -> ClaimsToken {
        match self {
            MergeOutcome::Success(token) => token,
            MergeOutcome::Degraded { token, .. } => token,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, MergeOutcome::Degraded { .. })
    }

    /// Treat a degraded outcome as an error.
    pub fn into_result(self) -> Result<ClaimsToken, PctError> {
        match self {
            MergeOutcome::Success(token) => Ok(token),
            MergeOutcome::Degraded { cause, .. } => Err(cause),
        }
    }
}

/// Merges claims into the authoritative token of a flow.
#[derive(Clone)]
pub struct ClaimsMerger {
    repository: TokenRepository,
}

impl ClaimsMerger {
    pub fn new(repository: TokenRepository) -> Self {
        Self { repository }
    }

    /// Merge claims and persist the working token.
    ///
    /// Never fails outright: a persistence failure yields
    /// [`MergeOutcome::Degraded`].
    pub async fn update_claims(
        &self,
        current: Option<ClaimsToken>,
        id_claims: Option<&Claims>,
        client_id: &str,
        grants: &[PermissionGrant],
    ) -> MergeOutcome {
        let ticket = self.resolve_ticket_token(grants).await;

        let mut working = match (current, ticket) {
            (None, Some(ticket)) => ticket,
            (None, None) => self.repository.new_token(client_id),
            (Some(current), None) => current,
            (Some(current), Some(mut ticket)) => {
                tracing::debug!(
                    "Promoting ticket PCT {} over current PCT {}",
                    ticket.code,
                    current.code
                );
                ticket.claims.merge_from(&current.claims);
                ticket
            }
        };

        if let Some(claims) = id_claims {
            working.claims.merge_from(claims);
        }

        tracing::trace!(
            code = %working.code,
            claims = ?working.claims.to_json().ok(),
            "Merged PCT claims"
        );

        match self.repository.try_save(&working).await {
            Ok(()) => MergeOutcome::Success(working),
            Err(cause) => {
                tracing::error!("Failed to update PCT claims, code: {}. {}", working.code, cause);
                MergeOutcome::Degraded {
                    token: working,
                    cause,
                }
            }
        }
    }

    /// Look up the ticket-scoped token named by the first grant.
    ///
    /// Absence and lookup failures both yield `None`.
    async fn resolve_ticket_token(&self, grants: &[PermissionGrant]) -> Option<ClaimsToken> {
        let code = grants.first()?.ticket_token_code()?;
        let ticket = self.repository.find_by_code(code).await;
        if ticket.is_none() {
            tracing::warn!("Ticket PCT {} not found, ignoring it", code);
        }
        ticket
    }
}
