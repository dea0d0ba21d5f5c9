//! Facade exposing the token operations used by the authorization flow.

use crate::merge::{ClaimsMerger, MergeOutcome};
use crate::repository::TokenRepository;
use crate::sweep::{ExpirySweeper, SweepReport};
use chrono::{DateTime, Utc};
use pct_core::{Claims, ClaimsToken, PctConfig, PermissionGrant};
use pct_store::DirectoryStore;
use std::sync::Arc;

/// Entry point for creating, merging, looking up, deleting and sweeping tokens.
#[derive(Clone)]
pub struct PctService {
    repository: TokenRepository,
    merger: ClaimsMerger,
    sweeper: ExpirySweeper,
}

impl PctService {
    pub fn new(repository: TokenRepository, batch_size: usize) -> Self {
        Self {
            merger: ClaimsMerger::new(repository.clone()),
            sweeper: ExpirySweeper::with_batch_size(repository.clone(), batch_size),
            repository,
        }
    }

    pub fn from_config(store: Arc<dyn DirectoryStore>, config: &PctConfig) -> Self {
        Self::new(
            TokenRepository::from_config(store, config),
            config.cleanup.batch_size,
        )
    }

    pub fn repository(&self) -> &TokenRepository {
        &self.repository
    }

    pub fn sweeper(&self) -> &ExpirySweeper {
        &self.sweeper
    }

    pub async fn create_token(&self, client_id: &str) -> ClaimsToken {
        self.repository.create_token(client_id).await
    }

    pub async fn merge_claims(
        &self,
        current: Option<ClaimsToken>,
        id_claims: Option<&Claims>,
        client_id: &str,
        grants: &[PermissionGrant],
    ) -> MergeOutcome {
        self.merger
            .update_claims(current, id_claims, client_id, grants)
            .await
    }

    pub async fn find_by_code(&self, code: &str) -> Option<ClaimsToken> {
        self.repository.find_by_code(code).await
    }

    pub async fn delete_by_code(&self, code: &str) {
        self.repository.delete_by_code(code).await
    }

    pub async fn delete_many<S: AsRef<str>>(&self, codes: &[S]) {
        self.repository.delete_many(codes).await
    }

    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> SweepReport {
        self.sweeper.sweep_expired(now).await
    }
}
