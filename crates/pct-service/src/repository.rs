//! Token repository: CRUD for claims tokens on top of a directory store.
//!
//! Tokens live under `ou=pct,<base dn>`, one entry per token with RDN
//! `tokenCode=<code>`. The branch is created on first write.
//!
//! Public operations log and absorb store failures; the `try_*` variants
//! return them.

use crate::error::PctError;
use chrono::Duration;
use pct_core::{Claims, ClaimsToken, PctConfig, effective_lifetime};
use pct_store::{
    DirectoryStore, Dn, Entry, Filter, SearchRequest, SearchScope, decode_generalized_time,
    encode_generalized_time,
};
use std::sync::Arc;

/// Object class of token entries.
pub const TOKEN_OBJECT_CLASS: &str = "pctToken";

/// Organizational unit holding token entries.
pub const BRANCH_OU: &str = "pct";

/// Attribute names of a token entry.
pub mod attrs {
    pub const CODE: &str = "tokenCode";
    pub const CLIENT_ID: &str = "clientId";
    pub const CLAIMS: &str = "claims";
    pub const EXPIRATION: &str = "expiration";
    pub const CREATED: &str = "creationDate";
}

/// Repository of claims tokens.
#[derive(Clone)]
pub struct TokenRepository {
    store: Arc<dyn DirectoryStore>,
    branch_dn: Dn,
    lifetime: Duration,
}

impl TokenRepository {
    /// Create a repository rooted at `base_dn`.
    ///
    /// A `lifetime_secs` that is not positive or exceeds `i32::MAX` selects the
    /// built-in default.
    pub fn new(store: Arc<dyn DirectoryStore>, base_dn: Dn, lifetime_secs: i64) -> Self {
        Self {
            store,
            branch_dn: base_dn.child("ou", BRANCH_OU),
            lifetime: effective_lifetime(lifetime_secs),
        }
    }

    pub fn from_config(store: Arc<dyn DirectoryStore>, config: &PctConfig) -> Self {
        Self::new(
            store,
            Dn::new(config.base_dn.as_str()),
            config.token.lifetime_secs,
        )
    }

    /// Lifetime applied to new tokens.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// DN of the branch holding all tokens.
    pub fn branch_dn(&self) -> &Dn {
        &self.branch_dn
    }

    /// DN of the token with `code`.
    pub fn dn(&self, code: &str) -> Result<Dn, PctError> {
        if code.trim().is_empty() {
            return Err(PctError::InvalidCode);
        }
        Ok(self.branch_dn.child(attrs::CODE, code))
    }

    /// Create the token branch if it does not exist yet.
    pub async fn prepare_branch(&self) -> Result<(), PctError> {
        self.store.ensure_branch(&self.branch_dn, BRANCH_OU).await?;
        Ok(())
    }

    /// Build a token for `client_id` without persisting it.
    pub fn new_token(&self, client_id: &str) -> ClaimsToken {
        ClaimsToken::new(client_id, self.lifetime)
    }

    /// Build and persist a fresh token for `client_id`.
    ///
    /// The token is returned even if persisting it failed.
    pub async fn create_token(&self, client_id: &str) -> ClaimsToken {
        let token = self.new_token(client_id);
        self.persist(&token).await;
        token
    }

    /// Persist a new token, logging failures.
    pub async fn persist(&self, token: &ClaimsToken) {
        if let Err(e) = self.try_persist(token).await {
            tracing::error!("Failed to persist PCT, code: {}. {}", token.code, e);
        }
    }

    pub async fn try_persist(&self, token: &ClaimsToken) -> Result<(), PctError> {
        self.prepare_branch().await?;
        self.store.create(self.to_entry(token)?).await?;
        tracing::debug!("Persisted PCT {}", token.code);
        Ok(())
    }

    /// Write a token back, creating it if it is absent. Failures are logged.
    pub async fn save(&self, token: &ClaimsToken) {
        if let Err(e) = self.try_save(token).await {
            tracing::error!("Failed to save PCT, code: {}. {}", token.code, e);
        }
    }

    pub async fn try_save(&self, token: &ClaimsToken) -> Result<(), PctError> {
        self.prepare_branch().await?;
        self.store.upsert(self.to_entry(token)?).await?;
        Ok(())
    }

    /// Look up a token by code. Store failures are logged and read as absent.
    pub async fn find_by_code(&self, code: &str) -> Option<ClaimsToken> {
        match self.try_find_by_code(code).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!("Failed to find PCT by code: {}. {}", code, e);
                None
            }
        }
    }

    pub async fn try_find_by_code(&self, code: &str) -> Result<Option<ClaimsToken>, PctError> {
        let request = SearchRequest::new(self.branch_dn.clone(), Filter::equals(attrs::CODE, code))
            .object_class(TOKEN_OBJECT_CLASS)
            .chunk(0, 1);

        match self.store.find(&request).await?.into_iter().next() {
            Some(entry) => Ok(Some(Self::from_entry(&entry)?)),
            None => {
                tracing::debug!("No PCT found for code: {}", code);
                Ok(None)
            }
        }
    }

    /// Remove a token. Already-absent tokens are not an error.
    pub async fn delete(&self, token: &ClaimsToken) {
        self.delete_by_code(&token.code).await;
    }

    /// Remove the token with `code`. Failures are logged.
    pub async fn delete_by_code(&self, code: &str) {
        if let Err(e) = self.try_delete_by_code(code).await {
            tracing::error!("Failed to remove PCT, code: {}. {}", code, e);
        }
    }

    pub async fn try_delete_by_code(&self, code: &str) -> Result<(), PctError> {
        let dn = self.dn(code)?;
        self.remove_entry(&dn).await
    }

    /// Remove every token in `codes`.
    pub async fn delete_many<S: AsRef<str>>(&self, codes: &[S]) {
        for code in codes {
            self.delete_by_code(code.as_ref()).await;
        }
    }

    /// Remove every token in `tokens`.
    pub async fn delete_all(&self, tokens: &[ClaimsToken]) {
        for token in tokens {
            self.delete(token).await;
        }
    }

    /// One chunk of token entries below the branch matching `filter`.
    pub(crate) async fn find_entries(
        &self,
        filter: Filter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Entry>, PctError> {
        let request = SearchRequest::new(self.branch_dn.clone(), filter)
            .object_class(TOKEN_OBJECT_CLASS)
            .scope(SearchScope::Sub)
            .chunk(offset, limit);
        Ok(self.store.find(&request).await?)
    }

    /// Delete the entry at `dn`, treating a missing entry as success.
    pub(crate) async fn remove_entry(&self, dn: &Dn) -> Result<(), PctError> {
        match self.store.delete(dn).await {
            Ok(()) => {
                tracing::debug!("Removed PCT entry {}", dn);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("PCT entry {} already removed", dn);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn to_entry(&self, token: &ClaimsToken) -> Result<Entry, PctError> {
        Ok(Entry::new(self.dn(&token.code)?, TOKEN_OBJECT_CLASS)
            .with(attrs::CODE, token.code.as_str())
            .with(attrs::CLIENT_ID, token.client_id.as_str())
            .with(attrs::CLAIMS, token.claims.to_json()?)
            .with(attrs::EXPIRATION, encode_generalized_time(token.expires_at)?)
            .with(attrs::CREATED, encode_generalized_time(token.created_at)?))
    }

    fn from_entry(entry: &Entry) -> Result<ClaimsToken, PctError> {
        let corrupt = |reason: String| PctError::CorruptRecord {
            dn: entry.dn.to_string(),
            reason,
        };
        let required = |name: &str| {
            entry
                .get(name)
                .ok_or_else(|| corrupt(format!("missing attribute {}", name)))
        };

        let claims = match entry.get(attrs::CLAIMS) {
            Some(raw) if !raw.trim().is_empty() => Claims::from_json(raw)?,
            _ => Claims::new(),
        };

        Ok(ClaimsToken {
            code: required(attrs::CODE)?.to_string(),
            client_id: required(attrs::CLIENT_ID)?.to_string(),
            claims,
            created_at: decode_generalized_time(required(attrs::CREATED)?)?,
            expires_at: decode_generalized_time(required(attrs::EXPIRATION)?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pct_store::MemoryDirectory;
    use serde_json::json;

    fn base_dn() -> Dn {
        Dn::new("ou=uma,o=gluu")
    }

    fn repository(lifetime_secs: i64) -> (Arc<MemoryDirectory>, TokenRepository) {
        let store = Arc::new(MemoryDirectory::new([base_dn()]));
        let repo = TokenRepository::new(store.clone(), base_dn(), lifetime_secs);
        (store, repo)
    }

    #[test]
    fn test_dn_layout() {
        let (_, repo) = repository(0);
        assert_eq!(repo.branch_dn().as_str(), "ou=pct,ou=uma,o=gluu");
        assert_eq!(
            repo.dn("abc_123").unwrap().as_str(),
            "tokenCode=abc_123,ou=pct,ou=uma,o=gluu"
        );
    }

    #[test]
    fn test_blank_code_rejected() {
        let (_, repo) = repository(0);
        assert!(matches!(repo.dn(""), Err(PctError::InvalidCode)));
        assert!(matches!(repo.dn("   "), Err(PctError::InvalidCode)));
        assert!(matches!(repo.dn("\t\n"), Err(PctError::InvalidCode)));
        assert_eq!(PctError::InvalidCode.to_string(), "token code is blank");
    }

    #[tokio::test]
    async fn test_create_bootstraps_branch_and_persists() {
        let (store, repo) = repository(0);
        assert!(!store.exists(repo.branch_dn()).await.unwrap());

        let before = Utc::now();
        let token = repo.create_token("client42").await;

        assert!(store.exists(repo.branch_dn()).await.unwrap());
        assert!(!token.code.trim().is_empty());
        assert!(token.claims.is_empty());
        assert!(token.expires_at >= before + Duration::seconds(3600));
        assert!(token.expires_at <= Utc::now() + Duration::seconds(3600));

        let found = repo.find_by_code(&token.code).await.unwrap();
        assert_eq!(found.code, token.code);
        assert_eq!(found.client_id, "client42");
    }

    #[tokio::test]
    async fn test_configured_lifetime() {
        let (_, repo) = repository(90);
        let token = repo.new_token("c");
        assert_eq!(token.expires_at - token.created_at, Duration::seconds(90));
    }

    #[tokio::test]
    async fn test_oversized_lifetime_still_creates_storable_tokens() {
        for lifetime_secs in [400_000_000_000, 9_000_000_000_000] {
            let (_, repo) = repository(lifetime_secs);
            assert_eq!(repo.lifetime(), Duration::seconds(3600));

            let token = repo.create_token("c").await;
            assert!(repo.find_by_code(&token.code).await.is_some());
        }
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let (_, repo) = repository(0);
        assert!(repo.find_by_code("nope").await.is_none());
        assert!(repo.try_find_by_code("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_claims() {
        let (_, repo) = repository(0);
        let mut token = repo.create_token("c").await;

        token.claims.set("email", "a@example.org");
        token.claims.set("groups", json!(["x", "y"]));
        repo.save(&token).await;

        let found = repo.find_by_code(&token.code).await.unwrap();
        assert_eq!(found.claims, token.claims);
    }

    #[tokio::test]
    async fn test_save_recreates_missing_record() {
        let (_, repo) = repository(0);
        let token = repo.new_token("c");

        repo.try_save(&token).await.unwrap();
        assert!(repo.find_by_code(&token.code).await.is_some());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_, repo) = repository(0);
        let token = repo.create_token("c").await;

        repo.try_delete_by_code(&token.code).await.unwrap();
        repo.try_delete_by_code(&token.code).await.unwrap();
        repo.try_delete_by_code("never-existed").await.unwrap();
        repo.delete(&token).await;

        assert!(repo.find_by_code(&token.code).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_many_and_all() {
        let (store, repo) = repository(0);
        let a = repo.create_token("c").await;
        let b = repo.create_token("c").await;
        let c = repo.create_token("c").await;

        repo.delete_many(&[a.code.clone(), "missing".to_string()]).await;
        assert!(repo.find_by_code(&a.code).await.is_none());
        assert!(repo.find_by_code(&b.code).await.is_some());

        repo.delete_all(&[b.clone(), c.clone()]).await;
        // Only the branch entry remains.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_timestamps_survive_at_millisecond_precision() {
        let (_, repo) = repository(0);
        let token = repo.create_token("c").await;
        let found = repo.find_by_code(&token.code).await.unwrap();

        let drift = (found.expires_at - token.expires_at).num_milliseconds().abs();
        assert!(drift < 1);
    }

    #[tokio::test]
    async fn test_corrupt_record_reported() {
        let (store, repo) = repository(0);
        repo.prepare_branch().await.unwrap();
        let dn = repo.dn("broken").unwrap();
        store
            .create(Entry::new(dn, TOKEN_OBJECT_CLASS).with(attrs::CODE, "broken"))
            .await
            .unwrap();

        assert!(matches!(
            repo.try_find_by_code("broken").await,
            Err(PctError::CorruptRecord { .. })
        ));
        assert!(repo.find_by_code("broken").await.is_none());
    }
}
