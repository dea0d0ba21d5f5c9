//! Expiry sweeper: deletes tokens whose expiration has passed.
//!
//! The token branch is scanned in chunks of `batch_size` entries matching
//! `expiration <= now`. Entries that fail to delete stay at the front of the
//! ordered result set, so the next chunk starts after them. The scan ends on
//! a short or empty chunk.

use crate::repository::{TokenRepository, attrs};
use chrono::{DateTime, Utc};
use pct_store::{Entry, Filter, decode_generalized_time, encode_generalized_time};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Chunk size shared with the other periodic cleanup jobs.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Counters from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Chunks fetched.
    pub chunks: usize,
    /// Entries deleted.
    pub deleted: usize,
    /// Entries whose deletion failed.
    pub failed: usize,
    /// Entries matched by the broad fallback filter but not yet expired.
    pub skipped: usize,
}

/// Deletes expired tokens in bounded chunks.
#[derive(Clone)]
pub struct ExpirySweeper {
    repository: TokenRepository,
    batch_size: usize,
}

impl ExpirySweeper {
    pub fn new(repository: TokenRepository) -> Self {
        Self::with_batch_size(repository, DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(repository: TokenRepository, batch_size: usize) -> Self {
        Self {
            repository,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Delete every token expiring at or before `now`.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        if let Err(e) = self.repository.prepare_branch().await {
            tracing::error!("Failed to prepare PCT branch for cleanup: {}", e);
            return report;
        }

        let (filter, broad) = match encode_generalized_time(now) {
            Ok(encoded) => (Filter::less_or_equal(attrs::EXPIRATION, encoded), false),
            Err(e) => {
                tracing::trace!("Falling back to presence filter: {}", e);
                (Filter::present(attrs::EXPIRATION), true)
            }
        };

        let mut offset = 0;
        loop {
            let chunk = match self
                .repository
                .find_entries(filter.clone(), offset, self.batch_size)
                .await
            {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::error!("Failed to fetch expired PCT chunk: {}", e);
                    break;
                }
            };
            if chunk.is_empty() {
                break;
            }

            report.chunks += 1;
            let fetched = chunk.len();

            for entry in chunk {
                if broad && !expired_at(&entry, now) {
                    report.skipped += 1;
                    offset += 1;
                    continue;
                }
                match self.repository.remove_entry(&entry.dn).await {
                    Ok(()) => report.deleted += 1,
                    Err(e) => {
                        tracing::error!("Failed to remove entry {}: {}", entry.dn, e);
                        report.failed += 1;
                        offset += 1;
                    }
                }
            }

            if fetched < self.batch_size {
                break;
            }
        }

        if report.deleted > 0 || report.failed > 0 {
            tracing::info!(
                deleted = report.deleted,
                failed = report.failed,
                chunks = report.chunks,
                "PCT cleanup finished"
            );
        }
        report
    }
}

/// Expiration check for entries matched by the presence filter.
/// Unreadable expirations count as expired.
fn expired_at(entry: &Entry, now: DateTime<Utc>) -> bool {
    entry
        .get(attrs::EXPIRATION)
        .and_then(|raw| decode_generalized_time(raw).ok())
        .is_none_or(|expiration| expiration <= now)
}

/// Run `sweeper` against the current time every `every`.
///
/// The first sweep runs immediately. A sweep that overruns the interval
/// pushes the next one back instead of triggering catch-up sweeps.
pub fn spawn_periodic(sweeper: ExpirySweeper, every: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let report = sweeper.sweep_expired(Utc::now()).await;
            tracing::debug!(?report, "PCT cleanup tick");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use pct_core::ClaimsToken;
    use pct_store::{DirectoryStore, Dn, MemoryDirectory};
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryDirectory>, TokenRepository) {
        let base = Dn::new("ou=uma,o=gluu");
        let store = Arc::new(MemoryDirectory::new([base.clone()]));
        let repo = TokenRepository::new(store.clone(), base, 0);
        (store, repo)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    async fn seed(repo: &TokenRepository, code: &str, expires_at: DateTime<Utc>) {
        let created_at = expires_at - Duration::hours(1);
        let mut token = ClaimsToken::issued_at(code, "c", created_at, Duration::hours(1));
        token.expires_at = expires_at;
        repo.try_save(&token).await.unwrap();
    }

    #[tokio::test]
    async fn test_boundary() {
        let (_, repo) = setup();
        seed(&repo, "due", now()).await;
        seed(&repo, "later", now() + Duration::seconds(1)).await;
        seed(&repo, "past", now() - Duration::days(2)).await;

        let report = ExpirySweeper::new(repo.clone()).sweep_expired(now()).await;

        assert_eq!(report.deleted, 2);
        assert!(repo.find_by_code("due").await.is_none());
        assert!(repo.find_by_code("past").await.is_none());
        assert!(repo.find_by_code("later").await.is_some());
    }

    #[tokio::test]
    async fn test_many_chunks() {
        let (_, repo) = setup();
        for i in 0..25 {
            seed(&repo, &format!("old-{:02}", i), now() - Duration::minutes(i)).await;
        }
        for i in 0..3 {
            seed(&repo, &format!("new-{}", i), now() + Duration::minutes(5)).await;
        }

        let report = ExpirySweeper::with_batch_size(repo.clone(), 10)
            .sweep_expired(now())
            .await;

        assert_eq!(report.deleted, 25);
        assert_eq!(report.failed, 0);
        assert_eq!(report.chunks, 3);
        for i in 0..3 {
            assert!(repo.find_by_code(&format!("new-{}", i)).await.is_some());
        }
    }

    #[tokio::test]
    async fn test_empty_namespace_bootstraps_branch() {
        let (store, repo) = setup();
        let report = ExpirySweeper::new(repo.clone()).sweep_expired(now()).await;

        assert_eq!(report, SweepReport::default());
        assert!(store.exists(repo.branch_dn()).await.unwrap());
    }

    #[tokio::test]
    async fn test_unencodable_now_falls_back_to_presence_scan() {
        let (_, repo) = setup();
        seed(&repo, "old", now()).await;
        seed(&repo, "older", now() - Duration::days(30)).await;

        let far_future = NaiveDate::from_ymd_opt(10000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        let report = ExpirySweeper::new(repo.clone()).sweep_expired(far_future).await;

        assert_eq!(report.deleted, 2);
        assert!(repo.find_by_code("old").await.is_none());
    }

    #[tokio::test]
    async fn test_presence_scan_skips_live_records() {
        let (_, repo) = setup();
        for code in ["a", "b", "c"] {
            seed(&repo, code, now()).await;
        }

        let before_year_zero = NaiveDate::from_ymd_opt(-1, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        let report = ExpirySweeper::with_batch_size(repo.clone(), 2)
            .sweep_expired(before_year_zero)
            .await;

        assert_eq!(
            report,
            SweepReport {
                chunks: 2,
                deleted: 0,
                failed: 0,
                skipped: 3,
            }
        );
        for code in ["a", "b", "c"] {
            assert!(repo.find_by_code(code).await.is_some());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_sweeps_on_every_tick() {
        let (_, repo) = setup();
        seed(&repo, "first", Utc::now() - Duration::hours(1)).await;

        let handle = spawn_periodic(
            ExpirySweeper::new(repo.clone()),
            std::time::Duration::from_secs(60),
        );

        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        assert!(repo.find_by_code("first").await.is_none());

        seed(&repo, "second", Utc::now() - Duration::hours(1)).await;
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        assert!(repo.find_by_code("second").await.is_some());

        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        assert!(repo.find_by_code("second").await.is_none());

        handle.abort();
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let (_, repo) = setup();
        assert_eq!(ExpirySweeper::with_batch_size(repo, 0).batch_size(), 1);
    }
}
