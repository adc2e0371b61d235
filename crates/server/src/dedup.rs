//! Duplicate submission tracking.
//!
//! Network retries and double-clicks make clients re-send "create" requests.
//! Each logical submission carries an opaque client session token; after a
//! create succeeds, the resulting record id is remembered under
//! `(kind, user, token)` for a short window so a replay of the same token
//! returns the already-created record instead of minting a second one.
//!
//! The tracker is an optimization, not a correctness invariant: entries
//! expire, and the check-then-act window with the store is not atomic.
//! Implementations are therefore infallible by contract - a backend that can
//! fail (a remote cache, say) must swallow and log its own errors and report
//! a miss, because a create request must never fail on tracker trouble.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use ledgerbook_core::UserId;

/// Which kind of submission a tracker entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    NewCustomer,
}

impl SubmissionKind {
    const fn code(self) -> u8 {
        match self {
            Self::NewCustomer => 1,
        }
    }
}

/// Short-lived map from `(kind, user, token)` to a result remark.
#[async_trait]
pub trait DuplicateChecker: Send + Sync {
    /// Look up the remark recorded for a submission, if it has not expired.
    async fn get_submission(
        &self,
        kind: SubmissionKind,
        uid: UserId,
        token: &str,
    ) -> Option<String>;

    /// Record the remark for a submission. Best effort.
    async fn set_submission(&self, kind: SubmissionKind, uid: UserId, token: &str, remark: String);
}

/// In-process duplicate checker over a TTL-bounded moka cache.
pub struct CachedDuplicateChecker {
    cache: Cache<String, String>,
}

impl CachedDuplicateChecker {
    /// Create a checker whose entries expire after `ttl` and which holds at
    /// most `capacity` entries.
    #[must_use]
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    fn key(kind: SubmissionKind, uid: UserId, token: &str) -> String {
        format!("{}:{}:{}", kind.code(), uid, token)
    }
}

#[async_trait]
impl DuplicateChecker for CachedDuplicateChecker {
    async fn get_submission(
        &self,
        kind: SubmissionKind,
        uid: UserId,
        token: &str,
    ) -> Option<String> {
        self.cache.get(&Self::key(kind, uid, token)).await
    }

    async fn set_submission(&self, kind: SubmissionKind, uid: UserId, token: &str, remark: String) {
        self.cache.insert(Self::key(kind, uid, token), remark).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_miss_on_unknown_token() {
        let checker = CachedDuplicateChecker::new(Duration::from_secs(60), 100);
        let found = checker
            .get_submission(SubmissionKind::NewCustomer, UserId::new(1), "token-a")
            .await;
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_hit_after_set() {
        let checker = CachedDuplicateChecker::new(Duration::from_secs(60), 100);
        checker
            .set_submission(
                SubmissionKind::NewCustomer,
                UserId::new(1),
                "token-a",
                "42".to_string(),
            )
            .await;

        let found = checker
            .get_submission(SubmissionKind::NewCustomer, UserId::new(1), "token-a")
            .await;
        assert_eq!(found.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_entries_are_scoped_per_user() {
        let checker = CachedDuplicateChecker::new(Duration::from_secs(60), 100);
        checker
            .set_submission(
                SubmissionKind::NewCustomer,
                UserId::new(1),
                "token-a",
                "42".to_string(),
            )
            .await;

        let other_user = checker
            .get_submission(SubmissionKind::NewCustomer, UserId::new(2), "token-a")
            .await;
        assert!(other_user.is_none());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let checker = CachedDuplicateChecker::new(Duration::from_millis(50), 100);
        checker
            .set_submission(
                SubmissionKind::NewCustomer,
                UserId::new(1),
                "token-a",
                "42".to_string(),
            )
            .await;

        tokio::time::sleep(Duration::from_millis(120)).await;

        let found = checker
            .get_submission(SubmissionKind::NewCustomer, UserId::new(1), "token-a")
            .await;
        assert!(found.is_none());
    }
}
