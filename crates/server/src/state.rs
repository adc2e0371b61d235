//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::PgCustomerStore;
use crate::dedup::CachedDuplicateChecker;
use crate::ids::SnowflakeIdGenerator;
use crate::services::CustomerService;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    customers: CustomerService,
}

impl AppState {
    /// Wire the long-lived collaborators and build the shared state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let store = Arc::new(PgCustomerStore::new(pool));
        let checker = Arc::new(CachedDuplicateChecker::new(
            config.submission_ttl,
            config.submission_capacity,
        ));
        let ids = Arc::new(SnowflakeIdGenerator::new(config.node_id));

        let customers =
            CustomerService::new(store, checker, ids, config.duplicate_check_enabled);

        Self {
            inner: Arc::new(AppStateInner { config, customers }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn customers(&self) -> &CustomerService {
        &self.inner.customers
    }
}
