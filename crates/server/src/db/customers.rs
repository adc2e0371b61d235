//! Customer repository for database operations.
//!
//! The [`CustomerStore`] trait is the persistence contract the customer
//! service is written against; [`PgCustomerStore`] is the `PostgreSQL`
//! implementation. Queries use the runtime sqlx API because the filtered
//! scans are assembled dynamically with `QueryBuilder`.
//!
//! Every write executes inside its own transaction and is scoped by
//! `uid AND NOT deleted`, so a record can never be mutated across owners or
//! resurrected after deletion.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use ledgerbook_core::{CustomerId, CustomerKind, UserId};

use super::RepositoryError;
use crate::models::Customer;

/// Filter applied to customer scans and counts.
///
/// The base predicate `uid = ? AND deleted = FALSE` is always applied on top.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerFilter {
    /// Restrict to one kind; `None` means all kinds.
    pub kind: Option<CustomerKind>,
    /// Additionally restrict to `hidden = FALSE`.
    pub visible_only: bool,
}

/// A limit/offset window over an ordered scan.
#[derive(Debug, Clone, Copy)]
pub struct PageSlice {
    pub limit: i64,
    pub offset: i64,
}

/// Persistence contract for customer records.
///
/// Implementations must order scans by `created_unix_time DESC, id DESC` -
/// newest first, with the id as a deterministic tie-break - and must report
/// the number of rows a write actually touched so callers can observe
/// fetch-then-write races.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Scan non-deleted records of one user, newest first.
    async fn list(
        &self,
        uid: UserId,
        filter: CustomerFilter,
        slice: Option<PageSlice>,
    ) -> Result<Vec<Customer>, RepositoryError>;

    /// Count non-deleted records of one user under the same predicate as
    /// [`CustomerStore::list`].
    async fn count(&self, uid: UserId, filter: CustomerFilter) -> Result<i64, RepositoryError>;

    /// Point lookup of a non-deleted record under one owner.
    async fn get(
        &self,
        uid: UserId,
        id: CustomerId,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Insert a fully populated record in one transaction.
    async fn insert(&self, customer: &Customer) -> Result<(), RepositoryError>;

    /// Persist the mutable field set plus `updated_unix_time`.
    async fn update_fields(&self, customer: &Customer) -> Result<u64, RepositoryError>;

    /// Flip the soft-delete flag and stamp the deletion timestamps.
    async fn mark_deleted(&self, customer: &Customer) -> Result<u64, RepositoryError>;

    /// Persist the visibility flag plus `updated_unix_time`.
    async fn set_hidden(&self, customer: &Customer) -> Result<u64, RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    uid: i64,
    name: String,
    customer_type: i16,
    address: String,
    contacts: String,
    contacts_info: String,
    comment: String,
    hidden: bool,
    deleted: bool,
    created_unix_time: i64,
    updated_unix_time: i64,
    deleted_unix_time: i64,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let kind = CustomerKind::try_from(row.customer_type).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid customer kind in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            uid: UserId::new(row.uid),
            name: row.name,
            kind,
            address: row.address,
            contacts: row.contacts,
            contacts_info: row.contacts_info,
            comment: row.comment,
            hidden: row.hidden,
            deleted: row.deleted,
            created_unix_time: row.created_unix_time,
            updated_unix_time: row.updated_unix_time,
            deleted_unix_time: row.deleted_unix_time,
        })
    }
}

const SELECT_COLUMNS: &str = "id, uid, name, customer_type, address, contacts, \
                              contacts_info, comment, hidden, deleted, \
                              created_unix_time, updated_unix_time, deleted_unix_time";

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL`-backed customer store.
#[derive(Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    /// Create a new customer store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, uid: UserId, filter: CustomerFilter) {
        builder.push(" WHERE uid = ");
        builder.push_bind(uid.as_i64());
        builder.push(" AND deleted = FALSE");

        if let Some(kind) = filter.kind {
            builder.push(" AND customer_type = ");
            builder.push_bind(kind.as_i16());
        }

        if filter.visible_only {
            builder.push(" AND hidden = FALSE");
        }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn list(
        &self,
        uid: UserId,
        filter: CustomerFilter,
        slice: Option<PageSlice>,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let mut builder =
            QueryBuilder::new(format!("SELECT {SELECT_COLUMNS} FROM customer"));
        Self::push_filter(&mut builder, uid, filter);
        builder.push(" ORDER BY created_unix_time DESC, id DESC");

        if let Some(slice) = slice {
            builder.push(" LIMIT ");
            builder.push_bind(slice.limit);
            builder.push(" OFFSET ");
            builder.push_bind(slice.offset);
        }

        let rows: Vec<CustomerRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self, uid: UserId, filter: CustomerFilter) -> Result<i64, RepositoryError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM customer");
        Self::push_filter(&mut builder, uid, filter);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn get(
        &self,
        uid: UserId,
        id: CustomerId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM customer \
             WHERE uid = $1 AND deleted = FALSE AND id = $2"
        ))
        .bind(uid.as_i64())
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn insert(&self, customer: &Customer) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO customer (\
                 id, uid, name, customer_type, address, contacts, contacts_info, \
                 comment, hidden, deleted, created_unix_time, updated_unix_time, \
                 deleted_unix_time\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(customer.id.as_i64())
        .bind(customer.uid.as_i64())
        .bind(&customer.name)
        .bind(customer.kind.as_i16())
        .bind(&customer.address)
        .bind(&customer.contacts)
        .bind(&customer.contacts_info)
        .bind(&customer.comment)
        .bind(customer.hidden)
        .bind(customer.deleted)
        .bind(customer.created_unix_time)
        .bind(customer.updated_unix_time)
        .bind(customer.deleted_unix_time)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_fields(&self, customer: &Customer) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE customer SET \
                 name = $1, customer_type = $2, address = $3, contacts = $4, \
                 contacts_info = $5, comment = $6, hidden = $7, updated_unix_time = $8 \
             WHERE id = $9 AND uid = $10 AND deleted = FALSE",
        )
        .bind(&customer.name)
        .bind(customer.kind.as_i16())
        .bind(&customer.address)
        .bind(&customer.contacts)
        .bind(&customer.contacts_info)
        .bind(&customer.comment)
        .bind(customer.hidden)
        .bind(customer.updated_unix_time)
        .bind(customer.id.as_i64())
        .bind(customer.uid.as_i64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn mark_deleted(&self, customer: &Customer) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE customer SET \
                 deleted = TRUE, deleted_unix_time = $1, updated_unix_time = $2 \
             WHERE id = $3 AND uid = $4 AND deleted = FALSE",
        )
        .bind(customer.deleted_unix_time)
        .bind(customer.updated_unix_time)
        .bind(customer.id.as_i64())
        .bind(customer.uid.as_i64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn set_hidden(&self, customer: &Customer) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE customer SET hidden = $1, updated_unix_time = $2 \
             WHERE id = $3 AND uid = $4 AND deleted = FALSE",
        )
        .bind(customer.hidden)
        .bind(customer.updated_unix_time)
        .bind(customer.id.as_i64())
        .bind(customer.uid.as_i64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
