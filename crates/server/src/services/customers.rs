//! Customer record service.
//!
//! Owns every read and write on customer records: filtered listing with
//! pagination, point lookup, idempotent creation, diff-based modification,
//! soft deletion and visibility toggling. The service itself is stateless
//! per call; it is constructed once with its three collaborators (record
//! store, duplicate checker, identifier generator) and shared behind the
//! application state.
//!
//! Concurrency correctness is delegated to the store: each write runs in its
//! own transaction scoped by `uid AND NOT deleted`, and no transaction is
//! ever held open across a call to the duplicate checker or the identifier
//! generator. Two concurrent modifies on the same record are
//! last-write-wins.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use ledgerbook_core::{CustomerId, CustomerKind, UserId};

use crate::db::{CustomerFilter, CustomerStore, PageSlice, RepositoryError};
use crate::dedup::{DuplicateChecker, SubmissionKind};
use crate::error::CustomerError;
use crate::ids::{IdGenerator, IdKind};
use crate::models::customer::{
    ADDRESS_MAX_LEN, COMMENT_MAX_LEN, CONTACTS_INFO_MAX_LEN, CONTACTS_MAX_LEN, Customer,
    CustomerFields, CustomerPage, NAME_MAX_LEN,
};

/// Page size applied when a client sends a non-positive one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Customer record service.
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
    checker: Arc<dyn DuplicateChecker>,
    ids: Arc<dyn IdGenerator>,
    dedup_enabled: bool,
}

impl CustomerService {
    /// Create a new customer service wired to its collaborators.
    ///
    /// `dedup_enabled` switches duplicate-submission collapsing on the
    /// create path; when off, client session tokens are ignored entirely.
    #[must_use]
    pub fn new(
        store: Arc<dyn CustomerStore>,
        checker: Arc<dyn DuplicateChecker>,
        ids: Arc<dyn IdGenerator>,
        dedup_enabled: bool,
    ) -> Self {
        Self {
            store,
            checker,
            ids,
            dedup_enabled,
        }
    }

    /// List all live customers of a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUserId` for a non-positive uid and `Store` if the
    /// scan fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        uid: UserId,
        kind: Option<CustomerKind>,
        visible_only: bool,
    ) -> Result<Vec<Customer>, CustomerError> {
        check_uid(uid)?;

        self.store
            .list(uid, CustomerFilter { kind, visible_only }, None)
            .await
            .map_err(|e| store_failure("list customers", uid, e))
    }

    /// Count live customers of a user under the same predicate as
    /// [`Self::list`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidUserId` for a non-positive uid and `Store` if the
    /// count fails.
    #[instrument(skip(self))]
    pub async fn count(
        &self,
        uid: UserId,
        kind: Option<CustomerKind>,
        visible_only: bool,
    ) -> Result<i64, CustomerError> {
        check_uid(uid)?;

        self.store
            .count(uid, CustomerFilter { kind, visible_only })
            .await
            .map_err(|e| store_failure("count customers", uid, e))
    }

    /// List one page of live customers plus the pager numbers.
    ///
    /// Non-positive `page` is clamped to 1, non-positive `page_size` to the
    /// default of 20. `total_pages` is `ceil(total / page_size)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUserId` for a non-positive uid and `Store` if the
    /// count or scan fails.
    #[instrument(skip(self))]
    pub async fn list_page(
        &self,
        uid: UserId,
        kind: Option<CustomerKind>,
        visible_only: bool,
        page: i64,
        page_size: i64,
    ) -> Result<CustomerPage, CustomerError> {
        check_uid(uid)?;

        let page = page.max(1);
        let page_size = if page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };

        let filter = CustomerFilter { kind, visible_only };

        let total = self
            .store
            .count(uid, filter)
            .await
            .map_err(|e| store_failure("count customers", uid, e))?;

        let customers = self
            .store
            .list(
                uid,
                filter,
                Some(PageSlice {
                    limit: page_size,
                    offset: (page - 1) * page_size,
                }),
            )
            .await
            .map_err(|e| store_failure("list customers", uid, e))?;

        let total_pages = total / page_size + i64::from(total % page_size > 0);

        Ok(CustomerPage {
            total,
            page,
            page_size,
            total_pages,
            customers,
        })
    }

    /// Fetch one live customer of a user.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCustomerId` for a non-positive id, `NotFound` if no
    /// live record exists under that owner, and `Store` on query failure.
    #[instrument(skip(self))]
    pub async fn get(&self, uid: UserId, id: CustomerId) -> Result<Customer, CustomerError> {
        check_uid(uid)?;
        if id.as_i64() <= 0 {
            return Err(CustomerError::InvalidCustomerId);
        }

        self.store
            .get(uid, id)
            .await
            .map_err(|e| store_failure("get customer", uid, e))?
            .ok_or(CustomerError::NotFound)
    }

    /// Create a customer record, collapsing duplicate client submissions.
    ///
    /// When duplicate checking is enabled and `client_session_id` is
    /// non-empty, a replay of an already-seen token returns the record the
    /// first submission created (re-read from the store, so later edits are
    /// reflected) instead of creating another one. An unreadable tracker
    /// entry is ignored and creation proceeds; tracker registration after
    /// the insert is best effort and never fails the request.
    ///
    /// # Errors
    ///
    /// Validation failures (`NameRequired`, `*TooLong`) are returned before
    /// any side effect - no identifier is consumed and nothing is recorded
    /// in the tracker. `SystemBusy` means identifier generation failed and
    /// the caller may retry; `Store` covers insert failures.
    #[instrument(skip(self, fields, client_session_id))]
    pub async fn create(
        &self,
        uid: UserId,
        fields: CustomerFields,
        client_session_id: &str,
    ) -> Result<Customer, CustomerError> {
        check_uid(uid)?;
        validate_fields(&fields)?;

        let track_submission = self.dedup_enabled && !client_session_id.is_empty();

        if track_submission
            && let Some(remark) = self
                .checker
                .get_submission(SubmissionKind::NewCustomer, uid, client_session_id)
                .await
        {
            if let Ok(existing_id) = remark.parse::<i64>() {
                info!(
                    %uid,
                    customer_id = existing_id,
                    "duplicate submission, returning existing customer"
                );
                return self.get(uid, CustomerId::new(existing_id)).await;
            }
            warn!(%uid, %remark, "unreadable submission remark, creating anyway");
        }

        let id = self.ids.next(IdKind::Customer);
        if id < 1 {
            error!(%uid, "identifier generator returned an invalid id");
            return Err(CustomerError::SystemBusy);
        }

        let now = Utc::now().timestamp();
        let customer = Customer {
            id: CustomerId::new(id),
            uid,
            name: fields.name,
            kind: fields.kind,
            address: fields.address,
            contacts: fields.contacts,
            contacts_info: fields.contacts_info,
            comment: fields.comment,
            hidden: fields.hidden,
            deleted: false,
            created_unix_time: now,
            updated_unix_time: now,
            deleted_unix_time: 0,
        };

        self.store
            .insert(&customer)
            .await
            .map_err(|e| store_failure("create customer", uid, e))?;

        info!(%uid, customer_id = %customer.id, "created customer");

        if track_submission {
            self.checker
                .set_submission(
                    SubmissionKind::NewCustomer,
                    uid,
                    client_session_id,
                    customer.id.to_string(),
                )
                .await;
        }

        Ok(customer)
    }

    /// Apply a field diff to an existing customer.
    ///
    /// Compares every mutable field against the stored record and persists
    /// only when something actually differs, bumping `updated_unix_time`.
    ///
    /// # Errors
    ///
    /// `NothingToUpdate` when the submitted fields match the stored record
    /// exactly - no write happens and timestamps stay put. Also the full
    /// lookup taxonomy of [`Self::get`] and `Store` on write failure.
    #[instrument(skip(self, fields))]
    pub async fn modify(
        &self,
        uid: UserId,
        id: CustomerId,
        fields: CustomerFields,
    ) -> Result<Customer, CustomerError> {
        validate_fields(&fields)?;

        let mut customer = self.get(uid, id).await?;
        let mut changed = false;

        if customer.name != fields.name {
            customer.name = fields.name;
            changed = true;
        }

        if customer.kind != fields.kind {
            customer.kind = fields.kind;
            changed = true;
        }

        if customer.address != fields.address {
            customer.address = fields.address;
            changed = true;
        }

        if customer.contacts != fields.contacts {
            customer.contacts = fields.contacts;
            changed = true;
        }

        if customer.contacts_info != fields.contacts_info {
            customer.contacts_info = fields.contacts_info;
            changed = true;
        }

        if customer.comment != fields.comment {
            customer.comment = fields.comment;
            changed = true;
        }

        if customer.hidden != fields.hidden {
            customer.hidden = fields.hidden;
            changed = true;
        }

        if !changed {
            return Err(CustomerError::NothingToUpdate);
        }

        customer.updated_unix_time = Utc::now().timestamp();

        let rows = self
            .store
            .update_fields(&customer)
            .await
            .map_err(|e| store_failure("modify customer", uid, e))?;

        if rows == 0 {
            // Record vanished between fetch and write (concurrent delete).
            debug!(%uid, customer_id = %customer.id, "modify touched no rows");
        }

        info!(%uid, customer_id = %customer.id, "updated customer");

        Ok(customer)
    }

    /// Soft-delete a customer.
    ///
    /// Flips the deleted flag and stamps `deleted_unix_time` and
    /// `updated_unix_time`; the record stays in the store for history but
    /// disappears from every read path. Deletion is one-way: a second
    /// delete reports `NotFound`.
    ///
    /// # Errors
    ///
    /// The full lookup taxonomy of [`Self::get`] and `Store` on write
    /// failure.
    #[instrument(skip(self))]
    pub async fn delete(&self, uid: UserId, id: CustomerId) -> Result<(), CustomerError> {
        let mut customer = self.get(uid, id).await?;

        let now = Utc::now().timestamp();
        customer.deleted = true;
        customer.deleted_unix_time = now;
        customer.updated_unix_time = now;

        let rows = self
            .store
            .mark_deleted(&customer)
            .await
            .map_err(|e| store_failure("delete customer", uid, e))?;

        if rows == 0 {
            debug!(%uid, customer_id = %customer.id, "delete touched no rows");
        }

        info!(%uid, customer_id = %customer.id, "deleted customer");

        Ok(())
    }

    /// Show or hide a customer in default views.
    ///
    /// Setting the flag to its current value succeeds silently without a
    /// write - toggling to the same state is a legitimate idempotent client
    /// action, unlike a no-op modify.
    ///
    /// # Errors
    ///
    /// The full lookup taxonomy of [`Self::get`] and `Store` on write
    /// failure.
    #[instrument(skip(self))]
    pub async fn set_hidden(
        &self,
        uid: UserId,
        id: CustomerId,
        hidden: bool,
    ) -> Result<(), CustomerError> {
        let mut customer = self.get(uid, id).await?;

        if customer.hidden == hidden {
            return Ok(());
        }

        customer.hidden = hidden;
        customer.updated_unix_time = Utc::now().timestamp();

        self.store
            .set_hidden(&customer)
            .await
            .map_err(|e| store_failure("update customer hidden status", uid, e))?;

        info!(%uid, customer_id = %customer.id, hidden, "updated customer hidden status");

        Ok(())
    }
}

fn check_uid(uid: UserId) -> Result<(), CustomerError> {
    if uid.as_i64() <= 0 {
        return Err(CustomerError::InvalidUserId);
    }
    Ok(())
}

fn validate_fields(fields: &CustomerFields) -> Result<(), CustomerError> {
    if fields.name.is_empty() {
        return Err(CustomerError::NameRequired);
    }
    if fields.name.chars().count() > NAME_MAX_LEN {
        return Err(CustomerError::NameTooLong);
    }
    if fields.address.chars().count() > ADDRESS_MAX_LEN {
        return Err(CustomerError::AddressTooLong);
    }
    if fields.contacts.chars().count() > CONTACTS_MAX_LEN {
        return Err(CustomerError::ContactsTooLong);
    }
    if fields.contacts_info.chars().count() > CONTACTS_INFO_MAX_LEN {
        return Err(CustomerError::ContactsInfoTooLong);
    }
    if fields.comment.chars().count() > COMMENT_MAX_LEN {
        return Err(CustomerError::CommentTooLong);
    }
    Ok(())
}

fn store_failure(operation: &'static str, uid: UserId, err: RepositoryError) -> CustomerError {
    error!(%uid, cause = %err, "{operation} failed");
    CustomerError::Store(err)
}
