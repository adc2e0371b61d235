//! Customer domain types.
//!
//! A customer is a counterparty the user trades with: somebody they sell to,
//! buy from, or both. Records are soft-deleted only - historical transactions
//! keep referring to them after removal.

use serde::Deserialize;

use ledgerbook_core::{CustomerId, CustomerKind, UserId};

/// Maximum length of a customer name, in characters.
pub const NAME_MAX_LEN: usize = 256;
/// Maximum length of the address field, in characters.
pub const ADDRESS_MAX_LEN: usize = 512;
/// Maximum length of the contact person field, in characters.
pub const CONTACTS_MAX_LEN: usize = 256;
/// Maximum length of the contact info field, in characters.
pub const CONTACTS_INFO_MAX_LEN: usize = 256;
/// Maximum length of the comment field, in characters.
pub const COMMENT_MAX_LEN: usize = 512;

/// A customer record (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Unique record ID, assigned once at creation.
    pub id: CustomerId,
    /// Owning user. Every query is scoped by this.
    pub uid: UserId,
    /// Display name, non-empty.
    pub name: String,
    /// Customer / supplier / both.
    pub kind: CustomerKind,
    /// Postal address, may be empty.
    pub address: String,
    /// Contact person, may be empty.
    pub contacts: String,
    /// Phone / email / whatever the user wrote down, may be empty.
    pub contacts_info: String,
    /// Free-form note, may be empty.
    pub comment: String,
    /// Hidden from default views, independent of deletion.
    pub hidden: bool,
    /// Soft-delete flag. Deleted records are invisible to every read path.
    pub deleted: bool,
    /// Creation time, unix seconds.
    pub created_unix_time: i64,
    /// Last modification time, unix seconds.
    pub updated_unix_time: i64,
    /// Deletion time, unix seconds; 0 while the record is live.
    pub deleted_unix_time: i64,
}

/// The mutable field set of a customer record.
///
/// Shared by the create and modify paths: creation populates a fresh record
/// from it, modification diffs it against the stored record field by field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomerFields {
    pub name: String,
    #[serde(rename = "customer_type")]
    pub kind: CustomerKind,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contacts: String,
    #[serde(default)]
    pub contacts_info: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub hidden: bool,
}

/// One page of customers plus the numbers a client needs to render a pager.
#[derive(Debug, Clone)]
pub struct CustomerPage {
    /// Total records matching the filter, across all pages.
    pub total: i64,
    /// The (clamped) page that was fetched, 1-based.
    pub page: i64,
    /// The (clamped) page size that was applied.
    pub page_size: i64,
    /// `ceil(total / page_size)`.
    pub total_pages: i64,
    /// The records of this page, newest first.
    pub customers: Vec<Customer>,
}
