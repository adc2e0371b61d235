//! Integration tests for Ledgerbook.
//!
//! The actual tests live under `tests/`; they exercise a running server
//! over HTTP and are `#[ignore]`d by default. See `tests/customers_api.rs`
//! for the required environment.
