//! Business logic services.
//!
//! # Services
//!
//! - `customers` - Customer record lifecycle: list, create, modify, soft
//!   delete, visibility

pub mod customers;

pub use customers::{CustomerService, DEFAULT_PAGE_SIZE};
