//! Domain types for the server.

pub mod customer;

pub use customer::{Customer, CustomerFields, CustomerPage};
