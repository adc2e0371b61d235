//! Ledgerbook server library.
//!
//! This crate provides the bookkeeping server functionality as a library,
//! allowing it to be tested and reused. The binary in `main.rs` wires
//! configuration, the database pool and the HTTP listener around it.
//!
//! # Modules
//!
//! - [`services`] - Business logic; [`services::CustomerService`] owns the
//!   customer record lifecycle
//! - [`db`] - Persistence contracts and the `PostgreSQL` implementation
//! - [`dedup`] - Duplicate-submission tracking for idempotent creates
//! - [`ids`] - Unique identifier generation
//! - [`routes`] - JSON API glue

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
