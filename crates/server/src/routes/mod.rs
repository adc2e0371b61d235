//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Health check
//! GET  /health/ready               - Readiness check
//!
//! # Customers
//! GET    /api/customers            - Full customer listing
//! GET    /api/customers/page       - Paginated customer listing
//! POST   /api/customers            - Create customer (idempotent per client session token)
//! GET    /api/customers/{id}       - Customer detail
//! PUT    /api/customers/{id}       - Modify customer (field diff)
//! DELETE /api/customers/{id}       - Soft-delete customer
//! POST   /api/customers/{id}/hidden - Show/hide customer
//! ```
//!
//! All `/api` routes expect the authenticated user id in `x-user-id`,
//! injected by the fronting proxy.

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod customers;

/// Assemble the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/customers",
            get(customers::list).post(customers::create),
        )
        .route("/api/customers/page", get(customers::list_page))
        .route(
            "/api/customers/{id}",
            get(customers::get_one)
                .put(customers::modify)
                .delete(customers::remove),
        )
        .route("/api/customers/{id}/hidden", post(customers::set_hidden))
}
