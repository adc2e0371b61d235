//! Customer route handlers.
//!
//! Thin JSON glue over [`CustomerService`]: binding, the `type=0 means all`
//! filter convention, and response shaping. Record ids are serialized as
//! strings because they do not survive a round trip through a JavaScript
//! number.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ledgerbook_core::{CustomerId, CustomerKind};

use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::{Customer, CustomerFields, CustomerPage};
use crate::services::CustomerService;
use crate::state::AppState;

/// Listing filter parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Kind filter; 0 (the default) means all kinds.
    #[serde(rename = "type", default)]
    pub kind: i16,
    #[serde(default)]
    pub visible_only: bool,
}

/// Pagination parameters on top of [`ListQuery`].
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(rename = "type", default)]
    pub kind: i16,
    #[serde(default)]
    pub visible_only: bool,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub page_size: i64,
}

/// Create request: the field set plus the client's submission token.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    pub client_session_id: String,
    #[serde(flatten)]
    pub fields: CustomerFields,
}

/// Visibility toggle request.
#[derive(Debug, Deserialize)]
pub struct HideCustomerRequest {
    pub hidden: bool,
}

/// Customer representation returned to clients.
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: String,
    pub name: String,
    pub customer_type: i16,
    pub address: String,
    pub contacts: String,
    pub contacts_info: String,
    pub comment: String,
    pub hidden: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.to_string(),
            name: customer.name,
            customer_type: customer.kind.as_i16(),
            address: customer.address,
            contacts: customer.contacts,
            contacts_info: customer.contacts_info,
            comment: customer.comment,
            hidden: customer.hidden,
            created_at: customer.created_unix_time,
            updated_at: customer.updated_unix_time,
        }
    }
}

/// One page of customers plus pager numbers.
#[derive(Debug, Serialize)]
pub struct CustomerPageResponse {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub customers: Vec<CustomerResponse>,
}

impl From<CustomerPage> for CustomerPageResponse {
    fn from(page: CustomerPage) -> Self {
        Self {
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
            customers: page.customers.into_iter().map(Into::into).collect(),
        }
    }
}

/// Map the wire filter value to a service-level kind filter.
fn kind_filter(raw: i16) -> Result<Option<CustomerKind>, AppError> {
    if raw == 0 {
        return Ok(None);
    }
    CustomerKind::try_from(raw)
        .map(Some)
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

fn service(state: &AppState) -> &CustomerService {
    state.customers()
}

/// Full customer listing, newest first.
#[instrument(skip(state))]
pub async fn list(
    RequireUser(uid): RequireUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CustomerResponse>>, AppError> {
    let kind = kind_filter(query.kind)?;
    let customers = service(&state).list(uid, kind, query.visible_only).await?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// Paginated customer listing.
#[instrument(skip(state))]
pub async fn list_page(
    RequireUser(uid): RequireUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<CustomerPageResponse>, AppError> {
    let kind = kind_filter(query.kind)?;
    let page = service(&state)
        .list_page(uid, kind, query.visible_only, query.page, query.page_size)
        .await?;
    Ok(Json(page.into()))
}

/// Customer detail.
#[instrument(skip(state))]
pub async fn get_one(
    RequireUser(uid): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerResponse>, AppError> {
    let customer = service(&state).get(uid, CustomerId::new(id)).await?;
    Ok(Json(customer.into()))
}

/// Create a customer, collapsing duplicate submissions.
#[instrument(skip(state, request))]
pub async fn create(
    RequireUser(uid): RequireUser,
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), AppError> {
    let customer = service(&state)
        .create(uid, request.fields, &request.client_session_id)
        .await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// Modify a customer via field diff.
#[instrument(skip(state, fields))]
pub async fn modify(
    RequireUser(uid): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(fields): Json<CustomerFields>,
) -> Result<Json<CustomerResponse>, AppError> {
    let customer = service(&state)
        .modify(uid, CustomerId::new(id), fields)
        .await?;
    Ok(Json(customer.into()))
}

/// Soft-delete a customer.
#[instrument(skip(state))]
pub async fn remove(
    RequireUser(uid): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service(&state).delete(uid, CustomerId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Show or hide a customer.
#[instrument(skip(state))]
pub async fn set_hidden(
    RequireUser(uid): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<HideCustomerRequest>,
) -> Result<StatusCode, AppError> {
    service(&state)
        .set_hidden(uid, CustomerId::new(id), request.hidden)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::ServerConfig;

    /// App wired to a lazy pool; requests that are rejected before the
    /// first query never touch a database.
    fn app() -> axum::Router {
        let config = ServerConfig {
            database_url: secrecy::SecretString::from("postgres://localhost/unused"),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 0,
            node_id: 0,
            duplicate_check_enabled: true,
            submission_ttl: std::time::Duration::from_secs(60),
            submission_capacity: 100,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        crate::routes::routes().with_state(AppState::new(config, pool))
    }

    #[test]
    fn test_response_serializes_id_as_string() {
        let customer = Customer {
            id: CustomerId::new(9_007_199_254_740_993), // above Number.MAX_SAFE_INTEGER
            uid: ledgerbook_core::UserId::new(1),
            name: "Acme".to_string(),
            kind: CustomerKind::Customer,
            address: String::new(),
            contacts: String::new(),
            contacts_info: String::new(),
            comment: String::new(),
            hidden: false,
            deleted: false,
            created_unix_time: 1_700_000_000,
            updated_unix_time: 1_700_000_000,
            deleted_unix_time: 0,
        };

        let json = serde_json::to_value(CustomerResponse::from(customer)).unwrap();
        assert_eq!(json["id"], "9007199254740993");
        assert_eq!(json["customer_type"], 1);
        assert_eq!(json["created_at"], 1_700_000_000);
    }

    #[tokio::test]
    async fn test_requests_without_identity_are_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/customers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_kind_filter_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/customers?type=9")
                    .header("x-user-id", "1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_create_body_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/customers")
                    .header("x-user-id", "1")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"customer_type": 1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/customers/abc")
                    .header("x-user-id", "1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
