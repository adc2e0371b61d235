//! Caller identity extraction.
//!
//! The server runs behind the deployment's authenticating proxy, which
//! verifies the session and forwards the resolved account id in the
//! `x-user-id` header. Nothing here validates credentials; a request that
//! reaches this process without the header is simply rejected.

use axum::{extract::FromRequestParts, http::request::Parts};

use ledgerbook_core::UserId;

use crate::error::AppError;

/// Header carrying the authenticated user id, set by the fronting proxy.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(uid): RequireUser) -> impl IntoResponse {
///     format!("Hello, {uid}!")
/// }
/// ```
pub struct RequireUser(pub UserId);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing user identity".to_string()))?;

        let uid: i64 = raw
            .parse()
            .map_err(|_| AppError::Unauthorized("malformed user identity".to_string()))?;

        if uid <= 0 {
            return Err(AppError::Unauthorized("malformed user identity".to_string()));
        }

        Ok(Self(UserId::new(uid)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> Result<RequireUser, AppError> {
        let (mut parts, ()) = request.into_parts();
        RequireUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_valid_user() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "42")
            .body(())
            .unwrap();
        let RequireUser(uid) = extract(request).await.unwrap();
        assert_eq!(uid, UserId::new(42));
    }

    #[tokio::test]
    async fn test_rejects_missing_header() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_garbage_and_non_positive_ids() {
        for bad in ["abc", "0", "-7", ""] {
            let request = Request::builder()
                .header(USER_ID_HEADER, bad)
                .body(())
                .unwrap();
            assert!(
                matches!(extract(request).await, Err(AppError::Unauthorized(_))),
                "expected rejection for {bad:?}"
            );
        }
    }
}
