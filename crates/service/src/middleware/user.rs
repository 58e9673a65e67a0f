//! Requesting user extractor.
//!
//! The service sits behind a gateway that verifies the caller's token and
//! forwards the subject in the `x-user-id` header. Favorites and recent
//! searches are scoped to that subject.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::Span;

use crate::error::{AppError, set_sentry_user};

/// The HTTP header carrying the verified user subject.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that requires a user subject on the request.
///
/// Rejects with `401 Unauthorized` if the header is missing or blank.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user_id): CurrentUser) -> String {
///     format!("favorites of {user_id}")
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing user identity".to_string()))?;

        Span::current().record("user_id", user_id);
        set_sentry_user(user_id);

        Ok(Self(user_id.to_string()))
    }
}
