//! Identity middleware and extractors for axum.
//!
//! Token validation happens upstream: the gateway in front of this service
//! authenticates the learner and forwards their id in [`USER_ID_HEADER`].
//! This module turns that header into an [`AuthenticatedUser`] and lets
//! handlers demand one.
//!
//! ```text
//! Request → identity_middleware → injects AuthenticatedUser into extensions
//!                                          ↓
//!                                  Handler → RequireAuth extractor reads from extensions
//! ```

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::UserId;

/// Header carrying the authenticated learner id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The learner on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

impl AuthenticatedUser {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// Reads [`USER_ID_HEADER`] and injects an [`AuthenticatedUser`].
///
/// A missing, non-UTF-8 or blank header leaves the request anonymous;
/// handlers using [`RequireAuth`] then reject it with 401.
pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    let user = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|raw| UserId::new(raw.trim()).ok())
        .map(AuthenticatedUser::new);

    if let Some(user) = user {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

/// Extractor that requires an authenticated learner.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No learner identity reached the handler.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::Unauthenticated => (StatusCode::UNAUTHORIZED, "Authentication required"),
        };

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "code": "UNAUTHENTICATED"
            })),
        )
            .into_response()
    }
}
