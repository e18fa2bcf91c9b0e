//! Request context extractors
//!
//! Session state rides on an opaque `Authorization: Bearer <token>` header.
//! The extractors resolve it into progressively stronger contexts: a bare
//! session, an authenticated user, an administrator.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::domain::User;
use crate::error::ApiError;
use crate::http::AppState;
use crate::session::Session;
use crate::store::StoreError;

fn bearer_token(parts: &Parts) -> Option<Uuid> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

/// A resolved session. Anonymous sessions qualify; requests without a
/// valid token are rejected with 401.
pub struct SessionCtx(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for SessionCtx {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized("authentication required"))?;
        let session = state
            .sessions
            .get(token)
            .await
            .ok_or(ApiError::Unauthorized("authentication required"))?;
        Ok(Self(session))
    }
}

/// The session if the request carries a live one. Register and login
/// accept requests without a session and mint a fresh one.
pub struct MaybeSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let session = match bearer_token(parts) {
            Some(token) => state.sessions.get(token).await,
            None => None,
        };
        Ok(Self(session))
    }
}

/// An authenticated user together with the session it rides on.
pub struct CurrentUser {
    pub session: Session,
    pub user: User,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let SessionCtx(session) = SessionCtx::from_request_parts(parts, state).await?;
        let user_id = session
            .user_id
            .ok_or(ApiError::Unauthorized("authentication required"))?;
        let user = state.store.get_user(user_id).await.map_err(|e| match e {
            // Sessions can outlive their user record.
            StoreError::NotFound(_) => ApiError::Unauthorized("authentication required"),
            other => other.into(),
        })?;
        Ok(Self { session, user })
    }
}

/// Administrative capability. Signed-in customers get 403.
pub struct Admin(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if !current.user.is_admin() {
            return Err(ApiError::forbidden("administrator capability required"));
        }
        Ok(Self(current.user))
    }
}
