//! User and session handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::user::{hash_password, verify_password};
use crate::domain::{Role, User};
use crate::error::ApiError;
use crate::http::extract::{CurrentUser, MaybeSession, SessionCtx};
use crate::http::AppState;
use crate::session::Session;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "a valid email is required"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// Public view of a user. The password hash never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: Uuid,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: Uuid,
}

/// Mint an anonymous session for pre-login browsing and cart building.
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = state.sessions.create().await;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token: session.token,
        }),
    ))
}

pub async fn register(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    req.validate()?;
    let hash = hash_password(&req.password).map_err(|e| ApiError::Internal(e.to_string()))?;
    let user = state
        .store
        .create_user(User::new(req.name, req.email, hash, Role::Customer))
        .await?;
    let session = bind_session(&state, session, user.id).await;
    tracing::info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: session.token,
            user: (&user).into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    req.validate()?;
    let user = state
        .store
        .find_user_by_email(&req.email)
        .await?
        .filter(|u| verify_password(&req.password, &u.password_hash))
        .ok_or(ApiError::Unauthorized("invalid email or password"))?;
    let session = bind_session(&state, session, user.id).await;
    Ok(Json(AuthResponse {
        token: session.token,
        user: (&user).into(),
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    SessionCtx(session): SessionCtx,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(session.token).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_profile(current: CurrentUser) -> Json<UserResponse> {
    Json((&current.user).into())
}

pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    req.validate()?;
    let mut user = current.user;
    if let Some(name) = req.name {
        user.name = name;
    }
    if let Some(email) = req.email {
        user.email = email;
    }
    if let Some(password) = req.password {
        user.password_hash =
            hash_password(&password).map_err(|e| ApiError::Internal(e.to_string()))?;
    }
    let user = state.store.update_user(user).await?;
    Ok(Json((&user).into()))
}

/// Attach the user to the caller's session, keeping any cart it carries,
/// or mint a fresh session when none was presented.
async fn bind_session(state: &AppState, session: Option<Session>, user_id: Uuid) -> Session {
    let token = match session {
        Some(s) => s.token,
        None => state.sessions.create().await.token,
    };
    // The token was just looked up or created; the registry still has it.
    match state.sessions.attach_user(token, user_id).await {
        Some(s) => s,
        None => {
            let fresh = state.sessions.create().await;
            state
                .sessions
                .attach_user(fresh.token, user_id)
                .await
                .unwrap_or(fresh)
        }
    }
}
