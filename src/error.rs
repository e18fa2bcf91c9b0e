//! API error taxonomy

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::domain::{CartError, OrderError};
use crate::payment::PaymentError;
use crate::store::StoreError;

/// Errors surfaced to API callers. Every variant carries a human-readable
/// message; nothing is retried on the server side.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("payment provider error: {0}")]
    Provider(String),

    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }
        let body = Json(serde_json::json!({ "message": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => Self::NotFound(entity),
            StoreError::Invalid(msg) => Self::Validation(msg),
            StoreError::InsufficientStock { .. }
            | StoreError::AlreadyPaid
            | StoreError::NotPaid
            | StoreError::AlreadyDelivered
            | StoreError::DuplicateReview
            | StoreError::DuplicateEmail => Self::Conflict(err.to_string()),
            StoreError::Database(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ZeroQuantity => Self::Validation(err.to_string()),
            CartError::ExceedsStock { .. } => Self::Conflict(err.to_string()),
            CartError::ItemNotFound => Self::NotFound("cart item"),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Empty | OrderError::ZeroQuantity => Self::Validation(err.to_string()),
            OrderError::AlreadyPaid | OrderError::NotPaid | OrderError::AlreadyDelivered => {
                Self::Conflict(err.to_string())
            }
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self::Provider(err.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errs: ValidationErrors) -> Self {
        let mut parts = Vec::new();
        collect_messages(&errs, "", &mut parts);
        parts.sort();
        Self::Validation(parts.join("; "))
    }
}

fn collect_messages(errs: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errs.errors() {
        let path = if prefix.is_empty() {
            (*field).to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed {} validation", e.code));
                    out.push(format!("{path}: {msg}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, &path, out),
            ValidationErrorsKind::List(map) => {
                for (idx, inner) in map {
                    collect_messages(inner, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}
