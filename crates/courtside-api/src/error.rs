//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use courtside_core::store::{FailureKind, StoreFailure};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store unavailable: {0}")]
  Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The request left state that needs attention (e.g. a failed revert).
  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Classify a backend error by its [`FailureKind`].
  pub fn store<E: StoreFailure>(err: E) -> Self {
    match err.kind() {
      FailureKind::NotFound => Self::NotFound(err.to_string()),
      FailureKind::Conflict => Self::Conflict(err.to_string()),
      FailureKind::Rejected => Self::BadRequest(err.to_string()),
      FailureKind::Unavailable => Self::Unavailable(Box::new(err)),
    }
  }
}

impl From<courtside_core::Error> for ApiError {
  fn from(err: courtside_core::Error) -> Self {
    use courtside_core::Error as E;
    match err {
      E::InvalidInput { .. } | E::Rejected(_) => Self::BadRequest(err.to_string()),
      E::NotFound(m) => Self::NotFound(m),
      E::ConcurrencyConflict { .. } => Self::Conflict(err.to_string()),
      E::StoreUnavailable(e) => Self::Unavailable(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match &self {
      ApiError::NotFound(m)
      | ApiError::BadRequest(m)
      | ApiError::Conflict(m)
      | ApiError::Internal(m) => m.clone(),
      ApiError::Unavailable(e) => e.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
