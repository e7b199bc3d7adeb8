//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cinema_core::{Entity, validate::FieldErrors};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Rendered as `{"error": "<Entity> not found!"}`.
  #[error("{0} not found")]
  NotFound(Entity),

  /// Rendered as the field → messages object itself.
  #[error("validation failed: {0}")]
  Validation(FieldErrors),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A storage-level uniqueness constraint caught what validation missed.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a store error, surfacing any domain error in its source chain.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    match cinema_core::Error::find_in(&err) {
      Some(cinema_core::Error::NotFound(entity, _)) => ApiError::NotFound(*entity),
      Some(conflict @ cinema_core::Error::Conflict { .. }) => {
        ApiError::Conflict(conflict.to_string())
      }
      None => ApiError::Store(Box::new(err)),
    }
  }
}

/// Parse a path id. Anything that is not a UUID cannot name a stored record,
/// so it is reported the same way as a missing one.
pub fn parse_id(raw: &str, entity: Entity) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(entity))
}

impl From<FieldErrors> for ApiError {
  fn from(errors: FieldErrors) -> Self { ApiError::Validation(errors) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::Validation(errors) => {
        return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
      }
      ApiError::NotFound(entity) => {
        (StatusCode::NOT_FOUND, format!("{entity} not found!"))
      }
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Conflict(m) => {
        tracing::warn!(error = %m, "write rejected by storage constraint");
        (StatusCode::CONFLICT, m)
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal server error".to_string(),
        )
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
    let resp = err.into_response();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn store_failure_hides_the_cause() {
    let cause = std::io::Error::other("disk I/O error at /var/lib/cinema.db");
    let (status, body) = render(ApiError::store(cause)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "internal server error" }));
  }

  #[tokio::test]
  async fn domain_errors_in_the_chain_are_classified() {
    let missing = cinema_core::Error::NotFound(Entity::Review, Uuid::nil());
    let (status, body) = render(ApiError::store(missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Review not found!" }));
  }

  #[test]
  fn parse_id_maps_garbage_to_not_found() {
    let id = Uuid::new_v4();
    assert_eq!(parse_id(&id.to_string(), Entity::Movie).unwrap(), id);
    assert!(matches!(
      parse_id("42", Entity::Movie),
      Err(ApiError::NotFound(Entity::Movie))
    ));
  }
}
