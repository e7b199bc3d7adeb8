//! Handlers for `/reviews` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/reviews` | Every [`ReviewBody`] |
//! | `POST`   | `/reviews` | Body: `{"text":"...","movie":"<id>","stars":0-5}`; 201 |
//! | `GET`    | `/reviews/{id}` | 404 if not found |
//! | `PUT`    | `/reviews/{id}` | Full replacement, may move the review to another movie |
//! | `DELETE` | `/reviews/{id}` | 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use cinema_core::{Entity, store::CatalogStore, validate::ReviewInput};

use crate::{
  error::{ApiError, parse_id},
  validate::validate_review_input,
  views::ReviewBody,
};

/// `GET /reviews`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<ReviewBody>>, ApiError>
where
  S: CatalogStore,
{
  let reviews = store.list_reviews(None).await.map_err(ApiError::store)?;
  Ok(Json(reviews.into_iter().map(ReviewBody::from).collect()))
}

/// `POST /reviews` — returns 201 + the stored review.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<ReviewInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
{
  let Json(input) = body?;
  let new_review = validate_review_input(store.as_ref(), &input).await?;
  let review = store.add_review(new_review).await.map_err(ApiError::store)?;
  tracing::info!(review_id = %review.review_id, movie_id = %review.movie_id, "review created");
  Ok((StatusCode::CREATED, Json(ReviewBody::from(review))))
}

/// `GET /reviews/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<ReviewBody>, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&raw_id, Entity::Review)?;
  let review = store
    .get_review(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(Entity::Review))?;
  Ok(Json(review.into()))
}

/// `PUT /reviews/{id}`
pub async fn replace<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
  body: Result<Json<ReviewInput>, JsonRejection>,
) -> Result<Json<ReviewBody>, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&raw_id, Entity::Review)?;
  store
    .get_review(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(Entity::Review))?;

  let Json(input) = body?;
  let new_review = validate_review_input(store.as_ref(), &input).await?;
  let review = store
    .replace_review(id, new_review)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(Entity::Review))?;
  tracing::info!(review_id = %id, "review replaced");
  Ok(Json(review.into()))
}

/// `DELETE /reviews/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&raw_id, Entity::Review)?;
  if !store.delete_review(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(Entity::Review));
  }
  tracing::info!(review_id = %id, "review deleted");
  Ok(StatusCode::NO_CONTENT)
}
