//! Handlers for `/directors` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/directors` | Every [`DirectorSummary`] |
//! | `POST`   | `/directors` | Body: `{"name":"..."}`; 201 |
//! | `GET`    | `/directors/{id}` | 404 if not found |
//! | `PUT`    | `/directors/{id}` | Rename; uniqueness excludes self |
//! | `DELETE` | `/directors/{id}` | Cascades to movies and their reviews; 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use cinema_core::{Entity, store::CatalogStore, validate::DirectorInput};

use crate::{
  error::{ApiError, parse_id},
  validate::validate_director_input,
  views::{self, DirectorSummary},
};

/// `GET /directors`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<DirectorSummary>>, ApiError>
where
  S: CatalogStore,
{
  Ok(Json(views::all_director_summaries(store.as_ref()).await?))
}

/// `POST /directors` — returns 201 + the [`DirectorSummary`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<DirectorInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
{
  let Json(input) = body?;
  let new_director = validate_director_input(store.as_ref(), &input, None).await?;
  let director = store
    .add_director(new_director)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(director_id = %director.director_id, name = %director.name, "director created");

  // A fresh director owns nothing yet.
  Ok((StatusCode::CREATED, Json(DirectorSummary::new(director, 0))))
}

/// `GET /directors/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<DirectorSummary>, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&raw_id, Entity::Director)?;
  let director = store
    .get_director(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(Entity::Director))?;
  Ok(Json(views::director_summary(store.as_ref(), director).await?))
}

/// `PUT /directors/{id}`
pub async fn replace<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
  body: Result<Json<DirectorInput>, JsonRejection>,
) -> Result<Json<DirectorSummary>, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&raw_id, Entity::Director)?;
  store
    .get_director(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(Entity::Director))?;

  let Json(input) = body?;
  let new_director = validate_director_input(store.as_ref(), &input, Some(id)).await?;
  let director = store
    .replace_director(id, new_director)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(Entity::Director))?;
  tracing::info!(director_id = %id, "director replaced");

  Ok(Json(views::director_summary(store.as_ref(), director).await?))
}

/// `DELETE /directors/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&raw_id, Entity::Director)?;
  if !store.delete_director(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(Entity::Director));
  }
  tracing::info!(director_id = %id, "director deleted with its movies");
  Ok(StatusCode::NO_CONTENT)
}
