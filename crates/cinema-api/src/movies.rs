//! Handlers for `/movies` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/movies` | List shape ([`MovieSummary`]) |
//! | `POST`   | `/movies` | Body: [`MovieInput`]; director found or created by name; 201 |
//! | `GET`    | `/movies/{id}` | [`MovieDetail`]; 404 if not found |
//! | `PUT`    | `/movies/{id}` | Full replacement; director must exist |
//! | `DELETE` | `/movies/{id}` | Cascades to reviews; 204 |
//! | `GET`    | `/movies-with-reviews` | Every movie as a [`MovieDetail`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use cinema_core::{Entity, store::CatalogStore, validate::MovieInput};

use crate::{
  error::{ApiError, parse_id},
  validate::validate_movie_input,
  views::{self, MovieDetail, MovieSummary},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /movies`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<MovieSummary>>, ApiError>
where
  S: CatalogStore,
{
  Ok(Json(views::all_movie_summaries(store.as_ref()).await?))
}

/// `GET /movies-with-reviews`
pub async fn with_reviews<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<MovieDetail>>, ApiError>
where
  S: CatalogStore,
{
  Ok(Json(views::all_movie_details(store.as_ref()).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /movies` — returns 201 + the [`MovieDetail`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<MovieInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
{
  let Json(input) = body?;
  let checked = validate_movie_input(store.as_ref(), &input, None).await?;
  let movie = store
    .add_movie_by_director(checked.movie.into_new_movie_by_director())
    .await
    .map_err(ApiError::store)?;
  tracing::info!(movie_id = %movie.movie_id, title = %movie.title, "movie created");

  let detail = views::movie_detail(store.as_ref(), movie).await?;
  Ok((StatusCode::CREATED, Json(detail)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /movies/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<MovieDetail>, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&raw_id, Entity::Movie)?;
  let movie = store
    .get_movie(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(Entity::Movie))?;
  Ok(Json(views::movie_detail(store.as_ref(), movie).await?))
}

// ─── Replace ──────────────────────────────────────────────────────────────────

/// `PUT /movies/{id}` — every mutable field is replaced.
pub async fn replace<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
  body: Result<Json<MovieInput>, JsonRejection>,
) -> Result<Json<MovieDetail>, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&raw_id, Entity::Movie)?;
  store
    .get_movie(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(Entity::Movie))?;

  let Json(input) = body?;
  let checked = validate_movie_input(store.as_ref(), &input, Some(id)).await?;
  let director = checked
    .director
    .ok_or(ApiError::NotFound(Entity::Director))?;
  let new_movie = checked.movie.into_new_movie(director.director_id);
  let movie = store
    .replace_movie(id, new_movie)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(Entity::Movie))?;
  tracing::info!(movie_id = %id, "movie replaced");

  Ok(Json(views::movie_detail(store.as_ref(), movie).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /movies/{id}` — also removes the movie's reviews.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&raw_id, Entity::Movie)?;
  if !store.delete_movie(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(Entity::Movie));
  }
  tracing::info!(movie_id = %id, "movie deleted");
  Ok(StatusCode::NO_CONTENT)
}
