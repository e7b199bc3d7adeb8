//! Store-backed validation: runs the shape checks from
//! [`cinema_core::validate`], answers their lookups against a
//! [`CatalogStore`], and resolves references.
//!
//! Uniqueness here is check-then-act. Two concurrent writers can both pass;
//! the storage-level UNIQUE constraints catch the loser, which surfaces as
//! [`ApiError::Conflict`]. A director created for a movie that loses such a
//! race is rolled back with it.

use cinema_core::{
  model::{Director, NewDirector, NewReview},
  store::CatalogStore,
  validate::{DirectorInput, MovieInput, ReviewInput, ValidMovie},
};
use uuid::Uuid;

use crate::error::ApiError;

/// A movie payload that passed every check.
pub struct CheckedMovie {
  pub movie:    ValidMovie,
  /// The named director, when the checks looked it up. Always set on update.
  pub director: Option<Director>,
}

/// Validate a movie payload. `exclude` is the id of the movie being replaced,
/// or `None` on create.
///
/// On create the director need not exist yet; the store finds or creates it
/// in the same write as the movie. On update, the director must already exist.
pub async fn validate_movie_input<S>(
  store: &S,
  input: &MovieInput,
  exclude: Option<Uuid>,
) -> Result<CheckedMovie, ApiError>
where
  S: CatalogStore,
{
  let mut draft = input.check();

  if let Some(title) = draft.title() {
    let holder = store
      .find_movie_by_title(title)
      .await
      .map_err(ApiError::store)?
      .map(|m| m.movie_id);
    draft.check_title_unique(holder, exclude);
  }

  let mut director = None;
  if exclude.is_some()
    && let Some(name) = draft.director()
  {
    director = store
      .find_director_by_name(name)
      .await
      .map_err(ApiError::store)?;
    draft.check_director_exists(director.is_some());
  }

  Ok(CheckedMovie { movie: draft.finish()?, director })
}

/// Validate a director payload. `exclude` is the id of the director being
/// replaced, or `None` on create.
pub async fn validate_director_input<S>(
  store: &S,
  input: &DirectorInput,
  exclude: Option<Uuid>,
) -> Result<NewDirector, ApiError>
where
  S: CatalogStore,
{
  let mut draft = input.check();

  if let Some(name) = draft.name() {
    let holder = store
      .find_director_by_name(name)
      .await
      .map_err(ApiError::store)?
      .map(|d| d.director_id);
    draft.check_name_unique(holder, exclude);
  }

  Ok(draft.finish()?)
}

/// Validate a review payload. Reviews carry no uniqueness rule, so create and
/// update share the same checks.
pub async fn validate_review_input<S>(
  store: &S,
  input: &ReviewInput,
) -> Result<NewReview, ApiError>
where
  S: CatalogStore,
{
  let mut draft = input.check();

  if let Some(movie_id) = draft.movie_id() {
    let exists = store
      .get_movie(movie_id)
      .await
      .map_err(ApiError::store)?
      .is_some();
    draft.check_movie_exists(exists);
  }

  Ok(draft.finish()?)
}
