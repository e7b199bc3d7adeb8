//! Response representations and the loaders that assemble them.
//!
//! Directors are flattened to their name inside movie payloads. Average
//! ratings and movie counts are recomputed on every read.

use std::collections::HashMap;

use cinema_core::{
  Entity,
  aggregate::{average_rating, movie_count, movie_counts, reviews_by_movie},
  model::{Director, Movie, Review},
  store::CatalogStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Reviews ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewBody {
  pub id:    Uuid,
  /// The reviewed movie's id.
  pub movie: Uuid,
  pub text:  String,
  pub stars: u8,
}

impl From<Review> for ReviewBody {
  fn from(r: Review) -> Self {
    ReviewBody {
      id:    r.review_id,
      movie: r.movie_id,
      text:  r.text,
      stars: r.stars,
    }
  }
}

// ─── Directors ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectorSummary {
  pub id:          Uuid,
  pub name:        String,
  pub movie_count: usize,
}

impl DirectorSummary {
  pub fn new(director: Director, movie_count: usize) -> Self {
    DirectorSummary {
      id: director.director_id,
      name: director.name,
      movie_count,
    }
  }
}

// ─── Movies ──────────────────────────────────────────────────────────────────

/// The list shape: the validated fields plus the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieSummary {
  pub id:          Uuid,
  pub title:       String,
  pub description: String,
  pub duration:    u32,
  pub director:    String,
}

/// The detail shape: everything, with reviews nested and the average rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetail {
  pub id:             Uuid,
  pub title:          String,
  pub description:    String,
  pub duration:       u32,
  pub director:       String,
  pub reviews:        Vec<ReviewBody>,
  pub average_rating: f64,
}

impl MovieDetail {
  pub fn new(movie: Movie, director: String, reviews: Vec<Review>) -> Self {
    let average_rating = average_rating(&reviews);
    MovieDetail {
      id: movie.movie_id,
      title: movie.title,
      description: movie.description,
      duration: movie.duration,
      director,
      reviews: reviews.into_iter().map(ReviewBody::from).collect(),
      average_rating,
    }
  }
}

// ─── Loaders ─────────────────────────────────────────────────────────────────

async fn director_names<S>(store: &S) -> Result<HashMap<Uuid, String>, ApiError>
where
  S: CatalogStore,
{
  Ok(
    store
      .list_directors()
      .await
      .map_err(ApiError::store)?
      .into_iter()
      .map(|d| (d.director_id, d.name))
      .collect(),
  )
}

fn name_of(names: &HashMap<Uuid, String>, movie: &Movie) -> Result<String, ApiError> {
  names
    .get(&movie.director_id)
    .cloned()
    .ok_or(ApiError::NotFound(Entity::Director))
}

/// Assemble the detail view of one movie.
pub async fn movie_detail<S>(store: &S, movie: Movie) -> Result<MovieDetail, ApiError>
where
  S: CatalogStore,
{
  let director = store
    .get_director(movie.director_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(Entity::Director))?;
  let reviews = store
    .list_reviews(Some(movie.movie_id))
    .await
    .map_err(ApiError::store)?;
  Ok(MovieDetail::new(movie, director.name, reviews))
}

/// Assemble the detail view of every movie, in three store reads.
pub async fn all_movie_details<S>(store: &S) -> Result<Vec<MovieDetail>, ApiError>
where
  S: CatalogStore,
{
  let names = director_names(store).await?;
  let movies = store.list_movies(None).await.map_err(ApiError::store)?;
  let mut reviews =
    reviews_by_movie(store.list_reviews(None).await.map_err(ApiError::store)?);

  movies
    .into_iter()
    .map(|movie| {
      let director = name_of(&names, &movie)?;
      let reviews = reviews.remove(&movie.movie_id).unwrap_or_default();
      Ok(MovieDetail::new(movie, director, reviews))
    })
    .collect()
}

/// Assemble the list view of every movie.
pub async fn all_movie_summaries<S>(store: &S) -> Result<Vec<MovieSummary>, ApiError>
where
  S: CatalogStore,
{
  let names = director_names(store).await?;
  let movies = store.list_movies(None).await.map_err(ApiError::store)?;

  movies
    .into_iter()
    .map(|movie| {
      let director = name_of(&names, &movie)?;
      Ok(MovieSummary {
        id: movie.movie_id,
        title: movie.title,
        description: movie.description,
        duration: movie.duration,
        director,
      })
    })
    .collect()
}

/// Assemble the summary of one director.
pub async fn director_summary<S>(
  store: &S,
  director: Director,
) -> Result<DirectorSummary, ApiError>
where
  S: CatalogStore,
{
  let movies = store
    .list_movies(Some(director.director_id))
    .await
    .map_err(ApiError::store)?;
  let count = movie_count(director.director_id, &movies);
  Ok(DirectorSummary::new(director, count))
}

/// Assemble the summary of every director.
pub async fn all_director_summaries<S>(
  store: &S,
) -> Result<Vec<DirectorSummary>, ApiError>
where
  S: CatalogStore,
{
  let directors = store.list_directors().await.map_err(ApiError::store)?;
  let counts = movie_counts(&store.list_movies(None).await.map_err(ApiError::store)?);

  Ok(
    directors
      .into_iter()
      .map(|d| {
        let count = counts.get(&d.director_id).copied().unwrap_or(0);
        DirectorSummary::new(d, count)
      })
      .collect(),
  )
}
