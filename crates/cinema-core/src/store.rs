//! The `CatalogStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `cinema-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::model::{
  Director, Movie, NewDirector, NewMovie, NewMovieByDirector, NewReview, Review,
};

/// Abstraction over a catalogue store backend.
///
/// Each write is a single atomic operation. Deletes cascade: removing a
/// director removes its movies, removing a movie removes its reviews.
///
/// Backends should report storage-level uniqueness violations and dangling
/// references as [`crate::Error`] somewhere in their error's source chain, so
/// callers can tell them apart from I/O failures.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Directors ─────────────────────────────────────────────────────────

  /// List all directors in insertion order.
  fn list_directors(
    &self,
  ) -> impl Future<Output = Result<Vec<Director>, Self::Error>> + Send + '_;

  /// Retrieve a director by id. Returns `None` if not found.
  fn get_director(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Director>, Self::Error>> + Send + '_;

  /// Look up a director by exact name.
  fn find_director_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Director>, Self::Error>> + Send + 'a;

  /// Create and persist a new director.
  fn add_director(
    &self,
    input: NewDirector,
  ) -> impl Future<Output = Result<Director, Self::Error>> + Send + '_;

  /// Return the director called `name`, creating it first if absent.
  ///
  /// Idempotent: two calls with the same name yield the same id.
  fn upsert_director_by_name(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Director, Self::Error>> + Send + '_;

  /// Replace every mutable field of a director. Returns `None` if not found.
  fn replace_director(
    &self,
    id: Uuid,
    input: NewDirector,
  ) -> impl Future<Output = Result<Option<Director>, Self::Error>> + Send + '_;

  /// Delete a director and, by cascade, its movies and their reviews.
  /// Returns `false` if the director did not exist.
  fn delete_director(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Movies ────────────────────────────────────────────────────────────

  /// List movies in insertion order, optionally only those of one director.
  fn list_movies(
    &self,
    director_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Movie>, Self::Error>> + Send + '_;

  /// Retrieve a movie by id. Returns `None` if not found.
  fn get_movie(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Movie>, Self::Error>> + Send + '_;

  /// Look up a movie by exact title.
  fn find_movie_by_title<'a>(
    &'a self,
    title: &'a str,
  ) -> impl Future<Output = Result<Option<Movie>, Self::Error>> + Send + 'a;

  /// Create and persist a new movie.
  fn add_movie(
    &self,
    input: NewMovie,
  ) -> impl Future<Output = Result<Movie, Self::Error>> + Send + '_;

  /// Create a movie together with its director, found or created by name.
  ///
  /// Atomic: if the movie cannot be inserted, a director created for it is
  /// not kept either.
  fn add_movie_by_director(
    &self,
    input: NewMovieByDirector,
  ) -> impl Future<Output = Result<Movie, Self::Error>> + Send + '_;

  /// Replace every mutable field of a movie. Returns `None` if not found.
  fn replace_movie(
    &self,
    id: Uuid,
    input: NewMovie,
  ) -> impl Future<Output = Result<Option<Movie>, Self::Error>> + Send + '_;

  /// Delete a movie and, by cascade, its reviews.
  /// Returns `false` if the movie did not exist.
  fn delete_movie(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Reviews ───────────────────────────────────────────────────────────

  /// List reviews in insertion order, optionally only those of one movie.
  fn list_reviews(
    &self,
    movie_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;

  /// Retrieve a review by id. Returns `None` if not found.
  fn get_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  /// Create and persist a new review.
  fn add_review(
    &self,
    input: NewReview,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  /// Replace every mutable field of a review. Returns `None` if not found.
  fn replace_review(
    &self,
    id: Uuid,
    input: NewReview,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  /// Delete a review. Returns `false` if it did not exist.
  fn delete_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
