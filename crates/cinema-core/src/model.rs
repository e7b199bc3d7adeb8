//! Catalogue records — directors, the movies they own, and the reviews
//! attached to each movie.
//!
//! Ownership is strict: deleting a director removes its movies, and deleting
//! a movie removes its reviews. Records are only ever mutated by full
//! replacement.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Description stored when a movie is created or replaced without one.
pub const DEFAULT_DESCRIPTION: &str = "no description";

// ─── Director ────────────────────────────────────────────────────────────────

/// A director. Names are unique across the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
  pub director_id: Uuid,
  pub name:        String,
}

/// Input to [`crate::store::CatalogStore::add_director`] and
/// [`crate::store::CatalogStore::replace_director`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDirector {
  pub name: String,
}

// ─── Movie ───────────────────────────────────────────────────────────────────

/// A movie. Titles are unique across the catalogue (exact, case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
  pub movie_id:    Uuid,
  pub title:       String,
  pub description: String,
  /// Running time, 1–100.
  pub duration:    u32,
  pub director_id: Uuid,
}

/// A validated movie, ready to be persisted. The director has already been
/// resolved to an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
  pub title:       String,
  pub description: String,
  pub duration:    u32,
  pub director_id: Uuid,
}

/// A validated movie whose director is named rather than referenced. The store
/// finds or creates the director in the same write as the movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovieByDirector {
  pub title:       String,
  pub description: String,
  pub duration:    u32,
  pub director:    String,
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// A review of a single movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
  pub review_id: Uuid,
  pub movie_id:  Uuid,
  pub text:      String,
  /// Rating, 0–5 inclusive.
  pub stars:     u8,
}

/// A validated review, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
  pub movie_id: Uuid,
  pub text:     String,
  pub stars:    u8,
}
