//! Conversions between domain types and the plain-text representations
//! stored in SQLite columns, plus classification of constraint failures.
//!
//! UUIDs are stored as hyphenated lowercase strings.

use cinema_core::model::{Director, Movie, Review};
use rusqlite::{ErrorCode, Row, ffi};
use uuid::Uuid;

use crate::Result;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Column lists ─────────────────────────────────────────────────────────────

pub const DIRECTOR_COLUMNS: &str = "director_id, name";
pub const MOVIE_COLUMNS: &str =
  "movie_id, title, description, duration, director_id";
pub const REVIEW_COLUMNS: &str = "review_id, movie_id, text, stars";

// ─── Raw row types ────────────────────────────────────────────────────────────
//
// Rows are read into these on the database thread; UUID parsing happens back
// on the async side so it can use this crate's error type.

pub struct RawDirector {
  pub director_id: String,
  pub name:        String,
}

impl RawDirector {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      director_id: row.get(0)?,
      name:        row.get(1)?,
    })
  }

  pub fn into_director(self) -> Result<Director> {
    Ok(Director {
      director_id: decode_uuid(&self.director_id)?,
      name:        self.name,
    })
  }
}

pub struct RawMovie {
  pub movie_id:    String,
  pub title:       String,
  pub description: String,
  pub duration:    u32,
  pub director_id: String,
}

impl RawMovie {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      movie_id:    row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      duration:    row.get(3)?,
      director_id: row.get(4)?,
    })
  }

  pub fn into_movie(self) -> Result<Movie> {
    Ok(Movie {
      movie_id:    decode_uuid(&self.movie_id)?,
      title:       self.title,
      description: self.description,
      duration:    self.duration,
      director_id: decode_uuid(&self.director_id)?,
    })
  }
}

pub struct RawReview {
  pub review_id: String,
  pub movie_id:  String,
  pub text:      String,
  pub stars:     u8,
}

impl RawReview {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      review_id: row.get(0)?,
      movie_id:  row.get(1)?,
      text:      row.get(2)?,
      stars:     row.get(3)?,
    })
  }

  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      review_id: decode_uuid(&self.review_id)?,
      movie_id:  decode_uuid(&self.movie_id)?,
      text:      self.text,
      stars:     self.stars,
    })
  }
}

// ─── Constraint failures ──────────────────────────────────────────────────────

/// Which kind of SQLite constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
  Unique,
  ForeignKey,
}

/// Classify `err` if it is a UNIQUE or FOREIGN KEY constraint failure.
pub fn violation(err: &tokio_rusqlite::Error) -> Option<Violation> {
  let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, _)) =
    err
  else {
    return None;
  };
  if failure.code != ErrorCode::ConstraintViolation {
    return None;
  }
  match failure.extended_code {
    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
      Some(Violation::Unique)
    }
    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Violation::ForeignKey),
    _ => None,
  }
}
