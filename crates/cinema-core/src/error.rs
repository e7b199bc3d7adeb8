//! Error types for `cinema-core`.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// The three kinds of record held by a catalogue store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
  Director,
  Movie,
  Review,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Director => "Director",
      Self::Movie => "Movie",
      Self::Review => "Review",
    })
  }
}

/// Domain failures that a store backend reports on top of its own I/O errors.
#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} not found: {1}")]
  NotFound(Entity, Uuid),

  /// A uniqueness rule was violated at the storage level. Application-level
  /// checks are check-then-act, so two racing writers can both pass them.
  #[error("{entity} {field} already exists: {value:?}")]
  Conflict {
    entity: Entity,
    field:  &'static str,
    value:  String,
  },
}

impl Error {
  /// Find a domain error in `err` or anywhere in its source chain.
  pub fn find_in<'a>(
    err: &'a (dyn std::error::Error + 'static),
  ) -> Option<&'a Error> {
    let mut current = Some(err);
    while let Some(e) = current {
      if let Some(domain) = e.downcast_ref::<Error>() {
        return Some(domain);
      }
      current = e.source();
    }
    None
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  #[error("backend: {0}")]
  struct Wrapper(#[source] Error);

  #[test]
  fn find_in_walks_the_source_chain() {
    let id = Uuid::new_v4();
    let wrapped = Wrapper(Error::NotFound(Entity::Movie, id));
    let found = Error::find_in(&wrapped);
    assert!(matches!(found, Some(Error::NotFound(Entity::Movie, got)) if *got == id));
  }

  #[test]
  fn find_in_returns_none_for_foreign_errors() {
    let io = std::io::Error::other("disk on fire");
    assert!(Error::find_in(&io).is_none());
  }

  #[test]
  fn entity_displays_capitalised() {
    assert_eq!(Entity::Review.to_string(), "Review");
  }
}
