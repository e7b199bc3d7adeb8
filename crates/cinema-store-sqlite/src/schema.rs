//! SQL schema for the catalogue SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS directors (
    director_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE
);

-- Deleting a director removes its movies.
CREATE TABLE IF NOT EXISTS movies (
    movie_id    TEXT PRIMARY KEY,
    title       TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT 'no description',
    duration    INTEGER NOT NULL CHECK (duration BETWEEN 1 AND 100),
    director_id TEXT NOT NULL
                REFERENCES directors(director_id) ON DELETE CASCADE
);

-- Deleting a movie removes its reviews. Zero stars is a valid rating.
CREATE TABLE IF NOT EXISTS reviews (
    review_id TEXT PRIMARY KEY,
    movie_id  TEXT NOT NULL
              REFERENCES movies(movie_id) ON DELETE CASCADE,
    text      TEXT NOT NULL,
    stars     INTEGER NOT NULL CHECK (stars BETWEEN 0 AND 5)
);

CREATE INDEX IF NOT EXISTS movies_director_idx ON movies(director_id);
CREATE INDEX IF NOT EXISTS reviews_movie_idx   ON reviews(movie_id);

PRAGMA user_version = 1;
";
