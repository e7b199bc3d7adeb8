//! [`SqliteStore`] — the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use cinema_core::{
  Entity,
  model::{
    Director, Movie, NewDirector, NewMovie, NewMovieByDirector, NewReview,
    Review,
  },
  store::CatalogStore,
};
use rusqlite::{OptionalExtension as _, Row};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    DIRECTOR_COLUMNS, MOVIE_COLUMNS, REVIEW_COLUMNS, RawDirector, RawMovie,
    RawReview, Violation, encode_uuid, violation,
  },
  schema::SCHEMA,
};

type RowReader<R> = fn(&Row<'_>) -> rusqlite::Result<R>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalogue store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are serialised onto one database thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row query bound to one text parameter.
  async fn fetch_optional<R>(
    &self,
    sql: String,
    param: String,
    read: RowReader<R>,
  ) -> Result<Option<R>>
  where
    R: Send + 'static,
  {
    let row = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params![param], read).optional()?)
      })
      .await?;
    Ok(row)
  }

  /// Run a multi-row query, optionally bound to one text parameter.
  async fn fetch_all<R>(
    &self,
    sql: String,
    param: Option<String>,
    read: RowReader<R>,
  ) -> Result<Vec<R>>
  where
    R: Send + 'static,
  {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = match param {
          Some(p) => stmt
            .query_map(rusqlite::params![p], read)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], read)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  /// Run a single write statement and return the number of affected rows.
  async fn execute(
    &self,
    sql: &'static str,
    params: Vec<rusqlite::types::Value>,
  ) -> std::result::Result<usize, tokio_rusqlite::Error> {
    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(sql, rusqlite::params_from_iter(params))?)
      })
      .await
  }
}

/// Translate constraint failures on a write into domain errors.
fn write_error(
  err: tokio_rusqlite::Error,
  on_unique: impl FnOnce() -> cinema_core::Error,
  on_dangling: impl FnOnce() -> cinema_core::Error,
) -> Error {
  let domain = match violation(&err) {
    Some(Violation::Unique) => on_unique(),
    Some(Violation::ForeignKey) => on_dangling(),
    None => return Error::Database(err),
  };
  tracing::warn!(error = %domain, "constraint rejected write");
  Error::Core(domain)
}

fn name_taken(name: &str) -> cinema_core::Error {
  cinema_core::Error::Conflict {
    entity: Entity::Director,
    field:  "name",
    value:  name.to_owned(),
  }
}

fn title_taken(title: &str) -> cinema_core::Error {
  cinema_core::Error::Conflict {
    entity: Entity::Movie,
    field:  "title",
    value:  title.to_owned(),
  }
}

/// Insert `name` unless a director already holds it, then read the row back.
fn upsert_director(
  tx: &rusqlite::Transaction<'_>,
  name: &str,
) -> rusqlite::Result<RawDirector> {
  tx.execute(
    "INSERT INTO directors (director_id, name) VALUES (?1, ?2)
     ON CONFLICT(name) DO NOTHING",
    rusqlite::params![encode_uuid(Uuid::new_v4()), name],
  )?;
  tx.query_row(
    &format!("SELECT {DIRECTOR_COLUMNS} FROM directors WHERE name = ?1"),
    rusqlite::params![name],
    RawDirector::from_row,
  )
}

fn text(s: &str) -> rusqlite::types::Value {
  rusqlite::types::Value::Text(s.to_owned())
}

fn int(n: impl Into<i64>) -> rusqlite::types::Value {
  rusqlite::types::Value::Integer(n.into())
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── Directors ─────────────────────────────────────────────────────────────

  async fn list_directors(&self) -> Result<Vec<Director>> {
    let sql = format!("SELECT {DIRECTOR_COLUMNS} FROM directors ORDER BY rowid");
    self
      .fetch_all(sql, None, RawDirector::from_row)
      .await?
      .into_iter()
      .map(RawDirector::into_director)
      .collect()
  }

  async fn get_director(&self, id: Uuid) -> Result<Option<Director>> {
    let sql =
      format!("SELECT {DIRECTOR_COLUMNS} FROM directors WHERE director_id = ?1");
    self
      .fetch_optional(sql, encode_uuid(id), RawDirector::from_row)
      .await?
      .map(RawDirector::into_director)
      .transpose()
  }

  async fn find_director_by_name(&self, name: &str) -> Result<Option<Director>> {
    let sql = format!("SELECT {DIRECTOR_COLUMNS} FROM directors WHERE name = ?1");
    self
      .fetch_optional(sql, name.to_owned(), RawDirector::from_row)
      .await?
      .map(RawDirector::into_director)
      .transpose()
  }

  async fn add_director(&self, input: NewDirector) -> Result<Director> {
    let director = Director {
      director_id: Uuid::new_v4(),
      name:        input.name,
    };

    self
      .execute(
        "INSERT INTO directors (director_id, name) VALUES (?1, ?2)",
        vec![text(&encode_uuid(director.director_id)), text(&director.name)],
      )
      .await
      .map_err(|e| {
        write_error(
          e,
          || name_taken(&director.name),
          || name_taken(&director.name),
        )
      })?;

    Ok(director)
  }

  async fn upsert_director_by_name(&self, name: String) -> Result<Director> {
    // Insert-if-absent and read-back share one transaction on the database
    // thread, so concurrent callers with the same name converge on one row.
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = upsert_director(&tx, &name)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_director()
  }

  async fn replace_director(
    &self,
    id: Uuid,
    input: NewDirector,
  ) -> Result<Option<Director>> {
    let changed = self
      .execute(
        "UPDATE directors SET name = ?2 WHERE director_id = ?1",
        vec![text(&encode_uuid(id)), text(&input.name)],
      )
      .await
      .map_err(|e| {
        write_error(e, || name_taken(&input.name), || name_taken(&input.name))
      })?;

    Ok((changed > 0).then(|| Director { director_id: id, name: input.name }))
  }

  async fn delete_director(&self, id: Uuid) -> Result<bool> {
    let changed = self
      .execute(
        "DELETE FROM directors WHERE director_id = ?1",
        vec![text(&encode_uuid(id))],
      )
      .await?;
    Ok(changed > 0)
  }

  // ── Movies ────────────────────────────────────────────────────────────────

  async fn list_movies(&self, director_id: Option<Uuid>) -> Result<Vec<Movie>> {
    let sql = match director_id {
      Some(_) => format!(
        "SELECT {MOVIE_COLUMNS} FROM movies WHERE director_id = ?1 ORDER BY rowid"
      ),
      None => format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY rowid"),
    };
    self
      .fetch_all(sql, director_id.map(encode_uuid), RawMovie::from_row)
      .await?
      .into_iter()
      .map(RawMovie::into_movie)
      .collect()
  }

  async fn get_movie(&self, id: Uuid) -> Result<Option<Movie>> {
    let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE movie_id = ?1");
    self
      .fetch_optional(sql, encode_uuid(id), RawMovie::from_row)
      .await?
      .map(RawMovie::into_movie)
      .transpose()
  }

  async fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>> {
    let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE title = ?1");
    self
      .fetch_optional(sql, title.to_owned(), RawMovie::from_row)
      .await?
      .map(RawMovie::into_movie)
      .transpose()
  }

  async fn add_movie(&self, input: NewMovie) -> Result<Movie> {
    let movie = Movie {
      movie_id:    Uuid::new_v4(),
      title:       input.title,
      description: input.description,
      duration:    input.duration,
      director_id: input.director_id,
    };

    self
      .execute(
        "INSERT INTO movies (movie_id, title, description, duration, director_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        vec![
          text(&encode_uuid(movie.movie_id)),
          text(&movie.title),
          text(&movie.description),
          int(movie.duration),
          text(&encode_uuid(movie.director_id)),
        ],
      )
      .await
      .map_err(|e| {
        write_error(
          e,
          || title_taken(&movie.title),
          || cinema_core::Error::NotFound(Entity::Director, movie.director_id),
        )
      })?;

    Ok(movie)
  }

  async fn add_movie_by_director(&self, input: NewMovieByDirector) -> Result<Movie> {
    let movie_id = Uuid::new_v4();
    let title = input.title.clone();

    // Dropping the transaction on error rolls back a freshly created director.
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let director = upsert_director(&tx, &input.director)?;
        tx.execute(
          "INSERT INTO movies (movie_id, title, description, duration, director_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            encode_uuid(movie_id),
            input.title,
            input.description,
            input.duration,
            director.director_id,
          ],
        )?;
        let raw = tx.query_row(
          &format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE movie_id = ?1"),
          rusqlite::params![encode_uuid(movie_id)],
          RawMovie::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await
      .map_err(|e| {
        // The director row is read inside the transaction, so only the title
        // can be violated.
        write_error(e, || title_taken(&title), || title_taken(&title))
      })?;

    raw.into_movie()
  }

  async fn replace_movie(&self, id: Uuid, input: NewMovie) -> Result<Option<Movie>> {
    let changed = self
      .execute(
        "UPDATE movies
         SET title = ?2, description = ?3, duration = ?4, director_id = ?5
         WHERE movie_id = ?1",
        vec![
          text(&encode_uuid(id)),
          text(&input.title),
          text(&input.description),
          int(input.duration),
          text(&encode_uuid(input.director_id)),
        ],
      )
      .await
      .map_err(|e| {
        write_error(
          e,
          || title_taken(&input.title),
          || cinema_core::Error::NotFound(Entity::Director, input.director_id),
        )
      })?;

    Ok((changed > 0).then(|| Movie {
      movie_id:    id,
      title:       input.title,
      description: input.description,
      duration:    input.duration,
      director_id: input.director_id,
    }))
  }

  async fn delete_movie(&self, id: Uuid) -> Result<bool> {
    let changed = self
      .execute(
        "DELETE FROM movies WHERE movie_id = ?1",
        vec![text(&encode_uuid(id))],
      )
      .await?;
    Ok(changed > 0)
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn list_reviews(&self, movie_id: Option<Uuid>) -> Result<Vec<Review>> {
    let sql = match movie_id {
      Some(_) => format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE movie_id = ?1 ORDER BY rowid"
      ),
      None => format!("SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY rowid"),
    };
    self
      .fetch_all(sql, movie_id.map(encode_uuid), RawReview::from_row)
      .await?
      .into_iter()
      .map(RawReview::into_review)
      .collect()
  }

  async fn get_review(&self, id: Uuid) -> Result<Option<Review>> {
    let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = ?1");
    self
      .fetch_optional(sql, encode_uuid(id), RawReview::from_row)
      .await?
      .map(RawReview::into_review)
      .transpose()
  }

  async fn add_review(&self, input: NewReview) -> Result<Review> {
    let review = Review {
      review_id: Uuid::new_v4(),
      movie_id:  input.movie_id,
      text:      input.text,
      stars:     input.stars,
    };

    let missing_movie =
      || cinema_core::Error::NotFound(Entity::Movie, review.movie_id);
    self
      .execute(
        "INSERT INTO reviews (review_id, movie_id, text, stars)
         VALUES (?1, ?2, ?3, ?4)",
        vec![
          text(&encode_uuid(review.review_id)),
          text(&encode_uuid(review.movie_id)),
          text(&review.text),
          int(review.stars),
        ],
      )
      .await
      .map_err(|e| write_error(e, missing_movie, missing_movie))?;

    Ok(review)
  }

  async fn replace_review(
    &self,
    id: Uuid,
    input: NewReview,
  ) -> Result<Option<Review>> {
    let missing_movie =
      || cinema_core::Error::NotFound(Entity::Movie, input.movie_id);
    let changed = self
      .execute(
        "UPDATE reviews SET movie_id = ?2, text = ?3, stars = ?4
         WHERE review_id = ?1",
        vec![
          text(&encode_uuid(id)),
          text(&encode_uuid(input.movie_id)),
          text(&input.text),
          int(input.stars),
        ],
      )
      .await
      .map_err(|e| write_error(e, missing_movie, missing_movie))?;

    Ok((changed > 0).then(|| Review {
      review_id: id,
      movie_id:  input.movie_id,
      text:      input.text,
      stars:     input.stars,
    }))
  }

  async fn delete_review(&self, id: Uuid) -> Result<bool> {
    let changed = self
      .execute(
        "DELETE FROM reviews WHERE review_id = ?1",
        vec![text(&encode_uuid(id))],
      )
      .await?;
    Ok(changed > 0)
  }
}
