//! JSON REST API for the cinema catalogue.
//!
//! Exposes an axum [`Router`] backed by any
//! [`cinema_core::store::CatalogStore`]. Transport concerns (listening,
//! request tracing) are the caller's responsibility; see the `server` binary.

pub mod directors;
pub mod error;
pub mod movies;
pub mod reviews;
pub mod validate;
pub mod views;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use cinema_core::store::CatalogStore;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, layered from an optional TOML file and
/// `CINEMA_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// SQLite database file; a leading `~/` is expanded by the binary.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8000 }

fn default_store_path() -> PathBuf { PathBuf::from("cinema.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    ServerConfig {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
    }
  }
}

impl ServerConfig {
  /// Load from `path` (skipped if missing), then apply `CINEMA_*` overrides.
  pub fn load(path: &std::path::Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("CINEMA"))
      .build()?
      .try_deserialize()
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested or layered by the caller regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CatalogStore + 'static,
{
  Router::new()
    // Movies
    .route("/movies", get(movies::list::<S>).post(movies::create::<S>))
    .route(
      "/movies/{id}",
      get(movies::get_one::<S>)
        .put(movies::replace::<S>)
        .delete(movies::delete_one::<S>),
    )
    .route("/movies-with-reviews", get(movies::with_reviews::<S>))
    // Directors
    .route(
      "/directors",
      get(directors::list::<S>).post(directors::create::<S>),
    )
    .route(
      "/directors/{id}",
      get(directors::get_one::<S>)
        .put(directors::replace::<S>)
        .delete(directors::delete_one::<S>),
    )
    // Reviews
    .route("/reviews", get(reviews::list::<S>).post(reviews::create::<S>))
    .route(
      "/reviews/{id}",
      get(reviews::get_one::<S>)
        .put(reviews::replace::<S>)
        .delete(reviews::delete_one::<S>),
    )
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
