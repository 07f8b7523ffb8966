//! Error types for tg-route.

use thiserror::Error;

use tg_core::{CoreError, LonLat};

/// Errors that can occur while fetching or caching travel times.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The upstream routing service failed.  Never cached.
    #[error("travel-time provider failed: {0}")]
    Provider(String),

    #[error("invalid coordinate {0}")]
    InvalidPoint(LonLat),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Alias for `Result<T, RouteError>`.
pub type RouteResult<T> = Result<T, RouteError>;
