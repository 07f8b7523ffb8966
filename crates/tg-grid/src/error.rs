//! Grid-subsystem error type.

use thiserror::Error;

use tg_core::CoreError;

/// Errors produced by `tg-grid`.
///
/// Only configuration can fail.  Generation never errors: a zoom with no
/// tier, a pruned coarse ancestor or a viewport outside the grid all yield
/// an empty result instead.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid mask: {0}")]
    InvalidMask(String),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type GridResult<T> = Result<T, GridError>;
