//! The `OutputWriter` trait implemented by all backend writers.

use tg_grid::GridFeature;

use crate::{ComparisonRow, OutputResult};

/// Trait implemented by the GeoJSON and CSV writers.
pub trait OutputWriter {
    /// Write the cells produced by one viewport update.  `view` numbers
    /// updates from 0 in the order they happened.
    fn write_cells(&mut self, view: u32, features: &[GridFeature]) -> OutputResult<()>;

    /// Write one completed origin–destination comparison.
    fn write_comparison(&mut self, row: &ComparisonRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
