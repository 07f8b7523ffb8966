//! `tg-output` — grid-cell and comparison writers for the transit_grid
//! workspace.
//!
//! | Backend   | Files created                                    |
//! |-----------|--------------------------------------------------|
//! | GeoJSON   | `grid_cells.geojson`, `comparisons.json`         |
//! | CSV       | `grid_cells.csv`, `comparisons.csv`              |
//!
//! Both backends implement [`OutputWriter`] and are usually driven by a
//! [`SessionRecorder`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use tg_output::{GeoJsonWriter, SessionRecorder};
//!
//! let mut rec = SessionRecorder::new(GeoJsonWriter::new(Path::new("./output"))?);
//! rec.record_view(session.update_view(view, zoom));
//! rec.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod json;
pub mod recorder;
pub mod row;
pub mod writer;


pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use json::GeoJsonWriter;
pub use recorder::SessionRecorder;
pub use row::{CellRow, ComparisonRow};
pub use writer::OutputWriter;
