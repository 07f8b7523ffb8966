//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `grid_cells.csv`: every cell of every recorded view
//! - `comparisons.csv`
//!
//! Missing values (an unavailable mode, an undefined ratio) are written as
//! empty fields.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use tg_grid::GridFeature;

use crate::row::CellRow;
use crate::writer::OutputWriter;
use crate::{ComparisonRow, OutputResult};

/// Writes grid and comparison output to two CSV files.
pub struct CsvWriter {
    cells:       Writer<File>,
    comparisons: Writer<File>,
    finished:    bool,
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut cells = Writer::from_path(dir.join("grid_cells.csv"))?;
        cells.write_record(["view", "id", "zoom", "tier", "col", "row", "west", "south", "east", "north"])?;

        let mut comparisons = Writer::from_path(dir.join("comparisons.csv"))?;
        comparisons.write_record([
            "origin_id",
            "destination_id",
            "origin_lon",
            "origin_lat",
            "destination_lon",
            "destination_lat",
            "departure_unix",
            "drive_secs",
            "drive_m",
            "transit_secs",
            "transit_m",
            "ratio",
            "verdict",
        ])?;

        Ok(Self { cells, comparisons, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_cells(&mut self, view: u32, features: &[GridFeature]) -> OutputResult<()> {
        for f in features {
            let row = CellRow::from_feature(view, f);
            self.cells.write_record(&[
                row.view.to_string(),
                row.id,
                row.zoom.to_string(),
                row.tier.to_string(),
                row.col.to_string(),
                row.row.to_string(),
                row.west.to_string(),
                row.south.to_string(),
                row.east.to_string(),
                row.north.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_comparison(&mut self, row: &ComparisonRow) -> OutputResult<()> {
        self.comparisons.write_record(&[
            row.origin_id.clone(),
            row.destination_id.clone(),
            row.origin_lon.to_string(),
            row.origin_lat.to_string(),
            row.destination_lon.to_string(),
            row.destination_lat.to_string(),
            row.departure_unix.to_string(),
            opt(row.drive_secs),
            opt(row.drive_m),
            opt(row.transit_secs),
            opt(row.transit_m),
            opt(row.ratio),
            row.verdict.clone(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.cells.flush()?;
        self.comparisons.flush()?;
        Ok(())
    }
}
