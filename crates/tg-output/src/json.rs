//! GeoJSON / JSON output backend.
//!
//! Creates two files in the configured output directory on
//! [`finish`](OutputWriter::finish):
//! - `grid_cells.geojson`: a `FeatureCollection` of the most recent view,
//!   in the shape the map layer consumes (`properties: { id, zoom }`)
//! - `comparisons.json`: an array of every comparison row
//!
//! Like the map layer, a new view replaces the previous one rather than
//! accumulating.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use tg_grid::{GridFeature, features_to_geojson};

use crate::writer::OutputWriter;
use crate::{ComparisonRow, OutputResult};

pub struct GeoJsonWriter {
    dir:         PathBuf,
    view:        Option<(u32, Vec<GridFeature>)>,
    comparisons: Vec<ComparisonRow>,
    finished:    bool,
}

impl GeoJsonWriter {
    /// Check that `dir` exists; nothing is written until `finish`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::metadata(dir)?;
        Ok(Self { dir: dir.to_path_buf(), view: None, comparisons: Vec::new(), finished: false })
    }
}

impl OutputWriter for GeoJsonWriter {
    fn write_cells(&mut self, view: u32, features: &[GridFeature]) -> OutputResult<()> {
        self.view = Some((view, features.to_vec()));
        Ok(())
    }

    fn write_comparison(&mut self, row: &ComparisonRow) -> OutputResult<()> {
        self.comparisons.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let features = self.view.as_ref().map(|(_, f)| f.as_slice()).unwrap_or(&[]);
        let mut cells = BufWriter::new(File::create(self.dir.join("grid_cells.geojson"))?);
        cells.write_all(features_to_geojson(features).to_string().as_bytes())?;
        cells.flush()?;

        let mut comparisons = BufWriter::new(File::create(self.dir.join("comparisons.json"))?);
        serde_json::to_writer_pretty(&mut comparisons, &self.comparisons)?;
        comparisons.flush()?;

        debug!(
            "wrote {} cells (view {}) and {} comparisons to {}",
            features.len(),
            self.view.as_ref().map_or(0, |(v, _)| *v),
            self.comparisons.len(),
            self.dir.display()
        );
        Ok(())
    }
}
