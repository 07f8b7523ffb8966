//! `SessionRecorder<W>`: feeds viewport updates and comparisons to an
//! `OutputWriter`.

use tg_grid::GridFeature;
use tg_route::RouteOutcome;

use crate::row::ComparisonRow;
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// Records a map session to any [`OutputWriter`] backend.
///
/// Host callbacks (pan, zoom, click) have no error channel, so write errors
/// are stored internally.  Check with [`take_error`][Self::take_error] when
/// the session ends.
pub struct SessionRecorder<W: OutputWriter> {
    writer:     W,
    next_view:  u32,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SessionRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, next_view: 0, last_error: None }
    }

    /// Record the feature list of one viewport update.
    pub fn record_view(&mut self, features: &[GridFeature]) {
        let view = self.next_view;
        self.next_view += 1;
        let result = self.writer.write_cells(view, features);
        self.store_err(result);
    }

    pub fn record_outcome(&mut self, outcome: &RouteOutcome) {
        let result = self.writer.write_comparison(&ComparisonRow::from(outcome));
        self.store_err(result);
    }

    /// Number of views recorded so far.
    pub fn views(&self) -> u32 {
        self.next_view
    }

    /// Finish the writer; a stored error takes precedence over a finish error.
    pub fn finish(&mut self) -> OutputResult<()> {
        let result = self.writer.finish();
        match self.last_error.take() {
            Some(e) => Err(e),
            None => result,
        }
    }

    /// Take the stored write error (if any).
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}
