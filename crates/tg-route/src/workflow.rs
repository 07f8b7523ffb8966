//! Click-driven comparison workflow.
//!
//! Ties a [`PointSelection`] to a [`CachedProvider`]: every click updates
//! the selection, and a click that completes a pair fetches both modes
//! (cache first) and classifies the result.

use log::{debug, info};

use tg_core::{AppConfig, CellId, ComparisonThresholds, DepartureTime, LonLat};
use tg_grid::{Grid, GridFeature};

use crate::cache::{CacheStats, CachedProvider, TripCache};
use crate::compare::{Comparison, compare};
use crate::provider::{TravelTimeProvider, TripTimes};
use crate::selection::{PointSelection, SelectedCell, SelectionEvent};
use crate::RouteResult;

/// A completed origin–destination comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteOutcome {
    pub origin:      SelectedCell,
    pub destination: SelectedCell,
    pub departure:   DepartureTime,
    pub times:       TripTimes,
    pub comparison:  Comparison,
}

/// Result of one click.
#[derive(Clone, Debug, PartialEq)]
pub enum WorkflowStep {
    OriginSelected(CellId),
    Cleared,
    Compared(RouteOutcome),
}

pub struct RouteWorkflow<P, C> {
    selection:  PointSelection,
    provider:   CachedProvider<P, C>,
    thresholds: ComparisonThresholds,
    departure:  DepartureTime,
}

impl<P: TravelTimeProvider, C: TripCache> RouteWorkflow<P, C> {
    pub fn new(provider: P, cache: C, config: &AppConfig, departure: DepartureTime) -> Self {
        Self {
            selection:  PointSelection::new(),
            provider:   CachedProvider::new(provider, cache, config.cache.bucket_secs),
            thresholds: config.comparison.clone(),
            departure,
        }
    }

    /// Departure used for subsequent comparisons.
    pub fn set_departure(&mut self, departure: DepartureTime) {
        self.departure = departure;
    }

    pub fn departure(&self) -> DepartureTime {
        self.departure
    }

    /// Handle a click on `feature`.  `now` is the wall clock in Unix
    /// seconds, used for cache expiry.
    ///
    /// On a provider error the selection still holds the completed pair; the
    /// next click starts a new origin as usual.
    pub fn click(&mut self, feature: &GridFeature, now: i64) -> RouteResult<WorkflowStep> {
        match self.selection.click(SelectedCell::from_feature(feature)) {
            SelectionEvent::OriginSet(cell) => {
                debug!("origin set to {}", cell.id);
                Ok(WorkflowStep::OriginSelected(cell.id))
            }
            SelectionEvent::Cleared => {
                debug!("selection cleared");
                Ok(WorkflowStep::Cleared)
            }
            SelectionEvent::Completed { origin, destination } => {
                let times = self.provider.fetch(origin.point, destination.point, self.departure, now)?;
                let comparison = compare(&times, &self.thresholds);
                info!(
                    "{} -> {} at {}: {} (ratio {})",
                    origin.id,
                    destination.id,
                    self.departure,
                    comparison.verdict,
                    comparison.ratio.map_or_else(|| "n/a".to_owned(), |r| format!("{r:.2}")),
                );
                Ok(WorkflowStep::Compared(RouteOutcome {
                    origin,
                    destination,
                    departure: self.departure,
                    times,
                    comparison,
                }))
            }
        }
    }

    /// Hit-test `point` against `grid` at `zoom` and treat a hit as a click.
    /// Returns `Ok(None)` when no emitted cell lies under the point.
    pub fn click_at(
        &mut self,
        grid: &Grid,
        point: LonLat,
        zoom: f64,
        now: i64,
    ) -> RouteResult<Option<WorkflowStep>> {
        match grid.locate(point, zoom) {
            Some(feature) => self.click(&feature, now).map(Some),
            None => Ok(None),
        }
    }

    pub fn selection(&self) -> &PointSelection {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.provider.stats()
    }

    pub fn provider(&self) -> &CachedProvider<P, C> {
        &self.provider
    }
}
