//! `GridSession`: the host-facing holder for "configured or not".
//!
//! A map UI reconfigures rarely (mask change) and regenerates constantly
//! (every pan / zoom / resize).  The session owns the current [`Grid`] and
//! the current feature list:
//!
//! - [`configure`](GridSession::configure) builds a new grid first and only
//!   then swaps it in, so a failed call leaves the previous grid untouched.
//! - [`update_view`](GridSession::update_view) replaces the feature list;
//!   the previous generation is dropped, never merged.
//! - Before the first successful `configure`, generation yields nothing.
//!
//! The session takes `&mut self` for both operations, so the borrow checker
//! rules out generating against a grid that is being replaced.

use tg_core::{BBox, GridConfig, LonLat};

use crate::generate::GridFeature;
use crate::grid::Grid;
use crate::mask::Mask;
use crate::GridResult;

pub struct GridSession {
    config:   GridConfig,
    grid:     Option<Grid>,
    features: Vec<GridFeature>,
}

impl GridSession {
    /// An unconfigured session using `config` for every future grid.
    pub fn new(config: GridConfig) -> Self {
        Self { config, grid: None, features: Vec::new() }
    }

    /// Build a grid for `mask` over `bbox` and make it current.
    ///
    /// On error the previous grid and features are kept.
    pub fn configure(&mut self, mask: &Mask, bbox: BBox) -> GridResult<()> {
        let grid = Grid::configure(mask, bbox, &self.config)?;
        self.grid = Some(grid);
        self.features.clear();
        Ok(())
    }

    /// Drop the current grid and features.
    pub fn reset(&mut self) {
        self.grid = None;
        self.features.clear();
    }

    pub fn is_configured(&self) -> bool {
        self.grid.is_some()
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Regenerate for a new viewport and return the new feature list.
    pub fn update_view(&mut self, view: BBox, zoom: f64) -> &[GridFeature] {
        self.features = match &self.grid {
            Some(grid) => grid.generate(view, zoom),
            None => Vec::new(),
        };
        &self.features
    }

    /// Features from the most recent [`update_view`](Self::update_view).
    pub fn features(&self) -> &[GridFeature] {
        &self.features
    }

    /// Click hit-test against the current grid.
    pub fn locate(&self, point: LonLat, zoom: f64) -> Option<GridFeature> {
        self.grid.as_ref()?.locate(point, zoom)
    }
}
