//! Grid configuration: the coarse scan and root-code assignment.
//!
//! # Algorithm
//!
//! 1. Origin = `(west, north)` of the bounding box.
//! 2. `cols = ceil(width / coarse)`, `rows = ceil(height / coarse)`.
//! 3. Scan row-major; test each coarse rectangle against the [`MaskIndex`].
//! 4. Every hit gets the next root index, and with it the letter code
//!    `encode_root(index)`: `A`, `B`, … `Z`, `AA`, …
//!
//! Coarse cells that miss the mask get no entry, and nothing below them is
//! ever generated at any tier.  That holds even when a finer sub-cell would
//! touch the mask on its own; the coarse scan is the only gate.
//!
//! A [`Grid`] is immutable once built.  Reconfiguring means building a new
//! one, so readers never observe a half-updated map.

use geo::Polygon;
use log::{debug, info};
use rustc_hash::FxHashMap;

use tg_core::{BBox, CellId, GridConfig, LonLat, RootIndex, TierIndex, decode_root, encode_root};

use crate::cell::CellFrame;
use crate::mask::{Mask, MaskIndex};
use crate::GridResult;

/// A mask-intersecting coarse cell and its assigned code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootCell {
    pub index: RootIndex,
    pub code:  String,
    pub col:   i64,
    pub row:   i64,
}

/// Configured grid state consumed by the feature generator.
///
/// Do not construct directly; use [`Grid::configure`].
pub struct Grid {
    pub(crate) config: GridConfig,
    pub(crate) bbox:   BBox,
    pub(crate) origin: LonLat,
    pub(crate) cols:   i64,
    pub(crate) rows:   i64,

    /// Root cells in assignment (scan) order, indexed by `RootIndex`.
    pub(crate) roots: Vec<RootCell>,

    /// `(col, row)` → root index.  The O(1) ancestor lookup on the hot path.
    pub(crate) root_by_cell: FxHashMap<(i64, i64), RootIndex>,

    pub(crate) mask: MaskIndex,
}

impl Grid {
    /// Scan `bbox` at the coarse tier and assign root codes to every cell
    /// that intersects `mask`.
    ///
    /// Fails only on an invalid `config` or `bbox`.  An empty mask is fine:
    /// it yields a grid with no roots, and every generation returns nothing.
    pub fn configure(mask: &Mask, bbox: BBox, config: &GridConfig) -> GridResult<Grid> {
        config.validate()?;
        bbox.validate()?;

        let coarse = config.coarse_size();
        let origin = bbox.north_west();
        let cols = (bbox.width() / coarse).ceil() as i64;
        let rows = (bbox.height() / coarse).ceil() as i64;
        let frame = CellFrame::new(origin, coarse);

        let index = MaskIndex::build(mask);

        // Row-major: cell i is (col = i % cols, row = i / cols).
        let hits = scan(&frame, &index, cols, rows);

        let mut roots = Vec::new();
        let mut root_by_cell = FxHashMap::default();
        for (i, hit) in hits.into_iter().enumerate() {
            if !hit {
                continue;
            }
            let (col, row) = (i as i64 % cols, i as i64 / cols);
            let idx = RootIndex(roots.len() as u32);
            root_by_cell.insert((col, row), idx);
            roots.push(RootCell { index: idx, code: encode_root(idx), col, row });
        }

        info!(
            "grid configured: {cols}×{rows} coarse cells of {coarse}°, {} inside mask ({} parts, {} degenerate)",
            roots.len(),
            index.part_count(),
            index.skipped_count(),
        );

        Ok(Grid {
            config: config.clone(),
            bbox,
            origin,
            cols,
            rows,
            roots,
            root_by_cell,
            mask: index,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    /// North-west corner every tier is anchored to.
    pub fn origin(&self) -> LonLat {
        self.origin
    }

    /// Coarse grid dimensions `(cols, rows)`.
    pub fn dimensions(&self) -> (i64, i64) {
        (self.cols, self.rows)
    }

    /// Root cells in assignment order.
    pub fn roots(&self) -> &[RootCell] {
        &self.roots
    }

    pub fn root_at(&self, col: i64, row: i64) -> Option<&RootCell> {
        self.root_by_cell.get(&(col, row)).map(|i| &self.roots[i.index()])
    }

    pub fn root_by_code(&self, code: &str) -> Option<&RootCell> {
        decode_root(code).and_then(|i| self.roots.get(i.index()))
    }

    pub fn mask_index(&self) -> &MaskIndex {
        &self.mask
    }

    /// The tier active at `zoom`, if any.
    pub fn active_tier(&self, zoom: f64) -> Option<TierIndex> {
        self.config.tier_for_zoom(zoom)
    }

    /// Lattice of tier `tier`, sized exactly `coarse / 2^depth`.
    pub fn frame(&self, tier: TierIndex) -> CellFrame {
        CellFrame::new(self.origin, self.config.lattice_size(tier))
    }

    /// Geometry of a cell given by identifier, at whatever depth it names.
    ///
    /// Returns `None` if the root code was never assigned by this grid.
    /// The result is pure geometry; it is not re-tested against the mask.
    pub fn cell_polygon(&self, id: &CellId) -> Option<Polygon<f64>> {
        let root = self.roots.get(id.root.index())?;
        let depth = id.depth() as u32;
        if depth as usize > tg_core::config::MAX_DEPTH {
            return None;
        }
        let scale = 1i64 << depth;
        let (dc, dr) = id.offset_in_root();
        let frame = CellFrame::new(self.origin, self.config.coarse_size() / scale as f64);
        Some(frame.rect(root.col * scale + dc as i64, root.row * scale + dr as i64).to_polygon())
    }
}

#[cfg(not(feature = "parallel"))]
fn scan(frame: &CellFrame, index: &MaskIndex, cols: i64, rows: i64) -> Vec<bool> {
    debug!("scanning {} coarse cells", cols * rows);
    (0..cols * rows)
        .map(|i| index.intersects_rect(&frame.rect(i % cols, i / cols)))
        .collect()
}

#[cfg(feature = "parallel")]
fn scan(frame: &CellFrame, index: &MaskIndex, cols: i64, rows: i64) -> Vec<bool> {
    use rayon::prelude::*;

    debug!("scanning {} coarse cells in parallel", cols * rows);
    // `collect` on an indexed parallel iterator keeps input order.
    (0..cols * rows)
        .into_par_iter()
        .map(|i| index.intersects_rect(&frame.rect(i % cols, i / cols)))
        .collect()
}
