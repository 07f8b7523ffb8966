//! Viewport-driven cell generation.
//!
//! # Per-cell pipeline
//!
//! For every `(col, row)` of the active tier that overlaps the view:
//!
//! 1. center point → coarse ancestor `(floor((dx + ε) / coarse), …)`
//! 2. ancestor has no root code → skip (pruned)
//! 3. descend from the coarse cell to the tier, halving each step; the
//!    quadrant at each level comes from comparing the center's offset inside
//!    the current parent against the half size (ε-biased)
//! 4. broad + narrow mask test on the cell's own rectangle → skip on miss
//! 5. emit `{ polygon, id, zoom }`
//!
//! Step 4 is needed because a coarse hit does not imply every sub-cell hits.
//! Step 2 is never relaxed: a sub-cell under a pruned root is not emitted
//! even if it would pass step 4.

use geo::{Polygon, Rect};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use log::debug;

use tg_core::{BBox, CellId, LonLat, Quadrant, RootIndex, TierIndex};

use crate::cell::{CellFrame, clamp_range};
use crate::grid::Grid;

// ── GridFeature ───────────────────────────────────────────────────────────────

/// One emitted grid cell.  Ephemeral: a fresh list is built on every
/// viewport update.
#[derive(Clone, Debug, PartialEq)]
pub struct GridFeature {
    pub id:   CellId,
    /// `zoom.round()` of the request that produced this cell.
    pub zoom: i32,
    pub tier: TierIndex,
    pub col:  i64,
    pub row:  i64,
    pub rect: Rect<f64>,
}

impl GridFeature {
    pub fn polygon(&self) -> Polygon<f64> {
        self.rect.to_polygon()
    }

    pub fn center(&self) -> LonLat {
        let c = self.rect.center();
        LonLat::new(c.x, c.y)
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.rect.min().x, self.rect.min().y, self.rect.max().x, self.rect.max().y)
    }

    /// GeoJSON shape consumed by the map layer:
    /// `{ geometry: Polygon, properties: { id, zoom } }`.
    pub fn to_geojson(&self) -> Feature {
        let b = self.bbox();
        let ring = vec![
            vec![b.west, b.south],
            vec![b.east, b.south],
            vec![b.east, b.north],
            vec![b.west, b.north],
            vec![b.west, b.south],
        ];
        let mut properties = serde_json::Map::new();
        properties.insert("id".into(), self.id.to_string().into());
        properties.insert("zoom".into(), self.zoom.into());
        Feature {
            bbox:            None,
            geometry:        Some(Geometry::new(geojson::Value::Polygon(vec![ring]))),
            id:              None,
            properties:      Some(properties),
            foreign_members: None,
        }
    }
}

/// Wrap features in a GeoJSON `FeatureCollection`.
pub fn features_to_geojson(features: &[GridFeature]) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection {
        bbox:            None,
        features:        features.iter().map(GridFeature::to_geojson).collect(),
        foreign_members: None,
    })
}

// ── Generation ────────────────────────────────────────────────────────────────

/// Per-call view of the active tier.
struct TierView {
    tier:  TierIndex,
    frame: CellFrame,
    depth: usize,
    zoom:  i32,
}

impl Grid {
    /// Cells of the tier active at `zoom` that overlap `view`, survive the
    /// coarse pruning and intersect the mask.
    ///
    /// Returns an empty list when no tier covers `zoom`, when `view` is
    /// invalid or lies outside the grid, or when the mask is empty.
    pub fn generate(&self, view: BBox, zoom: f64) -> Vec<GridFeature> {
        let Some(tv) = self.tier_view(zoom) else {
            debug!("zoom {zoom} has no grid tier");
            return Vec::new();
        };
        if view.validate().is_err() {
            debug!("ignoring invalid view {view}");
            return Vec::new();
        }

        let scale = 1i64 << tv.depth;
        let (cols, rows) = tv.frame.ranges(&view);
        let cols = clamp_range(cols, 0..self.cols * scale);
        let rows = clamp_range(rows, 0..self.rows * scale);

        let mut out = Vec::new();
        let mut pruned = 0usize;
        let mut outside = 0usize;
        for row in rows.clone() {
            for col in cols.clone() {
                match self.resolve(&tv, col, row) {
                    Resolved::Pruned => pruned += 1,
                    Resolved::OutsideMask => outside += 1,
                    Resolved::Emit(f) => out.push(f),
                }
            }
        }

        debug!(
            "tier {} @ zoom {}: {} cells emitted from {}×{} candidates ({pruned} pruned, {outside} outside mask)",
            tv.tier.0,
            tv.zoom,
            out.len(),
            cols.end - cols.start,
            rows.end - rows.start,
        );
        out
    }

    /// The cell under `point` at `zoom`, subject to the same pruning and
    /// mask test as [`generate`](Self::generate).  Used for click hit-tests.
    pub fn locate(&self, point: LonLat, zoom: f64) -> Option<GridFeature> {
        let tv = self.tier_view(zoom)?;
        if !point.is_finite() {
            return None;
        }
        let (col, row) = tv.frame.locate(point, self.config.epsilon);
        let scale = 1i64 << tv.depth;
        if !(0..self.cols * scale).contains(&col) || !(0..self.rows * scale).contains(&row) {
            return None;
        }
        match self.resolve(&tv, col, row) {
            Resolved::Emit(f) => Some(f),
            _ => None,
        }
    }

    /// Identifier of cell `(col, row)` at `tier`, or `None` if its coarse
    /// ancestor was pruned.  Does not run the mask test.
    pub fn cell_id(&self, tier: TierIndex, col: i64, row: i64) -> Option<CellId> {
        let frame = self.frame(tier);
        let depth = self.config.depth(tier);
        self.identify(&frame, depth, col, row)
    }

    fn tier_view(&self, zoom: f64) -> Option<TierView> {
        let tier = self.config.tier_for_zoom(zoom)?;
        Some(TierView {
            tier,
            frame: self.frame(tier),
            depth: self.config.depth(tier),
            zoom:  zoom.round() as i32,
        })
    }

    fn resolve(&self, tv: &TierView, col: i64, row: i64) -> Resolved {
        let Some(id) = self.identify(&tv.frame, tv.depth, col, row) else {
            return Resolved::Pruned;
        };
        let rect = tv.frame.rect(col, row);
        if !self.mask.intersects_rect(&rect) {
            return Resolved::OutsideMask;
        }
        Resolved::Emit(GridFeature { id, zoom: tv.zoom, tier: tv.tier, col, row, rect })
    }

    /// Steps 1–3 of the pipeline: ancestor lookup and quadtree descent.
    fn identify(&self, frame: &CellFrame, depth: usize, col: i64, row: i64) -> Option<CellId> {
        let eps = self.config.epsilon;
        let coarse = self.config.coarse_size();

        let center = frame.center(col, row);
        let dx = center.lon - self.origin.lon;
        let dy = self.origin.lat - center.lat;

        let root_col = ((dx + eps) / coarse).floor() as i64;
        let root_row = ((dy + eps) / coarse).floor() as i64;
        let root: RootIndex = *self.root_by_cell.get(&(root_col, root_row))?;

        let mut path = Vec::with_capacity(depth);
        let mut size = coarse;
        let mut px = root_col as f64 * coarse;
        let mut py = root_row as f64 * coarse;
        for _ in 0..depth {
            let half = size * 0.5;
            let col_bit = dx - px + eps >= half;
            let row_bit = dy - py + eps >= half;
            if col_bit {
                px += half;
            }
            if row_bit {
                py += half;
            }
            size = half;
            path.push(Quadrant::from_bits(row_bit, col_bit));
        }
        Some(CellId::new(root, path))
    }
}

enum Resolved {
    Pruned,
    OutsideMask,
    Emit(GridFeature),
}
