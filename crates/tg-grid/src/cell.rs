//! Origin-anchored integer cell geometry.
//!
//! Every tier addresses its cells as integer `(col, row)` offsets from the
//! same origin (the north-west corner of the configuring bounding box).
//! Columns grow eastward, rows grow southward:
//!
//! ```text
//!   origin ─► col 0   col 1   col 2
//!   row 0   ┌───────┬───────┬───────┐
//!           │       │       │       │
//!   row 1   ├───────┼───────┼───────┤
//! ```
//!
//! Cell edges are always computed as `origin ± k * size`, never by adding
//! sizes up, so a tier whose size is `coarse / 2^d` puts its edge `k * 2^d`
//! at exactly the same float as the coarse edge `k`.  That is what keeps the
//! tiers seam-free.

use std::ops::Range;

use geo::{Coord, Rect};

use tg_core::{BBox, LonLat};

/// One tier's cell lattice.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellFrame {
    pub origin: LonLat,
    /// Cell edge length in degrees.
    pub size:   f64,
}

impl CellFrame {
    #[inline]
    pub fn new(origin: LonLat, size: f64) -> Self {
        Self { origin, size }
    }

    /// Rectangle of cell `(col, row)`.
    pub fn rect(&self, col: i64, row: i64) -> Rect<f64> {
        let west  = self.origin.lon + col as f64 * self.size;
        let east  = self.origin.lon + (col + 1) as f64 * self.size;
        let north = self.origin.lat - row as f64 * self.size;
        let south = self.origin.lat - (row + 1) as f64 * self.size;
        Rect::new(Coord { x: west, y: south }, Coord { x: east, y: north })
    }

    pub fn center(&self, col: i64, row: i64) -> LonLat {
        LonLat::new(
            self.origin.lon + (col as f64 + 0.5) * self.size,
            self.origin.lat - (row as f64 + 0.5) * self.size,
        )
    }

    /// Cell containing `p`.  `epsilon` is added before the floor so a point
    /// sitting on an edge lands in the east / south neighbour consistently.
    pub fn locate(&self, p: LonLat, epsilon: f64) -> (i64, i64) {
        let col = ((p.lon - self.origin.lon + epsilon) / self.size).floor() as i64;
        let row = ((self.origin.lat - p.lat + epsilon) / self.size).floor() as i64;
        (col, row)
    }

    /// Columns overlapping `[west, east]` with positive width: floor on the
    /// low edge, ceil on the high edge.
    ///
    /// The division only gives a first guess; the result is then checked
    /// against the same edge floats [`rect`](Self::rect) produces.  A cell
    /// that is visible by any sliver is kept, and a neighbour that merely
    /// shares the view's edge is not.
    pub fn col_range(&self, west: f64, east: f64) -> Range<i64> {
        let edge = |k: i64| self.origin.lon + k as f64 * self.size;
        cover(
            edge,
            (west - self.origin.lon) / self.size,
            (east - self.origin.lon) / self.size,
            west,
            east,
        )
    }

    /// Rows overlapping `[south, north]`; see [`col_range`](Self::col_range).
    pub fn row_range(&self, south: f64, north: f64) -> Range<i64> {
        // Rows grow southward; negate so edges increase with `k`.
        let edge = |k: i64| -(self.origin.lat - k as f64 * self.size);
        cover(
            edge,
            (self.origin.lat - north) / self.size,
            (self.origin.lat - south) / self.size,
            -north,
            -south,
        )
    }

    /// Column and row ranges covering `view`.
    pub fn ranges(&self, view: &BBox) -> (Range<i64>, Range<i64>) {
        (self.col_range(view.west, view.east), self.row_range(view.south, view.north))
    }
}

/// Indices `k` whose interval `[edge(k), edge(k + 1)]` overlaps `(lo, hi)`.
/// `edge` must be increasing; `guess_lo` / `guess_hi` are the fractional
/// positions of `lo` / `hi`, off by at most float noise.  Never empty.
fn cover(edge: impl Fn(i64) -> f64, guess_lo: f64, guess_hi: f64, lo: f64, hi: f64) -> Range<i64> {
    let mut start = guess_lo.floor() as i64;
    if edge(start) > lo {
        start -= 1;
    } else if edge(start + 1) <= lo {
        start += 1;
    }
    let mut end = guess_hi.ceil() as i64;
    if edge(end) < hi {
        end += 1;
    } else if end > start + 1 && edge(end - 1) >= hi {
        end -= 1;
    }
    start..end.max(start + 1)
}

/// Intersection of two half-open ranges (possibly empty).
#[inline]
pub(crate) fn clamp_range(r: Range<i64>, bounds: Range<i64>) -> Range<i64> {
    let start = r.start.max(bounds.start);
    let end = r.end.min(bounds.end);
    start..end.max(start)
}
