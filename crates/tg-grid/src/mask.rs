//! Service-area mask and its intersection index.
//!
//! # Broad phase / narrow phase
//!
//! A city-sized mask is hundreds of disjoint polygons.  Testing every grid
//! cell against every part is O(cells × parts), so [`MaskIndex`] keeps an
//! R-tree (via `rstar`) of part bounding boxes.  A cell query first pulls the
//! parts whose boxes overlap the cell's box, then runs the exact
//! polygon/polygon test from `geo` only against those candidates.
//!
//! Touching counts as intersecting: a cell that shares only an edge or a
//! corner with the mask is kept.

use geo::{BoundingRect, Coord, Intersects, LineString, Polygon, Rect};
use geojson::GeoJson;
use log::warn;
use rstar::{AABB, RTree, RTreeObject};

use tg_core::BBox;

use crate::{GridError, GridResult};

// ── Mask ──────────────────────────────────────────────────────────────────────

/// Immutable set of polygons defining the valid service area, in lon/lat
/// degrees.  Multipolygons are flattened into their member polygons.
#[derive(Clone, Debug, Default)]
pub struct Mask {
    parts: Vec<Polygon<f64>>,
}

impl Mask {
    pub fn new(parts: Vec<Polygon<f64>>) -> Self {
        Self { parts }
    }

    /// A mask with no parts.  Every cell tests as outside.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a GeoJSON `FeatureCollection` of `Polygon` / `MultiPolygon`
    /// features.
    ///
    /// Anything else (a bare geometry, a feature without geometry, a point
    /// or line feature, a position with fewer than two ordinates) is a fatal
    /// [`GridError::InvalidMask`].
    pub fn from_geojson_str(s: &str) -> GridResult<Self> {
        let geojson: GeoJson = s.parse()?;
        Self::from_geojson(&geojson)
    }

    pub fn from_geojson(geojson: &GeoJson) -> GridResult<Self> {
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(GridError::InvalidMask("expected a FeatureCollection".into()));
        };

        let mut parts = Vec::with_capacity(collection.features.len());
        for (i, feature) in collection.features.iter().enumerate() {
            let geometry = feature
                .geometry
                .as_ref()
                .ok_or_else(|| GridError::InvalidMask(format!("feature {i} has no geometry")))?;
            match &geometry.value {
                geojson::Value::Polygon(rings) => parts.push(polygon_from_rings(i, rings)?),
                geojson::Value::MultiPolygon(polys) => {
                    for rings in polys {
                        parts.push(polygon_from_rings(i, rings)?);
                    }
                }
                other => {
                    return Err(GridError::InvalidMask(format!(
                        "feature {i} has unsupported geometry type {}",
                        value_type(other)
                    )));
                }
            }
        }
        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[Polygon<f64>] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Union of the part bounding boxes, or `None` for an empty mask.
    pub fn bounds(&self) -> Option<BBox> {
        self.parts
            .iter()
            .filter_map(|p| p.bounding_rect())
            .map(|r| BBox::new(r.min().x, r.min().y, r.max().x, r.max().y))
            .reduce(|a, b| {
                BBox::new(
                    a.west.min(b.west),
                    a.south.min(b.south),
                    a.east.max(b.east),
                    a.north.max(b.north),
                )
            })
    }
}

fn value_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_)              => "Point",
        geojson::Value::MultiPoint(_)         => "MultiPoint",
        geojson::Value::LineString(_)         => "LineString",
        geojson::Value::MultiLineString(_)    => "MultiLineString",
        geojson::Value::Polygon(_)            => "Polygon",
        geojson::Value::MultiPolygon(_)       => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn polygon_from_rings(feature: usize, rings: &[Vec<Vec<f64>>]) -> GridResult<Polygon<f64>> {
    let mut rings = rings
        .iter()
        .map(|ring| ring_from_positions(feature, ring))
        .collect::<GridResult<Vec<_>>>()?;
    if rings.is_empty() {
        return Err(GridError::InvalidMask(format!("feature {feature} has a polygon with no rings")));
    }
    let exterior = rings.remove(0);
    Ok(Polygon::new(exterior, rings))
}

fn ring_from_positions(feature: usize, ring: &[Vec<f64>]) -> GridResult<LineString<f64>> {
    ring.iter()
        .map(|pos| match pos.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(GridError::InvalidMask(format!(
                "feature {feature} has a position with {} ordinates",
                pos.len()
            ))),
        })
        .collect::<GridResult<Vec<_>>>()
        .map(LineString::new)
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Bounding box of one mask part, pointing back into `MaskIndex::parts`.
#[derive(Clone)]
struct PartEntry {
    envelope: AABB<[f64; 2]>,
    part:     usize,
}

impl RTreeObject for PartEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

#[inline]
fn rect_envelope(r: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([r.min().x, r.min().y], [r.max().x, r.max().y])
}

// ── MaskIndex ─────────────────────────────────────────────────────────────────

/// Mask parts plus a bounding-box R-tree over them.
///
/// Parts that cannot be tested reliably (non-finite coordinates, or an
/// exterior ring with fewer than four positions after closing) are left out
/// of the tree, so they never intersect anything.  One bad part therefore
/// hides only its own area instead of failing the whole configuration.
pub struct MaskIndex {
    parts:   Vec<Polygon<f64>>,
    tree:    RTree<PartEntry>,
    skipped: usize,
}

impl MaskIndex {
    /// Bulk-load the index.  O(P log P) in the number of parts.
    pub fn build(mask: &Mask) -> Self {
        let parts = mask.parts().to_vec();
        let mut skipped = 0;

        let entries: Vec<PartEntry> = parts
            .iter()
            .enumerate()
            .filter_map(|(i, poly)| match usable_bounds(poly) {
                Some(rect) => Some(PartEntry { envelope: rect_envelope(&rect), part: i }),
                None => {
                    warn!("mask part {i} is degenerate; treating it as outside every cell");
                    skipped += 1;
                    None
                }
            })
            .collect();

        Self { parts, tree: RTree::bulk_load(entries), skipped }
    }

    /// Number of parts, usable or not.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Number of parts excluded as degenerate.
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Number of parts whose bounding box overlaps `rect` (broad phase only).
    pub fn candidate_count(&self, rect: &Rect<f64>) -> usize {
        self.tree
            .locate_in_envelope_intersecting(&rect_envelope(rect))
            .count()
    }

    /// Exact test: does the cell `rect` intersect any usable mask part?
    pub fn intersects_rect(&self, rect: &Rect<f64>) -> bool {
        let cell = rect.to_polygon();
        self.tree
            .locate_in_envelope_intersecting(&rect_envelope(rect))
            .any(|entry| self.parts[entry.part].intersects(&cell))
    }
}

fn usable_bounds(poly: &Polygon<f64>) -> Option<Rect<f64>> {
    let exterior = poly.exterior();
    if exterior.0.len() < 4 {
        return None;
    }
    let finite = std::iter::once(exterior)
        .chain(poly.interiors())
        .flat_map(|ring| ring.0.iter())
        .all(|c| c.x.is_finite() && c.y.is_finite());
    if !finite {
        return None;
    }
    poly.bounding_rect()
}
