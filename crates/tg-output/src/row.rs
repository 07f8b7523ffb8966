//! Plain data row types written by output backends.

use serde::Serialize;

use tg_grid::GridFeature;
use tg_route::RouteOutcome;

/// One emitted grid cell, flattened for tabular output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellRow {
    pub view:  u32,
    pub id:    String,
    pub zoom:  i32,
    pub tier:  u8,
    pub col:   i64,
    pub row:   i64,
    pub west:  f64,
    pub south: f64,
    pub east:  f64,
    pub north: f64,
}

impl CellRow {
    pub fn from_feature(view: u32, f: &GridFeature) -> Self {
        let b = f.bbox();
        Self {
            view,
            id:    f.id.to_string(),
            zoom:  f.zoom,
            tier:  f.tier.0,
            col:   f.col,
            row:   f.row,
            west:  b.west,
            south: b.south,
            east:  b.east,
            north: b.north,
        }
    }
}

/// One completed comparison.  Missing legs and ratios stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub origin_id:       String,
    pub destination_id:  String,
    pub origin_lon:      f64,
    pub origin_lat:      f64,
    pub destination_lon: f64,
    pub destination_lat: f64,
    pub departure_unix:  i64,
    pub drive_secs:      Option<u32>,
    pub drive_m:         Option<f64>,
    pub transit_secs:    Option<u32>,
    pub transit_m:       Option<f64>,
    pub ratio:           Option<f64>,
    pub verdict:         String,
}

impl From<&RouteOutcome> for ComparisonRow {
    fn from(o: &RouteOutcome) -> Self {
        Self {
            origin_id:       o.origin.id.to_string(),
            destination_id:  o.destination.id.to_string(),
            origin_lon:      o.origin.point.lon,
            origin_lat:      o.origin.point.lat,
            destination_lon: o.destination.point.lon,
            destination_lat: o.destination.point.lat,
            departure_unix:  o.departure.unix_secs(),
            drive_secs:      o.times.drive.map(|l| l.duration_secs),
            drive_m:         o.times.drive.map(|l| l.distance_m),
            transit_secs:    o.times.transit.map(|l| l.duration_secs),
            transit_m:       o.times.transit.map(|l| l.distance_m),
            ratio:           o.comparison.ratio,
            verdict:         o.comparison.verdict.as_str().to_owned(),
        }
    }
}
