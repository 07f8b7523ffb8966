//! Synthetic Lisbon service area.
//!
//! Two parts: a coarse outline of the municipality north of the Tagus and
//! the Almada / Cacilhas ferry landing on the south bank.  Coordinates are
//! hand-placed, good to a few hundred metres.

use tg_core::BBox;

/// Map extent the grid is configured over.
pub const LISBON_BBOX: BBox = BBox { west: -9.3, south: 38.6, east: -9.0, north: 38.8 };

pub const LISBON_MASK: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "name": "Lisboa" },
      "geometry": {
        "type": "Polygon",
        "coordinates": [[
          [-9.230, 38.692], [-9.200, 38.694], [-9.165, 38.700], [-9.140, 38.705],
          [-9.115, 38.710], [-9.097, 38.730], [-9.090, 38.760], [-9.087, 38.795],
          [-9.110, 38.797], [-9.140, 38.792], [-9.165, 38.780], [-9.190, 38.760],
          [-9.215, 38.740], [-9.230, 38.720], [-9.230, 38.692]
        ]]
      }
    },
    {
      "type": "Feature",
      "properties": { "name": "Almada" },
      "geometry": {
        "type": "MultiPolygon",
        "coordinates": [
          [[
            [-9.175, 38.660], [-9.145, 38.660], [-9.140, 38.687],
            [-9.160, 38.690], [-9.175, 38.680], [-9.175, 38.660]
          ]]
        ]
      }
    }
  ]
}"#;
