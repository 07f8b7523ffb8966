//! `tg-core` — foundational types for the `transit_grid` workspace.
//!
//! This crate is a dependency of every other `tg-*` crate.  It has no
//! `tg-*` dependencies and only `thiserror`, `serde` and `serde_json` as
//! external ones.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `RootIndex`, `TierIndex`                              |
//! | [`code`]        | base-26 root codes, `Quadrant`, `CellId`              |
//! | [`geo`]         | `LonLat`, `BBox`, haversine distance                  |
//! | [`time`]        | `DepartureTime`, departure buckets                    |
//! | [`transport`]   | `TravelMode` enum                                     |
//! | [`config`]      | `AppConfig`, `GridConfig`, `Tier`, JSON loading       |
//! | [`error`]       | `CoreError`, `CoreResult`                             |

pub mod code;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod time;
pub mod transport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use code::{CellId, Quadrant, decode_root, encode_root};
pub use config::{AppConfig, CacheConfig, ComparisonThresholds, GridConfig, Tier, load_config};
pub use error::{CoreError, CoreResult};
pub use geo::{BBox, LonLat};
pub use ids::{RootIndex, TierIndex};
pub use time::DepartureTime;
pub use transport::TravelMode;
