//! `tg-grid` — service-area mask, hierarchical grid configuration and
//! viewport-driven cell generation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`mask`]      | `Mask` (GeoJSON input), `MaskIndex` (R-tree + exact test) |
//! | [`cell`]      | `CellFrame`: origin-anchored integer cell geometry        |
//! | [`grid`]      | `Grid`, `RootCell`: the configurator's output             |
//! | [`generate`]  | `GridFeature`, `Grid::generate`, `Grid::locate`           |
//! | [`session`]   | `GridSession`: configured-or-not holder for a host UI     |
//! | [`error`]     | `GridError`, `GridResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Rayon-parallel coarse scan in [`Grid::configure`].        |

pub mod cell;
pub mod error;
pub mod generate;
pub mod grid;
pub mod mask;
pub mod session;


pub use cell::CellFrame;
pub use error::{GridError, GridResult};
pub use generate::{GridFeature, features_to_geojson};
pub use grid::{Grid, RootCell};
pub use mask::{Mask, MaskIndex};
pub use session::GridSession;
