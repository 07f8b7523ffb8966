//! `tg-route` — travel-time collaborator and the transit-vs-drive
//! comparison built on top of it.
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`provider`]    | `TravelTimeProvider` trait, `EstimateProvider`          |
//! | [`cache`]       | `CacheKey`, `TripCache`, `MemoryCache`, `CachedProvider`|
//! | [`compare`]     | `compare`, `Comparison`, `Verdict`                      |
//! | [`selection`]   | `PointSelection` two-click state machine                |
//! | [`workflow`]    | `RouteWorkflow`: clicks → comparisons                   |
//! | `sqlite`        | `SqliteCache` (feature `sqlite`)                        |
//!
//! # Usage
//!
//! ```rust,ignore
//! use tg_route::{EstimateProvider, MemoryCache, RouteWorkflow, WorkflowStep};
//!
//! let cache = MemoryCache::from_config(&config.cache);
//! let mut wf = RouteWorkflow::new(EstimateProvider::default(), cache, &config, departure);
//! wf.click(&origin_cell, now)?;
//! if let WorkflowStep::Compared(outcome) = wf.click(&dest_cell, now)? {
//!     println!("{}", outcome.comparison.verdict);
//! }
//! ```

pub mod cache;
pub mod compare;
pub mod error;
pub mod provider;
pub mod selection;
pub mod workflow;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use cache::{CacheKey, CacheStats, CachedProvider, MemoryCache, TripCache};
pub use compare::{Comparison, Verdict, compare};
pub use error::{RouteError, RouteResult};
pub use provider::{EstimateProvider, Leg, ModeProfile, TravelTimeProvider, TripTimes};
pub use selection::{PointSelection, SelectedCell, SelectionEvent};
pub use workflow::{RouteOutcome, RouteWorkflow, WorkflowStep};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCache;
