//! Application configuration.
//!
//! Loaded from a JSON file by the application crate (see [`load_config`]) and
//! passed by reference to the grid, route and output layers.  Every section
//! and field is optional in the file; missing values take the defaults
//! documented on each type.
//!
//! ```json
//! {
//!   "grid": {
//!     "tiers": [
//!       { "zoom_min": 10, "zoom_max": 12, "cell_size": 0.04 },
//!       { "zoom_min": 12, "zoom_max": 14, "cell_size": 0.01 }
//!     ],
//!     "epsilon": 1e-6
//!   },
//!   "cache": { "retention_secs": 604800, "bucket_secs": 900 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, TierIndex};

/// Relative tolerance when checking that a tier size is `coarse / 2^k`.
const SUBDIVISION_TOLERANCE: f64 = 1e-9;

/// Deepest subdivision a tier may sit below the coarse tier.
pub const MAX_DEPTH: usize = 24;

// ── Tier ──────────────────────────────────────────────────────────────────────

/// One grid resolution: active for zooms in `[zoom_min, zoom_max)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub zoom_min:  f64,
    pub zoom_max:  f64,
    /// Cell edge length in degrees.
    pub cell_size: f64,
}

impl Tier {
    pub fn new(zoom_min: f64, zoom_max: f64, cell_size: f64) -> Self {
        Self { zoom_min, zoom_max, cell_size }
    }

    #[inline]
    pub fn contains_zoom(&self, zoom: f64) -> bool {
        zoom >= self.zoom_min && zoom < self.zoom_max
    }
}

// ── GridConfig ────────────────────────────────────────────────────────────────

/// Resolution tiers and the boundary epsilon shared by the configurator and
/// the feature generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Ordered coarsest → finest.  Default: 0.04° / 0.02° / 0.01° / 0.005°
    /// over zooms 10–12, 12–13, 13–14, 14–17.
    pub tiers: Vec<Tier>,

    /// Bias applied before floor divisions and half-size comparisons so that
    /// points sitting exactly on a cell edge classify consistently.
    /// Default: 1e-6°.
    pub epsilon: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                Tier::new(10.0, 12.0, 0.04),
                Tier::new(12.0, 13.0, 0.02),
                Tier::new(13.0, 14.0, 0.01),
                Tier::new(14.0, 17.0, 0.005),
            ],
            epsilon: 1e-6,
        }
    }
}

impl GridConfig {
    /// Check tier ordering, contiguity, power-of-two subdivision and the
    /// epsilon bound.
    pub fn validate(&self) -> CoreResult<()> {
        let Some(coarse) = self.tiers.first() else {
            return Err(CoreError::Config("at least one grid tier is required".into()));
        };

        for (i, t) in self.tiers.iter().enumerate() {
            if !(t.cell_size.is_finite() && t.cell_size > 0.0) {
                return Err(CoreError::Config(format!(
                    "tier {i}: cell_size must be positive, got {}",
                    t.cell_size
                )));
            }
            if !(t.zoom_min.is_finite() && t.zoom_max.is_finite()) || t.zoom_min >= t.zoom_max {
                return Err(CoreError::Config(format!(
                    "tier {i}: zoom range [{}, {}) is empty",
                    t.zoom_min, t.zoom_max
                )));
            }
            if subdivision_depth(coarse.cell_size, t.cell_size).is_none() {
                return Err(CoreError::Config(format!(
                    "tier {i}: cell_size {} is not the coarse size {} halved a whole number of times",
                    t.cell_size, coarse.cell_size
                )));
            }
        }

        for (i, pair) in self.tiers.windows(2).enumerate() {
            let (a, b) = (&pair[0], &pair[1]);
            if b.cell_size >= a.cell_size {
                return Err(CoreError::Config(format!(
                    "tier {}: cell_size must be smaller than tier {i}",
                    i + 1
                )));
            }
            if a.zoom_max != b.zoom_min {
                return Err(CoreError::Config(format!(
                    "tiers {i} and {}: zoom ranges must be contiguous ({} != {})",
                    i + 1,
                    a.zoom_max,
                    b.zoom_min
                )));
            }
        }

        let finest = self.finest_size();
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0 && self.epsilon < finest * 0.01) {
            return Err(CoreError::Config(format!(
                "epsilon {} must be non-negative and below 1% of the finest cell size {finest}",
                self.epsilon
            )));
        }
        Ok(())
    }

    /// Edge length of a coarse cell.
    ///
    /// # Panics
    /// Panics if there are no tiers; call [`validate`](Self::validate) first.
    #[inline]
    pub fn coarse_size(&self) -> f64 {
        self.tiers[0].cell_size
    }

    #[inline]
    pub fn finest_size(&self) -> f64 {
        self.tiers.last().map(|t| t.cell_size).unwrap_or(0.0)
    }

    /// The tier active at `zoom`, if any.
    pub fn tier_for_zoom(&self, zoom: f64) -> Option<TierIndex> {
        self.tiers
            .iter()
            .position(|t| t.contains_zoom(zoom))
            .map(|i| TierIndex(i as u8))
    }

    #[inline]
    pub fn tier(&self, idx: TierIndex) -> &Tier {
        &self.tiers[idx.index()]
    }

    /// Number of halvings from the coarse tier down to `idx`.
    pub fn depth(&self, idx: TierIndex) -> usize {
        subdivision_depth(self.coarse_size(), self.tier(idx).cell_size).unwrap_or(0)
    }

    /// Cell edge length the lattice of tier `idx` is built from:
    /// `coarse / 2^depth`, not the configured `cell_size`, which validation
    /// only checks to within a tolerance.
    pub fn lattice_size(&self, idx: TierIndex) -> f64 {
        self.coarse_size() / (1u64 << self.depth(idx)) as f64
    }
}

/// `Some(k)` if `fine == coarse / 2^k` within tolerance.
fn subdivision_depth(coarse: f64, fine: f64) -> Option<usize> {
    let k = (coarse / fine).log2().round();
    if !(0.0..=MAX_DEPTH as f64).contains(&k) {
        return None;
    }
    let k = k as usize;
    let expected = coarse / (1u64 << k) as f64;
    ((expected - fine).abs() <= coarse * SUBDIVISION_TOLERANCE).then_some(k)
}

// ── CacheConfig ───────────────────────────────────────────────────────────────

/// Travel-time cache policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entries older than this are purged on the next read.  Default: 7 days.
    pub retention_secs: u64,
    /// Departure bucket width used in cache keys.  Default: 15 minutes.
    pub bucket_secs: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { retention_secs: 7 * 86_400, bucket_secs: 900 }
    }
}

// ── ComparisonThresholds ──────────────────────────────────────────────────────

/// Upper bounds on the transit/drive duration ratio for each verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonThresholds {
    /// Ratio ≤ this → transit is faster.  Default: 1.0.
    pub faster: f64,
    /// Ratio ≤ this → comparable.  Default: 1.5.
    pub comparable: f64,
    /// Ratio ≤ this → slower; above → much slower.  Default: 2.5.
    pub slower: f64,
}

impl Default for ComparisonThresholds {
    fn default() -> Self {
        Self { faster: 1.0, comparable: 1.5, slower: 2.5 }
    }
}

impl ComparisonThresholds {
    pub fn validate(&self) -> CoreResult<()> {
        let ordered = self.faster > 0.0 && self.faster <= self.comparable && self.comparable <= self.slower;
        if !ordered || !self.slower.is_finite() {
            return Err(CoreError::Config(format!(
                "comparison thresholds must satisfy 0 < faster <= comparable <= slower, got {} / {} / {}",
                self.faster, self.comparable, self.slower
            )));
        }
        Ok(())
    }
}

// ── AppConfig ─────────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub grid:       GridConfig,
    pub cache:      CacheConfig,
    pub comparison: ComparisonThresholds,
}

impl AppConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> CoreResult<Self> {
        let config: AppConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.grid.validate()?;
        self.comparison.validate()
    }
}

/// Read, parse and validate a JSON config file.
pub fn load_config(path: &Path) -> CoreResult<AppConfig> {
    let text = std::fs::read_to_string(path)?;
    AppConfig::from_json_str(&text)
}
