//! Travel mode enum shared by the route and output crates.

use serde::{Deserialize, Serialize};

/// The two modes the comparison workflow puts side by side.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// Private car.
    Drive,
    /// Scheduled public transit (bus, metro, tram, rail, ferry…).
    Transit,
}

impl TravelMode {
    pub const ALL: [TravelMode; 2] = [TravelMode::Drive, TravelMode::Transit];

    /// Human-readable label, useful for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Drive   => "drive",
            TravelMode::Transit => "transit",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
