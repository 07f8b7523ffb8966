//! Transit-vs-drive verdicts.
//!
//! The ratio is `transit_secs / drive_secs`.  Thresholds are upper bounds,
//! checked in order:
//!
//! | Ratio                      | Verdict          |
//! |----------------------------|------------------|
//! | `≤ faster`                 | `TransitFaster`  |
//! | `≤ comparable`             | `Comparable`     |
//! | `≤ slower`                 | `Slower`         |
//! | above                      | `MuchSlower`     |

use std::fmt;

use serde::{Deserialize, Serialize};

use tg_core::ComparisonThresholds;

use crate::provider::TripTimes;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    TransitFaster,
    Comparable,
    Slower,
    MuchSlower,
    /// Drive has a route, transit does not.
    TransitUnavailable,
    /// Transit has a route, drive does not.
    DriveUnavailable,
    /// Neither mode has a route.
    NoData,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::TransitFaster      => "transit_faster",
            Verdict::Comparable         => "comparable",
            Verdict::Slower             => "slower",
            Verdict::MuchSlower         => "much_slower",
            Verdict::TransitUnavailable => "transit_unavailable",
            Verdict::DriveUnavailable   => "drive_unavailable",
            Verdict::NoData             => "no_data",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub drive_secs:   Option<u32>,
    pub transit_secs: Option<u32>,
    /// `transit / drive`; `None` unless both modes have a route.
    pub ratio:        Option<f64>,
    pub verdict:      Verdict,
}

/// Classify one trip.  A zero-second drive is treated as one second so the
/// ratio stays finite.
pub fn compare(times: &TripTimes, thresholds: &ComparisonThresholds) -> Comparison {
    let drive_secs = times.drive.map(|l| l.duration_secs);
    let transit_secs = times.transit.map(|l| l.duration_secs);

    let (ratio, verdict) = match (drive_secs, transit_secs) {
        (None, None)    => (None, Verdict::NoData),
        (Some(_), None) => (None, Verdict::TransitUnavailable),
        (None, Some(_)) => (None, Verdict::DriveUnavailable),
        (Some(d), Some(t)) => {
            let ratio = t as f64 / d.max(1) as f64;
            let verdict = if ratio <= thresholds.faster {
                Verdict::TransitFaster
            } else if ratio <= thresholds.comparable {
                Verdict::Comparable
            } else if ratio <= thresholds.slower {
                Verdict::Slower
            } else {
                Verdict::MuchSlower
            };
            (Some(ratio), verdict)
        }
    };

    Comparison { drive_secs, transit_secs, ratio, verdict }
}
