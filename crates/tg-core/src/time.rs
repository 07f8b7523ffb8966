//! Departure-time model.
//!
//! # Design
//!
//! A departure is a plain Unix timestamp in seconds.  The route cache does
//! not key on the exact second: departures are grouped into fixed-width
//! buckets so that two requests a few minutes apart share one entry.
//!
//!   bucket_start = floor(unix_secs / bucket_secs) * bucket_secs
//!
//! Integer arithmetic keeps bucketing exact; `div_euclid` keeps it correct
//! for timestamps before the epoch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An absolute departure instant in Unix seconds (UTC).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(Serialize, Deserialize)]
pub struct DepartureTime(pub i64);

impl DepartureTime {
    #[inline]
    pub fn from_unix(secs: i64) -> Self {
        Self(secs)
    }

    #[inline]
    pub fn unix_secs(self) -> i64 {
        self.0
    }

    /// Start of the bucket containing this departure.
    ///
    /// A `bucket_secs` of 0 disables bucketing and returns the timestamp
    /// unchanged.
    #[inline]
    pub fn bucket_start(self, bucket_secs: u32) -> i64 {
        if bucket_secs == 0 {
            return self.0;
        }
        let b = bucket_secs as i64;
        self.0.div_euclid(b) * b
    }

    /// Seconds since the most recent UTC midnight.
    #[inline]
    pub fn secs_of_day(self) -> u32 {
        self.0.rem_euclid(86_400) as u32
    }

    /// Same calendar day (UTC), different time of day.
    pub fn with_secs_of_day(self, secs: u32) -> Self {
        let midnight = self.0 - self.secs_of_day() as i64;
        Self(midnight + (secs % 86_400) as i64)
    }
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.secs_of_day();
        write!(f, "{} ({:02}:{:02} UTC)", self.0, s / 3_600, (s % 3_600) / 60)
    }
}
