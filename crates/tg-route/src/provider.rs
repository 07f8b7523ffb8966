//! Travel-time provider trait and the offline estimate implementation.
//!
//! # Pluggability
//!
//! The comparison workflow asks for times through the [`TravelTimeProvider`]
//! trait, so a host can plug in a real routing service (an HTTP directions
//! API, a local OTP/Valhalla instance) without touching the grid or cache
//! code.  [`EstimateProvider`] needs no network and is what the demo and the
//! tests use.
//!
//! # Units
//!
//! Durations are whole seconds (`u32`), distances metres (`f64`).

use serde::{Deserialize, Serialize};

use tg_core::{DepartureTime, LonLat, TravelMode};

use crate::{RouteError, RouteResult};

// ── Leg / TripTimes ───────────────────────────────────────────────────────────

/// One mode's answer for an origin–destination pair.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub duration_secs: u32,
    pub distance_m:    f64,
}

/// Drive and transit legs for one query.  `None` means the mode has no
/// route (no service at that hour, no road connection, …).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TripTimes {
    pub drive:   Option<Leg>,
    pub transit: Option<Leg>,
}

impl TripTimes {
    pub fn leg(&self, mode: TravelMode) -> Option<&Leg> {
        match mode {
            TravelMode::Drive   => self.drive.as_ref(),
            TravelMode::Transit => self.transit.as_ref(),
        }
    }

    /// `true` if neither mode produced a route.
    pub fn is_empty(&self) -> bool {
        self.drive.is_none() && self.transit.is_none()
    }
}

// ── Provider trait ────────────────────────────────────────────────────────────

/// Pluggable travel-time source.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one provider can serve several
/// sessions.
pub trait TravelTimeProvider: Send + Sync {
    /// Drive and transit times from `origin` to `destination` leaving at
    /// `departure`.
    ///
    /// A mode without a route is reported as `None` inside `Ok`; `Err` is
    /// reserved for failures of the provider itself.
    fn fetch(
        &self,
        origin: LonLat,
        destination: LonLat,
        departure: DepartureTime,
    ) -> RouteResult<TripTimes>;
}

// ── EstimateProvider ──────────────────────────────────────────────────────────

/// Per-mode parameters for [`EstimateProvider`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeProfile {
    /// Average door-to-door speed once moving, metres per second.
    pub speed_mps:     f64,
    /// Network distance / great-circle distance.
    pub detour:        f64,
    /// Fixed time added to every trip (parking, walking to the stop, waiting).
    pub overhead_secs: u32,
}

/// Offline provider: great-circle distance scaled by a detour factor and
/// divided by a mode speed.
///
/// | Mode    | Speed    | Detour | Overhead | Availability        |
/// |---------|----------|--------|----------|---------------------|
/// | Drive   | 8.3 m/s  | 1.3    | 2 min    | always              |
/// | Transit | 5.0 m/s  | 1.4    | 10 min   | 05:00–24:00 UTC     |
///
/// Good enough to drive the UI and the tests; not a routing engine.
#[derive(Clone, Debug)]
pub struct EstimateProvider {
    pub drive:   ModeProfile,
    pub transit: ModeProfile,
    /// First second of the day (UTC) with transit service.
    pub service_start_secs: u32,
    /// First second of the day (UTC) without transit service.
    pub service_end_secs:   u32,
}

impl Default for EstimateProvider {
    fn default() -> Self {
        Self {
            drive:   ModeProfile { speed_mps: 8.3, detour: 1.3, overhead_secs: 120 },
            transit: ModeProfile { speed_mps: 5.0, detour: 1.4, overhead_secs: 600 },
            service_start_secs: 5 * 3_600,
            service_end_secs:   24 * 3_600,
        }
    }
}

impl EstimateProvider {
    fn transit_runs_at(&self, departure: DepartureTime) -> bool {
        let s = departure.secs_of_day();
        s >= self.service_start_secs && s < self.service_end_secs
    }
}

fn estimate_leg(profile: &ModeProfile, crow_m: f64) -> Leg {
    let distance_m = crow_m * profile.detour;
    let moving = (distance_m / profile.speed_mps).ceil() as u32;
    Leg { duration_secs: profile.overhead_secs + moving, distance_m }
}

impl TravelTimeProvider for EstimateProvider {
    fn fetch(
        &self,
        origin: LonLat,
        destination: LonLat,
        departure: DepartureTime,
    ) -> RouteResult<TripTimes> {
        for p in [origin, destination] {
            if !p.is_finite() {
                return Err(RouteError::InvalidPoint(p));
            }
        }
        let crow_m = origin.distance_m(destination);
        Ok(TripTimes {
            drive:   Some(estimate_leg(&self.drive, crow_m)),
            transit: self
                .transit_runs_at(departure)
                .then(|| estimate_leg(&self.transit, crow_m)),
        })
    }
}
