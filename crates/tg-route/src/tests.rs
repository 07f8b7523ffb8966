//! Unit tests for tg-route.

#[cfg(test)]
mod helpers {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tg_core::{BBox, DepartureTime, GridConfig, LonLat};
    use tg_grid::{Grid, Mask};

    use crate::{Leg, RouteError, RouteResult, TravelTimeProvider, TripTimes};

    /// 2023-11-14 00:00:00 UTC.
    pub const MIDNIGHT: i64 = 1_699_920_000;
    pub const MORNING: DepartureTime = DepartureTime(MIDNIGHT + 8 * 3_600);
    pub const NIGHT: DepartureTime = DepartureTime(MIDNIGHT + 3 * 3_600);

    pub const BAIXA: LonLat = LonLat { lon: -9.139, lat: 38.711 };
    pub const ORIENTE: LonLat = LonLat { lon: -9.094, lat: 38.768 };
    /// About 450 m from `BAIXA`.
    pub const CHIADO: LonLat = LonLat { lon: -9.143, lat: 38.7105 };

    pub fn leg(duration_secs: u32) -> Leg {
        Leg { duration_secs, distance_m: duration_secs as f64 * 5.0 }
    }

    pub fn trip(drive: Option<u32>, transit: Option<u32>) -> TripTimes {
        TripTimes { drive: drive.map(leg), transit: transit.map(leg) }
    }

    /// Returns a fixed answer and counts calls.
    pub struct FixedProvider {
        pub calls: AtomicUsize,
        pub times: TripTimes,
    }

    impl FixedProvider {
        pub fn new(times: TripTimes) -> Self {
            Self { calls: AtomicUsize::new(0), times }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TravelTimeProvider for FixedProvider {
        fn fetch(&self, _: LonLat, _: LonLat, _: DepartureTime) -> RouteResult<TripTimes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.times.clone())
        }
    }

    /// Always fails, counting calls.
    #[derive(Default)]
    pub struct FailingProvider {
        pub calls: AtomicUsize,
    }

    impl TravelTimeProvider for FailingProvider {
        fn fetch(&self, _: LonLat, _: LonLat, _: DepartureTime) -> RouteResult<TripTimes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(RouteError::Provider("upstream returned 503".into()))
        }
    }

    /// Grid over Lisbon with a mask covering the whole box.
    pub fn lisbon_grid() -> Grid {
        let bbox = BBox::new(-9.3, 38.6, -9.0, 38.8);
        let mask = Mask::new(vec![
            geo::Rect::new(geo::Coord { x: -9.3, y: 38.6 }, geo::Coord { x: -9.0, y: 38.8 }).to_polygon(),
        ]);
        Grid::configure(&mask, bbox, &GridConfig::default()).unwrap()
    }
}

// ── EstimateProvider ──────────────────────────────────────────────────────────

#[cfg(test)]
mod estimate {
    use tg_core::{LonLat, TravelMode};

    use super::helpers::{BAIXA, CHIADO, MORNING, NIGHT, ORIENTE};
    use crate::{EstimateProvider, RouteError, TravelTimeProvider};

    #[test]
    fn longer_trip_takes_longer() {
        let p = EstimateProvider::default();
        let short = p.fetch(BAIXA, CHIADO, MORNING).unwrap();
        let long = p.fetch(BAIXA, ORIENTE, MORNING).unwrap();
        for mode in TravelMode::ALL {
            assert!(long.leg(mode).unwrap().duration_secs > short.leg(mode).unwrap().duration_secs);
        }
    }

    #[test]
    fn detour_applied_to_distance() {
        let p = EstimateProvider::default();
        let t = p.fetch(BAIXA, ORIENTE, MORNING).unwrap();
        let crow = BAIXA.distance_m(ORIENTE);
        assert!((t.drive.unwrap().distance_m - crow * 1.3).abs() < 1e-6);
        assert!((t.transit.unwrap().distance_m - crow * 1.4).abs() < 1e-6);
    }

    #[test]
    fn same_point_costs_only_overhead() {
        let p = EstimateProvider::default();
        let t = p.fetch(BAIXA, BAIXA, MORNING).unwrap();
        assert_eq!(t.drive.unwrap().duration_secs, 120);
        assert_eq!(t.transit.unwrap().duration_secs, 600);
    }

    #[test]
    fn no_transit_at_night() {
        let p = EstimateProvider::default();
        let t = p.fetch(BAIXA, ORIENTE, NIGHT).unwrap();
        assert!(t.drive.is_some());
        assert!(t.transit.is_none());
    }

    #[test]
    fn non_finite_point_is_an_error() {
        let p = EstimateProvider::default();
        let r = p.fetch(BAIXA, LonLat::new(f64::NAN, 38.7), MORNING);
        assert!(matches!(r, Err(RouteError::InvalidPoint(_))));
    }
}

// ── Cache ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use tg_core::{DepartureTime, LonLat};

    use super::helpers::{BAIXA, MORNING, ORIENTE, trip};
    use crate::{CacheKey, MemoryCache, TripCache};

    #[test]
    fn key_rounds_coordinates_to_five_decimals() {
        let a = CacheKey::new(BAIXA, ORIENTE, MORNING, 900);
        let jitter = LonLat::new(BAIXA.lon + 4e-7, BAIXA.lat - 4e-7);
        assert_eq!(a, CacheKey::new(jitter, ORIENTE, MORNING, 900));

        let moved = LonLat::new(BAIXA.lon + 1e-5, BAIXA.lat);
        assert_ne!(a, CacheKey::new(moved, ORIENTE, MORNING, 900));
        assert_eq!(a.origin, (-913_900, 3_871_100));
    }

    #[test]
    fn key_is_directional() {
        assert_ne!(
            CacheKey::new(BAIXA, ORIENTE, MORNING, 900),
            CacheKey::new(ORIENTE, BAIXA, MORNING, 900)
        );
    }

    #[test]
    fn key_buckets_departure() {
        let at = |offset: i64| CacheKey::new(BAIXA, ORIENTE, DepartureTime(MORNING.0 + offset), 900);
        assert_eq!(at(0), at(14 * 60 + 59));
        assert_ne!(at(0), at(15 * 60));
        assert_eq!(at(15 * 60).bucket_start, MORNING.0 + 900);
    }

    #[test]
    fn key_display() {
        let k = CacheKey::new(BAIXA, ORIENTE, MORNING, 900);
        assert_eq!(k.to_string(), format!("-9.13900,38.71100->-9.09400,38.76800@{}", MORNING.0));
    }

    #[test]
    fn memory_put_get() {
        let mut c = MemoryCache::new(100);
        let k = CacheKey::new(BAIXA, ORIENTE, MORNING, 900);
        assert_eq!(c.get(&k, 0).unwrap(), None);
        c.put(k, &trip(Some(600), Some(900)), 0).unwrap();
        assert_eq!(c.get(&k, 50).unwrap(), Some(trip(Some(600), Some(900))));
    }

    #[test]
    fn memory_entries_expire_on_read() {
        let mut c = MemoryCache::new(100);
        let k1 = CacheKey::new(BAIXA, ORIENTE, MORNING, 900);
        let k2 = CacheKey::new(ORIENTE, BAIXA, MORNING, 900);
        c.put(k1, &trip(Some(600), None), 0).unwrap();
        c.put(k2, &trip(Some(600), None), 60).unwrap();

        // Exactly at the retention boundary the entry is still live.
        assert!(c.get(&k1, 100).unwrap().is_some());
        assert_eq!(c.len(), 2);

        assert!(c.get(&k1, 101).unwrap().is_none());
        assert_eq!(c.len(), 1, "only the older entry is swept");

        assert_eq!(c.purge_expired(1_000).unwrap(), 1);
        assert!(c.is_empty());
    }

    #[test]
    fn memory_put_overwrites_and_restamps() {
        let mut c = MemoryCache::new(100);
        let k = CacheKey::new(BAIXA, ORIENTE, MORNING, 900);
        c.put(k, &trip(Some(600), None), 0).unwrap();
        c.put(k, &trip(Some(700), None), 90).unwrap();
        assert_eq!(c.get(&k, 150).unwrap(), Some(trip(Some(700), None)));
    }
}

// ── CachedProvider ────────────────────────────────────────────────────────────

#[cfg(test)]
mod cached_provider {
    use std::sync::atomic::Ordering;

    use tg_core::DepartureTime;

    use super::helpers::{BAIXA, FailingProvider, FixedProvider, MORNING, ORIENTE, trip};
    use crate::{CacheStats, CachedProvider, MemoryCache, RouteError};

    #[test]
    fn second_identical_query_is_served_from_cache() {
        let mut cp = CachedProvider::new(FixedProvider::new(trip(Some(600), Some(900))), MemoryCache::new(3_600), 900);
        let a = cp.fetch(BAIXA, ORIENTE, MORNING, 0).unwrap();
        let b = cp.fetch(BAIXA, ORIENTE, DepartureTime(MORNING.0 + 300), 10).unwrap();
        assert_eq!(a, b);
        assert_eq!(cp.provider().calls(), 1);
        assert_eq!(cp.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn other_bucket_misses() {
        let mut cp = CachedProvider::new(FixedProvider::new(trip(Some(600), Some(900))), MemoryCache::new(3_600), 900);
        cp.fetch(BAIXA, ORIENTE, MORNING, 0).unwrap();
        cp.fetch(BAIXA, ORIENTE, DepartureTime(MORNING.0 + 900), 0).unwrap();
        assert_eq!(cp.provider().calls(), 2);
    }

    #[test]
    fn expired_entry_is_refetched() {
        let mut cp = CachedProvider::new(FixedProvider::new(trip(Some(600), None)), MemoryCache::new(3_600), 900);
        cp.fetch(BAIXA, ORIENTE, MORNING, 0).unwrap();
        cp.fetch(BAIXA, ORIENTE, MORNING, 3_601).unwrap();
        assert_eq!(cp.provider().calls(), 2);
        assert_eq!(cp.cache().len(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cp = CachedProvider::new(FailingProvider::default(), MemoryCache::new(3_600), 900);
        for _ in 0..2 {
            assert!(matches!(cp.fetch(BAIXA, ORIENTE, MORNING, 0), Err(RouteError::Provider(_))));
        }
        assert_eq!(cp.provider().calls.load(Ordering::SeqCst), 2);
        assert!(cp.cache().is_empty());
        assert_eq!(cp.stats().misses, 2);
    }

    #[test]
    fn unavailable_modes_are_cached() {
        // `None` legs are a valid answer, not a failure.
        let mut cp = CachedProvider::new(FixedProvider::new(trip(None, None)), MemoryCache::new(3_600), 900);
        cp.fetch(BAIXA, ORIENTE, MORNING, 0).unwrap();
        assert!(cp.fetch(BAIXA, ORIENTE, MORNING, 0).unwrap().is_empty());
        assert_eq!(cp.provider().calls(), 1);
    }
}

// ── compare ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod verdicts {
    use tg_core::ComparisonThresholds;

    use super::helpers::trip;
    use crate::{Verdict, compare};

    fn verdict(drive: Option<u32>, transit: Option<u32>) -> Verdict {
        compare(&trip(drive, transit), &ComparisonThresholds::default()).verdict
    }

    #[test]
    fn ratio_bands() {
        assert_eq!(verdict(Some(1_000), Some(900)), Verdict::TransitFaster);
        assert_eq!(verdict(Some(1_000), Some(1_000)), Verdict::TransitFaster);
        assert_eq!(verdict(Some(1_000), Some(1_001)), Verdict::Comparable);
        assert_eq!(verdict(Some(1_000), Some(1_500)), Verdict::Comparable);
        assert_eq!(verdict(Some(1_000), Some(2_500)), Verdict::Slower);
        assert_eq!(verdict(Some(1_000), Some(2_501)), Verdict::MuchSlower);
    }

    #[test]
    fn missing_modes() {
        assert_eq!(verdict(Some(1_000), None), Verdict::TransitUnavailable);
        assert_eq!(verdict(None, Some(1_000)), Verdict::DriveUnavailable);
        assert_eq!(verdict(None, None), Verdict::NoData);
        assert_eq!(compare(&trip(None, Some(5)), &ComparisonThresholds::default()).ratio, None);
    }

    #[test]
    fn ratio_and_durations_reported() {
        let c = compare(&trip(Some(1_200), Some(1_800)), &ComparisonThresholds::default());
        assert_eq!(c.ratio, Some(1.5));
        assert_eq!(c.drive_secs, Some(1_200));
        assert_eq!(c.transit_secs, Some(1_800));
    }

    #[test]
    fn zero_second_drive_stays_finite() {
        let c = compare(&trip(Some(0), Some(60)), &ComparisonThresholds::default());
        assert_eq!(c.ratio, Some(60.0));
        assert_eq!(c.verdict, Verdict::MuchSlower);
    }

    #[test]
    fn custom_thresholds() {
        let strict = ComparisonThresholds { faster: 0.8, comparable: 1.0, slower: 1.2 };
        assert_eq!(compare(&trip(Some(100), Some(90)), &strict).verdict, Verdict::Comparable);
        assert_eq!(compare(&trip(Some(100), Some(130)), &strict).verdict, Verdict::MuchSlower);
    }

    #[test]
    fn verdict_labels() {
        assert_eq!(Verdict::TransitUnavailable.to_string(), "transit_unavailable");
        assert_eq!(Verdict::MuchSlower.as_str(), "much_slower");
    }
}

// ── PointSelection ────────────────────────────────────────────────────────────

#[cfg(test)]
mod selection {
    use tg_core::LonLat;

    use crate::{PointSelection, SelectedCell, SelectionEvent};

    fn cell(id: &str) -> SelectedCell {
        SelectedCell { id: id.parse().unwrap(), point: LonLat::new(-9.1, 38.7) }
    }

    #[test]
    fn first_click_sets_origin() {
        let mut s = PointSelection::new();
        assert_eq!(s.click(cell("A0")), SelectionEvent::OriginSet(cell("A0")));
        assert_eq!(s.origin(), Some(&cell("A0")));
        assert!(!s.is_complete());
    }

    #[test]
    fn clicking_origin_again_clears() {
        let mut s = PointSelection::new();
        s.click(cell("A0"));
        assert_eq!(s.click(cell("A0")), SelectionEvent::Cleared);
        assert!(s.origin().is_none());
    }

    #[test]
    fn second_cell_completes_pair() {
        let mut s = PointSelection::new();
        s.click(cell("A0"));
        let ev = s.click(cell("B3"));
        assert_eq!(ev, SelectionEvent::Completed { origin: cell("A0"), destination: cell("B3") });
        assert!(s.is_complete());
        assert_eq!(s.destination(), Some(&cell("B3")));
    }

    #[test]
    fn click_on_complete_pair_starts_over() {
        let mut s = PointSelection::new();
        s.click(cell("A0"));
        s.click(cell("B3"));
        // Even a click on the old origin starts a fresh selection.
        assert_eq!(s.click(cell("A0")), SelectionEvent::OriginSet(cell("A0")));
        assert!(s.destination().is_none());
    }

    #[test]
    fn parent_and_child_are_different_cells() {
        let mut s = PointSelection::new();
        s.click(cell("A"));
        assert!(matches!(s.click(cell("A0")), SelectionEvent::Completed { .. }));
    }
}

// ── RouteWorkflow ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod workflow {
    use tg_core::{AppConfig, LonLat};

    use super::helpers::{
        BAIXA, CHIADO, FailingProvider, FixedProvider, MORNING, NIGHT, ORIENTE, lisbon_grid, trip,
    };
    use crate::{EstimateProvider, MemoryCache, RouteError, RouteWorkflow, Verdict, WorkflowStep};

    const ZOOM: f64 = 15.0;

    fn estimate_workflow() -> RouteWorkflow<EstimateProvider, MemoryCache> {
        let config = AppConfig::default();
        RouteWorkflow::new(EstimateProvider::default(), MemoryCache::from_config(&config.cache), &config, MORNING)
    }

    #[test]
    fn two_clicks_compare() {
        let grid = lisbon_grid();
        let mut wf = estimate_workflow();

        let first = wf.click_at(&grid, BAIXA, ZOOM, 0).unwrap().unwrap();
        assert!(matches!(first, WorkflowStep::OriginSelected(ref id) if id.depth() == 3));

        let Some(WorkflowStep::Compared(out)) = wf.click_at(&grid, ORIENTE, ZOOM, 0).unwrap() else {
            panic!("second click should compare");
        };
        // ~7.4 km: long enough that transit is slower, not much slower.
        assert_eq!(out.comparison.verdict, Verdict::Slower);
        assert_eq!(out.departure, MORNING);
        assert!(out.origin.id != out.destination.id);
        assert!(out.comparison.ratio.unwrap() > 1.5);
    }

    #[test]
    fn short_hop_is_much_slower_by_transit() {
        let grid = lisbon_grid();
        let mut wf = estimate_workflow();
        wf.click_at(&grid, BAIXA, ZOOM, 0).unwrap();
        let Some(WorkflowStep::Compared(out)) = wf.click_at(&grid, CHIADO, ZOOM, 0).unwrap() else {
            panic!("expected a comparison");
        };
        assert_eq!(out.comparison.verdict, Verdict::MuchSlower);
    }

    #[test]
    fn night_departure_has_no_transit() {
        let grid = lisbon_grid();
        let mut wf = estimate_workflow();
        wf.set_departure(NIGHT);
        wf.click_at(&grid, BAIXA, ZOOM, 0).unwrap();
        let Some(WorkflowStep::Compared(out)) = wf.click_at(&grid, ORIENTE, ZOOM, 0).unwrap() else {
            panic!("expected a comparison");
        };
        assert_eq!(out.comparison.verdict, Verdict::TransitUnavailable);
    }

    #[test]
    fn repeated_pair_hits_cache() {
        let grid = lisbon_grid();
        let config = AppConfig::default();
        let mut wf = RouteWorkflow::new(
            FixedProvider::new(trip(Some(600), Some(900))),
            MemoryCache::from_config(&config.cache),
            &config,
            MORNING,
        );
        for _ in 0..2 {
            wf.click_at(&grid, BAIXA, ZOOM, 0).unwrap();
            wf.click_at(&grid, ORIENTE, ZOOM, 0).unwrap();
        }
        assert_eq!(wf.provider().provider().calls(), 1);
        assert_eq!(wf.cache_stats().hits, 1);
    }

    #[test]
    fn reclicking_origin_clears() {
        let grid = lisbon_grid();
        let mut wf = estimate_workflow();
        wf.click_at(&grid, BAIXA, ZOOM, 0).unwrap();
        // A point a few metres away lands in the same finest-tier cell.
        let nearby = LonLat::new(BAIXA.lon + 1e-5, BAIXA.lat);
        assert_eq!(wf.click_at(&grid, nearby, ZOOM, 0).unwrap(), Some(WorkflowStep::Cleared));
        assert!(wf.selection().origin().is_none());
    }

    #[test]
    fn click_outside_grid_is_ignored() {
        let grid = lisbon_grid();
        let mut wf = estimate_workflow();
        assert_eq!(wf.click_at(&grid, LonLat::new(-8.0, 40.0), ZOOM, 0).unwrap(), None);
        assert_eq!(wf.click_at(&grid, BAIXA, 5.0, 0).unwrap(), None);
        assert!(wf.selection().origin().is_none());
    }

    #[test]
    fn provider_error_surfaces() {
        let grid = lisbon_grid();
        let config = AppConfig::default();
        let mut wf =
            RouteWorkflow::new(FailingProvider::default(), MemoryCache::from_config(&config.cache), &config, MORNING);
        wf.click_at(&grid, BAIXA, ZOOM, 0).unwrap();
        let r = wf.click_at(&grid, ORIENTE, ZOOM, 0);
        assert!(matches!(r, Err(RouteError::Provider(_))));
        assert!(wf.selection().is_complete());
    }
}

// ── SqliteCache ───────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite {
    use super::helpers::{BAIXA, MORNING, ORIENTE, trip};
    use crate::{CacheKey, SqliteCache, TripCache};

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("trips.db");
        let k = CacheKey::new(BAIXA, ORIENTE, MORNING, 900);
        {
            let mut c = SqliteCache::open(&path, 3_600).unwrap();
            c.put(k, &trip(Some(600), None), 0).unwrap();
        }
        let mut c = SqliteCache::open(&path, 3_600).unwrap();
        assert_eq!(c.get(&k, 10).unwrap(), Some(trip(Some(600), None)));
    }

    #[test]
    fn expired_rows_are_deleted_on_read() {
        let mut c = SqliteCache::in_memory(100).unwrap();
        let k = CacheKey::new(BAIXA, ORIENTE, MORNING, 900);
        c.put(k, &trip(Some(600), Some(900)), 0).unwrap();
        assert!(c.get(&k, 100).unwrap().is_some());
        assert!(c.get(&k, 101).unwrap().is_none());
        assert_eq!(c.len().unwrap(), 0);
    }
}
