//! lisbon — scripted map session for the transit_grid workspace.
//!
//! Configures the grid over a synthetic Lisbon service area, replays a fixed
//! sequence of pans and zooms, then clicks pairs of cells and compares
//! transit against driving with the offline estimate provider.
//!
//! ```text
//! lisbon [MASK.geojson] [CONFIG.json]
//! ```
//!
//! With no arguments the built-in mask and default configuration are used.
//! Output lands in `output/lisbon/`.

mod service_area;

use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use log::info;

use tg_core::{AppConfig, BBox, DepartureTime, LonLat, load_config};
use tg_grid::{GridSession, Mask};
use tg_output::{CsvWriter, GeoJsonWriter, SessionRecorder};
use tg_route::{EstimateProvider, MemoryCache, RouteWorkflow, WorkflowStep};

use service_area::{LISBON_BBOX, LISBON_MASK};

// ── Constants ─────────────────────────────────────────────────────────────────

const OUTPUT_DIR: &str = "output/lisbon";

/// 2023-11-14 00:00 UTC.
const MIDNIGHT: i64 = 1_699_920_000;
const MORNING:  DepartureTime = DepartureTime(MIDNIGHT + 8 * 3_600);
const NIGHT:    DepartureTime = DepartureTime(MIDNIGHT + 2 * 3_600);

/// Clicks are hit-tested at this zoom (finest tier).
const CLICK_ZOOM: f64 = 15.0;

const fn bbox(west: f64, south: f64, east: f64, north: f64) -> BBox {
    BBox { west, south, east, north }
}

const BAIXA:    LonLat = LonLat { lon: -9.139, lat: 38.711 };
const ORIENTE:  LonLat = LonLat { lon: -9.094, lat: 38.768 };
const BELEM:    LonLat = LonLat { lon: -9.205, lat: 38.697 };
const CACILHAS: LonLat = LonLat { lon: -9.148, lat: 38.686 };
const TAGUS:    LonLat = LonLat { lon: -9.120, lat: 38.690 };

// ── Script ────────────────────────────────────────────────────────────────────

/// `(label, viewport, zoom)` in the order a user would produce them.
const VIEWS: [(&str, BBox, f64); 6] = [
    ("overview",  bbox(-9.30, 38.60, -9.00, 38.80),   11.0),
    ("baixa",     bbox(-9.16, 38.70, -9.12, 38.72),   13.2),
    ("pan east",  bbox(-9.12, 38.70, -9.08, 38.72),   13.2),
    ("zoom in",   bbox(-9.15, 38.705, -9.13, 38.715), 15.5),
    ("too far",   bbox(-9.30, 38.60, -9.00, 38.80),    9.0),
    ("oriente",   bbox(-9.11, 38.75, -9.08, 38.78),   12.4),
];

/// `(label, point, departure)` clicks.
const CLICKS: [(&str, LonLat, DepartureTime); 9] = [
    ("baixa",    BAIXA,    MORNING),
    ("oriente",  ORIENTE,  MORNING),
    ("belem",    BELEM,    MORNING),
    ("cacilhas", CACILHAS, MORNING),
    ("river",    TAGUS,    MORNING),
    ("baixa",    BAIXA,    MORNING),
    ("oriente",  ORIENTE,  MORNING),
    ("baixa",    BAIXA,    NIGHT),
    ("oriente",  ORIENTE,  NIGHT),
];

fn fmt_secs(secs: Option<u32>) -> String {
    match secs {
        Some(s) => format!("{}m{:02}s", s / 60, s % 60),
        None => "n/a".to_owned(),
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== lisbon: transit vs drive grid ===");

    // 1. Mask and configuration.
    let mut args = std::env::args().skip(1);
    let (mask, extent) = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading mask {path}"))?;
            let mask = Mask::from_geojson_str(&text).with_context(|| format!("parsing mask {path}"))?;
            let extent = mask.bounds().context("mask has no polygons")?;
            (mask, extent)
        }
        None => (Mask::from_geojson_str(LISBON_MASK)?, LISBON_BBOX),
    };
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path)).with_context(|| format!("loading config {path}"))?,
        None => AppConfig::default(),
    };
    println!(
        "Mask: {} parts  |  extent [{}, {}, {}, {}]  |  {} tiers",
        mask.len(),
        extent.west,
        extent.south,
        extent.east,
        extent.north,
        config.grid.tiers.len()
    );

    // 2. Configure.
    let t0 = Instant::now();
    let mut session = GridSession::new(config.grid.clone());
    session.configure(&mask, extent)?;
    let (cols, rows) = session.grid().map_or((0, 0), |g| g.dimensions());
    let roots = session.grid().map_or(0, |g| g.roots().len());
    println!(
        "Configured in {:.3} ms: {cols}×{rows} coarse cells, {roots} inside the mask",
        t0.elapsed().as_secs_f64() * 1e3
    );
    println!();

    // 3. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let dir = Path::new(OUTPUT_DIR);
    let mut geojson = SessionRecorder::new(GeoJsonWriter::new(dir)?);
    let mut csv = SessionRecorder::new(CsvWriter::new(dir)?);

    // 4. Replay pans and zooms.
    println!("{:<10} {:>6} {:>6} {:>8}", "View", "Zoom", "Tier", "Cells");
    println!("{}", "-".repeat(33));
    for (label, view, zoom) in VIEWS {
        let tier = session.grid().and_then(|g| g.active_tier(zoom));
        let features = session.update_view(view, zoom);
        println!(
            "{:<10} {:>6.1} {:>6} {:>8}",
            label,
            zoom,
            tier.map_or_else(|| "-".to_owned(), |t| t.0.to_string()),
            features.len()
        );
        geojson.record_view(features);
        csv.record_view(features);
    }
    println!();

    // 5. Click pairs and compare.
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
    let grid = session.grid().context("grid not configured")?;
    let mut workflow = RouteWorkflow::new(
        EstimateProvider::default(),
        MemoryCache::from_config(&config.cache),
        &config,
        MORNING,
    );

    for (label, point, departure) in CLICKS {
        workflow.set_departure(departure);
        match workflow.click_at(grid, point, CLICK_ZOOM, now)? {
            None => println!("  {label:<9} no grid cell here"),
            Some(WorkflowStep::OriginSelected(id)) => println!("  {label:<9} origin {id}"),
            Some(WorkflowStep::Cleared) => println!("  {label:<9} selection cleared"),
            Some(WorkflowStep::Compared(out)) => {
                let c = &out.comparison;
                println!(
                    "  {label:<9} destination {}  drive {:>8}  transit {:>8}  ratio {:>5}  {}",
                    out.destination.id,
                    fmt_secs(c.drive_secs),
                    fmt_secs(c.transit_secs),
                    c.ratio.map_or_else(|| "n/a".to_owned(), |r| format!("{r:.2}")),
                    c.verdict
                );
                geojson.record_outcome(&out);
                csv.record_outcome(&out);
            }
        }
    }
    println!();

    // 6. Summary.
    geojson.finish()?;
    csv.finish()?;
    let stats = workflow.cache_stats();
    info!("trip cache: {} hits, {} misses", stats.hits, stats.misses);
    println!("Wrote {} views to {OUTPUT_DIR}/", csv.views());
    println!("  grid_cells.geojson, grid_cells.csv, comparisons.json, comparisons.csv");

    Ok(())
}
