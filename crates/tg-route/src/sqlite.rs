//! SQLite trip cache (feature `sqlite`).
//!
//! One table, `trip_cache`, keyed by the quantized endpoints and the
//! departure bucket.  A missing leg is stored as NULL duration and distance.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::cache::{CacheKey, TripCache};
use crate::provider::{Leg, TripTimes};
use crate::RouteResult;

/// Trip cache persisted in an SQLite database.
pub struct SqliteCache {
    conn:           Connection,
    retention_secs: u64,
}

impl SqliteCache {
    /// Open (or create) the database at `path` and initialise the schema.
    pub fn open(path: &Path, retention_secs: u64) -> RouteResult<Self> {
        Self::with_connection(Connection::open(path)?, retention_secs)
    }

    /// A private in-memory database.
    pub fn in_memory(retention_secs: u64) -> RouteResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, retention_secs)
    }

    fn with_connection(conn: Connection, retention_secs: u64) -> RouteResult<Self> {
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             CREATE TABLE IF NOT EXISTS trip_cache (
                 origin_lon    INTEGER NOT NULL,
                 origin_lat    INTEGER NOT NULL,
                 dest_lon      INTEGER NOT NULL,
                 dest_lat      INTEGER NOT NULL,
                 bucket_start  INTEGER NOT NULL,
                 drive_secs    INTEGER,
                 drive_m       REAL,
                 transit_secs  INTEGER,
                 transit_m     REAL,
                 stored_at     INTEGER NOT NULL,
                 PRIMARY KEY (origin_lon, origin_lat, dest_lon, dest_lat, bucket_start)
             );",
        )?;
        Ok(Self { conn, retention_secs })
    }

    /// Number of stored rows, expired or not.
    pub fn len(&self) -> RouteResult<usize> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM trip_cache", [], |r| r.get(0))?;
        Ok(n as usize)
    }
}

fn leg_from(secs: Option<u32>, metres: Option<f64>) -> Option<Leg> {
    Some(Leg { duration_secs: secs?, distance_m: metres? })
}

impl TripCache for SqliteCache {
    fn get(&mut self, key: &CacheKey, now: i64) -> RouteResult<Option<TripTimes>> {
        self.purge_expired(now)?;
        let times = self
            .conn
            .query_row(
                "SELECT drive_secs, drive_m, transit_secs, transit_m FROM trip_cache \
                 WHERE origin_lon = ?1 AND origin_lat = ?2 AND dest_lon = ?3 AND dest_lat = ?4 \
                 AND bucket_start = ?5",
                rusqlite::params![
                    key.origin.0,
                    key.origin.1,
                    key.destination.0,
                    key.destination.1,
                    key.bucket_start,
                ],
                |r| {
                    Ok(TripTimes {
                        drive:   leg_from(r.get(0)?, r.get(1)?),
                        transit: leg_from(r.get(2)?, r.get(3)?),
                    })
                },
            )
            .optional()?;
        Ok(times)
    }

    fn put(&mut self, key: CacheKey, times: &TripTimes, now: i64) -> RouteResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO trip_cache \
             (origin_lon, origin_lat, dest_lon, dest_lat, bucket_start, \
              drive_secs, drive_m, transit_secs, transit_m, stored_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                key.origin.0,
                key.origin.1,
                key.destination.0,
                key.destination.1,
                key.bucket_start,
                times.drive.map(|l| l.duration_secs),
                times.drive.map(|l| l.distance_m),
                times.transit.map(|l| l.duration_secs),
                times.transit.map(|l| l.distance_m),
                now,
            ],
        )?;
        Ok(())
    }

    fn purge_expired(&mut self, now: i64) -> RouteResult<usize> {
        let cutoff = now.saturating_sub(self.retention_secs as i64);
        let n = self
            .conn
            .execute("DELETE FROM trip_cache WHERE stored_at < ?1", rusqlite::params![cutoff])?;
        Ok(n)
    }
}
