use crate::error::Result;
use crate::types::Row;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Clone)]
struct Snapshot {
    rows: Arc<Vec<Row>>,
    fetched_at: Instant,
}

/// Last loaded set of rows plus when it was loaded.
///
/// Built once at startup and handed to whoever needs the data, so reloads
/// happen at most once per `ttl`.
pub struct SnapshotCache {
    ttl: Duration,
    snapshot: Option<Snapshot>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, snapshot: None }
    }

    pub fn is_fresh(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|s| s.fetched_at.elapsed() <= self.ttl)
    }

    pub fn fetched_at(&self) -> Option<Instant> {
        self.snapshot.as_ref().map(|s| s.fetched_at)
    }

    /// Cached rows regardless of age.
    pub fn rows(&self) -> Option<Arc<Vec<Row>>> {
        self.snapshot.as_ref().map(|s| Arc::clone(&s.rows))
    }

    /// Cached rows while fresh, otherwise whatever `loader` returns.
    ///
    /// A failing loader leaves the previous snapshot in place.
    pub fn get_or_load<F>(&mut self, loader: F) -> Result<Arc<Vec<Row>>>
    where
        F: FnOnce() -> Result<Vec<Row>>,
    {
        if self.is_fresh() {
            if let Some(rows) = self.rows() {
                debug!(rows = rows.len(), "serving cached snapshot");
                return Ok(rows);
            }
        }
        let rows = Arc::new(loader()?);
        info!(rows = rows.len(), "snapshot refreshed");
        self.snapshot = Some(Snapshot {
            rows: Arc::clone(&rows),
            fetched_at: Instant::now(),
        });
        Ok(rows)
    }

    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }
}
