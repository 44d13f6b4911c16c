//! Background refresh loop.
//!
//! A single task owns the write side of the snapshot store: it fetches the
//! full upstream dataset on startup and then on a fixed interval, committing
//! each successful result with one atomic replace. A failed cycle is logged
//! and abandoned — the previous snapshot keeps serving until the next
//! interval. Manual refresh requests coalesce with an in-flight cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};

use brewdb_catalog::SnapshotStore;
use brewdb_core::AppConfig;
use brewdb_source::BreweryApiClient;

/// Drives periodic snapshot refreshes against a [`SnapshotStore`].
pub struct Refresher {
    store: Arc<SnapshotStore>,
    client: BreweryApiClient,
    page_size: u32,
    max_pages: u32,
    interval: Duration,
    in_flight: AtomicBool,
    wake: Notify,
}

/// Clears the in-flight flag when a cycle ends, including when the cycle
/// future is dropped by a shutdown race.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Refresher {
    pub fn new(store: Arc<SnapshotStore>, client: BreweryApiClient, config: &AppConfig) -> Self {
        Self {
            store,
            client,
            page_size: config.upstream_page_size,
            max_pages: config.upstream_max_pages,
            interval: Duration::from_secs(config.refresh_interval_secs),
            in_flight: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    /// Runs the refresh loop until `shutdown` signals.
    ///
    /// One cycle runs immediately (cold-start population); afterwards the
    /// loop sleeps for the configured interval, waking early for manual
    /// triggers. Shutdown is observed while sleeping and while fetching.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "refresh loop starting");

        tokio::select! {
            () = self.run_cycle() => {}
            () = shutdown_requested(&mut shutdown) => {
                tracing::info!("refresh loop stopped during initial cycle");
                return;
            }
        }

        loop {
            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = self.wake.notified() => {
                    tracing::info!("manual refresh trigger received");
                }
                () = shutdown_requested(&mut shutdown) => break,
            }

            tokio::select! {
                () = self.run_cycle() => {}
                () = shutdown_requested(&mut shutdown) => break,
            }
        }

        tracing::info!("refresh loop stopped");
    }

    /// Requests a refresh outside the regular interval.
    ///
    /// Advisory: returns `false` without doing anything when a cycle is
    /// already in flight (that cycle satisfies the request), `true` when the
    /// loop has been woken to run a cycle promptly.
    pub fn trigger_refresh(&self) -> bool {
        if self.in_flight.load(Ordering::SeqCst) {
            return false;
        }
        self.wake.notify_one();
        true
    }

    /// One refresh cycle: fetch everything, commit on success, log and keep
    /// the previous snapshot on failure.
    pub(crate) async fn run_cycle(&self) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("refresh cycle already in flight; skipping");
            return;
        }
        let _guard = InFlightGuard(&self.in_flight);

        tracing::info!("refresh cycle: fetching upstream dataset");
        match self.client.fetch_all(self.page_size, self.max_pages).await {
            Ok(breweries) => {
                let count = breweries.len();
                self.store.replace(breweries);
                tracing::info!(count, "refresh cycle: snapshot committed");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    pages_fetched = e.pages_fetched,
                    "refresh cycle failed; keeping previous snapshot"
                );
            }
        }
    }
}

/// Resolves once shutdown has been signalled (or the sender is gone).
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    // wait_for returns Err when the channel closes, which also means stop.
    let _ = shutdown.wait_for(|stop| *stop).await;
}
