//! The data manager: one entry point for statistics and the data lifecycle.
//!
//! [`DataManager`] wraps a [`StoreAdapter`] and provides:
//!
//! - **Statistics**: [`refresh_stats`](DataManager::refresh_stats) with a single-flight
//!   guarantee, a cached last-known snapshot and a `watch` subscription for updates.
//! - **Scheduling**: [`start`](DataManager::start) runs periodic and post-mutation
//!   refreshes through a [`RefreshScheduler`]; [`shutdown`](DataManager::shutdown)
//!   tears it down.
//! - **Lifecycle**: [`export_all`](DataManager::export_all),
//!   [`import_all`](DataManager::import_all) and [`reset_all`](DataManager::reset_all),
//!   each a single adapter call whose failures are classified into [`DataError`].
//!
//! ## Refresh state
//!
//! ```text
//! Idle ──refresh_stats()──▶ Refreshing ──scan done / dropped──▶ Idle
//!                               │
//!                               └── concurrent refresh_stats() waits for the same result
//! ```
//!
//! `reset_all` and `import_all` bump a generation counter. A refresh that started
//! before the bump may still finish, but it no longer updates the cache, so the
//! next `refresh_stats` always reads the store again.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use toolshed::libs::manager::{DataManager, ManagerOptions};
//! use toolshed::libs::store::SqliteStore;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let manager = DataManager::new(Arc::new(SqliteStore::open()?), ManagerOptions::default());
//! if let Some(snapshot) = manager.refresh_stats().await {
//!     println!("{} tools, {} items", snapshot.total_tools, snapshot.total_data_points);
//! }
//! # Ok(())
//! # }
//! ```

use crate::libs::bundle::{ExportBundle, ExportOptions, ImportMode};
use crate::libs::config::{Config, MIN_REFRESH_INTERVAL_SECS};
use crate::libs::error::DataError;
use crate::libs::messages::Message;
use crate::libs::scheduler::RefreshScheduler;
use crate::libs::stats::{StatisticsSnapshot, StatsAggregator, STORAGE_QUOTA_BYTES};
use crate::libs::store::StoreAdapter;
use crate::{msg_debug, msg_warning};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerOptions {
    pub refresh_interval: Duration,
    pub debounce: Duration,
    pub quota_bytes: u64,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(120),
            debounce: Duration::from_secs(1),
            quota_bytes: STORAGE_QUOTA_BYTES,
        }
    }
}

impl ManagerOptions {
    pub fn from_config(config: &Config) -> Self {
        let refresh = config.refresh_or_default();
        Self {
            refresh_interval: Duration::from_secs(refresh.interval_secs.max(MIN_REFRESH_INTERVAL_SECS)),
            debounce: Duration::from_millis(refresh.debounce_millis),
            quota_bytes: config.storage_or_default().quota_bytes,
        }
    }
}

/// Result slot shared between the refresh that scans and the callers waiting on it.
#[derive(Debug, Clone)]
enum Flight {
    Pending,
    Done(Option<StatisticsSnapshot>),
}

enum RefreshState {
    Idle,
    Refreshing(watch::Receiver<Flight>),
}

enum Role {
    Leader(watch::Sender<Flight>, u64),
    Follower(watch::Receiver<Flight>),
}

struct Inner<S> {
    store: Arc<S>,
    options: ManagerOptions,
    state: Mutex<RefreshState>,
    generation: AtomicU64,
    snapshot_tx: watch::Sender<Option<StatisticsSnapshot>>,
    scheduler: Mutex<Option<RefreshScheduler>>,
}

impl<S> Inner<S> {
    /// Forgets the cached snapshot and detaches any in-flight refresh from the cache.
    fn invalidate(&self) {
        {
            let mut state = self.state.lock();
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = RefreshState::Idle;
        }
        self.snapshot_tx.send_replace(None);
        msg_debug!(Message::StatsInvalidated);
    }
}

/// Returns the refresh state to `Idle` when the scanning refresh ends, including when
/// its future is dropped. Does nothing if the state was reset in the meantime.
struct FlightGuard<'a, S> {
    inner: &'a Inner<S>,
    generation: u64,
}

impl<S> Drop for FlightGuard<'_, S> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        if self.inner.generation.load(Ordering::SeqCst) == self.generation {
            *state = RefreshState::Idle;
        }
    }
}

pub struct DataManager<S: StoreAdapter> {
    inner: Arc<Inner<S>>,
}

impl<S: StoreAdapter> Clone for DataManager<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StoreAdapter> DataManager<S> {
    pub fn new(store: Arc<S>, options: ManagerOptions) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                store,
                options,
                state: Mutex::new(RefreshState::Idle),
                generation: AtomicU64::new(0),
                snapshot_tx,
                scheduler: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.inner.store
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.inner.options
    }

    /// Last known snapshot, if any refresh has succeeded since the last invalidation.
    pub fn snapshot(&self) -> Option<StatisticsSnapshot> {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Receives every snapshot update, and `None` when the cache is invalidated.
    pub fn subscribe(&self) -> watch::Receiver<Option<StatisticsSnapshot>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Recomputes statistics from the store.
    ///
    /// Only one scan runs at a time: a call made while another refresh is in flight
    /// waits for that refresh and returns its result. A failed scan is logged and the
    /// last known snapshot is returned instead.
    pub async fn refresh_stats(&self) -> Option<StatisticsSnapshot> {
        let role = {
            let mut state = self.inner.state.lock();
            match &mut *state {
                RefreshState::Refreshing(flight) => Role::Follower(flight.clone()),
                idle @ RefreshState::Idle => {
                    let (flight_tx, flight_rx) = watch::channel(Flight::Pending);
                    *idle = RefreshState::Refreshing(flight_rx);
                    Role::Leader(flight_tx, self.inner.generation.load(Ordering::SeqCst))
                }
            }
        };

        match role {
            Role::Follower(flight) => self.join_flight(flight).await,
            Role::Leader(flight_tx, generation) => self.lead_flight(flight_tx, generation).await,
        }
    }

    async fn join_flight(&self, mut flight: watch::Receiver<Flight>) -> Option<StatisticsSnapshot> {
        msg_debug!(Message::StatsRefreshJoined);

        let joined = match flight.wait_for(|f| matches!(f, Flight::Done(_))).await {
            Ok(done) => match &*done {
                Flight::Done(result) => Some(result.clone()),
                Flight::Pending => None,
            },
            // The scanning refresh was dropped before it finished.
            Err(_) => None,
        };

        joined.unwrap_or_else(|| self.snapshot())
    }

    async fn lead_flight(&self, flight_tx: watch::Sender<Flight>, generation: u64) -> Option<StatisticsSnapshot> {
        let _guard = FlightGuard {
            inner: &self.inner,
            generation,
        };
        msg_debug!(Message::StatsRefreshStarted(generation));

        let started = Instant::now();
        let aggregator = StatsAggregator::with_quota(self.inner.store.as_ref(), self.inner.options.quota_bytes);

        let result = match aggregator.compute_snapshot().await {
            Ok(snapshot) => {
                {
                    let _state = self.inner.state.lock();
                    if self.inner.generation.load(Ordering::SeqCst) == generation {
                        self.inner.snapshot_tx.send_replace(Some(snapshot.clone()));
                    }
                }
                msg_debug!(Message::StatsRefreshCompleted(snapshot.total_tools, snapshot.total_data_points));
                tracing::trace!(elapsed_ms = started.elapsed().as_millis() as u64, "statistics scan finished");
                Some(snapshot)
            }
            Err(e) => {
                msg_warning!(Message::StatsRefreshFailed(e.to_string()));
                self.snapshot()
            }
        };

        flight_tx.send_replace(Flight::Done(result.clone()));
        result
    }

    /// Serializes every record, plus the requested auxiliary trees, into a bundle.
    /// Read-only. Either the whole bundle or an error is returned.
    pub async fn export_all(&self, options: ExportOptions) -> Result<ExportBundle, DataError> {
        msg_debug!(Message::ExportingData);

        let contents = self.inner.store.read_contents(options).await.map_err(DataError::from_export)?;
        let bundle = ExportBundle::from_contents(contents);

        msg_debug!(Message::ExportSummary(bundle.records.len(), bundle.tool_count()));
        Ok(bundle)
    }

    /// Makes `bundle` the store's entire record set.
    ///
    /// Mode and format version are validated before anything is written; a rejected
    /// bundle leaves the store untouched.
    pub async fn import_all(&self, bundle: ExportBundle, mode: ImportMode) -> Result<(), DataError> {
        match mode {
            ImportMode::Replace => {}
            ImportMode::Merge => return Err(DataError::UnsupportedMode(mode)),
        }
        bundle.check_version()?;

        let imported = bundle.records.len();
        self.inner
            .store
            .replace_contents(bundle.into_contents())
            .await
            .map_err(DataError::from_write)?;

        self.inner.invalidate();
        self.notify_mutation();
        msg_debug!(Message::ImportCompleted(imported));
        Ok(())
    }

    /// Deletes all stored data and drops the cached snapshot. Safe on an empty store.
    pub async fn reset_all(&self) -> Result<(), DataError> {
        self.inner.store.clear_all().await.map_err(DataError::from_write)?;

        self.inner.invalidate();
        self.notify_mutation();
        msg_debug!(Message::ResetCompleted);
        Ok(())
    }

    /// Exports to `path`, gzip-compressed when `compress` is set.
    ///
    /// The bundle is written to a sibling `.partial` file and renamed into place, so
    /// `path` holds either its previous contents or the complete new bundle.
    pub async fn export_to_file(&self, path: &Path, options: ExportOptions, compress: bool) -> Result<ExportBundle, DataError> {
        let bundle = self.export_all(options).await?;
        let bytes = bundle.encode(compress)?;

        let partial = partial_path(path);
        let written = match tokio::fs::write(&partial, bytes).await {
            Ok(()) => tokio::fs::rename(&partial, path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(DataError::ExportFailed(format!("{}: {}", path.display(), e)));
        }

        Ok(bundle)
    }

    /// Reads and imports a bundle file. Returns the number of records restored.
    pub async fn import_file(&self, path: &Path, mode: ImportMode) -> Result<usize, DataError> {
        if mode != ImportMode::Replace {
            return Err(DataError::UnsupportedMode(mode));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DataError::Unknown(format!("cannot read {}: {}", path.display(), e)))?;
        let bundle = ExportBundle::decode(&bytes)?;
        let imported = bundle.records.len();

        self.import_all(bundle, mode).await?;
        Ok(imported)
    }

    /// Starts periodic and debounced refreshes. Returns `false` if already running.
    pub fn start(&self) -> bool {
        let mut slot = self.inner.scheduler.lock();
        if slot.as_ref().is_some_and(RefreshScheduler::is_running) {
            msg_debug!(Message::SchedulerAlreadyRunning);
            return false;
        }

        let weak: Weak<Inner<S>> = Arc::downgrade(&self.inner);
        let scheduler = RefreshScheduler::spawn(self.inner.options.refresh_interval, self.inner.options.debounce, move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    DataManager { inner }.refresh_stats().await;
                }
            }
        });

        *slot = Some(scheduler);
        true
    }

    /// Cancels the scheduler, its pending debounce and any refresh it is running.
    pub fn shutdown(&self) {
        let scheduler = self.inner.scheduler.lock().take();
        if let Some(mut scheduler) = scheduler {
            scheduler.cancel();
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.inner.scheduler.lock().as_ref().is_some_and(RefreshScheduler::is_running)
    }

    /// Tells the scheduler that data changed, so a debounced refresh follows.
    pub fn notify_mutation(&self) {
        if let Some(scheduler) = self.inner.scheduler.lock().as_ref() {
            scheduler.notify_mutation();
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
