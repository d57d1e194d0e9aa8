//! Background timing for statistics refreshes.
//!
//! A [`RefreshScheduler`] owns one task that runs a refresh action:
//!
//! - once immediately after spawning,
//! - then on a fixed period,
//! - and after a mutation, once the debounce window passes with no further mutation.
//!
//! While a debounce is pending the periodic tick is held back, so the debounced run is
//! always the next refresh after a mutation. The period restarts from that run.
//!
//! Cancelling (or dropping) the scheduler stops the timer, discards any pending
//! debounce and aborts a refresh that is still running.

use crate::libs::messages::Message;
use crate::msg_debug;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_millis(1);

pub struct RefreshScheduler {
    mutations: Arc<Notify>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Spawns the refresh loop on the current runtime.
    pub fn spawn<F, Fut>(interval: Duration, debounce: Duration, refresh: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mutations = Arc::new(Notify::new());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(run_loop(interval.max(MIN_PERIOD), debounce, Arc::clone(&mutations), shutdown_rx, refresh));

        msg_debug!(Message::SchedulerStarted(interval.as_millis() as u64, debounce.as_millis() as u64));

        Self {
            mutations,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Restarts the debounce window. A burst of calls yields a single refresh.
    pub fn notify_mutation(&self) {
        self.mutations.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the loop. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
            msg_debug!(Message::SchedulerStopped);
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_loop<F, Fut>(interval: Duration, debounce: Duration, mutations: Arc<Notify>, mut shutdown_rx: oneshot::Receiver<()>, refresh: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Deadline of the debounced refresh, pushed back by every new mutation.
    let mut pending: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            _ = ticker.tick(), if pending.is_none() => {
                refresh().await;
            }
            _ = mutations.notified() => {
                pending = Some(Instant::now() + debounce);
            }
            _ = time::sleep_until(pending.unwrap_or_else(Instant::now)), if pending.is_some() => {
                pending = None;
                refresh().await;
                ticker.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<()> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test]
    async fn first_tick_runs_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));
        let scheduler = RefreshScheduler::spawn(Duration::from_secs(3600), Duration::from_millis(10), counting(&counter));

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(scheduler.is_running());
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::spawn(Duration::from_secs(3600), Duration::from_millis(10), counting(&counter));

        scheduler.cancel();
        scheduler.cancel();
        assert!(!scheduler.is_running());
    }
}
