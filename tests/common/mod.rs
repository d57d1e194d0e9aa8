#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use toolshed::libs::bundle::ExportOptions;
use toolshed::libs::error::StoreError;
use toolshed::libs::store::{SqliteStore, StorageStats, StoreAdapter, StoreContents, UsageScan};

/// Wraps a real store, counts usage scans and can slow them down or make them fail.
pub struct CountingStore {
    pub inner: SqliteStore,
    scans: AtomicUsize,
    scan_delay: Duration,
    fail_scans: AtomicBool,
}

impl CountingStore {
    pub fn new(inner: SqliteStore, scan_delay: Duration) -> Self {
        Self {
            inner,
            scans: AtomicUsize::new(0),
            scan_delay,
            fail_scans: AtomicBool::new(false),
        }
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn fail_scans(&self, fail: bool) {
        self.fail_scans.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreAdapter for CountingStore {
    async fn storage_stats(&self) -> Result<StorageStats, StoreError> {
        self.inner.storage_stats().await
    }

    async fn list_distinct_tools(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_distinct_tools().await
    }

    async fn usage_scan(&self) -> Result<UsageScan, StoreError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.scan_delay).await;
        if self.fail_scans.load(Ordering::SeqCst) {
            return Err(StoreError::Read("injected scan failure".to_string()));
        }
        self.inner.usage_scan().await
    }

    async fn read_contents(&self, options: ExportOptions) -> Result<StoreContents, StoreError> {
        self.inner.read_contents(options).await
    }

    async fn replace_contents(&self, contents: StoreContents) -> Result<(), StoreError> {
        self.inner.replace_contents(contents).await
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.inner.clear_all().await
    }
}

/// Fixed instant `offset_secs` after 2024-01-01T00:00:00Z.
pub fn at(offset_secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(offset_secs)
}
