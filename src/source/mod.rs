//! Stat table sources.
//!
//! Plugin commands read [`StatTables`] through the [`StatsSource`] trait so
//! the same dispatch runs against a live server or a saved JSON dump.

mod file;

pub use file::FileSource;

use std::future::Future;

use slabwatch_adapters::memcached::MemcachedAdapter;
use slabwatch_adapters::AdapterError;
use slabwatch_types::StatTables;

/// Something that can produce a full set of stat tables.
///
/// # Example
///
/// ```
/// use slabwatch::source::StatsSource;
/// use slabwatch_types::StatTables;
///
/// let tables = StatTables::builder().stat("uptime", "60").build();
/// let collected = tokio_test::block_on(tables.collect()).unwrap();
/// assert_eq!(collected.general.get("uptime"), Some("60"));
/// ```
pub trait StatsSource {
    /// Check that the source is reachable without collecting anything.
    fn ping(&self) -> impl Future<Output = Result<(), AdapterError>>;

    /// Collect the general, settings, slabs and items tables.
    fn collect(&self) -> impl Future<Output = Result<StatTables, AdapterError>>;

    /// Human-readable description, used in log lines.
    fn description(&self) -> String;
}

impl StatsSource for MemcachedAdapter {
    async fn ping(&self) -> Result<(), AdapterError> {
        MemcachedAdapter::ping(self).await
    }

    async fn collect(&self) -> Result<StatTables, AdapterError> {
        MemcachedAdapter::collect(self).await
    }

    fn description(&self) -> String {
        format!("memcached: {}", self.addr())
    }
}

/// Already collected tables act as their own source.
impl StatsSource for StatTables {
    async fn ping(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn collect(&self) -> Result<StatTables, AdapterError> {
        Ok(self.clone())
    }

    fn description(&self) -> String {
        "in-memory tables".to_string()
    }
}
