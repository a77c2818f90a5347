//! # slabwatch-adapters
//!
//! Adapters for collecting statistics from cache servers.
//!
//! Each adapter opens a short-lived connection, issues the server's
//! introspection commands and converts the responses to [`StatTables`].
//!
//! ## Supported Systems
//!
//! - **memcached** (`memcached` feature, default) - Collects general stats,
//!   settings, per-slab chunk counters and per-slab item counters over the
//!   text protocol
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slabwatch_adapters::memcached::MemcachedAdapter;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = MemcachedAdapter::builder()
//!         .host("localhost")
//!         .port(11211)
//!         .timeout(Duration::from_secs(10))
//!         .build();
//!
//!     let tables = adapter.collect().await?;
//!
//!     println!("Collected {} slabs", tables.slabs.len());
//!     Ok(())
//! }
//! ```

pub mod error;

#[cfg(feature = "memcached")]
pub mod memcached;

pub use error::AdapterError;

// Re-export types for convenience
pub use slabwatch_types::{GlobalStats, SlabStats, StatMap, StatTables};
