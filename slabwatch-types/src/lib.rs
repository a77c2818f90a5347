//! # slabwatch-types
//!
//! Core types for memcached observability. This crate defines the tables the
//! protocol client fills in and the small value types the graph renderer
//! needs to interpret them.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable `serde` to dump stat tables as JSON
//! - **Ordered by construction**: Slab ids iterate in ascending numeric order
//! - **Ergonomic builders**: Fluent API for constructing stat tables in tests and tools
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON/MessagePack/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use slabwatch_types::{StatTables, TimeScale};
//!
//! let tables = StatTables::builder()
//!     .stat("version", "1.6.21")
//!     .stat("curr_items", "42")
//!     .slab(1, |s| s.stat("chunk_size", "96").stat("total_chunks", "10922"))
//!     .item(1, |i| i.stat("number", "42").stat("age", "7200"))
//!     .build();
//!
//! assert_eq!(tables.general.get("curr_items"), Some("42"));
//! assert_eq!(tables.slabs.ids().collect::<Vec<_>>(), vec![1]);
//! assert_eq!(TimeScale::Hours.scale(7200.0), "2.00");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod stats;
mod timescale;
mod version;

pub use stats::*;
pub use timescale::*;
pub use version::*;
