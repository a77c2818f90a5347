//! # slabwatch
//!
//! A munin multigraph plugin for memcached.
//!
//! slabwatch asks a memcached server for its general, settings, slab and
//! item statistics, then renders graph configuration or current values in
//! the line format munin reads from plugins.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           plugin                             │
//! │  ┌──────────┐    ┌────────────┐    ┌──────────┐   ┌────────┐ │
//! │  │  source  │───▶│ StatTables │───▶│  graph   │──▶│ stdout │ │
//! │  │ (input)  │    │  (types)   │    │ (render) │   │        │ │
//! │  └────┬─────┘    └────────────┘    └──────────┘   └────────┘ │
//! │       │                                                      │
//! │       └── MemcachedAdapter | FileSource | StatTables         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`config`]**: Layered settings (defaults, file, environment, flags)
//! - **[`source`]**: The [`StatsSource`] trait and its implementations
//! - **[`graph`]**: The graph registry and the CONFIG/VALUES renderer
//! - **[`plugin`]**: Command dispatch for `autoconf`, `suggest`, `config`,
//!   `fetch` and `dump`
//!
//! ## Usage
//!
//! ### As a munin plugin
//!
//! ```bash
//! # Link once per root graph; the identity is taken from the link name
//! ln -s /usr/local/bin/slabwatch /etc/munin/plugins/memcached_multi_items
//! munin-run memcached_multi_items config
//!
//! # Or select the graph explicitly
//! slabwatch fetch --graph conns --host 10.0.0.5
//! ```
//!
//! ### As a library
//!
//! ```
//! use slabwatch::graph::{Mode, Renderer};
//! use slabwatch_types::StatTables;
//!
//! let tables = StatTables::builder()
//!     .stat("bytes_read", "1024")
//!     .stat("bytes_written", "4096")
//!     .build();
//!
//! let lines = Renderer::new(&tables).render_lines("bytes", Mode::Values).unwrap();
//! assert_eq!(lines, vec!["bytes_read.value 1024", "bytes_written.value 4096"]);
//! ```

pub mod config;
pub mod graph;
pub mod plugin;
pub mod source;

pub use config::{Overrides, Settings};
pub use graph::{GraphId, Mode, RenderError, Renderer};
pub use plugin::{Invocation, PluginCommand};
pub use source::{FileSource, StatsSource};
