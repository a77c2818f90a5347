//! Graph definitions and rendering.
//!
//! This module turns [`StatTables`](slabwatch_types::StatTables) into the
//! line-oriented output a munin-style collector reads.
//!
//! ## Submodules
//!
//! - [`registry`]: The static catalog of graphs ([`GraphId`], [`GraphDef`], [`Series`])
//! - [`render`]: CONFIG and VALUES emission ([`Renderer`], [`GraphBlock`])
//!
//! ## Rendering Flow
//!
//! ```text
//! identity ("items")
//!        │
//!        ▼
//! GraphId::from_str() ──▶ UnknownIdentity
//!        │
//!        ├──▶ multi-root: one child block per (slab id, child template),
//!        │                then the root summary block
//!        │
//!        └──▶ flat root: a single block
//! ```

pub mod registry;
pub mod render;

use thiserror::Error;

pub use registry::{GraphDef, GraphId, Series, SeriesKind, TableKind, ValueSource};
pub use render::{GraphBlock, Renderer};

/// What the renderer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Graph metadata and series attributes.
    Config,
    /// Current values.
    Values,
}

/// Errors from graph lookup and rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested identity is not an invokable graph.
    #[error(
        "Unknown graph '{0}': expected one of items, memory, bytes, conns, commands, evictions"
    )]
    UnknownIdentity(String),
}
