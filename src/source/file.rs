//! File-based stat source.
//!
//! Reads stat tables from a JSON file written by the `dump` command.

use std::io;
use std::path::{Path, PathBuf};

use slabwatch_adapters::AdapterError;
use slabwatch_types::StatTables;
use tracing::debug;

use super::StatsSource;

/// A source that replays stat tables saved as JSON.
///
/// Useful for rendering graphs offline from a capture taken on another host.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl StatsSource for FileSource {
    async fn ping(&self) -> Result<(), AdapterError> {
        tokio::fs::metadata(&self.path).await?;
        Ok(())
    }

    async fn collect(&self) -> Result<StatTables, AdapterError> {
        debug!("Reading stat tables from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&content)
            .map_err(|e| AdapterError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn description(&self) -> String {
        format!("file: {}", self.path.display())
    }
}
