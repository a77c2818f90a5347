//! memcached adapter using the text protocol.
//!
//! This adapter opens one connection, sends four introspection commands and
//! parses each response into [`StatTables`].
//!
//! ## Stats Collected
//!
//! - **`stats`**: General counters (items, connections, commands, evictions)
//! - **`stats settings`**: Server settings such as `maxconns`, merged into the
//!   same global table
//! - **`stats slabs`**: Chunk-level counters per slab class
//! - **`stats items`**: Item-level counters per slab class
//!
//! ## Example
//!
//! ```rust,no_run
//! use slabwatch_adapters::memcached::MemcachedAdapter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = MemcachedAdapter::builder()
//!         .host("cache.local")
//!         .port(11211)
//!         .build();
//!
//!     let tables = adapter.collect().await?;
//!
//!     for (slab, stats) in tables.slabs.iter() {
//!         println!("Slab {}: chunk size {:?}", slab, stats.get("chunk_size"));
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::io;
use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, trace, warn};

use slabwatch_types::StatTables;

use crate::AdapterError;

/// Default memcached port.
pub const DEFAULT_PORT: u16 = 11211;

/// Default connect timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// memcached adapter for collecting slab and item stats.
#[derive(Debug, Clone)]
pub struct MemcachedAdapter {
    host: String,
    port: u16,
    timeout: Duration,
}

impl MemcachedAdapter {
    /// Create a new builder for configuring the adapter.
    pub fn builder() -> MemcachedAdapterBuilder {
        MemcachedAdapterBuilder::default()
    }

    /// The `host:port` address this adapter dials.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check that the server accepts connections.
    ///
    /// The connection is closed again immediately.
    pub async fn ping(&self) -> Result<(), AdapterError> {
        self.connect().await.map(drop)
    }

    /// Collect all four stat tables over a single connection.
    pub async fn collect(&self) -> Result<StatTables, AdapterError> {
        let stream = self.connect().await?;
        collect_from(stream).await
    }

    async fn connect(&self) -> Result<TcpStream, AdapterError> {
        let addr = self.addr();
        debug!("Connecting to {}", addr);

        let connect = TcpStream::connect((self.host.as_str(), self.port));
        connect_within(addr, self.timeout, connect).await
    }
}

/// Await a connection attempt, mapping failure and expiry to adapter errors.
async fn connect_within<T, F>(
    addr: String,
    timeout: Duration,
    connect: F,
) -> Result<T, AdapterError>
where
    F: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => {
            warn!("Connection to {} failed: {}", addr, e);
            Err(AdapterError::Connection {
                addr,
                reason: e.to_string(),
            })
        }
        Err(_) => {
            warn!("Connection to {} timed out", addr);
            Err(AdapterError::Timeout { addr, timeout })
        }
    }
}

/// Builder for MemcachedAdapter.
#[derive(Debug, Default)]
pub struct MemcachedAdapterBuilder {
    host: Option<String>,
    port: Option<u16>,
    timeout: Option<Duration>,
}

impl MemcachedAdapterBuilder {
    /// Set the server host (default: "127.0.0.1").
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the server port (default: 11211).
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the connect timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the adapter.
    pub fn build(self) -> MemcachedAdapter {
        MemcachedAdapter {
            host: self.host.unwrap_or_else(|| "127.0.0.1".to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}

/// The introspection commands, in the order they are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsCommand {
    General,
    Settings,
    Slabs,
    Items,
}

impl StatsCommand {
    /// Every command, in send order.
    pub const ALL: [StatsCommand; 4] = [
        StatsCommand::General,
        StatsCommand::Settings,
        StatsCommand::Slabs,
        StatsCommand::Items,
    ];

    /// The command text as sent on the wire, without the line ending.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StatsCommand::General => "stats",
            StatsCommand::Settings => "stats settings",
            StatsCommand::Slabs => "stats slabs",
            StatsCommand::Items => "stats items",
        }
    }
}

/// Line grammars for the four responses.
#[derive(Debug, Clone)]
pub struct StatsParser {
    stat: Regex,
    slab: Regex,
    item: Regex,
}

impl StatsParser {
    /// Compile the grammars.
    pub fn new() -> Result<Self, AdapterError> {
        Ok(Self {
            stat: Regex::new(r"^STAT\s+(\S+)\s+(.*)$")?,
            slab: Regex::new(r"^STAT\s+(\d+):(\S+)\s+(.*)$")?,
            item: Regex::new(r"^STAT\s+items:(\d+):(\S+)\s+(.*)$")?,
        })
    }

    /// Route one response line into the tables.
    ///
    /// Returns false when the line does not match the command's grammar; such
    /// lines are noise and are never an error.
    pub fn parse_line(&self, command: StatsCommand, line: &str, tables: &mut StatTables) -> bool {
        match command {
            StatsCommand::General | StatsCommand::Settings => match self.stat.captures(line) {
                Some(caps) => {
                    tables.general.insert(&caps[1], &caps[2]);
                    true
                }
                None => false,
            },
            StatsCommand::Slabs => match self.slab.captures(line) {
                Some(caps) => match caps[1].parse::<u32>() {
                    Ok(id) => {
                        tables.slabs.insert(id, &caps[2], &caps[3]);
                        true
                    }
                    Err(_) => false,
                },
                None => false,
            },
            StatsCommand::Items => match self.item.captures(line) {
                Some(caps) => match caps[1].parse::<u32>() {
                    Ok(id) => {
                        tables.items.insert(id, &caps[2], &caps[3]);
                        true
                    }
                    Err(_) => false,
                },
                None => false,
            },
        }
    }
}

/// Whether a line ends a response block.
///
/// `END` is the normal terminator. Error replies also end the block so a
/// server that rejects a command cannot stall the exchange.
pub fn is_terminator(line: &str) -> bool {
    line.starts_with("END")
        || line.starts_with("ERROR")
        || line.starts_with("CLIENT_ERROR")
        || line.starts_with("SERVER_ERROR")
}

/// Run the four-command exchange over an already open stream.
///
/// The stream is consumed and dropped when the exchange finishes. If the
/// server closes the stream early, the tables parsed so far are returned and
/// the remaining commands are not sent.
pub async fn collect_from<S>(stream: S) -> Result<StatTables, AdapterError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let parser = StatsParser::new()?;
    let mut reader = BufReader::new(stream);
    let mut tables = StatTables::new();
    let mut buf = Vec::new();

    for command in StatsCommand::ALL {
        debug!("Sending '{}'", command.as_str());
        let stream = reader.get_mut();
        stream.write_all(command.as_str().as_bytes()).await?;
        stream.write_all(b"\r\n").await?;
        stream.flush().await?;

        let mut parsed = 0usize;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                debug!("Stream closed during '{}'", command.as_str());
                return Ok(tables);
            }

            let text = String::from_utf8_lossy(&buf);
            let line = text.trim_end_matches(['\r', '\n']);

            if is_terminator(line) {
                if !line.starts_with("END") {
                    debug!("'{}' answered with {}", command.as_str(), line);
                }
                break;
            }

            if parser.parse_line(command, line, &mut tables) {
                parsed += 1;
            } else {
                trace!("Skipping line: {}", line);
            }
        }

        debug!("'{}' yielded {} stats", command.as_str(), parsed);
    }

    Ok(tables)
}
