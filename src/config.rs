//! Layered configuration.
//!
//! Settings are resolved from, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. An optional config file (`--config`)
//! 3. munin-style plugin environment (`host`, `port`, `timescale`, `prefix`)
//! 4. Prefixed environment (`SLABWATCH_HOST`, `SLABWATCH_PORT`, ...)
//! 5. Command line flags

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use slabwatch_types::TimeScale;

/// Keys munin passes through from `env.<key>` lines in plugin configuration.
const MUNIN_KEYS: [&str; 4] = ["host", "port", "timescale", "prefix"];

/// Resolved plugin settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Time-scale code: 1 seconds, 2 minutes, 3 hours, 4 days.
    ///
    /// Kept as text so a malformed value degrades to hours instead of
    /// failing the whole run.
    pub timescale: String,
    /// Prepended to every multigraph name; empty by default.
    pub prefix: String,
    /// Connect timeout in seconds.
    pub timeout_secs: u64,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timescale: Option<i64>,
    pub prefix: Option<String>,
}

impl Settings {
    /// Resolve settings from every layer, reading the process environment.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_with_env(path, overrides, std::env::vars())
    }

    /// Resolve settings with an explicit set of environment variables.
    pub fn load_with_env(
        path: Option<&Path>,
        overrides: &Overrides,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let mut builder = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 11211_i64)?
            .set_default("timescale", 3_i64)?
            .set_default("prefix", "")?
            .set_default("timeout_secs", 10_i64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(
                Environment::default()
                    .source(Some(munin_env(vars.iter().cloned())))
                    .try_parsing(true),
            )
            .add_source(
                Environment::with_prefix("SLABWATCH")
                    .source(Some(vars.into_iter().collect()))
                    .try_parsing(true),
            )
            .set_override_option("host", overrides.host.clone())?
            .set_override_option("port", overrides.port.map(i64::from))?
            .set_override_option("timescale", overrides.timescale)?
            .set_override_option("prefix", overrides.prefix.clone())?
            .build()
            .context("Failed to load configuration")?;

        settings.try_deserialize().context("Invalid configuration")
    }

    /// The configured display unit; unset, unknown or non-numeric codes mean
    /// hours.
    pub fn time_scale(&self) -> TimeScale {
        self.timescale
            .trim()
            .parse::<i64>()
            .map(TimeScale::from_code)
            .unwrap_or_default()
    }

    /// The connect timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Keep only the lowercase plugin variables munin exports.
fn munin_env(vars: impl Iterator<Item = (String, String)>) -> config::Map<String, String> {
    vars.filter(|(key, _)| MUNIN_KEYS.contains(&key.as_str()))
        .collect()
}
