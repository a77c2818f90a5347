//! Time-scale normalization for "time since" series.
//!
//! The server reports ages and eviction times in seconds. Graphs can display
//! them in a coarser unit chosen by configuration, given as a numeric code:
//! 1 = seconds, 2 = minutes, 3 = hours, 4 = days.

use alloc::format;
use alloc::string::String;
use core::fmt;
use core::str::FromStr;

/// Display unit for elapsed-time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeScale {
    Seconds,
    Minutes,
    #[default]
    Hours,
    Days,
}

impl TimeScale {
    /// Map a configuration code to a unit.
    ///
    /// Unknown codes, including 0 and anything above 4, fall back to hours.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => TimeScale::Seconds,
            2 => TimeScale::Minutes,
            4 => TimeScale::Days,
            _ => TimeScale::Hours,
        }
    }

    /// Number of seconds in one unit.
    pub const fn seconds(&self) -> u32 {
        match self {
            TimeScale::Seconds => 1,
            TimeScale::Minutes => 60,
            TimeScale::Hours => 3600,
            TimeScale::Days => 86400,
        }
    }

    /// Axis label for the unit.
    pub const fn label(&self) -> &'static str {
        match self {
            TimeScale::Seconds => "Seconds",
            TimeScale::Minutes => "Minutes",
            TimeScale::Hours => "Hours",
            TimeScale::Days => "Days",
        }
    }

    /// Convert a duration in seconds to this unit, with two decimals.
    pub fn scale(&self, secs: f64) -> String {
        format!("{:02.2}", secs / f64::from(self.seconds()))
    }
}

/// What `normalize` should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleMode {
    /// Produce a unit label.
    Config,
    /// Produce a scaled value.
    Data,
}

impl FromStr for ScaleMode {
    type Err = TimeScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "config" => Ok(ScaleMode::Config),
            "data" => Ok(ScaleMode::Data),
            other => Err(TimeScaleError::InvalidMode(other.into())),
        }
    }
}

/// Errors from time-scale normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeScaleError {
    /// The requested mode is neither `config` nor `data`.
    InvalidMode(String),
}

impl fmt::Display for TimeScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeScaleError::InvalidMode(mode) => {
                write!(f, "unknown time scale mode '{}'", mode)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TimeScaleError {}

/// Normalize a value for the given unit.
///
/// In `Config` mode `value` is a label suffix and the unit label is prepended
/// to it. In `Data` mode `value` is a number of seconds; non-numeric input
/// counts as zero.
pub fn normalize(mode: ScaleMode, value: &str, unit: TimeScale) -> String {
    match mode {
        ScaleMode::Config => format!("{}{}", unit.label(), value),
        ScaleMode::Data => unit.scale(value.trim().parse().unwrap_or(0.0)),
    }
}

/// Like [`normalize`], with the mode given by name.
pub fn normalize_str(mode: &str, value: &str, unit: TimeScale) -> Result<String, TimeScaleError> {
    Ok(normalize(mode.parse()?, value, unit))
}
