//! Server versions and version ranges.

use core::fmt;

/// A memcached server version as reported by `STAT version`.
///
/// Only the numeric `major.minor.patch` prefix is kept, so distribution
/// suffixes such as `1.4.2-ubuntu1` still compare as `1.4.2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerVersion {
    /// Major version.
    pub major: u32,

    /// Minor version.
    pub minor: u32,

    /// Patch version.
    pub patch: u32,
}

impl ServerVersion {
    /// Create a new server version.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse the leading numeric components of a version string.
    ///
    /// Missing minor or patch components count as 0. Returns `None` when the
    /// string does not start with a number.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().splitn(3, '.');
        let major = leading_number(parts.next()?)?;
        let minor = parts.next().and_then(leading_number).unwrap_or(0);
        let patch = parts.next().and_then(leading_number).unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn leading_number(s: &str) -> Option<u32> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

/// An inclusive range of server versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange {
    /// Lowest matching version.
    pub first: ServerVersion,

    /// Highest matching version.
    pub last: ServerVersion,
}

impl VersionRange {
    /// Create a range covering `first..=last`.
    pub const fn new(first: ServerVersion, last: ServerVersion) -> Self {
        Self { first, last }
    }

    /// Check if a version falls inside the range.
    pub fn contains(&self, version: ServerVersion) -> bool {
        self.first <= version && version <= self.last
    }
}
