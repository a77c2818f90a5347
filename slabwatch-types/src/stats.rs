//! Stat tables - the parsed form of the server's introspection responses.

use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::ServerVersion;

/// A flat key → value stat table.
///
/// Values are kept as the raw strings the server sent; callers coerce them to
/// numbers when rendering. Inserting an existing key overwrites the old value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StatMap {
    entries: BTreeMap<String, String>,
}

impl StatMap {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a stat, replacing any earlier value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Get the raw value of a stat.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Get a stat coerced to a number.
    ///
    /// Returns `None` when the key is absent or the value is not numeric.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// Number of stats in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all stats in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Global stats, merged from `stats` and `stats settings`.
pub type GlobalStats = StatMap;

/// Per-slab stat tables, keyed by slab class id.
///
/// Used for both `stats slabs` (chunk-level counters) and `stats items`
/// (item-level counters). Ids always iterate in ascending numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SlabStats {
    slabs: BTreeMap<u32, StatMap>,
}

impl SlabStats {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a stat for a slab, creating the slab entry on first use.
    pub fn insert(&mut self, slab: u32, key: impl Into<String>, value: impl Into<String>) {
        self.slabs.entry(slab).or_default().insert(key, value);
    }

    /// Get all stats for one slab.
    pub fn get(&self, slab: u32) -> Option<&StatMap> {
        self.slabs.get(&slab)
    }

    /// Get a single stat for one slab.
    pub fn stat(&self, slab: u32, key: &str) -> Option<&str> {
        self.get(slab).and_then(|s| s.get(key))
    }

    /// Slab ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.slabs.keys().copied()
    }

    /// Sum a numeric stat across every slab.
    ///
    /// Slabs missing the key, or holding a non-numeric value, contribute 0.
    pub fn sum(&self, key: &str) -> u64 {
        self.iter()
            .filter_map(|(_, s)| s.get(key))
            .map(|v| v.trim().parse::<u64>().unwrap_or(0))
            .sum()
    }

    /// Number of slabs.
    pub fn len(&self) -> usize {
        self.slabs.len()
    }

    /// Check if no slab has been recorded.
    pub fn is_empty(&self) -> bool {
        self.slabs.is_empty()
    }

    /// Iterate over slabs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &StatMap)> {
        self.slabs.iter().map(|(id, s)| (*id, s))
    }
}

/// Everything one collection pass learns about a server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatTables {
    /// Global counters and settings.
    pub general: GlobalStats,

    /// Chunk-level counters from `stats slabs`.
    pub slabs: SlabStats,

    /// Item-level counters from `stats items`.
    pub items: SlabStats,
}

impl StatTables {
    /// Create empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing tables.
    pub fn builder() -> StatTablesBuilder {
        StatTablesBuilder::new()
    }

    /// The server version reported in the global stats, if parsable.
    pub fn version(&self) -> Option<ServerVersion> {
        self.general.get("version").and_then(ServerVersion::parse)
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Builder for `StatTables`.
#[derive(Debug, Default)]
pub struct StatTablesBuilder {
    tables: StatTables,
}

impl StatTablesBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a global stat.
    pub fn stat(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tables.general.insert(key, value);
        self
    }

    /// Add stats for one slab built using a closure.
    pub fn slab<F>(mut self, id: u32, f: F) -> Self
    where
        F: FnOnce(StatMapBuilder) -> StatMapBuilder,
    {
        for (key, value) in f(StatMapBuilder::new()).build().iter() {
            self.tables.slabs.insert(id, key, value);
        }
        self
    }

    /// Add item stats for one slab built using a closure.
    pub fn item<F>(mut self, id: u32, f: F) -> Self
    where
        F: FnOnce(StatMapBuilder) -> StatMapBuilder,
    {
        for (key, value) in f(StatMapBuilder::new()).build().iter() {
            self.tables.items.insert(id, key, value);
        }
        self
    }

    /// Build the tables.
    pub fn build(self) -> StatTables {
        self.tables
    }
}

/// Builder for a single `StatMap`.
#[derive(Debug, Default)]
pub struct StatMapBuilder {
    map: StatMap,
}

impl StatMapBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stat.
    pub fn stat(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.map.insert(key, value);
        self
    }

    /// Build the table.
    pub fn build(self) -> StatMap {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_map_overwrites() {
        let mut map = StatMap::new();
        map.insert("curr_items", "1");
        map.insert("curr_items", "2");

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("curr_items"), Some("2"));
        assert_eq!(map.get_f64("curr_items"), Some(2.0));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_get_f64_non_numeric() {
        let mut map = StatMap::new();
        map.insert("domain_socket", "NULL");
        assert_eq!(map.get_f64("domain_socket"), None);
    }

    #[test]
    fn test_slab_ids_are_numerically_sorted() {
        let mut slabs = SlabStats::new();
        slabs.insert(10, "chunk_size", "1184");
        slabs.insert(2, "chunk_size", "120");
        slabs.insert(1, "chunk_size", "96");

        // 10 would sort before 2 if ids were compared as strings
        assert_eq!(slabs.ids().collect::<Vec<_>>(), vec![1, 2, 10]);
        assert_eq!(slabs.stat(2, "chunk_size"), Some("120"));
        assert_eq!(slabs.stat(3, "chunk_size"), None);
    }

    #[test]
    fn test_slab_sum_skips_missing_and_garbage() {
        let tables = StatTables::builder()
            .item(1, |i| i.stat("evicted_nonzero", "5"))
            .item(2, |i| i.stat("evicted_nonzero", "7"))
            .item(3, |i| i.stat("number", "1"))
            .item(4, |i| i.stat("evicted_nonzero", "bogus"))
            .build();

        assert_eq!(tables.items.sum("evicted_nonzero"), 12);
        assert_eq!(SlabStats::new().sum("evicted_nonzero"), 0);
    }

    #[test]
    fn test_builder() {
        let tables = StatTables::builder()
            .stat("uptime", "50")
            .slab(1, |s| s.stat("chunk_size", "96").stat("used_chunks", "3"))
            .item(5, |i| i.stat("number", "3"))
            .build();

        assert_eq!(tables.general.get("uptime"), Some("50"));
        assert_eq!(tables.slabs.len(), 1);
        assert_eq!(tables.slabs.stat(1, "used_chunks"), Some("3"));
        assert_eq!(tables.items.ids().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_version_lookup() {
        let tables = StatTables::builder().stat("version", "1.4.1").build();
        assert_eq!(tables.version(), Some(ServerVersion::new(1, 4, 1)));

        assert_eq!(StatTables::new().version(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let tables = StatTables::builder()
            .stat("version", "1.6.21")
            .slab(1, |s| s.stat("chunk_size", "96"))
            .item(1, |i| i.stat("age", "12"))
            .build();

        let json = serde_json::to_string(&tables).unwrap();
        let parsed: StatTables = serde_json::from_str(&json).unwrap();

        assert_eq!(tables, parsed);
    }
}
