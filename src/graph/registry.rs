//! Static catalog of graph definitions.
//!
//! Every identity the plugin knows is a [`GraphId`]. Each id maps to one
//! immutable [`GraphDef`] describing its config directives and data series.
//! Root graphs are invokable; sub-graph templates are only rendered as
//! per-slab children of their root.

use std::fmt;
use std::str::FromStr;

use slabwatch_types::{ServerVersion, VersionRange};

use super::RenderError;

/// Server versions that never report the reclaimed counter.
pub const RECLAIMED_UNAVAILABLE: VersionRange =
    VersionRange::new(ServerVersion::new(1, 4, 0), ServerVersion::new(1, 4, 2));

/// Every graph identity, roots first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphId {
    Items,
    Memory,
    Bytes,
    Conns,
    Commands,
    Evictions,
    SlabChunks,
    SlabHits,
    SlabEvictions,
    SlabEvictionTime,
    SlabItems,
    SlabItemTime,
}

impl GraphId {
    /// The invokable root identities, in suggestion order.
    pub const ROOTS: [GraphId; 6] = [
        GraphId::Items,
        GraphId::Memory,
        GraphId::Bytes,
        GraphId::Conns,
        GraphId::Commands,
        GraphId::Evictions,
    ];

    const ALL: [GraphId; 12] = [
        GraphId::Items,
        GraphId::Memory,
        GraphId::Bytes,
        GraphId::Conns,
        GraphId::Commands,
        GraphId::Evictions,
        GraphId::SlabChunks,
        GraphId::SlabHits,
        GraphId::SlabEvictions,
        GraphId::SlabEvictionTime,
        GraphId::SlabItems,
        GraphId::SlabItemTime,
    ];

    /// The identity's name as used on the command line and in output.
    pub const fn name(&self) -> &'static str {
        match self {
            GraphId::Items => "items",
            GraphId::Memory => "memory",
            GraphId::Bytes => "bytes",
            GraphId::Conns => "conns",
            GraphId::Commands => "commands",
            GraphId::Evictions => "evictions",
            GraphId::SlabChunks => "slabchnks",
            GraphId::SlabHits => "slabhits",
            GraphId::SlabEvictions => "slabevics",
            GraphId::SlabEvictionTime => "slabevictime",
            GraphId::SlabItems => "slabitems",
            GraphId::SlabItemTime => "slabitemtime",
        }
    }

    /// Whether this is an invokable root graph.
    pub fn is_root(&self) -> bool {
        Self::ROOTS.contains(self)
    }

    /// Resolve an identity to an invokable root graph.
    ///
    /// Sub-graph template names are rejected like unknown names.
    pub fn root(identity: &str) -> Result<GraphId, RenderError> {
        identity
            .parse::<GraphId>()
            .ok()
            .filter(GraphId::is_root)
            .ok_or_else(|| RenderError::UnknownIdentity(identity.to_string()))
    }

    /// Sub-graph templates rendered once per slab under this root.
    pub const fn children(&self) -> &'static [GraphId] {
        match self {
            GraphId::Items => &[GraphId::SlabItems, GraphId::SlabItemTime],
            GraphId::Memory => &[GraphId::SlabChunks],
            GraphId::Commands => &[GraphId::SlabHits],
            GraphId::Evictions => &[GraphId::SlabEvictions, GraphId::SlabEvictionTime],
            _ => &[],
        }
    }

    /// The table whose slab ids drive the per-slab fan-out.
    ///
    /// `None` for flat roots and for the sub-graph templates themselves.
    pub const fn fan_out(&self) -> Option<TableKind> {
        match self {
            GraphId::Memory | GraphId::Commands => Some(TableKind::Slabs),
            GraphId::Items | GraphId::Evictions => Some(TableKind::Items),
            _ => None,
        }
    }

    /// The graph's definition.
    pub fn def(&self) -> &'static GraphDef {
        match self {
            GraphId::Items => &ITEMS,
            GraphId::Memory => &MEMORY,
            GraphId::Bytes => &BYTES,
            GraphId::Conns => &CONNS,
            GraphId::Commands => &COMMANDS,
            GraphId::Evictions => &EVICTIONS,
            GraphId::SlabChunks => &SLAB_CHUNKS,
            GraphId::SlabHits => &SLAB_HITS,
            GraphId::SlabEvictions => &SLAB_EVICTIONS,
            GraphId::SlabEvictionTime => &SLAB_EVICTION_TIME,
            GraphId::SlabItems => &SLAB_ITEMS,
            GraphId::SlabItemTime => &SLAB_ITEM_TIME,
        }
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GraphId {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| RenderError::UnknownIdentity(s.to_string()))
    }
}

/// Which stat table a graph reads its series from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    General,
    Slabs,
    Items,
}

/// Series data type as understood by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    /// Instantaneous value.
    Gauge,
    /// Cumulative counter; the collector derives a rate.
    Derive,
}

impl SeriesKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SeriesKind::Gauge => "GAUGE",
            SeriesKind::Derive => "DERIVE",
        }
    }
}

/// Where a series value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSource {
    /// A stat read verbatim from the graph's table.
    Stat(&'static str),
    /// A stat holding seconds, rescaled to the configured time unit.
    Elapsed(&'static str),
    /// `total / uptime` from the global table, as a zero-padded integer.
    PerSecond {
        total: &'static str,
        uptime: &'static str,
    },
    /// An item stat summed across every slab.
    SlabSum(&'static str),
}

/// One data series of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Series {
    pub name: &'static str,
    pub source: ValueSource,
    pub label: &'static str,
    pub info: Option<&'static str>,
    pub draw: Option<&'static str>,
    pub kind: SeriesKind,
    pub min: Option<&'static str>,
    /// Rendered but not drawn; used as the negative half of a pair.
    pub hidden: bool,
    pub cdef: Option<&'static str>,
    pub negative: Option<&'static str>,
    /// Servers in this range do not report the series at all.
    pub unavailable: Option<VersionRange>,
}

impl Series {
    /// A gauge reading `name` from the graph's table, with a floor of 0.
    pub const fn gauge(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            source: ValueSource::Stat(name),
            label,
            info: None,
            draw: None,
            kind: SeriesKind::Gauge,
            min: Some("0"),
            hidden: false,
            cdef: None,
            negative: None,
            unavailable: None,
        }
    }

    /// A cumulative counter reading `name` from the graph's table.
    pub const fn derive(name: &'static str, label: &'static str) -> Self {
        Self {
            kind: SeriesKind::Derive,
            ..Self::gauge(name, label)
        }
    }

    pub const fn source(self, source: ValueSource) -> Self {
        Self { source, ..self }
    }

    pub const fn info(self, info: &'static str) -> Self {
        Self {
            info: Some(info),
            ..self
        }
    }

    pub const fn draw(self, draw: &'static str) -> Self {
        Self {
            draw: Some(draw),
            ..self
        }
    }

    pub const fn hidden(self) -> Self {
        Self {
            hidden: true,
            ..self
        }
    }

    pub const fn cdef(self, cdef: &'static str) -> Self {
        Self {
            cdef: Some(cdef),
            ..self
        }
    }

    pub const fn negative(self, negative: &'static str) -> Self {
        Self {
            negative: Some(negative),
            ..self
        }
    }

    pub const fn unavailable_in(self, range: VersionRange) -> Self {
        Self {
            unavailable: Some(range),
            ..self
        }
    }

    /// Whether the series exists on a server of the given version.
    ///
    /// An unknown version never hides a series.
    pub fn available_on(&self, version: Option<ServerVersion>) -> bool {
        match (self.unavailable, version) {
            (Some(range), Some(version)) => !range.contains(version),
            _ => true,
        }
    }
}

/// A graph definition: config directives plus ordered series.
///
/// Config values are templates. `{slab}` expands to the slab id,
/// `{chunk_size}` to the slab's chunk size and `{unit}` to the time-scale
/// label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphDef {
    pub id: GraphId,
    pub table: TableKind,
    pub config: &'static [(&'static str, &'static str)],
    pub series: &'static [Series],
}

static ITEMS: GraphDef = GraphDef {
    id: GraphId::Items,
    table: TableKind::General,
    config: &[
        ("graph_title", "Items"),
        ("graph_args", "--base 1000 --lower-limit 0"),
        ("graph_vlabel", "Items in Memcached"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows the number of items in use by memcached",
        ),
    ],
    series: &[
        Series::gauge("curr_items", "Current Items"),
        Series::derive("total_items", "New Items"),
    ],
};

static MEMORY: GraphDef = GraphDef {
    id: GraphId::Memory,
    table: TableKind::General,
    config: &[
        ("graph_title", "Memory Usage"),
        ("graph_args", "--base 1024 --lower-limit 0"),
        ("graph_vlabel", "Bytes Used"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows the memory consumption of memcached",
        ),
    ],
    series: &[
        Series::gauge("limit_maxbytes", "Maximum Bytes Allocated").draw("AREA"),
        Series::gauge("bytes", "Current Bytes Used").draw("AREA"),
    ],
};

static BYTES: GraphDef = GraphDef {
    id: GraphId::Bytes,
    table: TableKind::General,
    config: &[
        ("graph_title", "Network Traffic"),
        ("graph_args", "--base 1000"),
        ("graph_vlabel", "bits in (-) / out (+)"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows the network traffic in (-) / out (+) of the machine",
        ),
        ("graph_order", "bytes_read bytes_written"),
    ],
    series: &[
        Series::derive("bytes_read", "Network Traffic coming in (-)")
            .hidden()
            .cdef("bytes_read,8,*"),
        Series::derive("bytes_written", "Traffic in (-) / out (+)")
            .negative("bytes_read")
            .cdef("bytes_written,8,*"),
    ],
};

static CONNS: GraphDef = GraphDef {
    id: GraphId::Conns,
    table: TableKind::General,
    config: &[
        ("graph_title", "Connections"),
        ("graph_args", "--base 1000 --lower-limit 0"),
        ("graph_vlabel", "Connections per ${graph_period}"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows the number of connections being handled by memcached",
        ),
        ("graph_order", "max_conns curr_conns avg_conns"),
    ],
    series: &[
        Series::gauge("curr_conns", "Current Connections")
            .source(ValueSource::Stat("curr_connections")),
        Series::gauge("max_conns", "Max Connections").source(ValueSource::Stat("maxconns")),
        Series::gauge("avg_conns", "Avg Connections").source(ValueSource::PerSecond {
            total: "total_connections",
            uptime: "uptime",
        }),
    ],
};

static COMMANDS: GraphDef = GraphDef {
    id: GraphId::Commands,
    table: TableKind::General,
    config: &[
        ("graph_title", "Commands"),
        ("graph_args", "--base 1000 --lower-limit 0"),
        ("graph_vlabel", "Commands per ${graph_period}"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows the number of commands being handled by memcached",
        ),
    ],
    series: &[
        Series::derive("cmd_get", "Gets").info("Cumulative number of retrieval reqs"),
        Series::derive("cmd_set", "Sets").info("Cumulative number of storage reqs"),
        Series::derive("get_hits", "Get Hits")
            .info("Number of keys that were requested and found"),
        Series::derive("get_misses", "Get Misses")
            .info("Number of keys there were requested and not found"),
        Series::derive("delete_hits", "Delete Hits")
            .info("Number of delete requests that resulted in a deletion of a key"),
        Series::derive("delete_misses", "Delete Misses")
            .info("Number of delete requests for missing key"),
        Series::derive("incr_hits", "Increment Hits")
            .info("Number of successful increment requests"),
        Series::derive("incr_misses", "Increment Misses")
            .info("Number of unsuccessful increment requests"),
        Series::derive("decr_hits", "Decrement Hits")
            .info("Number of successful decrement requests"),
        Series::derive("decr_misses", "Decrement Misses")
            .info("Number of unsuccessful decrement requests"),
    ],
};

static EVICTIONS: GraphDef = GraphDef {
    id: GraphId::Evictions,
    table: TableKind::General,
    config: &[
        ("graph_title", "Evictions"),
        ("graph_args", "--base 1000 --lower-limit 0"),
        ("graph_vlabel", "Evictions per ${graph_period}"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows the number of evictions per second",
        ),
    ],
    series: &[
        Series::derive("evictions", "Evictions").info("Cumulative Evictions Across All Slabs"),
        Series::derive("evicted_nonzero", "Evictions prior to TTL expiration")
            .info("Cumulative Evictions forced to expire prior to expiration")
            .source(ValueSource::SlabSum("evicted_nonzero")),
        Series::derive("reclaimed", "Reclaimed Items")
            .info("Cumulative Reclaimed Item Entries Across All Slabs")
            .unavailable_in(RECLAIMED_UNAVAILABLE),
    ],
};

static SLAB_CHUNKS: GraphDef = GraphDef {
    id: GraphId::SlabChunks,
    table: TableKind::Slabs,
    config: &[
        (
            "graph_title",
            "Chunk Usage for Slab: {slab} ({chunk_size} Bytes)",
        ),
        ("graph_args", "--base 1000 --lower-limit 0"),
        ("graph_vlabel", "Available Chunks for this Slab"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows you the chunk usage for this memory slab.",
        ),
    ],
    series: &[
        Series::gauge("total_chunks", "Total Chunks Available"),
        Series::gauge("used_chunks", "Total Chunks in Use"),
        Series::gauge("free_chunks", "Total Chunks Not in Use (Free)"),
    ],
};

static SLAB_HITS: GraphDef = GraphDef {
    id: GraphId::SlabHits,
    table: TableKind::Slabs,
    config: &[
        ("graph_title", "Hits for Slab: {slab}"),
        ("graph_args", "--base 1000 --lower-limit 0"),
        ("graph_vlabel", "Hits per Slab per ${graph_period}"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows you the successful hit rate for this memory slab.",
        ),
    ],
    series: &[
        Series::derive("get_hits", "Get Requests"),
        Series::derive("cmd_set", "Set Requests"),
        Series::derive("delete_hits", "Delete Requests"),
        Series::derive("incr_hits", "Increment Requests"),
        Series::derive("decr_hits", "Decrement Requests"),
    ],
};

static SLAB_EVICTIONS: GraphDef = GraphDef {
    id: GraphId::SlabEvictions,
    table: TableKind::Items,
    config: &[
        ("graph_title", "Evictions for Slab: {slab}"),
        ("graph_args", "--base 1000 --lower-limit 0"),
        ("graph_vlabel", "Evictions per Slab per ${graph_period}"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows you the eviction rate for this memory slab.",
        ),
    ],
    series: &[
        Series::derive("evicted", "Total Evictions").info("Items evicted from memory slab"),
        Series::derive("evicted_nonzero", "Evictions from LRU Prior to Expire")
            .info("Items evicted from memory slab before ttl expiration"),
        Series::derive("reclaimed", "Reclaimed Expired Items")
            .info("Number of times an entry was stored using memory from an expired entry")
            .unavailable_in(RECLAIMED_UNAVAILABLE),
    ],
};

static SLAB_EVICTION_TIME: GraphDef = GraphDef {
    id: GraphId::SlabEvictionTime,
    table: TableKind::Items,
    config: &[
        ("graph_title", "Eviction Request Time for Slab: {slab}"),
        ("graph_args", "--base 1000 --lower-limit 0"),
        ("graph_vlabel", "{unit} since Request for LEI"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows you the time since we requested the last evicted item",
        ),
    ],
    series: &[
        Series::gauge("evicted_time", "Eviction Time (LEI)")
            .info("Time Since Request for Last Evicted Item")
            .source(ValueSource::Elapsed("evicted_time")),
    ],
};

static SLAB_ITEMS: GraphDef = GraphDef {
    id: GraphId::SlabItems,
    table: TableKind::Items,
    config: &[
        ("graph_title", "Items in Slab: {slab}"),
        ("graph_args", "--base 1000 --lower-limit 0"),
        ("graph_vlabel", "Items per Slab"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows you the number of items and reclaimed items per slab.",
        ),
    ],
    series: &[
        Series::gauge("number", "Items")
            .draw("AREA")
            .info("This is the amount of items stored in this slab"),
    ],
};

static SLAB_ITEM_TIME: GraphDef = GraphDef {
    id: GraphId::SlabItemTime,
    table: TableKind::Items,
    config: &[
        ("graph_title", "Age of Eldest Item in Slab: {slab}"),
        ("graph_args", "--base 1000 --lower-limit 0"),
        ("graph_vlabel", "{unit} since item was stored"),
        ("graph_category", "memcached"),
        (
            "graph_info",
            "This graph shows you the time of the eldest item in this slab",
        ),
    ],
    series: &[
        Series::gauge("age", "Eldest Item's Age").source(ValueSource::Elapsed("age")),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for id in GraphId::ALL {
            assert_eq!(id.name().parse::<GraphId>().unwrap(), id);
            assert_eq!(id.def().id, id);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "uptime".parse::<GraphId>().unwrap_err();
        assert!(matches!(err, RenderError::UnknownIdentity(ref name) if name == "uptime"));
    }

    #[test]
    fn test_roots() {
        let names: Vec<_> = GraphId::ROOTS.iter().map(|id| id.name()).collect();
        assert_eq!(
            names,
            vec!["items", "memory", "bytes", "conns", "commands", "evictions"]
        );
        assert!(GraphId::Items.is_root());
        assert!(!GraphId::SlabItems.is_root());
    }

    #[test]
    fn test_root_lookup() {
        assert_eq!(GraphId::root("evictions").unwrap(), GraphId::Evictions);
        assert!(GraphId::root("slabevics").is_err());
        assert!(GraphId::root("").is_err());
    }

    #[test]
    fn test_children_read_from_fan_out_table() {
        for root in GraphId::ROOTS {
            match root.fan_out() {
                Some(table) => {
                    assert!(!root.children().is_empty(), "{} has no children", root);
                    for child in root.children() {
                        assert_eq!(child.def().table, table, "{} under {}", child, root);
                        assert!(child.fan_out().is_none());
                    }
                }
                None => assert!(root.children().is_empty()),
            }
            assert_eq!(root.def().table, TableKind::General);
        }
    }

    #[test]
    fn test_series_names_unique_per_graph() {
        for id in GraphId::ALL {
            let series = id.def().series;
            for (i, a) in series.iter().enumerate() {
                for b in &series[i + 1..] {
                    assert_ne!(a.name, b.name, "duplicate series in {}", id);
                }
            }
        }
    }

    #[test]
    fn test_reclaimed_gate() {
        let reclaimed = EVICTIONS
            .series
            .iter()
            .find(|s| s.name == "reclaimed")
            .unwrap();

        assert!(!reclaimed.available_on(Some(ServerVersion::new(1, 4, 1))));
        assert!(reclaimed.available_on(Some(ServerVersion::new(1, 4, 3))));
        assert!(reclaimed.available_on(None));
    }

    #[test]
    fn test_series_defaults() {
        let s = Series::derive("cmd_get", "Gets");
        assert_eq!(s.source, ValueSource::Stat("cmd_get"));
        assert_eq!(s.kind, SeriesKind::Derive);
        assert_eq!(s.min, Some("0"));
        assert!(!s.hidden);
    }
}
