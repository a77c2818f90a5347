//! CONFIG and VALUES rendering.
//!
//! The renderer joins a [`GraphDef`] against the stat tables. Output comes
//! back as [`GraphBlock`]s, one per emitted graph, so callers can tell where
//! one graph ends and the next begins.

use slabwatch_types::{normalize, ScaleMode, ServerVersion, StatTables, TimeScale};

use super::registry::{GraphDef, GraphId, Series, TableKind, ValueSource};
use super::{Mode, RenderError};

/// The output for one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphBlock {
    /// Name announced with a `multigraph` directive, if any.
    pub multigraph: Option<String>,
    /// Directive and series lines, in output order.
    pub lines: Vec<String>,
}

impl GraphBlock {
    /// All output lines, including the `multigraph` header.
    pub fn output(&self) -> impl Iterator<Item = String> + '_ {
        self.multigraph
            .iter()
            .map(|name| format!("multigraph {}", name))
            .chain(self.lines.iter().cloned())
    }
}

/// Renders graphs from a set of stat tables.
///
/// # Example
///
/// ```
/// use slabwatch::graph::{Mode, Renderer};
/// use slabwatch_types::StatTables;
///
/// let tables = StatTables::builder()
///     .stat("curr_items", "3")
///     .stat("total_items", "9")
///     .item(1, |i| i.stat("number", "3").stat("age", "7200"))
///     .build();
///
/// let lines = Renderer::new(&tables).render_lines("items", Mode::Values).unwrap();
/// assert_eq!(lines[0], "multigraph items.slabitems_1");
/// assert!(lines.contains(&"age.value 2.00".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct Renderer<'a> {
    tables: &'a StatTables,
    version: Option<ServerVersion>,
    timescale: TimeScale,
    prefix: String,
}

impl<'a> Renderer<'a> {
    /// Create a renderer over the given tables.
    pub fn new(tables: &'a StatTables) -> Self {
        Self {
            tables,
            version: tables.version(),
            timescale: TimeScale::default(),
            prefix: String::new(),
        }
    }

    /// Set the display unit for elapsed-time series (default: hours).
    pub fn timescale(mut self, timescale: TimeScale) -> Self {
        self.timescale = timescale;
        self
    }

    /// Set the prefix prepended to every multigraph name (default: none).
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Render a root graph by name.
    ///
    /// Fails before producing any output if `identity` is not a root graph.
    pub fn render(&self, identity: &str, mode: Mode) -> Result<Vec<GraphBlock>, RenderError> {
        let id = GraphId::root(identity)?;
        Ok(self.render_graph(id, mode))
    }

    /// Render a root graph by name, flattened to output lines.
    pub fn render_lines(&self, identity: &str, mode: Mode) -> Result<Vec<String>, RenderError> {
        let blocks = self.render(identity, mode)?;
        Ok(blocks.iter().flat_map(GraphBlock::output).collect())
    }

    /// Render a root graph.
    ///
    /// Multi-root graphs emit one block per slab and child template, in
    /// ascending slab order, followed by the root summary.
    pub fn render_graph(&self, id: GraphId, mode: Mode) -> Vec<GraphBlock> {
        let Some(table) = id.fan_out() else {
            return vec![self.block(id.def(), None, mode, None)];
        };

        let mut blocks = Vec::new();
        for slab in self.slab_ids(table) {
            for child in id.children() {
                let name = format!("{}{}.{}_{}", self.prefix, id, child, slab);
                blocks.push(self.block(child.def(), Some(slab), mode, Some(name)));
            }
        }

        let name = format!("{}{}", self.prefix, id);
        blocks.push(self.block(id.def(), None, mode, Some(name)));
        blocks
    }

    fn slab_ids(&self, table: TableKind) -> Vec<u32> {
        match table {
            TableKind::Slabs => self.tables.slabs.ids().collect(),
            TableKind::Items => self.tables.items.ids().collect(),
            TableKind::General => Vec::new(),
        }
    }

    fn block(
        &self,
        def: &GraphDef,
        slab: Option<u32>,
        mode: Mode,
        multigraph: Option<String>,
    ) -> GraphBlock {
        let lines = match mode {
            Mode::Config => self.config_lines(def, slab),
            Mode::Values => self.value_lines(def, slab),
        };
        GraphBlock { multigraph, lines }
    }

    fn visible<'d>(&self, def: &'d GraphDef) -> impl Iterator<Item = &'d Series> + 'd {
        let version = self.version;
        def.series.iter().filter(move |s| s.available_on(version))
    }

    fn config_lines(&self, def: &GraphDef, slab: Option<u32>) -> Vec<String> {
        let mut lines: Vec<String> = def
            .config
            .iter()
            .map(|(key, template)| format!("{} {}", key, self.interpolate(template, slab)))
            .collect();

        for series in self.visible(def) {
            let name = series.name;
            lines.push(format!("{}.label {}", name, series.label));
            if let Some(info) = series.info {
                lines.push(format!("{}.info {}", name, info));
            }
            if let Some(draw) = series.draw {
                lines.push(format!("{}.draw {}", name, draw));
            }
            lines.push(format!("{}.type {}", name, series.kind.as_str()));
            if let Some(min) = series.min {
                lines.push(format!("{}.min {}", name, min));
            }
            if series.hidden {
                lines.push(format!("{}.graph no", name));
            }
            if let Some(cdef) = series.cdef {
                lines.push(format!("{}.cdef {}", name, cdef));
            }
            if let Some(negative) = series.negative {
                lines.push(format!("{}.negative {}", name, negative));
            }
        }

        lines
    }

    fn value_lines(&self, def: &GraphDef, slab: Option<u32>) -> Vec<String> {
        self.visible(def)
            .map(|series| format!("{}.value {}", series.name, self.value(def, series, slab)))
            .collect()
    }

    fn interpolate(&self, template: &str, slab: Option<u32>) -> String {
        let mut out = template.replace("{unit}", self.timescale.label());
        if let Some(slab) = slab {
            let chunk_size = self.tables.slabs.stat(slab, "chunk_size").unwrap_or("0");
            out = out
                .replace("{slab}", &slab.to_string())
                .replace("{chunk_size}", chunk_size);
        }
        out
    }

    fn lookup(&self, table: TableKind, slab: Option<u32>, key: &str) -> Option<&'a str> {
        let tables = self.tables;
        match (table, slab) {
            (TableKind::General, _) => tables.general.get(key),
            (TableKind::Slabs, Some(slab)) => tables.slabs.stat(slab, key),
            (TableKind::Items, Some(slab)) => tables.items.stat(slab, key),
            (_, None) => None,
        }
    }

    fn value(&self, def: &GraphDef, series: &Series, slab: Option<u32>) -> String {
        match series.source {
            ValueSource::Stat(key) => self.lookup(def.table, slab, key).unwrap_or("0").to_string(),
            ValueSource::Elapsed(key) => {
                let secs = self.lookup(def.table, slab, key).unwrap_or("0");
                normalize(ScaleMode::Data, secs, self.timescale)
            }
            ValueSource::PerSecond { total, uptime } => {
                let general = &self.tables.general;
                let total = general.get_f64(total).unwrap_or(0.0);
                let rate = match general.get_f64(uptime) {
                    Some(uptime) if uptime > 0.0 => (total / uptime).trunc() as i64,
                    _ => 0,
                };
                format!("{:02}", rate)
            }
            ValueSource::SlabSum(key) => self.tables.items.sum(key).to_string(),
        }
    }
}
