//! Plugin command dispatch.
//!
//! Maps the munin plugin protocol (`autoconf`, `suggest`, `config` and a
//! bare invocation for values) onto a [`StatsSource`] and the graph renderer.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use slabwatch_types::{StatTables, TimeScale};
use tracing::{debug, info};

use crate::config::Settings;
use crate::graph::{GraphId, Mode, Renderer};
use crate::source::StatsSource;

/// A plugin command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PluginCommand {
    /// Report whether the plugin can run on this host.
    Autoconf,
    /// List the graph identities to install.
    Suggest,
    /// Emit graph metadata.
    Config,
    /// Emit current values.
    #[default]
    Fetch,
    /// Print the collected stat tables as JSON.
    Dump,
}

/// Everything a single plugin run needs besides the source.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub command: PluginCommand,
    /// Root graph to render; required for `config` and `fetch`.
    pub graph: Option<String>,
    /// Prepended to every multigraph name.
    pub prefix: String,
    pub timescale: TimeScale,
}

impl Invocation {
    /// Build an invocation from the command line and resolved settings.
    ///
    /// An explicit `graph` wins; otherwise the identity is taken from the
    /// executable name. The prefix only ever comes from `settings`.
    pub fn new(
        command: PluginCommand,
        graph: Option<String>,
        exe: Option<&str>,
        settings: &Settings,
    ) -> Self {
        Self {
            command,
            graph: graph.or_else(|| exe.and_then(identity_from_exe)),
            prefix: settings.prefix.clone(),
            timescale: settings.time_scale(),
        }
    }
}

/// The graph identity encoded in an executable name: the part after the last
/// `_`, so `memcached_multi_items` selects `items`.
///
/// Returns `None` when the name has no `_` or nothing follows the last one.
pub fn identity_from_exe(exe: &str) -> Option<String> {
    let name = Path::new(exe).file_name()?.to_str()?;
    let (_, identity) = name.rsplit_once('_')?;
    if identity.is_empty() {
        return None;
    }
    Some(identity.to_string())
}

/// Run one plugin command and return the lines to print.
///
/// Nothing is returned on error, so a failed run never leaves partial
/// output on stdout.
pub async fn run<S: StatsSource>(source: &S, invocation: &Invocation) -> Result<Vec<String>> {
    debug!(
        "Running {:?} against {}",
        invocation.command,
        source.description()
    );

    match invocation.command {
        PluginCommand::Autoconf => Ok(vec![match source.ping().await {
            Ok(()) => "yes".to_string(),
            Err(e) => {
                info!("autoconf: {}", e);
                format!("no ({})", e)
            }
        }]),
        PluginCommand::Suggest => match source.ping().await {
            Ok(()) => Ok(GraphId::ROOTS.iter().map(|id| id.to_string()).collect()),
            Err(e) => {
                info!("suggest: {}", e);
                Ok(Vec::new())
            }
        },
        PluginCommand::Config | PluginCommand::Fetch => {
            let identity = invocation.graph.as_deref().ok_or_else(|| {
                anyhow!("No graph selected: pass --graph or link the binary as <name>_<graph>")
            })?;
            // Reject bad identities before touching the network.
            let id = GraphId::root(identity)?;

            let tables = collect(source).await?;
            let mode = match invocation.command {
                PluginCommand::Config => Mode::Config,
                _ => Mode::Values,
            };
            let renderer = Renderer::new(&tables)
                .timescale(invocation.timescale)
                .prefix(invocation.prefix.clone());

            Ok(renderer
                .render_graph(id, mode)
                .iter()
                .flat_map(|block| block.output())
                .collect())
        }
        PluginCommand::Dump => {
            let tables = collect(source).await?;
            let json = serde_json::to_string_pretty(&tables)?;
            Ok(json.lines().map(str::to_string).collect())
        }
    }
}

async fn collect<S: StatsSource>(source: &S) -> Result<StatTables> {
    source
        .collect()
        .await
        .with_context(|| format!("Failed to collect stats from {}", source.description()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use slabwatch_adapters::AdapterError;
    use std::cell::Cell;

    /// A source that is never reachable and counts how often it was asked.
    #[derive(Default)]
    struct Unreachable {
        calls: Cell<usize>,
    }

    impl StatsSource for Unreachable {
        async fn ping(&self) -> Result<(), AdapterError> {
            self.calls.set(self.calls.get() + 1);
            Err(AdapterError::Connection {
                addr: "127.0.0.1:11211".to_string(),
                reason: "Connection refused".to_string(),
            })
        }

        async fn collect(&self) -> Result<StatTables, AdapterError> {
            self.ping().await.map(|_| StatTables::new())
        }

        fn description(&self) -> String {
            "unreachable".to_string()
        }
    }

    fn tables() -> StatTables {
        StatTables::builder()
            .stat("uptime", "100")
            .stat("total_connections", "250")
            .stat("curr_connections", "10")
            .stat("maxconns", "1024")
            .slab(2, |s| s.stat("chunk_size", "120").stat("used_chunks", "4"))
            .item(2, |i| i.stat("number", "3").stat("evicted", "1"))
            .build()
    }

    fn invocation(command: PluginCommand, graph: Option<&str>) -> Invocation {
        Invocation {
            command,
            graph: graph.map(str::to_string),
            ..Default::default()
        }
    }

    fn settings(overrides: Overrides) -> Settings {
        Settings::load_with_env(None, &overrides, Vec::new()).unwrap()
    }

    #[test]
    fn test_identity_from_exe() {
        assert_eq!(
            identity_from_exe("/etc/munin/plugins/memcached_multi_items"),
            Some("items".to_string())
        );
        assert_eq!(identity_from_exe("slab_conns"), Some("conns".to_string()));
        assert_eq!(identity_from_exe("slabwatch"), None);
        assert_eq!(identity_from_exe("memcached_"), None);
    }

    #[test]
    fn test_invocation_graph_precedence() {
        let settings = settings(Overrides::default());
        let exe = Some("memcached_multi_items");

        let inv = Invocation::new(PluginCommand::Fetch, None, exe, &settings);
        assert_eq!(inv.graph.as_deref(), Some("items"));

        let graph = Some("conns".to_string());
        let inv = Invocation::new(PluginCommand::Fetch, graph, exe, &settings);
        assert_eq!(inv.graph.as_deref(), Some("conns"));

        let inv = Invocation::new(PluginCommand::Fetch, None, Some("slabwatch"), &settings);
        assert_eq!(inv.graph, None);
    }

    #[tokio::test]
    async fn test_linked_exe_keeps_bare_graph_names() {
        let settings = settings(Overrides::default());
        let exe = Some("/etc/munin/plugins/memcached_multi_items");
        let inv = Invocation::new(PluginCommand::Config, None, exe, &settings);
        assert_eq!(inv.prefix, "");

        let lines = run(&tables(), &inv).await.unwrap();
        assert_eq!(lines[0], "multigraph items.slabitems_2");
        assert!(lines.contains(&"multigraph items".to_string()));
        assert!(!lines.iter().any(|l| l.contains("memcached_multi_")));
    }

    #[tokio::test]
    async fn test_configured_prefix() {
        let settings = settings(Overrides {
            prefix: Some("memcached_multi_".to_string()),
            ..Default::default()
        });
        let exe = Some("memcached_multi_items");
        let inv = Invocation::new(PluginCommand::Config, None, exe, &settings);

        let lines = run(&tables(), &inv).await.unwrap();
        assert_eq!(lines[0], "multigraph memcached_multi_items.slabitems_2");
        assert!(lines.contains(&"multigraph memcached_multi_items".to_string()));
    }

    #[tokio::test]
    async fn test_autoconf() {
        let yes = run(&tables(), &invocation(PluginCommand::Autoconf, None))
            .await
            .unwrap();
        assert_eq!(yes, vec!["yes"]);

        let source = Unreachable::default();
        let no = run(&source, &invocation(PluginCommand::Autoconf, None))
            .await
            .unwrap();
        assert_eq!(no.len(), 1);
        assert!(no[0].starts_with("no ("));
        assert!(no[0].contains("Connection refused"));
    }

    #[tokio::test]
    async fn test_suggest() {
        let lines = run(&tables(), &invocation(PluginCommand::Suggest, None))
            .await
            .unwrap();
        assert_eq!(
            lines,
            vec!["items", "memory", "bytes", "conns", "commands", "evictions"]
        );

        let source = Unreachable::default();
        let lines = run(&source, &invocation(PluginCommand::Suggest, None))
            .await
            .unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_conns() {
        let lines = run(&tables(), &invocation(PluginCommand::Fetch, Some("conns")))
            .await
            .unwrap();
        assert_eq!(
            lines,
            vec![
                "curr_conns.value 10",
                "max_conns.value 1024",
                "avg_conns.value 02"
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_identity_skips_source() {
        let source = Unreachable::default();
        let inv = invocation(PluginCommand::Fetch, Some("slabchnks"));
        let err = run(&source, &inv).await.unwrap_err();

        assert!(err.to_string().contains("slabchnks"));
        assert_eq!(source.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_missing_graph() {
        let err = run(&tables(), &invocation(PluginCommand::Config, None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No graph selected"));
    }

    #[tokio::test]
    async fn test_fetch_connection_failure() {
        let source = Unreachable::default();
        let err = run(&source, &invocation(PluginCommand::Fetch, Some("bytes")))
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to collect stats from unreachable"));
    }

    #[tokio::test]
    async fn test_dump_round_trips() {
        let lines = run(&tables(), &invocation(PluginCommand::Dump, None))
            .await
            .unwrap();
        let parsed: StatTables = serde_json::from_str(&lines.join("\n")).unwrap();
        assert_eq!(parsed, tables());
    }
}
