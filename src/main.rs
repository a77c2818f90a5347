use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use slabwatch::config::{Overrides, Settings};
use slabwatch::plugin::{self, Invocation, PluginCommand};
use slabwatch::source::{FileSource, StatsSource};
use slabwatch_adapters::memcached::MemcachedAdapter;

#[derive(Parser, Debug)]
#[command(name = "slabwatch")]
#[command(about = "munin multigraph plugin for memcached slab and item statistics")]
#[command(version)]
struct Args {
    /// Plugin command; munin runs the plugin without one to fetch values
    #[arg(value_enum, default_value_t = PluginCommand::Fetch)]
    command: PluginCommand,

    /// Root graph to render (defaults to the suffix of the executable name)
    #[arg(short, long)]
    graph: Option<String>,

    /// memcached host
    #[arg(long)]
    host: Option<String>,

    /// memcached port
    #[arg(long)]
    port: Option<u16>,

    /// Time unit for age graphs: 1 seconds, 2 minutes, 3 hours, 4 days
    #[arg(long)]
    timescale: Option<i64>,

    /// Prefix for multigraph names (empty unless set)
    #[arg(long)]
    prefix: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render from a JSON file written by `dump` instead of a live server
    #[arg(long)]
    from_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let overrides = Overrides {
        host: args.host.clone(),
        port: args.port,
        timescale: args.timescale,
        prefix: args.prefix.clone(),
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;

    let exe = std::env::args().next();
    let invocation = Invocation::new(args.command, args.graph, exe.as_deref(), &settings);

    let lines = match args.from_file {
        Some(path) => run(&FileSource::new(path), &invocation)?,
        None => {
            let adapter = MemcachedAdapter::builder()
                .host(settings.host.clone())
                .port(settings.port)
                .timeout(settings.timeout())
                .build();
            run(&adapter, &invocation)?
        }
    };

    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{}", line)?;
    }
    stdout.flush()?;
    Ok(())
}

/// Run one plugin command on a single-threaded runtime.
fn run<S: StatsSource>(source: &S, invocation: &Invocation) -> Result<Vec<String>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(plugin::run(source, invocation))
}

/// Log to stderr so plugin output on stdout stays clean.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("slabwatch=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
