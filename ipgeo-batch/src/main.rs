//! ipgeo-batch - Bulk IP geolocation lookup
//!
//! Reads addresses from a file (or takes one on the command line), resolves
//! them concurrently against the lookup service and writes a CSV table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ipgeo_batch::config::{log_directives, CliOverrides, LookupSettings};
use ipgeo_batch::console::{self, ConsoleOptions};
use ipgeo_batch::event_bridge::{bus_capacity, EventBridge};
use ipgeo_batch::services::{
    manual_address, read_addresses, CsvFileSink, ResultSink, StdoutSink,
};
use ipgeo_batch::shutdown;
use ipgeo_batch::{Field, ResultSet};
use ipgeo_common::config::{config_file_path, load_toml_config, write_toml_config, CONFIG_PATH_ENV};
use ipgeo_common::events::EventBus;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for ipgeo-batch
#[derive(Parser, Debug)]
#[command(name = "ipgeo-batch")]
#[command(about = "Resolve IP addresses to geolocation and ISP metadata")]
#[command(version)]
struct Args {
    /// Newline-delimited address file ("-" for stdin)
    #[arg(short, long, conflicts_with = "ip")]
    file: Option<PathBuf>,

    /// Look up a single address
    #[arg(long)]
    ip: Option<String>,

    /// Comma-separated fields, in column order (default: all)
    #[arg(short = 'F', long, value_delimiter = ',')]
    fields: Option<Vec<String>>,

    /// CSV destination
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum lookups in flight
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Requests per minute cap (0 = unlimited)
    #[arg(long)]
    rate_limit: Option<u32>,

    /// Lookup service base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Config file
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Sort rows by address instead of arrival order
    #[arg(long)]
    sort: bool,

    /// No progress bar or per-address lines
    #[arg(short, long)]
    quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the field catalog and exit
    #[arg(long)]
    list_fields: bool,

    /// Write the resolved settings to the config file and exit
    #[arg(long)]
    init_config: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            endpoint: self.endpoint.clone(),
            pool_size: self.workers,
            timeout_secs: self.timeout,
            requests_per_minute: self.rate_limit,
            fields: self.fields.clone(),
            output: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_fields {
        for field in Field::CATALOG {
            println!("{}", field);
        }
        return Ok(());
    }

    // Logging starts before the config file is read; the file's level
    // replaces the startup level unless RUST_LOG or --verbose set one
    let env_filter = EnvFilter::try_from_default_env().ok();
    let level_fixed = env_filter.is_some() || args.verbose;
    let startup_level = if args.verbose { "debug" } else { "info" };
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new(log_directives(startup_level))),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = config_file_path(args.config.as_deref());
    let toml_config =
        load_toml_config(config_path.as_deref()).context("Failed to load config file")?;

    if !level_fixed {
        let level = toml_config.logging.level.as_str();
        if let Err(e) = filter_handle.reload(EnvFilter::new(log_directives(level))) {
            warn!("Failed to apply log level {:?}: {}", level, e);
        }
    }

    let settings = LookupSettings::resolve(&args.overrides(), &toml_config)
        .context("Invalid settings")?;

    if args.init_config {
        let path = config_path.context("No config directory available; pass --config")?;
        write_toml_config(&settings.to_toml_config(), &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let engine = settings.build_engine().context("Failed to build lookup client")?;

    let mut results = if let Some(ip) = &args.ip {
        let address = manual_address(ip)?;
        let result = engine.resolve_one(address, &settings.fields).await;
        if !args.quiet {
            eprintln!("{}", result);
        }
        ResultSet::single(result)
    } else {
        let path = args
            .file
            .as_deref()
            .context("Either --file or --ip is required")?;
        let addresses = read_addresses(path)?;
        if addresses.is_empty() {
            return Err(ipgeo_batch::Error::EmptyInput.into());
        }

        run_batch(&engine, addresses, &settings, &args).await
    };

    if args.sort {
        results.sort_by_address();
    }

    let sink = CsvFileSink::new(&settings.output);
    if let Err(e) = sink.export(&results, &settings.fields) {
        error!("{}", e);
        warn!("Writing results to stdout instead");
        StdoutSink
            .export(&results, &settings.fields)
            .context("Fallback export to stdout failed")?;
        return Err(e.into());
    }

    eprintln!(
        "Resolved {} address(es), {} failed -> {}",
        results.len(),
        results.failed_count(),
        sink.path().display()
    );
    if !results.is_complete() {
        warn!("Batch was cancelled; results are partial");
    }

    Ok(())
}

/// Run a batch with console output and Ctrl+C cancellation
async fn run_batch(
    engine: &ipgeo_batch::ResolutionEngine,
    addresses: Vec<ipgeo_batch::AddressRecord>,
    settings: &LookupSettings,
    args: &Args,
) -> ResultSet {
    let event_bus = EventBus::new(bus_capacity(addresses.len()));
    let console = tokio::spawn(console::run_console(
        event_bus.subscribe(),
        ConsoleOptions {
            progress_bar: !args.quiet,
            print_items: !args.quiet,
        },
    ));

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(exit_on_second_interrupt(cancel.clone()));

    let mut bridge = EventBridge::new(event_bus);
    let results = engine
        .resolve_with_reporter(addresses, &settings.fields, &mut bridge, &cancel)
        .await;

    interrupt.abort();
    drop(bridge);
    if let Ok(summary) = console.await {
        if summary.lagged > 0 {
            warn!("Console skipped {} events; per-address lines are incomplete", summary.lagged);
        }
    }
    results
}

/// First Ctrl+C cancels the batch; a second exits without waiting for
/// in-flight lookups
async fn exit_on_second_interrupt(cancel: CancellationToken) {
    if shutdown::cancel_then_force(cancel, signal::ctrl_c).await {
        warn!("Second interrupt, exiting without writing results");
        std::process::exit(130);
    }
}
