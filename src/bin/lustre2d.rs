//! lustre2d - Lustre statistics collector daemon.
//!
//! Periodically scans Lustre `/proc` statistics of the local OSS/MDS and
//! writes one tagged record per target (and per job) to stdout.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use lustre2::collector::lustre::TargetKind;
use lustre2::collector::{FileSystem, Lustre2Collector, RealFs};
use lustre2::config::{Lustre2Config, SAMPLE_CONFIG};
use lustre2::sink::{JsonSink, LineProtocolSink, MetricSink};

/// Output encoding of emitted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JSON object per line.
    Json,
    /// InfluxDB line protocol.
    Line,
}

/// Lustre statistics collector daemon.
#[derive(Parser)]
#[command(name = "lustre2d", about = "Lustre statistics collector daemon", version)]
struct Args {
    /// Collection interval in seconds.
    #[arg(short, long, default_value = "10")]
    interval: u64,

    /// TOML file with `ost_procfiles` / `mds_procfiles` glob lists.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// OST statistics glob (repeatable). Replaces the config file list.
    #[arg(long = "ost-procfile", value_name = "GLOB")]
    ost_procfiles: Vec<String>,

    /// MDT statistics glob (repeatable). Replaces the config file list.
    #[arg(long = "mds-procfile", value_name = "GLOB")]
    mds_procfiles: Vec<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Run a single scan and exit.
    #[arg(long)]
    once: bool,

    /// Print an annotated sample configuration and exit.
    #[arg(long)]
    sample_config: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr so stdout carries only records.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for crate_name in ["lustre2d", "lustre2"] {
        match format!("{}={}", crate_name, level).parse::<Directive>() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {}: {}", crate_name, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Builds the effective configuration: command line globs replace the
/// config file lists of the same kind.
fn resolve_config(args: &Args) -> Result<Lustre2Config, lustre2::config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => Lustre2Config::load(path)?,
        None => Lustre2Config::default(),
    };
    if !args.ost_procfiles.is_empty() {
        config.ost_procfiles = args.ost_procfiles.clone();
    }
    if !args.mds_procfiles.is_empty() {
        config.mds_procfiles = args.mds_procfiles.clone();
    }
    Ok(config)
}

fn make_sink(format: Format) -> Box<dyn MetricSink> {
    let out = io::BufWriter::new(io::stdout());
    match format {
        Format::Json => Box::new(JsonSink::new(out)),
        Format::Line => Box::new(LineProtocolSink::new(out)),
    }
}

/// Runs one scan and reports the outcome. Returns `false` if the scan failed.
fn run_scan<F: FileSystem>(
    collector: &mut Lustre2Collector<F>,
    sink: &mut dyn MetricSink,
    scan_count: u64,
) -> bool {
    match collector.gather(sink) {
        Ok(records) => {
            let files = collector.last_timing().map(|t| t.files).unwrap_or(0);
            let took = collector.last_timing().map(|t| t.total).unwrap_or_default();
            info!(
                "Scan #{}: {} records from {} files ({:?})",
                scan_count, records, files, took
            );
            if files == 0 {
                warn!("No Lustre statistics files matched; is this a Lustre server?");
            }
            true
        }
        Err(e) => {
            error!("Scan #{} failed: {}", scan_count, e);
            false
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.sample_config {
        print!("{}", SAMPLE_CONFIG);
        return match io::stdout().flush() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    }

    init_logging(args.verbose, args.quiet);

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("lustre2d {} starting", env!("CARGO_PKG_VERSION"));
    let mut collector = Lustre2Collector::new(RealFs::new(), &config);
    for kind in [TargetKind::Ost, TargetKind::Mdt] {
        info!("{} globs: {}", kind.as_str(), collector.globs(kind).join(", "));
    }

    let mut sink = make_sink(args.format);

    if args.once {
        return if run_scan(&mut collector, sink.as_mut(), 1) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    info!("Config: interval={}s, format={:?}", args.interval, args.format);
    let interval = Duration::from_secs(args.interval);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting collection loop");

    let mut scan_count: u64 = 0;
    let mut failed_scans: u64 = 0;
    while running.load(Ordering::SeqCst) {
        scan_count += 1;
        if !run_scan(&mut collector, sink.as_mut(), scan_count) {
            failed_scans += 1;
            debug!("{} of {} scans failed so far", failed_scans, scan_count);
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!(
        "Shutdown complete after {} scans ({} failed)",
        scan_count, failed_scans
    );
    ExitCode::SUCCESS
}
