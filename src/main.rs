//! zonemon - Solaris zones resource monitor.
//!
//! Gathers per-zone memory and CPU usage via `zonestat(1)` and prints a
//! summary, a per-zone report, or pushes host-wide totals to InfluxDB.
//! Intended to run from cron with `-d`; every failure is fatal (exit 1),
//! since a skipped cycle beats corrupted metrics.
//!
//! Usage:
//!   zonemon                 # totals summary
//!   zonemon -z              # per-zone report, name order
//!   zonemon -z mem          # per-zone report, by physical memory used
//!   zonemon -z cpu          # per-zone report, by CPU percentage
//!   zonemon -d              # push totals to the metrics database
//!   zonemon --ping          # metrics database liveness check
//!   zonemon --show-databases
//!   zonemon --json          # totals as JSON

use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use zonemon::collector::{DEFAULT_ZONESTAT_PATH, ZoneCollector, ZonestatCommand};
use zonemon::influx::{InfluxClient, InfluxConfig, encode_totals};
use zonemon::report::{SortKey, totals_report, zones_report};
use zonemon::totals::Totals;

/// Solaris zones resource monitor.
#[derive(Parser)]
#[command(name = "zonemon", about = "Solaris zones resource monitor", version)]
struct Args {
    /// Print a per-zone report, optionally sorted by "mem" or "cpu".
    #[arg(short = 'z', long = "zones", value_name = "SORT", num_args = 0..=1, value_enum)]
    zones: Option<Option<SortKey>>,

    /// Push host-wide totals to the metrics database.
    #[arg(short = 'd', long = "store")]
    store: bool,

    /// Check that the metrics database is alive and exit.
    #[arg(long)]
    ping: bool,

    /// List databases on the metrics server and exit.
    #[arg(long)]
    show_databases: bool,

    /// Print host-wide totals as JSON.
    #[arg(long)]
    json: bool,

    /// Metrics database base URL.
    #[arg(long, default_value = "http://influxdb.local:8086", value_name = "URL")]
    url: String,

    /// Database to write samples into.
    #[arg(long, default_value = "zonestatdb", value_name = "NAME")]
    db: String,

    /// Path to the zonestat executable.
    #[arg(long, default_value = DEFAULT_ZONESTAT_PATH, value_name = "PATH")]
    zonestat_path: String,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber. Default level is WARN so reports
/// stay clean; `-v` raises it, `-q` drops to errors only.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("zonemon={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(err) = run(&args) {
        eprintln!("zonemon: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.ping {
        let client = InfluxClient::new(InfluxConfig::new(&args.url, &args.db))?;
        client.ping()?;
        println!("metrics database at {} is alive", args.url);
        return Ok(());
    }

    if args.show_databases {
        let client = InfluxClient::new(InfluxConfig::new(&args.url, &args.db))?;
        let databases = client.show_databases()?;
        println!("{}", serde_json::to_string_pretty(&databases)?);
        return Ok(());
    }

    let collector = ZoneCollector::new(ZonestatCommand::new(&args.zonestat_path));
    let stat = collector.collect()?;

    if args.store {
        let totals = Totals::from_stat(&stat);
        let host = hostname::get()?.to_string_lossy().into_owned();
        let payload = encode_totals(&totals, &host);
        let client = InfluxClient::new(InfluxConfig::new(&args.url, &args.db))?;
        client.write(&payload)?;
        info!(zones = totals.zone_count, %host, "totals stored");
        return Ok(());
    }

    if args.json {
        let totals = Totals::from_stat(&stat);
        println!("{}", serde_json::to_string_pretty(&totals)?);
        return Ok(());
    }

    if let Some(sort) = args.zones {
        print!("{}", zones_report(&stat, sort));
        return Ok(());
    }

    print!("{}", totals_report(&Totals::from_stat(&stat), chrono::Utc::now()));
    Ok(())
}
