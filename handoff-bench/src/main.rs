use clap::Parser;
use handoff_bench::report::render_report;
use handoff_common::{BenchConfig, HandoffError, Strategy};
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "handoff-bench", about = "Hand-off latency benchmark harness")]
struct Args {
    /// JSON file holding a BenchConfig; the flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pushes recorded per strategy
    #[arg(long)]
    count: Option<usize>,

    /// Delay between pushes in milliseconds (0 disables it)
    #[arg(long)]
    cadence_ms: Option<f64>,

    /// Fixed histogram bin count instead of sqrt(n)
    #[arg(long)]
    bins: Option<usize>,

    /// Print the summary table only
    #[arg(long)]
    no_histograms: bool,

    /// Log per-strategy progress at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {e}");
    }
}

fn resolve_config(args: &Args) -> Result<BenchConfig, HandoffError> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::from_json_file(path)?,
        None => BenchConfig::default(),
    };
    if let Some(count) = args.count {
        config.count_per_strategy = count;
    }
    if let Some(ms) = args.cadence_ms {
        let cadence = Duration::try_from_secs_f64(ms / 1_000.0).map_err(|e| {
            HandoffError::InvalidArgument(format!("cadence {ms} ms is not a valid delay: {e}"))
        })?;
        config = config.with_cadence(cadence);
    }
    if args.bins.is_some() {
        config.bin_count = args.bins;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet);

    let config = resolve_config(&args).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(3);
    });

    print!(
        "Running {} strategies x {} pushes every {:.3} ms ",
        Strategy::ALL.len(),
        config.count_per_strategy,
        config.cadence().as_secs_f64() * 1_000.0,
    );
    std::io::stdout().flush().ok();

    let dot_handle = tokio::spawn(async {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await; // consume the immediate first tick
        loop {
            interval.tick().await;
            print!(".");
            std::io::stdout().flush().ok();
        }
    });

    let result = handoff_bench::run_all(&Strategy::ALL, &config).await;

    dot_handle.abort();
    println!();

    match result {
        Ok(report) => print!("{}", render_report(&report, !args.no_histograms)),
        Err(e) => {
            eprintln!("Benchmark failed: {e}");
            process::exit(1);
        }
    }
}
