// quadrant: integrate f(x) over operator-supplied intervals on a thread pool.
//
// Reads `<lower> <upper> <tolerance>` lines from stdin and prints each result
// as soon as a worker finishes it. `quit` or end of input drains the pool.

use std::io;
use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use tracing::Level;

use quadrant::engine::{self, TanhSinh};
use quadrant::logging::{self, LogConfig};
use quadrant::thread::{ConsoleSink, IntegrationPool, OutputFormat, PoolConfig};
use quadrant::{Integrand, Session};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Number of worker threads (0 = one per CPU)
    #[arg(long, default_value_t = quadrant::thread::DEFAULT_POOL_SIZE)]
    workers: usize,

    /// Integrand to evaluate
    #[arg(long, default_value = engine::DEFAULT_INTEGRAND)]
    integrand: String,

    /// Output format for results and diagnostics on stdout
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Minimum level of internal logs written to stderr
    #[arg(long, default_value = "warn")]
    log_level: Level,

    /// Write internal logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Verbose internal logs with file, line and thread details
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init(if args.debug {
        LogConfig::development()
    } else {
        LogConfig {
            level: args.log_level,
            json_format: args.log_json,
            ..Default::default()
        }
    });

    let integrand = engine::lookup(&args.integrand).ok_or_else(|| {
        anyhow!(
            "unknown integrand '{}', expected one of: {}",
            args.integrand,
            engine::names().join(", ")
        )
    })?;

    let config = match args.workers {
        0 => PoolConfig::with_available_parallelism(),
        n => PoolConfig::default().with_pool_size(n),
    };

    let sink = Arc::new(ConsoleSink::stdout(args.format));
    let pool = IntegrationPool::start(
        config,
        Arc::new(TanhSinh::default()),
        Arc::new(integrand),
        sink.clone(),
    )?;

    let label = format!("{} [{}]", integrand.formula(), integrand.name());
    let summary = Session::new(pool, sink, label).run(io::stdin().lock())?;

    for worker in &summary.shutdown.panicked {
        tracing::warn!(worker = worker.index(), "worker ended with a panic");
    }
    quadrant::log_system!(
        "session",
        "completed",
        submitted = summary.submitted,
        rejected = summary.rejected
    );
    Ok(())
}
