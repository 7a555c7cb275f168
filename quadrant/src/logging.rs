// Logging for Quadrant
//
// Diagnostics go through `tracing` and are always written to stderr. Stdout
// belongs to the operator-facing output sink, so log lines and results never
// interleave on the same stream.
//
// ```rust
// use quadrant::logging::{self, LogConfig};
// use quadrant::{log_system, log_worker, worker_span};
//
// logging::init(LogConfig::default().with_directive("quadrant::thread::mailbox=trace"));
//
// log_system!("pool_startup", "completed", workers = 10);
// let span = worker_span!(3);
// let _guard = span.enter();
// log_worker!(3, "started");
// ```

use std::io;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// How diagnostics are filtered and rendered.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default maximum verbosity.
    pub level: Level,
    /// One JSON object per event instead of human-readable lines.
    pub json_format: bool,
    /// Include source file and line.
    pub show_source: bool,
    /// Include thread name and id. Worker threads are named after the pool
    /// prefix, so this is how a line is tied to a worker outside its span.
    pub show_thread_info: bool,
    pub show_time: bool,
    /// Extra `target=level` directives layered on top of `level`.
    pub directives: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_source: false,
            show_thread_info: true,
            show_time: true,
            directives: Vec::new(),
        }
    }
}

impl LogConfig {
    /// Debug everywhere, trace for the pool internals, with source locations.
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            show_source: true,
            ..Self::default()
        }
        .with_directive("quadrant::thread=trace")
    }

    /// Warnings only, no timestamps or thread details.
    pub fn quiet() -> Self {
        Self {
            level: Level::WARN,
            show_thread_info: false,
            show_time: false,
            ..Self::default()
        }
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// `RUST_LOG` first, then `level`, then each parseable extra directive.
    fn filter(&self) -> EnvFilter {
        self.directives
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(
                EnvFilter::from_default_env().add_directive(self.level.into()),
                EnvFilter::add_directive,
            )
    }

    fn output_layer(&self) -> BoxedLayer {
        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_file(self.show_source)
            .with_line_number(self.show_source)
            .with_thread_names(self.show_thread_info)
            .with_thread_ids(self.show_thread_info);

        match (self.json_format, self.show_time) {
            (true, _) => layer.json().flatten_event(true).boxed(),
            (false, true) => layer.with_ansi(atty::is(atty::Stream::Stderr)).boxed(),
            (false, false) => layer
                .with_ansi(atty::is(atty::Stream::Stderr))
                .without_time()
                .boxed(),
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global subscriber. Only the first call in a process has any
/// effect, so tests may call this freely.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let result = tracing_subscriber::registry()
            .with(config.output_layer())
            .with(config.filter())
            .try_init();
        if let Err(err) = result {
            eprintln!("quadrant: could not install log subscriber: {err}");
        }
    });
}

/// For tests: see warnings from worker threads without drowning the output.
pub fn init_test() {
    init(LogConfig::quiet());
}

/// Span wrapping the whole life of a worker thread.
///
/// ```rust
/// let span = quadrant::worker_span!(2);
/// let _guard = span.enter();
/// let span = quadrant::worker_span!(2, engine = "tanh-sinh");
/// ```
#[macro_export]
macro_rules! worker_span {
    ($worker:expr $(, $($fields:tt)*)?) => {
        tracing::info_span!("worker", worker = $worker $(, $($fields)*)?)
    };
}

/// Worker lifecycle transitions.
///
/// ```rust
/// quadrant::log_worker!(4, "stopped", reason = "shutdown");
/// ```
#[macro_export]
macro_rules! log_worker {
    ($worker:expr, $event:expr $(, $($fields:tt)*)?) => {
        tracing::info!(worker = $worker, $($($fields)*,)? "worker {}", $event)
    };
}

/// Per-request progress, at debug level.
///
/// ```rust
/// let id = quadrant_api::RequestId::new();
/// quadrant::log_request!(id, "completed", worker = 1, evaluations = 129);
/// ```
#[macro_export]
macro_rules! log_request {
    ($request:expr, $status:expr $(, $($fields:tt)*)?) => {
        tracing::debug!(request = %$request, status = $status $(, $($fields)*)?)
    };
}

/// Pool and session state changes.
///
/// ```rust
/// quadrant::log_system!("pool_shutdown", "completed", joined = 10);
/// ```
#[macro_export]
macro_rules! log_system {
    ($operation:expr, $status:expr $(, $($fields:tt)*)?) => {
        tracing::info!(operation = $operation, status = $status $(, $($fields)*)?)
    };
}

/// Any error value that implements `Display`.
///
/// ```rust
/// let error = std::io::Error::other("stdin closed");
/// quadrant::log_error!(error, component = "session");
/// ```
#[macro_export]
macro_rules! log_error {
    ($error:expr $(, $($fields:tt)*)?) => {
        tracing::error!(error = %$error $(, $($fields)*)?)
    };
}
