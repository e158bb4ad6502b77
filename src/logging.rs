//! Subscriber setup for the binary.
//!
//! Everything goes through `tracing`. Warnings print to stderr, filtered by
//! `RUST_LOG`. `--perf` adds a stderr line for every closed crate span, with
//! its busy and idle time. `--debug-log` copies crate events and span timings
//! at debug level into a file.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::filter::{EnvFilter, Targets, filter_fn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, fmt};

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Which sinks the subscriber writes to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Report span timings on stderr
    pub perf: bool,
    /// File receiving debug events and span timings
    pub debug_log: Option<PathBuf>,
}

fn is_crate_span(meta: &Metadata<'_>) -> bool {
    meta.is_span() && meta.target().starts_with(CRATE_TARGET)
}

/// Build the subscriber described by `options` without installing it.
///
/// # Errors
/// Returns an error if the debug log file cannot be created or written.
pub fn subscriber(options: &LogOptions) -> io::Result<impl Subscriber + Send + Sync + use<>> {
    let diagnostics = fmt::layer().with_writer(io::stderr).with_filter(
        EnvFilter::from_default_env().add_directive(Level::WARN.into()),
    );

    let timings = options.perf.then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter_fn(is_crate_span))
    });

    let debug_log = match &options.debug_log {
        Some(path) => {
            let mut file = File::create(path)?;
            writeln!(file, "{CRATE_TARGET} debug log start")?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_span_events(FmtSpan::CLOSE)
                    .with_filter(Targets::new().with_target(CRATE_TARGET, Level::DEBUG)),
            )
        }
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(diagnostics)
        .with(timings)
        .with(debug_log))
}
