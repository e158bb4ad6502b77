//! braillemap - query the text/braille unit index of a document fixture.
//!
//! # Usage
//!
//! ```bash
//! braillemap book.json dump
//! braillemap book.json text 12 --hint 3
//! braillemap --format json book.json range 0 40
//! braillemap --watch book.json page 120
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info_span};
use tracing_subscriber::util::SubscriberInitExt;

use braillemap::config::{
    ConfigFlags, OutputFormat, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use braillemap::report::{self, Query};
use braillemap::watcher::FileWatcher;
use braillemap::fixture;
use braillemap::logging::{self, LogOptions};

/// Query the text/braille unit index of a document fixture
#[derive(Parser, Debug)]
#[command(name = "braillemap", version, about, long_about = None)]
struct Cli {
    /// JSON fixture describing the document, both views and the unit list
    #[arg(value_name = "FIXTURE")]
    fixture: PathBuf,

    #[command(subcommand)]
    query: Option<Query>,

    /// Rerun the query whenever the fixture changes
    #[arg(short, long)]
    watch: bool,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Print timings for rebuilds and queries
    #[arg(long)]
    perf: bool,

    /// Write debug events to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);
const WATCH_POLL: Duration = Duration::from_millis(250);

fn run_once(path: &Path, query: &Query, format: OutputFormat) -> Result<()> {
    let _span = info_span!("query").entered();
    let mut session = fixture::load(path)?;
    let report = report::run(&mut session, query)?;
    debug!(?query, "ran query");
    println!("{}", report::render(&report, format)?);
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    // Initialize logging
    let options = LogOptions {
        perf: effective.perf,
        debug_log: effective
            .debug_log
            .clone()
            .or_else(|| std::env::var_os("BRAILLEMAP_DEBUG_LOG").map(PathBuf::from)),
    };
    match logging::subscriber(&options) {
        Ok(subscriber) => subscriber.try_init()?,
        Err(err) => {
            eprintln!(
                "[warn] Failed to initialize debug log {}: {}",
                options
                    .debug_log
                    .as_ref()
                    .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
                err
            );
            logging::subscriber(&LogOptions {
                debug_log: None,
                ..options
            })?
            .try_init()?;
        }
    }

    if !cli.fixture.exists() {
        anyhow::bail!("File not found: {}", cli.fixture.display());
    }

    let query = cli.query.unwrap_or(Query::Dump);
    let format = effective.format.unwrap_or(OutputFormat::Plain);

    if !effective.watch {
        return run_once(&cli.fixture, &query, format);
    }

    let mut watcher = FileWatcher::new(&cli.fixture, WATCH_DEBOUNCE)
        .with_context(|| format!("Failed to watch {}", cli.fixture.display()))?;
    loop {
        // A half-written fixture is expected while editing; report and keep watching
        if let Err(err) = run_once(&cli.fixture, &query, format) {
            eprintln!("[error] {err:#}");
        }
        watcher.wait_for_change(WATCH_POLL);
        println!();
    }
}
