//! Logging setup: a stderr layer plus an append-only run log.
//!
//! Called once from `main` after the configuration is known; nothing here
//! runs at load time.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use marquee_core::persist::create_directories;
use marquee_core::PipelineConfig;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

/// `[time: LEVEL: module]: message`, one event per line.
struct RunLogFormat;

impl<S, N> FormatEvent<S, N> for RunLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(writer, "[")?;
        SystemTime.format_time(&mut writer)?;
        write!(
            writer,
            ": {}: {}]: ",
            meta.level(),
            meta.module_path().unwrap_or_else(|| meta.target())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn stderr_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the stderr level; the run log always records
/// `info` and above (`debug` with `--verbose`).
pub fn setup_logging(config: &PipelineConfig, verbose: bool, quiet: bool) -> anyhow::Result<()> {
    create_directories(std::path::Path::new(&config.logging.directory))
        .context("Failed to create log directory")?;
    let log_path = config.log_file();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let stderr_layer = tracing_fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(stderr_filter(verbose, quiet))),
        );

    let file_layer = tracing_fmt::layer()
        .with_ansi(false)
        .event_format(RunLogFormat)
        .with_writer(Mutex::new(file))
        .with_filter(EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}
