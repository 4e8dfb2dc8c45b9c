use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directives, e.g. `SPENDLOG_LOG=spendlog=debug`.
pub(crate) const LOG_ENV: &str = "SPENDLOG_LOG";

static TRACING_INIT: Once = Once::new();

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Only fails when another subscriber is already global; logging then goes
/// there instead, so this is reported rather than fatal.
fn report_init<E: std::fmt::Display>(installed: Result<(), E>) {
    if let Err(e) = installed {
        eprintln!("spendlog: keeping the existing log subscriber: {e}");
    }
}

/// Log to stderr. Used by the command-line mode.
pub(crate) fn init_stderr() {
    TRACING_INIT.call_once(|| {
        let installed = fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .try_init();
        report_init(installed);
    });
}

/// Log to a file so the dashboard's alternate screen stays clean.
pub(crate) fn init_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    TRACING_INIT.call_once(|| {
        let installed = fmt()
            .with_env_filter(filter())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init();
        report_init(installed);
    });
    Ok(())
}
