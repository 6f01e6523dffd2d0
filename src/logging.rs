use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `guessr=debug`
pub const LOG_ENV: &str = "GUESSR_LOG";
pub const LOG_FILE: &str = "guessr.log";

/// Route `tracing` output to a file in `dir`; the terminal belongs to the TUI.
///
/// Keep the returned guard alive for as long as logs should be flushed.
pub fn init(dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    // a subscriber may already be installed (tests, embedding); that is fine
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(guard)
}
