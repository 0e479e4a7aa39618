use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_DIR: &str = "logs";

/// Initializes console logging plus a daily-rotated JSON log under `logs/`.
///
/// `verbose` lowers the default level for this crate to `debug`. `RUST_LOG`
/// still takes precedence. Hold on to the returned guard until exit so the
/// file writer flushes.
pub fn init_logging(verbose: bool) -> WorkerGuard {
    let _ = fs::create_dir_all(LOG_DIR);

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, "parcel_scout.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let default_directive = if verbose {
        "parcel_scout=debug"
    } else {
        "parcel_scout=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}
