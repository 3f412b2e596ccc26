use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialise logging at `info`, or `debug` when `debug` is set.
///
/// The level can be overridden via `RUST_LOG` only when debug logging is
/// enabled. Output goes to stderr because stdout carries the result list, or to
/// `log_file` when one is given.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let file = log_file.and_then(|path| {
        let dir = path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        let name = path.file_name()?.to_owned();
        std::fs::create_dir_all(&dir).ok()?;
        Some(tracing_appender::rolling::never(dir, name))
    });

    let _ = match file {
        Some(appender) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(appender)
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
}
