//! Logging setup for the Pushkeeper application.
//!
//! All crates log through the `tracing` macros; this module installs the
//! subscriber once at startup.

use pushkeeper_config::LoggingConfig;
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` directives still apply on top of `level`.
pub fn init_with_level(level: Level) {
    let filter = build_filter(&level.to_string());

    // try_init: a global subscriber may already be set (tests, embedding)
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize logging from the `logging` config section.
///
/// With `directory` set, a daily rolling file `pushkeeper.log` is written
/// there in addition to stdout. The returned guard must be kept alive for
/// the lifetime of the process or buffered file output is lost.
pub fn init_with_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let Some(directory) = config.directory.as_deref() else {
        let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
        init_with_level(level);
        return None;
    };

    let file_appender = tracing_appender::rolling::daily(directory, "pushkeeper.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_line_number(true))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(file_writer),
        )
        .with(build_filter(&config.level))
        .try_init();

    match result {
        Ok(()) => {
            info!(
                "Logging initialized at level {} (file output in {})",
                config.level, directory
            );
            Some(guard)
        }
        Err(_) => None,
    }
}

fn build_filter(level: &str) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match format!("pushkeeper={}", level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter.add_directive(Level::INFO.into()),
    }
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result, so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
