//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/stagger/stagger.log` (or platform equivalent)
//! with 10 MB size-based rotation. The terminal only sees warnings unless
//! `DEBUG_LOGGING=1` is set, so log lines don't bury the REPL.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,stagger_core=debug,stagger_cli=debug";

/// Initialize logging with dual output (file + stderr).
///
/// Returns a `WorkerGuard` that must be held for the application lifetime
/// so buffered logs are flushed on shutdown. Falls back to stderr-only
/// logging (and returns `None`) if the log file can't be opened.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = match dirs::config_dir() {
        Some(config) => config.join("stagger"),
        None => {
            init_stderr_only(debug_logging);
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber not installed yet
        eprintln!(
            "Failed to create log directory {:?}: {}, using stderr only",
            log_dir, e
        );
        init_stderr_only(debug_logging);
        return None;
    }

    let log_path = log_dir.join("stagger.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(10 * 1024 * 1024),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stderr_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(file_filter(debug_logging));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(terminal_layer(debug_logging))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "Stagger logging initialized");

    Some(guard)
}

fn file_filter(debug_logging: bool) -> EnvFilter {
    EnvFilter::new(if debug_logging { DEBUG_DIRECTIVE } else { "info" })
}

fn terminal_layer<S>(debug_logging: bool) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let directive = if debug_logging { DEBUG_DIRECTIVE } else { "warn" };
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(EnvFilter::new(directive))
}

fn init_stderr_only(debug_logging: bool) {
    tracing_subscriber::registry()
        .with(terminal_layer(debug_logging))
        .init();

    tracing::info!(debug_logging, "Stagger logging initialized (stderr only)");
}
