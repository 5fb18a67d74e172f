//! Tracing setup: terse stderr plus a detailed daily log file.

use cea_infrastructure::CeaPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const FILE_FILTER: &str = "warn,cea_core=info,cea_infrastructure=info,cea_interaction=info,cea_application=info,cea_cli=info";
const LOG_FILE_PREFIX: &str = "cea.log";

/// Directives for the terminal. Info lines go to the file only.
fn stderr_directives(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Directives for the log file when `RUST_LOG` is unset.
fn file_directives(verbose: bool) -> &'static str {
    if verbose { "debug" } else { FILE_FILTER }
}

/// Installs the global subscriber. `RUST_LOG` overrides the file filter.
///
/// The returned guard flushes the file writer and must live until exit.
/// Without a usable log directory only stderr is written.
pub fn init(paths: &CeaPaths, verbose: bool) -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(stderr_directives(verbose)));

    let file = paths
        .logs_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .map(|dir| {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            tracing_appender::non_blocking(appender)
        });

    match file {
        Some((writer, guard)) => {
            let file_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(file_directives(verbose)));
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter);
            tracing_subscriber::registry()
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(stderr_layer).init();
            None
        }
    }
}
