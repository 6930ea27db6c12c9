// Tracing initialization: stdout always, plus an optional non-blocking file layer

use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "herald_gateway=debug,tower_http=debug,axum=debug"
    } else {
        "herald_gateway=info,tower_http=info"
    }
}

/// `RUST_LOG` wins over the `debug` flag when set.
pub fn init_logger(debug: bool, log_file: Option<&str>) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer());

    match log_file.and_then(file_writer) {
        Some(writer) => registry
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .init(),
        None => registry.init(),
    }
}

fn file_writer(path: &str) -> Option<NonBlocking> {
    match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {path}: {err}");
            None
        }
    }
}
