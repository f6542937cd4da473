use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use sensor_core::settings::{LoaderConfig, Settings};
use sensor_core::validation::RecordValidator;
use sensor_runtime::ingest::IngestService;
use sensor_runtime::store::RecordStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised. Output goes
/// to stderr and, when `log_file` is set, is appended to that file as well.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Map `--log-level` names onto `tracing` directives.
fn normalise_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

// ── Service bootstrap ──────────────────────────────────────────────────────────

/// Load the source and wire the store behind an [`IngestService`].
///
/// A load failure aborts startup.
pub fn build_service(settings: &Settings, config: &LoaderConfig) -> anyhow::Result<IngestService> {
    let store = RecordStore::from_source(config)?;
    tracing::info!(
        records = store.len(),
        sensors = ?config.sensor_columns,
        strict_append = settings.strict_append,
        "record store initialised"
    );
    let validator = RecordValidator::new(settings.append_policy(config));
    Ok(IngestService::new(Arc::new(store), validator))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
