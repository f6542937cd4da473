use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::error::{Result, SensorError};
use crate::filters::{DateWindow, ValueThresholds};
use crate::validation::{AppendPolicy, DATE_FORMAT};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Serve filtered industrial sensor readings over HTTP
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sensor-server",
    about = "Serve filtered industrial sensor readings over HTTP",
    version
)]
pub struct Settings {
    /// CSV file with the raw sensor readings
    #[arg(long, env = "SENSOR_CSV_PATH", default_value = "sensor.csv")]
    pub csv_path: PathBuf,

    /// First calendar date to load (YYYY-MM-DD, inclusive)
    #[arg(long, env = "SENSOR_DATE_MIN", default_value = "2018-04-01", value_parser = parse_iso_date)]
    pub date_min: NaiveDate,

    /// Last calendar date to load (YYYY-MM-DD, inclusive)
    #[arg(long, env = "SENSOR_DATE_MAX", default_value = "2018-04-30", value_parser = parse_iso_date)]
    pub date_max: NaiveDate,

    /// Lower sensor value threshold (exclusive)
    #[arg(long, env = "SENSOR_VALUE_MIN", default_value = "20", allow_negative_numbers = true)]
    pub value_min: f64,

    /// Upper sensor value threshold (exclusive)
    #[arg(long, env = "SENSOR_VALUE_MAX", default_value = "30", allow_negative_numbers = true)]
    pub value_max: f64,

    /// Sensor columns to extract, in output order
    #[arg(
        long,
        env = "SENSOR_COLUMNS",
        value_delimiter = ',',
        default_values = ["sensor_07", "sensor_47"]
    )]
    pub sensor_columns: Vec<String>,

    /// Also enforce the sensor set and value thresholds on uploaded records
    #[arg(long, env = "SENSOR_STRICT_APPEND")]
    pub strict_append: bool,

    /// Address to listen on
    #[arg(long, env = "SENSOR_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "SENSOR_PORT", default_value = "8000")]
    pub port: u16,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Everything the source loader needs, checked for consistency.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    pub source: PathBuf,
    pub date_window: DateWindow,
    pub thresholds: ValueThresholds,
    /// Ordered, unique sensor column names.
    pub sensor_columns: Vec<String>,
}

impl LoaderConfig {
    pub fn new(
        source: impl Into<PathBuf>,
        date_window: DateWindow,
        thresholds: ValueThresholds,
        sensor_columns: Vec<String>,
    ) -> Result<Self> {
        if sensor_columns.is_empty() {
            return Err(SensorError::Config(
                "at least one sensor column is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for column in &sensor_columns {
            if column.trim().is_empty() {
                return Err(SensorError::Config(
                    "sensor column names must not be empty".to_string(),
                ));
            }
            if !seen.insert(column.as_str()) {
                return Err(SensorError::Config(format!(
                    "sensor column `{column}` is listed twice"
                )));
            }
        }

        Ok(Self {
            source: source.into(),
            date_window,
            thresholds,
            sensor_columns,
        })
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and apply the `--debug` flag.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`load`](Self::load) but over an explicit argument list.
    pub fn try_load_from<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    /// Validate the loader-related arguments into a [`LoaderConfig`].
    pub fn loader_config(&self) -> Result<LoaderConfig> {
        let sensor_columns = self
            .sensor_columns
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        LoaderConfig::new(
            self.csv_path.clone(),
            DateWindow::new(self.date_min, self.date_max)?,
            ValueThresholds::new(self.value_min, self.value_max)?,
            sensor_columns,
        )
    }

    /// Validation policy for uploaded records.
    pub fn append_policy(&self, config: &LoaderConfig) -> AppendPolicy {
        if self.strict_append {
            AppendPolicy::Strict {
                sensors: config.sensor_columns.clone(),
                thresholds: config.thresholds,
            }
        } else {
            AppendPolicy::Lenient
        }
    }

    /// Socket address built from `--host` and `--port`.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| SensorError::Config(format!("invalid listen address: {e}")))
    }

    /// `--debug` overrides the log level.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

fn parse_iso_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
