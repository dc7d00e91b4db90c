// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use crate::domain::model::{HistoryRange, TickerSymbol};
use dotenv::dotenv;
use std::env;
use std::fs::File;
use std::time::Duration;

const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
const DEFAULT_PROVIDER_URL: &str = "https://query1.finance.yahoo.com";

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Instrument and refresh cadence
    pub dashboard: DashboardConfig,

    /// Market-data provider
    pub provider: ProviderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Ticker shown for the lifetime of the process (e.g., "AAPL")
    pub ticker: TickerSymbol,

    /// Seconds between scheduled refreshes
    pub refresh_interval_secs: u64,
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

/// Market-data provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the chart API
    pub base_url: String,

    /// Trailing window of daily history (e.g., "1mo")
    pub history_range: HistoryRange,

    /// Per-request timeout; requests are unbounded when unset
    pub request_timeout_secs: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let ticker = match env::var("TICKER_SYMBOL") {
            Ok(raw) => TickerSymbol::new(&raw).map_err(AppError::Config)?,
            Err(_) => TickerSymbol::default(),
        };

        let refresh_interval_secs = match env::var("REFRESH_INTERVAL_SECS") {
            Ok(raw) => parse_positive(&raw, "REFRESH_INTERVAL_SECS")?,
            Err(_) => DEFAULT_REFRESH_INTERVAL_SECS,
        };

        let dashboard_config = DashboardConfig {
            ticker,
            refresh_interval_secs,
        };

        let history_range = match env::var("HISTORY_RANGE") {
            Ok(raw) => raw.parse().map_err(AppError::Config)?,
            Err(_) => HistoryRange::default(),
        };

        let request_timeout_secs = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) if !raw.trim().is_empty() => {
                Some(parse_positive(&raw, "REQUEST_TIMEOUT_SECS")?)
            }
            _ => None,
        };

        let provider_config = ProviderConfig {
            base_url: env::var("PROVIDER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PROVIDER_URL.to_string()),
            history_range,
            request_timeout_secs,
        };

        // Create Logging config
        let logging_config = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env::var("LOG_TO_FILE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        Ok(Config {
            dashboard: dashboard_config,
            provider: provider_config,
            logging: logging_config,
        })
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        // Set log level
        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        // Configure output
        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    AppError::Config(format!("Failed to create log file: {}", e))
                })?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        // Initialize the logger
        builder.init();

        Ok(())
    }
}

fn parse_positive(raw: &str, name: &str) -> AppResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(AppError::Config(format!(
            "{} must be a positive integer, got '{}'",
            name, raw
        ))),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dashboard: DashboardConfig {
                ticker: TickerSymbol::default(),
                refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            },
            provider: ProviderConfig {
                base_url: DEFAULT_PROVIDER_URL.to_string(),
                history_range: HistoryRange::OneMonth,
                request_timeout_secs: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}
