//! Logging for droidspec
//!
//! Structured logging with `tracing`, written to stderr so that stdout stays
//! reserved for dumps and rendered files.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `config.log_level`.
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(config.ansi)
            .with_target(config.show_target)
            .with_file(config.show_file)
            .with_line_number(config.show_line_number)
            .compact());

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Logging initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Filter levels from quietest to noisiest
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
    pub show_target: bool,
    pub show_file: bool,
    pub show_line_number: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            ansi: true,
            show_target: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

impl TelemetryConfig {
    /// Derive the filter from CLI flags
    ///
    /// `quiet` wins over `verbose`; each `-v` raises the level one step above
    /// `base_level`. A base that is not a plain level (a directive list such
    /// as `droidspec=debug`) counts as `warn` once `-v` is given.
    pub fn from_verbosity(base_level: &str, verbose: u8, quiet: bool) -> Self {
        let log_level = if quiet {
            "error".to_string()
        } else if verbose == 0 {
            base_level.to_string()
        } else {
            let base = LEVELS
                .iter()
                .position(|level| level.eq_ignore_ascii_case(base_level.trim()))
                .unwrap_or(1);
            LEVELS[(base + usize::from(verbose)).min(LEVELS.len() - 1)].to_string()
        };

        Self {
            log_level,
            show_target: verbose >= 2,
            show_file: verbose >= 3,
            show_line_number: verbose >= 3,
            ..Self::default()
        }
    }

    /// Disable ANSI colors in log output
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }
}

/// Timer for measuring operation duration
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Stop the timer and log the duration
    pub fn stop(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = self.name,
            duration_us = duration.as_micros() as u64,
            "Timer completed"
        );
        duration
    }
}
