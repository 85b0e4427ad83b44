//! Configuration schema definitions
//!
//! Settings for the droidspec tool itself, not for the build descriptor.

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ConfigSchema {
    /// `[general]` table
    #[serde(default)]
    pub general: GeneralConfig,

    /// `[validation]` table
    #[serde(default)]
    pub validation: ValidationConfig,

    /// `[logging]` table
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Descriptor used when a command is given no file argument
    #[serde(default = "default_descriptor")]
    pub descriptor: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            descriptor: default_descriptor(),
        }
    }
}

fn default_descriptor() -> String {
    "android/app/build-descriptor.toml".to_string()
}

/// Validation behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Treat warnings as errors
    #[serde(default)]
    pub strict: bool,

    /// Verify that keystore files exist on disk
    #[serde(default)]
    pub check_files: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
