//! Descriptor errors

use droidspec_core::error::{Error, ErrorCode};
use droidspec_core::validation::ValidationResult;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while loading, checking or resolving a descriptor
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Input could not be parsed
    #[error(
        "malformed descriptor {source_name}{}: {message}",
        .line.map(|l| format!(" (line {})", l)).unwrap_or_default()
    )]
    Malformed {
        /// File path or caller-supplied name of the input
        source_name: String,
        /// 1-based line, when the parser reports one
        line: Option<usize>,
        /// Parser message
        message: String,
    },

    /// One or more invariants failed; carries every violation
    #[error("invalid descriptor: {}", summarize(.0))]
    Invalid(ValidationResult),

    /// A build type names a signing config that is not declared
    #[error("build type '{build_type}' references unknown signing config '{name}'")]
    UnknownSigningConfig {
        /// Build type holding the reference
        build_type: String,
        /// Signing-config name that was not found
        name: String,
    },

    /// The requested build type is not declared
    #[error("unknown build type '{name}'")]
    UnknownBuildType {
        /// Requested build type
        name: String,
        /// Build types the descriptor declares
        available: Vec<String>,
    },

    /// Reading or writing a file failed
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A descriptor could not be written as TOML or JSON
    #[error("failed to serialize descriptor: {0}")]
    Serialize(String),
}

impl DescriptorError {
    /// Validation report, when this is an [`DescriptorError::Invalid`]
    pub fn violations(&self) -> Option<&ValidationResult> {
        match self {
            Self::Invalid(result) => Some(result),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn summarize(result: &ValidationResult) -> String {
    result
        .errors()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<DescriptorError> for Error {
    fn from(err: DescriptorError) -> Self {
        match err {
            DescriptorError::Malformed { ref source_name, .. } => {
                let context = format!("While parsing {}", source_name);
                Error::new(ErrorCode::ConfigParseError, err.to_string())
                    .with_context(context)
                    .with_suggestion("Fix the syntax error; unknown keys are rejected, check for typos")
            }
            DescriptorError::Invalid(ref result) => Error::new(
                ErrorCode::ConfigValidationError,
                format!("{} violation(s): {}", result.errors().len(), summarize(result)),
            )
            .with_suggestion("Run `droidspec check` to list every violation"),
            DescriptorError::UnknownSigningConfig { ref name, .. } => {
                let suggestion = format!("Declare signingConfigs.{} or point the build type at an existing config", name);
                Error::new(ErrorCode::UnknownSigningConfig, err.to_string()).with_suggestion(suggestion)
            }
            DescriptorError::UnknownBuildType { ref available, .. } => {
                let suggestion = if available.is_empty() {
                    "The descriptor declares no build types".to_string()
                } else {
                    format!("Available build types: {}", available.join(", "))
                };
                Error::new(ErrorCode::UnknownBuildType, err.to_string()).with_suggestion(suggestion)
            }
            DescriptorError::Io { path, source } => {
                let code = match source.kind() {
                    std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
                    std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
                    _ => ErrorCode::IoError,
                };
                Error::new(code, format!("failed to access {}: {}", path.display(), source))
                    .with_source(source)
            }
            DescriptorError::Serialize(_) => Error::new(ErrorCode::SerializeError, err.to_string()),
        }
    }
}
