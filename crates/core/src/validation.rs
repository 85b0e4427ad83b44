//! Fluent validation that collects every violation in one pass
//!
//! Validators never stop at the first problem: each check appends to a
//! [`ValidationResult`], so a caller can report all errors and warnings
//! together.
//!
//! # Example
//!
//! ```rust
//! use droidspec_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("namespace", "com.example.app")
//!     .range("versionCode", 1, 1, 2_100_000_000)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation, as a dotted path
    pub field: String,
    /// Error message
    pub message: String,
    /// Machine-readable code
    pub code: String,
    /// Expected value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl ValidationError {
    /// Create an error without expected/actual values
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
            expected: None,
            actual: None,
        }
    }

    /// Attach the expected value
    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Attach the actual value
    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Errors carrying the given code
    pub fn errors_with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.code == code)
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Move every warning into the error list
    pub fn promote_warnings(&mut self) {
        self.errors.append(&mut self.warnings);
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(
                ValidationError::new(field, "REQUIRED", "Field is required")
                    .expected("non-empty value")
                    .actual("empty"),
            );
        }
        self
    }

    /// Validate against a regex. Empty values are left to [`Validator::required`].
    pub fn pattern(mut self, field: &str, value: &str, re: &Regex, description: &str) -> Self {
        if !value.is_empty() && !re.is_match(value) {
            self.result.add_error(
                ValidationError::new(field, "PATTERN", format!("Must match {}", description))
                    .expected(description)
                    .actual(value),
            );
        }
        self
    }

    /// Validate that a value is in a list of allowed values
    pub fn one_of(mut self, field: &str, value: &str, allowed: &[&str]) -> Self {
        if !allowed.contains(&value) {
            self.result.add_error(
                ValidationError::new(field, "ONE_OF", format!("Must be one of: {}", allowed.join(", ")))
                    .expected(allowed.join(", "))
                    .actual(value),
            );
        }
        self
    }

    /// Validate a numeric range
    pub fn range<T: PartialOrd + std::fmt::Display>(
        mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if value < min || value > max {
            self.result.add_error(
                ValidationError::new(field, "RANGE", format!("Must be between {} and {}", min, max))
                    .expected(format!("{} - {}", min, max))
                    .actual(value.to_string()),
            );
        }
        self
    }

    /// Validate that a path is a file
    pub fn is_file(mut self, field: &str, path: &Path) -> Self {
        if !path.is_file() {
            self.result.add_error(
                ValidationError::new(field, "NOT_A_FILE", format!("Not a file: {}", path.display()))
                    .expected("file")
                    .actual(if path.is_dir() { "directory" } else { "not found" }),
            );
        }
        self
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, code: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result
                .add_warning(ValidationError::new(field, code, message));
        }
        self
    }

    /// Append a prebuilt error
    pub fn error(mut self, error: ValidationError) -> Self {
        self.result.add_error(error);
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Flag relative paths that escape their base, and absolute paths
pub fn validate_path_safety(field: &str, path: &Path) -> ValidationResult {
    let mut result = ValidationResult::new();
    let path_str = path.to_string_lossy();

    if path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        result.add_warning(
            ValidationError::new(field, "PATH_TRAVERSAL", "Path leaves the module directory")
                .actual(path_str.to_string()),
        );
    }

    if path.is_absolute() {
        result.add_warning(
            ValidationError::new(field, "ABSOLUTE_PATH", "Absolute path detected")
                .actual(path_str.to_string()),
        );
    }

    result
}
