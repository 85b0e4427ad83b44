//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use droidspec_core::validation::{ValidationError, ValidationResult};
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Print every error and warning of a validation pass
pub fn print_validation(result: &ValidationResult) {
    for error in result.errors() {
        Status::error(&format_violation(error));
    }
    for warning in result.warnings() {
        Status::warning(&format_violation(warning));
    }
}

/// One line per violation: `field: message [CODE] (expected ..., got ...)`
pub fn format_violation(violation: &ValidationError) -> String {
    let mut line = format!("{} [{}]", violation, violation.code);
    match (&violation.expected, &violation.actual) {
        (Some(expected), Some(actual)) => {
            line.push_str(&format!(" (expected {}, got {})", expected, actual));
        }
        (None, Some(actual)) => line.push_str(&format!(" (got {})", actual)),
        _ => {}
    }
    line
}

/// Replace a secret with a fixed-width mask
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
