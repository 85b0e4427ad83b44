//! CLI utilities for droidspec
//!
//! Provides shared CLI functionality:
//! - Status messages
//! - Validation report formatting
//! - Secret masking

#![warn(missing_docs)]

pub mod output;
