//! Core utilities for droidspec
//!
//! This crate provides shared functionality used by the descriptor crate and
//! the command-line tool:
//!
//! - **Error handling**: Coded errors with context and recovery suggestions
//! - **Validation**: Fluent validator that collects every violation
//! - **Configuration**: TOML-based tool settings with defaults
//!
//! # Example
//!
//! ```rust
//! use droidspec_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("applicationId", "")
//!     .validate();
//!
//! assert!(!result.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};
