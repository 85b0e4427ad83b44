//! Descriptor loading and serialization
//!
//! Descriptors are TOML documents with camelCase keys. Unknown keys are
//! rejected so typos surface as parse errors with a line number.

use crate::descriptor::BuildDescriptor;
use crate::error::DescriptorError;
use std::path::Path;

/// Parse a descriptor from TOML text
///
/// `source_name` is only used in error messages.
///
/// # Errors
///
/// [`DescriptorError::Malformed`] for syntax errors, type mismatches and unknown keys.
pub fn load_str(content: &str, source_name: &str) -> Result<BuildDescriptor, DescriptorError> {
    let descriptor: BuildDescriptor =
        toml::from_str(content).map_err(|e| malformed(content, source_name, &e))?;

    tracing::debug!(
        source = source_name,
        namespace = %descriptor.namespace,
        signing_configs = descriptor.signing_configs.len(),
        build_types = descriptor.build_types.len(),
        "Loaded build descriptor"
    );

    Ok(descriptor)
}

/// Read and parse a descriptor file
pub fn load_file(path: &Path) -> Result<BuildDescriptor, DescriptorError> {
    let content = std::fs::read_to_string(path).map_err(|e| DescriptorError::io(path, e))?;
    load_str(&content, &path.display().to_string())
}

/// Serialize a descriptor back to TOML
pub fn to_toml_string(descriptor: &BuildDescriptor) -> Result<String, DescriptorError> {
    toml::to_string_pretty(descriptor).map_err(|e| DescriptorError::Serialize(e.to_string()))
}

/// Serialize a descriptor as pretty JSON
pub fn to_json_string(descriptor: &BuildDescriptor) -> Result<String, DescriptorError> {
    serde_json::to_string_pretty(descriptor).map_err(|e| DescriptorError::Serialize(e.to_string()))
}

/// Write a descriptor to a TOML file
pub fn save_file(descriptor: &BuildDescriptor, path: &Path) -> Result<(), DescriptorError> {
    let content = to_toml_string(descriptor)?;
    std::fs::write(path, content).map_err(|e| DescriptorError::io(path, e))?;
    tracing::info!(path = %path.display(), "Wrote build descriptor");
    Ok(())
}

fn malformed(content: &str, source_name: &str, err: &toml::de::Error) -> DescriptorError {
    let line = err
        .span()
        .map(|span| line_of(content, span.start));

    DescriptorError::Malformed {
        source_name: source_name.to_string(),
        line,
        message: err.message().trim().to_string(),
    }
}

/// 1-based line containing byte `offset`
fn line_of(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
