//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, a standard location, or defaults
    ///
    /// An explicit path that does not exist is an error; missing standard
    /// locations fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        tracing::debug!(path = ?config_path, "Loaded tool configuration");

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Default descriptor path with `~` and environment variables expanded
    pub fn descriptor_path(&self) -> PathBuf {
        expand_path(&self.schema.general.descriptor)
    }
}

/// Expand `~` and `$VAR` in a path, leaving it untouched when a variable is unset
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            tracing::warn!(path = raw, error = %e, "Could not expand path");
            PathBuf::from(raw)
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let candidates = [".droidspec.toml", "droidspec.toml", ".config/droidspec.toml"];

    for candidate in candidates {
        if Path::new(candidate).exists() {
            return Some(PathBuf::from(candidate));
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("droidspec").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    let schema: ConfigSchema = toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))?;

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.general.descriptor, "android/app/build-descriptor.toml");
        assert_eq!(config.descriptor_path(), PathBuf::from("android/app/build-descriptor.toml"));
        assert_eq!(config.schema.logging.level, "warn");
        assert!(!config.schema.validation.strict);
    }

    #[test]
    fn test_config_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[general]\ndescriptor = \"android/app/descriptor.toml\"\n\n[validation]\nstrict = true"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.schema.general.descriptor, "android/app/descriptor.toml");
        assert!(config.schema.validation.strict);
        assert!(!config.schema.validation.check_files);
    }

    #[test]
    fn test_config_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/no/such/droidspec.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[validation\nstrict = yes").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("a/b.toml"), PathBuf::from("a/b.toml"));
    }
}
