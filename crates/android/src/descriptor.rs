//! Build descriptor model
//!
//! A [`BuildDescriptor`] is the typed form of everything an Android module
//! declares for the build: identifiers, SDK levels, language levels, signing
//! credentials and the build types that use them.
//!
//! Required fields deserialize to their empty/zero value when absent so that
//! [`crate::validate::validate`] can report every missing field at once.

use crate::error::DescriptorError;
use droidspec_core::config::expand_path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Plugin id every Android application module must apply
pub const ANDROID_APPLICATION_PLUGIN: &str = "com.android.application";

/// Declarative record of the parameters an Android build reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BuildDescriptor {
    /// Reverse-domain package of the generated R and BuildConfig classes
    pub namespace: String,
    /// API level the module compiles against
    pub compile_sdk_version: i32,
    /// Side-by-side NDK version, dotted numeric
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<String>,
    /// Java language level of the sources
    pub source_compatibility: String,
    /// Java bytecode level of the output
    pub target_compatibility: String,
    /// Kotlin `jvmTarget`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jvm_target: Option<String>,
    /// Package name the installed app is published under
    pub application_id: String,
    /// Lowest API level the app installs on
    pub min_sdk_version: i32,
    /// API level the app is tested against
    pub target_sdk_version: i32,
    /// Positive, increasing release number
    pub version_code: i32,
    /// User-facing version string
    pub version_name: String,
    /// Plugins to apply, in application order
    pub plugin_activations: Vec<String>,
    /// Present for Flutter host modules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flutter: Option<FlutterConfig>,
    /// Signing credentials by name
    pub signing_configs: BTreeMap<String, SigningCredential>,
    /// Build types by name
    pub build_types: BTreeMap<String, BuildType>,
    /// Source-set name to directory list
    pub source_directory_overrides: BTreeMap<String, Vec<String>>,
}

/// Keystore and key used to sign a packaged artifact
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SigningCredential {
    /// Path to the keystore, relative to the module directory
    pub keystore_file: String,
    /// Keystore password
    pub store_password: String,
    /// Alias of the signing key inside the keystore
    pub key_alias: String,
    /// Password of the signing key
    pub key_password: String,
}

impl fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredential")
            .field("keystore_file", &self.keystore_file)
            .field("store_password", &"<redacted>")
            .field("key_alias", &self.key_alias)
            .field("key_password", &"<redacted>")
            .finish()
    }
}

/// Variant-specific build settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BuildType {
    /// Name of an entry in [`BuildDescriptor::signing_configs`]
    pub signing_config: String,
}

impl BuildType {
    /// Build type signed with the named config
    pub fn signed_with(name: impl Into<String>) -> Self {
        Self {
            signing_config: name.into(),
        }
    }
}

/// `flutter { }` block of a Flutter host module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FlutterConfig {
    /// Flutter project root, relative to the module
    pub source: String,
}

impl BuildDescriptor {
    /// Follow a build type's signing reference to its credential
    ///
    /// # Errors
    ///
    /// [`DescriptorError::UnknownBuildType`] when the build type is not
    /// declared, [`DescriptorError::UnknownSigningConfig`] when it names a
    /// signing config that does not exist.
    pub fn resolve_signing_config(&self, build_type: &str) -> Result<&SigningCredential, DescriptorError> {
        let entry = self
            .build_types
            .get(build_type)
            .ok_or_else(|| DescriptorError::UnknownBuildType {
                name: build_type.to_string(),
                available: self.build_types.keys().cloned().collect(),
            })?;

        self.signing_configs
            .get(&entry.signing_config)
            .ok_or_else(|| DescriptorError::UnknownSigningConfig {
                build_type: build_type.to_string(),
                name: entry.signing_config.clone(),
            })
    }

    /// Signing-config name to the build types that reference it
    pub fn signing_references(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut refs: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (build_type, entry) in &self.build_types {
            if !entry.signing_config.is_empty() {
                refs.entry(entry.signing_config.as_str())
                    .or_default()
                    .push(build_type.as_str());
            }
        }
        refs
    }

    /// Keystore locations resolved against the module directory
    ///
    /// `~` and environment variables are expanded before joining.
    pub fn keystore_paths(&self, base_dir: &Path) -> BTreeMap<&str, PathBuf> {
        self.signing_configs
            .iter()
            .filter(|(_, cred)| !cred.keystore_file.is_empty())
            .map(|(name, cred)| {
                let path = expand_path(&cred.keystore_file);
                let resolved = if path.is_absolute() {
                    path
                } else {
                    base_dir.join(path)
                };
                (name.as_str(), resolved)
            })
            .collect()
    }
}

/// Java language levels accepted for `sourceCompatibility`,
/// `targetCompatibility` and `jvmTarget`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JavaVersion {
    /// Java 6
    V1_6,
    /// Java 7
    V1_7,
    /// Java 8
    V1_8,
    /// Java 9
    V9,
    /// Java 10
    V10,
    /// Java 11
    V11,
    /// Java 17
    V17,
    /// Java 21
    V21,
}

impl JavaVersion {
    /// All supported levels, oldest first
    pub const ALL: [JavaVersion; 8] = [
        Self::V1_6,
        Self::V1_7,
        Self::V1_8,
        Self::V9,
        Self::V10,
        Self::V11,
        Self::V17,
        Self::V21,
    ];

    /// Descriptor spelling (`"1.8"`, `"17"`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1_6 => "1.6",
            Self::V1_7 => "1.7",
            Self::V1_8 => "1.8",
            Self::V9 => "9",
            Self::V10 => "10",
            Self::V11 => "11",
            Self::V17 => "17",
            Self::V21 => "21",
        }
    }

    /// Gradle `JavaVersion` constant name (`VERSION_1_8`)
    pub fn gradle_constant(self) -> String {
        format!("VERSION_{}", self.as_str().replace('.', "_"))
    }

    /// Parse a Gradle constant name back into a level
    pub fn from_gradle_constant(constant: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.gradle_constant() == constant)
    }

    /// Supported descriptor spellings
    pub fn supported() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.as_str()).collect()
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JavaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unsupported Java version '{}'", s))
    }
}
