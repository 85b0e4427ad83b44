//! Android build descriptors
//!
//! This crate provides the typed form of an Android app module's build
//! configuration:
//! - Descriptor model with signing configs and build types
//! - TOML loading and serialization
//! - Invariant validation that reports every violation at once
//! - Signing credential resolution by build type
//! - Gradle Kotlin DSL import and rendering
//!
//! # Example
//!
//! ```rust
//! use droidspec_android::{loader, validate};
//!
//! let descriptor = loader::load_str(
//!     r#"
//! namespace = "com.example.app"
//! applicationId = "com.example.app"
//! compileSdkVersion = 35
//! minSdkVersion = 21
//! targetSdkVersion = 35
//! sourceCompatibility = "1.8"
//! targetCompatibility = "1.8"
//! versionCode = 1
//! versionName = "1.0"
//! signingConfigs.debug = { keystoreFile = "debug.keystore", storePassword = "android", keyAlias = "androiddebugkey", keyPassword = "android" }
//! buildTypes.debug.signingConfig = "debug"
//! "#,
//!     "inline",
//! )?;
//!
//! validate::validate(&descriptor)?;
//! let credential = descriptor.resolve_signing_config("debug")?;
//! assert_eq!(credential.key_alias, "androiddebugkey");
//! # Ok::<(), droidspec_android::DescriptorError>(())
//! ```

#![warn(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod gradle_kts;
pub mod loader;
pub mod validate;

#[cfg(test)]
mod fixtures;

pub use descriptor::{BuildDescriptor, BuildType, FlutterConfig, JavaVersion, SigningCredential};
pub use error::DescriptorError;
