//! Descriptor invariant checks
//!
//! [`validate`] runs every check and returns all violations together. Errors
//! make the descriptor unusable; warnings flag conventions a build would
//! still accept.

use crate::descriptor::{BuildDescriptor, JavaVersion, ANDROID_APPLICATION_PLUGIN};
use crate::error::DescriptorError;
use droidspec_core::validation::{validate_path_safety, ValidationError, ValidationResult, Validator};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

/// Violation codes specific to build descriptors
pub mod codes {
    /// SDK levels break `min <= target <= compile`
    pub const SDK_ORDER: &str = "SDK_ORDER";
    /// A build type names an undeclared signing config
    pub const UNKNOWN_SIGNING_CONFIG: &str = "UNKNOWN_SIGNING_CONFIG";
    /// Warning: no build type uses the signing config
    pub const UNUSED_SIGNING_CONFIG: &str = "UNUSED_SIGNING_CONFIG";
    /// Warning: `release` is signed with the `debug` config
    pub const RELEASE_DEBUG_SIGNING: &str = "RELEASE_DEBUG_SIGNING";
    /// A plugin is activated twice
    pub const DUPLICATE_PLUGIN: &str = "DUPLICATE_PLUGIN";
    /// Warning: plugins are listed but `com.android.application` is not
    pub const MISSING_ANDROID_PLUGIN: &str = "MISSING_ANDROID_PLUGIN";
    /// Warning: `applicationId` is not under `namespace`
    pub const APPLICATION_ID_DIVERGES: &str = "APPLICATION_ID_DIVERGES";
    /// Warning: Kotlin `jvmTarget` differs from `targetCompatibility`
    pub const JVM_TARGET_MISMATCH: &str = "JVM_TARGET_MISMATCH";
    /// Warning: `versionName` is empty
    pub const EMPTY_VERSION_NAME: &str = "EMPTY_VERSION_NAME";
    /// A source-set override lists no directories
    pub const EMPTY_SOURCE_DIRS: &str = "EMPTY_SOURCE_DIRS";
}

/// Highest versionCode Google Play accepts
pub const MAX_VERSION_CODE: i32 = 2_100_000_000;

static PACKAGE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap());

static NDK_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+){1,3}$").unwrap());

static PLUGIN_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._\-]*$").unwrap());

/// Check every invariant of a descriptor
///
/// # Errors
///
/// [`DescriptorError::Invalid`] carrying every error (and warning) found.
pub fn validate(descriptor: &BuildDescriptor) -> Result<ValidationResult, DescriptorError> {
    let result = inspect(descriptor);

    tracing::debug!(
        errors = result.errors().len(),
        warnings = result.warnings().len(),
        "Validated build descriptor"
    );

    if result.is_valid() {
        Ok(result)
    } else {
        Err(DescriptorError::Invalid(result))
    }
}

/// Run every check without converting the outcome into an error
pub fn inspect(d: &BuildDescriptor) -> ValidationResult {
    let mut result = identity(d);
    result.merge(sdk_levels(d));
    result.merge(language_levels(d));
    result.merge(signing(d));
    result.merge(source_sets(d));
    result.merge(plugins(d));
    result
}

/// Verify that every keystore exists relative to `base_dir`
pub fn check_files(d: &BuildDescriptor, base_dir: &Path) -> ValidationResult {
    d.keystore_paths(base_dir)
        .into_iter()
        .fold(Validator::new(), |v, (name, path)| {
            v.is_file(&format!("signingConfigs.{}.keystoreFile", name), &path)
        })
        .validate()
}

fn identity(d: &BuildDescriptor) -> ValidationResult {
    let diverges = !d.namespace.is_empty()
        && !d.application_id.is_empty()
        && d.application_id != d.namespace
        && !d.application_id.starts_with(&format!("{}.", d.namespace));

    let mut validator = Validator::new()
        .required("namespace", &d.namespace)
        .pattern("namespace", &d.namespace, &PACKAGE_NAME, "reverse-domain package name")
        .required("applicationId", &d.application_id)
        .pattern("applicationId", &d.application_id, &PACKAGE_NAME, "reverse-domain package name")
        .warn_if(
            "applicationId",
            codes::APPLICATION_ID_DIVERGES,
            diverges,
            "applicationId is not derived from namespace",
        )
        .range("versionCode", d.version_code, 1, MAX_VERSION_CODE)
        .warn_if(
            "versionName",
            codes::EMPTY_VERSION_NAME,
            d.version_name.trim().is_empty(),
            "versionName is empty",
        );

    if let Some(ndk) = &d.ndk_version {
        validator = validator
            .required("ndkVersion", ndk)
            .pattern("ndkVersion", ndk, &NDK_VERSION, "dotted numeric version");
    }

    validator.validate()
}

fn sdk_levels(d: &BuildDescriptor) -> ValidationResult {
    let (min, target, compile) = (d.min_sdk_version, d.target_sdk_version, d.compile_sdk_version);

    let mut validator = Validator::new()
        .range("compileSdkVersion", compile, 1, i32::MAX)
        .range("minSdkVersion", min, 1, i32::MAX)
        .range("targetSdkVersion", target, 1, i32::MAX);

    let all_set = min > 0 && target > 0 && compile > 0;
    if all_set && !(min <= target && target <= compile) {
        validator = validator.error(
            ValidationError::new(
                "minSdkVersion",
                codes::SDK_ORDER,
                "SDK levels must satisfy minSdkVersion <= targetSdkVersion <= compileSdkVersion",
            )
            .expected("minSdkVersion <= targetSdkVersion <= compileSdkVersion")
            .actual(format!("{} <= {} <= {}", min, target, compile)),
        );
    }

    validator.validate()
}

fn language_levels(d: &BuildDescriptor) -> ValidationResult {
    let supported = JavaVersion::supported();

    let mut validator = Validator::new()
        .one_of("sourceCompatibility", &d.source_compatibility, &supported)
        .one_of("targetCompatibility", &d.target_compatibility, &supported);

    if let Some(jvm_target) = &d.jvm_target {
        validator = validator
            .one_of("jvmTarget", jvm_target, &supported)
            .warn_if(
                "jvmTarget",
                codes::JVM_TARGET_MISMATCH,
                jvm_target != &d.target_compatibility,
                "Kotlin jvmTarget differs from targetCompatibility",
            );
    }

    validator.validate()
}

fn signing(d: &BuildDescriptor) -> ValidationResult {
    let mut validator = Validator::new();

    for (name, cred) in &d.signing_configs {
        let field = |key: &str| format!("signingConfigs.{}.{}", name, key);
        validator = validator
            .required(&field("keystoreFile"), &cred.keystore_file)
            .required(&field("storePassword"), &cred.store_password)
            .required(&field("keyAlias"), &cred.key_alias)
            .required(&field("keyPassword"), &cred.key_password);
    }

    for (build_type, entry) in &d.build_types {
        validator = validator.required(
            &format!("buildTypes.{}.signingConfig", build_type),
            &entry.signing_config,
        );
    }

    let references = d.signing_references();
    let declared: Vec<&str> = d.signing_configs.keys().map(String::as_str).collect();

    // One violation per missing name, however many build types point at it.
    for (name, build_types) in &references {
        if !d.signing_configs.contains_key(*name) {
            validator = validator.error(
                ValidationError::new(
                    format!("signingConfigs.{}", name),
                    codes::UNKNOWN_SIGNING_CONFIG,
                    format!(
                        "Signing config '{}' is referenced by build type(s) {} but not declared",
                        name,
                        build_types.join(", ")
                    ),
                )
                .expected(if declared.is_empty() {
                    "a declared signing config".to_string()
                } else {
                    format!("one of: {}", declared.join(", "))
                })
                .actual(*name),
            );
        }
    }

    for name in &declared {
        validator = validator.warn_if(
            &format!("signingConfigs.{}", name),
            codes::UNUSED_SIGNING_CONFIG,
            !references.contains_key(name),
            "Signing config is not used by any build type",
        );
    }

    let release_uses_debug = d
        .build_types
        .get("release")
        .is_some_and(|bt| bt.signing_config == "debug");

    validator
        .warn_if(
            "buildTypes.release.signingConfig",
            codes::RELEASE_DEBUG_SIGNING,
            release_uses_debug,
            "Release builds are signed with the debug signing config",
        )
        .validate()
}

fn source_sets(d: &BuildDescriptor) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (set, dirs) in &d.source_directory_overrides {
        let field = format!("sourceDirectoryOverrides.{}", set);
        if dirs.is_empty() {
            result.add_error(ValidationError::new(
                field.clone(),
                codes::EMPTY_SOURCE_DIRS,
                "Source set override lists no directories",
            ));
        }

        for (i, dir) in dirs.iter().enumerate() {
            let entry = format!("{}[{}]", field, i);
            if dir.trim().is_empty() {
                result.merge(Validator::new().required(&entry, dir).validate());
            } else {
                result.merge(validate_path_safety(&entry, Path::new(dir)));
            }
        }
    }

    result
}

fn plugins(d: &BuildDescriptor) -> ValidationResult {
    let mut validator = Validator::new();
    let mut seen = HashSet::new();

    for (i, id) in d.plugin_activations.iter().enumerate() {
        let field = format!("pluginActivations[{}]", i);
        validator = validator
            .required(&field, id)
            .pattern(&field, id, &PLUGIN_ID, "Gradle plugin id");

        if !seen.insert(id.as_str()) {
            validator = validator.error(
                ValidationError::new(field, codes::DUPLICATE_PLUGIN, format!("Plugin '{}' is listed twice", id))
                    .actual(id.as_str()),
            );
        }
    }

    let missing_android = !d.plugin_activations.is_empty()
        && !d.plugin_activations.iter().any(|p| p == ANDROID_APPLICATION_PLUGIN);

    validator
        .warn_if(
            "pluginActivations",
            codes::MISSING_ANDROID_PLUGIN,
            missing_android,
            "com.android.application is not activated",
        )
        .validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::BuildType;
    use crate::fixtures::SAMPLE;
    use crate::loader::load_str;
    use proptest::prelude::*;

    fn sample() -> BuildDescriptor {
        load_str(SAMPLE, "sample").unwrap()
    }

    fn error_codes(result: &ValidationResult) -> Vec<&str> {
        result.errors().iter().map(|e| e.code.as_str()).collect()
    }

    #[test]
    fn test_sample_is_valid() {
        let result = validate(&sample()).unwrap();
        assert!(result.is_valid());
        let warnings: Vec<_> = result.warnings().iter().map(|w| w.code.as_str()).collect();
        assert_eq!(warnings, vec![codes::RELEASE_DEBUG_SIGNING]);
    }

    #[test]
    fn test_removed_signing_config_reported_once() {
        let mut d = sample();
        d.signing_configs.remove("debug");

        let err = validate(&d).unwrap_err();
        let result = err.violations().unwrap();
        let unknown: Vec<_> = result.errors_with_code(codes::UNKNOWN_SIGNING_CONFIG).collect();

        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].field, "signingConfigs.debug");
        assert_eq!(unknown[0].actual.as_deref(), Some("debug"));
        assert!(unknown[0].message.contains("debug, release"));
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn test_min_sdk_above_compile_sdk() {
        let mut d = sample();
        d.min_sdk_version = 36;
        d.compile_sdk_version = 35;

        let err = validate(&d).unwrap_err();
        let result = err.violations().unwrap();
        let order: Vec<_> = result.errors_with_code(codes::SDK_ORDER).collect();
        assert_eq!(order.len(), 1);
        assert!(order[0].message.contains("minSdkVersion <= targetSdkVersion <= compileSdkVersion"));
        assert_eq!(order[0].actual.as_deref(), Some("36 <= 35 <= 35"));
    }

    #[test]
    fn test_all_violations_collected() {
        let mut d = sample();
        d.namespace.clear();
        d.version_code = 0;
        d.source_compatibility = "1.5".to_string();
        d.signing_configs.get_mut("debug").unwrap().key_password.clear();

        let err = validate(&d).unwrap_err();
        let result = err.violations().unwrap();
        let found = error_codes(result);
        assert!(found.contains(&"REQUIRED"));
        assert!(found.contains(&"RANGE"));
        assert!(found.contains(&"ONE_OF"));
        assert!(result
            .errors()
            .iter()
            .any(|e| e.field == "signingConfigs.debug.keyPassword"));
        assert!(result.errors().len() >= 4);
    }

    #[test]
    fn test_empty_descriptor_reports_required_fields() {
        let result = inspect(&BuildDescriptor::default());
        let fields: Vec<_> = result.errors().iter().map(|e| e.field.as_str()).collect();
        for expected in [
            "namespace",
            "applicationId",
            "versionCode",
            "compileSdkVersion",
            "minSdkVersion",
            "targetSdkVersion",
            "sourceCompatibility",
            "targetCompatibility",
        ] {
            assert!(fields.contains(&expected), "missing {}", expected);
        }
        assert!(result.errors_with_code(codes::SDK_ORDER).next().is_none());
    }

    #[test]
    fn test_namespace_format() {
        let mut d = sample();
        d.namespace = "ubicacion".to_string();
        d.application_id = "ubicacion".to_string();
        let result = inspect(&d);
        assert_eq!(result.errors_with_code("PATTERN").count(), 2);
    }

    #[test]
    fn test_application_id_divergence_warns() {
        let mut d = sample();
        d.application_id = "org.other.app".to_string();
        let result = validate(&d).unwrap();
        assert!(result
            .warnings()
            .iter()
            .any(|w| w.code == codes::APPLICATION_ID_DIVERGES));

        d.application_id = "com.example.ubicacionmx_nueva.dev".to_string();
        let result = validate(&d).unwrap();
        assert!(!result
            .warnings()
            .iter()
            .any(|w| w.code == codes::APPLICATION_ID_DIVERGES));
    }

    #[test]
    fn test_ndk_version_format() {
        let mut d = sample();
        d.ndk_version = Some("r27".to_string());
        assert_eq!(inspect(&d).errors()[0].field, "ndkVersion");
    }

    #[test]
    fn test_jvm_target_mismatch_warns() {
        let mut d = sample();
        d.jvm_target = Some("17".to_string());
        let result = validate(&d).unwrap();
        assert!(result
            .warnings()
            .iter()
            .any(|w| w.code == codes::JVM_TARGET_MISMATCH));
    }

    #[test]
    fn test_unsupported_jvm_target() {
        let mut d = sample();
        d.jvm_target = Some("1.5".to_string());
        let result = inspect(&d);
        assert_eq!(result.errors()[0].field, "jvmTarget");
    }

    #[test]
    fn test_empty_build_type_reference() {
        let mut d = sample();
        d.build_types.insert("staging".to_string(), BuildType::default());
        let result = inspect(&d);
        assert_eq!(result.errors()[0].field, "buildTypes.staging.signingConfig");
        assert_eq!(result.errors_with_code(codes::UNKNOWN_SIGNING_CONFIG).count(), 0);
    }

    #[test]
    fn test_unused_signing_config_warns() {
        let mut d = sample();
        let upload = d.signing_configs["debug"].clone();
        d.signing_configs.insert("upload".to_string(), upload);
        let result = validate(&d).unwrap();
        assert!(result
            .warnings()
            .iter()
            .any(|w| w.code == codes::UNUSED_SIGNING_CONFIG && w.field == "signingConfigs.upload"));
    }

    #[test]
    fn test_duplicate_plugin() {
        let mut d = sample();
        d.plugin_activations = vec![
            ANDROID_APPLICATION_PLUGIN.to_string(),
            ANDROID_APPLICATION_PLUGIN.to_string(),
        ];
        let result = inspect(&d);
        assert_eq!(error_codes(&result), vec![codes::DUPLICATE_PLUGIN]);
        assert_eq!(result.errors()[0].field, "pluginActivations[1]");
    }

    #[test]
    fn test_missing_android_plugin_warns() {
        let mut d = sample();
        d.plugin_activations = vec!["dev.flutter.flutter-gradle-plugin".to_string()];
        let result = validate(&d).unwrap();
        assert!(result
            .warnings()
            .iter()
            .any(|w| w.code == codes::MISSING_ANDROID_PLUGIN));
    }

    #[test]
    fn test_source_set_checks() {
        let mut d = sample();
        d.source_directory_overrides
            .insert("test".to_string(), Vec::new());
        d.source_directory_overrides.insert(
            "androidTest".to_string(),
            vec!["".to_string(), "../shared/src".to_string()],
        );

        let result = inspect(&d);
        assert!(result
            .errors()
            .iter()
            .any(|e| e.code == codes::EMPTY_SOURCE_DIRS && e.field == "sourceDirectoryOverrides.test"));
        assert!(result
            .errors()
            .iter()
            .any(|e| e.field == "sourceDirectoryOverrides.androidTest[0]"));
        assert!(result
            .warnings()
            .iter()
            .any(|w| w.code == "PATH_TRAVERSAL"));
    }

    #[test]
    fn test_check_files() {
        let dir = tempfile::tempdir().unwrap();
        let d = sample();

        let missing = check_files(&d, dir.path());
        assert_eq!(missing.errors()[0].field, "signingConfigs.debug.keystoreFile");

        std::fs::write(dir.path().join("debug.keystore"), b"keystore").unwrap();
        assert!(check_files(&d, dir.path()).is_valid());
    }

    proptest! {
        #[test]
        fn prop_valid_descriptors_have_ordered_sdk_levels(
            min in 1i32..60,
            target in 1i32..60,
            compile in 1i32..60,
        ) {
            let mut d = sample();
            d.min_sdk_version = min;
            d.target_sdk_version = target;
            d.compile_sdk_version = compile;

            match validate(&d) {
                Ok(_) => prop_assert!(min <= target && target <= compile),
                Err(err) => {
                    let result = err.violations().unwrap();
                    prop_assert!(!(min <= target && target <= compile));
                    prop_assert_eq!(result.errors_with_code(codes::SDK_ORDER).count(), 1);
                }
            }
        }
    }
}
