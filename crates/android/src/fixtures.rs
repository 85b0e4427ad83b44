//! Shared test inputs

/// The reference descriptor in TOML form
pub(crate) const SAMPLE: &str = r#"
namespace = "com.example.ubicacionmx_nueva"
compileSdkVersion = 35
ndkVersion = "27.0.12077973"
sourceCompatibility = "1.8"
targetCompatibility = "1.8"
applicationId = "com.example.ubicacionmx_nueva"
minSdkVersion = 21
targetSdkVersion = 35
versionCode = 1
versionName = "1.0"
signingConfigs.debug = { keystoreFile = "debug.keystore", storePassword = "android", keyAlias = "androiddebugkey", keyPassword = "android" }
buildTypes.release.signingConfig = "debug"
buildTypes.debug.signingConfig = "debug"
sourceDirectoryOverrides.main = ["src/main/kotlin"]
"#;

/// A Flutter host module script declaring the same configuration
pub(crate) const GRADLE_KTS: &str = r#"plugins {
    id("com.android.application")
    id("dev.flutter.flutter-gradle-plugin")
    kotlin("android")
}

android {
    namespace = "com.example.ubicacionmx_nueva"
    compileSdk = 35 // bumped for plugin compatibility
    ndkVersion = "27.0.12077973"

    compileOptions {
        sourceCompatibility = JavaVersion.VERSION_1_8
        targetCompatibility = JavaVersion.VERSION_1_8
    }

    kotlinOptions {
        jvmTarget = "1.8"
    }

    sourceSets {
        getByName("main") {
            java.srcDirs("src/main/kotlin")
        }
    }

    defaultConfig {
        applicationId = "com.example.ubicacionmx_nueva"
        minSdk = 21
        targetSdk = 35
        versionCode = 1
        versionName = "1.0"
    }

    // custom debug signing
    signingConfigs {
        getByName("debug") {
            storeFile = file("debug.keystore")
            storePassword = "android"
            keyAlias = "androiddebugkey"
            keyPassword = "android"
        }
    }

    buildTypes {
        getByName("release") {
            // release signing goes here once publishing is set up
            signingConfig = signingConfigs.getByName("debug")
        }
        getByName("debug") {
           signingConfig = signingConfigs.getByName("debug")
        }
    }
}

flutter {
    source = "../.."
}

dependencies {}"#;
