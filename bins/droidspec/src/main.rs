//! droidspec CLI
//!
//! Load, validate and convert Android app module build descriptors.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use droidspec_android::gradle_kts::{self, ImportReport};
use droidspec_android::{loader, validate, BuildDescriptor, DescriptorError};
use droidspec_cli::output::{format_count, format_violation, mask_secret, print_validation, Status};
use droidspec_core::config::Config;
use droidspec_core::error::{exit_codes, Error};
use droidspec_core::validation::ValidationResult;
use droidspec_telemetry::{TelemetryConfig, Timer};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "droidspec")]
#[command(about = "Validate and convert Android build descriptors")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a descriptor, listing every violation
    Check {
        /// Descriptor file (defaults to the configured path)
        file: Option<PathBuf>,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
        /// Verify that keystore files exist
        #[arg(long)]
        check_files: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the signing credential a build type resolves to
    Resolve {
        /// Build type name
        build_type: String,
        /// Descriptor file (defaults to the configured path)
        file: Option<PathBuf>,
        /// Print passwords instead of masking them
        #[arg(long)]
        show_secrets: bool,
    },

    /// Print a validated descriptor
    Dump {
        /// Descriptor file (defaults to the configured path)
        file: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = DumpFormat::Toml)]
        format: DumpFormat,
    },

    /// Convert a build.gradle.kts into a descriptor
    Import {
        /// Gradle Kotlin DSL script
        gradle: PathBuf,
        /// Write the descriptor here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a descriptor as build.gradle.kts
    Render {
        /// Descriptor file (defaults to the configured path)
        file: Option<PathBuf>,
        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
    Toml,
    Json,
}

/// Shared state for every command
struct Context {
    config: Config,
    quiet: bool,
}

impl Context {
    fn descriptor_path(&self, file: Option<PathBuf>) -> PathBuf {
        file.unwrap_or_else(|| self.config.descriptor_path())
    }

    fn success(&self, message: &str) {
        if !self.quiet {
            Status::success(message);
        }
    }

    fn info(&self, message: &str) {
        if !self.quiet {
            Status::info(message);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(e.code.exit_code());
        }
    };

    let mut telemetry = TelemetryConfig::from_verbosity(&config.schema.logging.level, cli.verbose, cli.quiet);
    if cli.no_color {
        telemetry = telemetry.without_ansi();
    }
    droidspec_telemetry::init_with_config(telemetry)?;

    let ctx = Context {
        config,
        quiet: cli.quiet,
    };

    let exit_code = match cli.command {
        Commands::Check { file, strict, check_files, json } => {
            run_check(&ctx, &ctx.descriptor_path(file), strict, check_files, json)
        }
        Commands::Resolve { build_type, file, show_secrets } => {
            run_resolve(&ctx, &ctx.descriptor_path(file), &build_type, show_secrets)
        }
        Commands::Dump { file, format } => {
            run_dump(&ctx, &ctx.descriptor_path(file), format)
        }
        Commands::Import { gradle, output } => {
            run_import(&ctx, &gradle, output.as_deref())
        }
        Commands::Render { file, output } => {
            run_render(&ctx, &ctx.descriptor_path(file), output.as_deref())
        }
    };

    std::process::exit(exit_code);
}

/// Print a failure and map it to an exit code
fn fail(err: DescriptorError) -> i32 {
    if let DescriptorError::Invalid(result) = &err {
        print_validation(result);
        Status::error(&format!(
            "Descriptor is invalid: {}",
            format_count(result.errors().len(), "error", "errors")
        ));
        return exit_codes::VALIDATION_ERROR;
    }

    let err = Error::from(err);
    Status::error(&err.to_string());
    err.code.exit_code()
}

/// Load a descriptor and require it to pass validation
fn load_valid(path: &Path) -> std::result::Result<(BuildDescriptor, ValidationResult), DescriptorError> {
    let descriptor = loader::load_file(path)?;
    let result = validate::validate(&descriptor)?;
    Ok((descriptor, result))
}

fn write_output(ctx: &Context, content: &str, output: Option<&Path>, what: &str) -> i32 {
    match output {
        Some(path) => match std::fs::write(path, content) {
            Ok(()) => {
                ctx.success(&format!("Wrote {} to {}", what, path.display()));
                exit_codes::SUCCESS
            }
            Err(e) => {
                Status::error(&format!("Failed to write {}: {}", path.display(), e));
                exit_codes::FAILURE
            }
        },
        None => {
            print!("{}", content);
            exit_codes::SUCCESS
        }
    }
}

#[derive(Serialize)]
struct CheckReport<'a> {
    file: String,
    valid: bool,
    #[serde(flatten)]
    result: &'a ValidationResult,
}

fn run_check(ctx: &Context, path: &Path, strict: bool, check_files: bool, json: bool) -> i32 {
    let timer = Timer::start("check");
    let strict = strict || ctx.config.schema.validation.strict;
    let check_files = check_files || ctx.config.schema.validation.check_files;

    let descriptor = match loader::load_file(path) {
        Ok(d) => d,
        Err(e) if json => {
            let err = Error::from(e);
            println!("{}", serde_json::to_string_pretty(&err.to_report()).unwrap_or_default());
            return err.code.exit_code();
        }
        Err(e) => return fail(e),
    };

    let mut result = validate::inspect(&descriptor);
    if check_files {
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        result.merge(validate::check_files(&descriptor, base_dir));
    }
    if strict {
        result.promote_warnings();
    }
    timer.stop();

    let exit_code = if result.is_valid() {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_ERROR
    };

    if json {
        let report = CheckReport {
            file: path.display().to_string(),
            valid: result.is_valid(),
            result: &result,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                Status::error(&format!("Failed to serialize report: {}", e));
                return exit_codes::FAILURE;
            }
        }
        return exit_code;
    }

    print_validation(&result);
    if result.is_valid() {
        ctx.success(&format!(
            "{} is valid ({})",
            path.display(),
            format_count(result.warnings().len(), "warning", "warnings")
        ));
    } else {
        Status::error(&format!(
            "{} is invalid: {}",
            path.display(),
            format_count(result.errors().len(), "error", "errors")
        ));
    }

    exit_code
}

fn run_resolve(ctx: &Context, path: &Path, build_type: &str, show_secrets: bool) -> i32 {
    let descriptor = match loader::load_file(path) {
        Ok(d) => d,
        Err(e) => return fail(e),
    };

    let credential = match descriptor.resolve_signing_config(build_type) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    let secret = |s: &str| if show_secrets { s.to_string() } else { mask_secret(s) };

    if !ctx.quiet {
        Status::header(&format!("Build type: {}", build_type));
    }
    println!("signingConfig:  {}", descriptor.build_types[build_type].signing_config);
    println!("keystoreFile:   {}", credential.keystore_file);
    println!("storePassword:  {}", secret(&credential.store_password));
    println!("keyAlias:       {}", credential.key_alias);
    println!("keyPassword:    {}", secret(&credential.key_password));

    exit_codes::SUCCESS
}

fn run_dump(ctx: &Context, path: &Path, format: DumpFormat) -> i32 {
    let (descriptor, result) = match load_valid(path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(e),
    };

    for warning in result.warnings() {
        if !ctx.quiet {
            Status::warning(&format_violation(warning));
        }
    }

    let rendered = match format {
        DumpFormat::Toml => loader::to_toml_string(&descriptor),
        DumpFormat::Json => loader::to_json_string(&descriptor).map(|s| s + "\n"),
    };

    match rendered {
        Ok(text) => write_output(ctx, &text, None, "descriptor"),
        Err(e) => fail(e),
    }
}

fn run_import(ctx: &Context, gradle: &Path, output: Option<&Path>) -> i32 {
    let ImportReport { descriptor, skipped } = match gradle_kts::import_file(gradle) {
        Ok(report) => report,
        Err(e) => return fail(e),
    };

    for entry in &skipped {
        Status::warning(&format!(
            "{} (line {}): `{}` is not a literal, left unset",
            entry.key, entry.line, entry.expression
        ));
    }

    let text = match loader::to_toml_string(&descriptor) {
        Ok(text) => text,
        Err(e) => return fail(e),
    };

    let written = write_output(ctx, &text, output, "descriptor");
    if written != exit_codes::SUCCESS {
        return written;
    }

    let result = validate::inspect(&descriptor);
    if result.is_valid() {
        // stdout may be carrying the descriptor itself
        if output.is_some() {
            ctx.info(&format!(
                "Imported descriptor is valid ({})",
                format_count(result.warnings().len(), "warning", "warnings")
            ));
        }
        exit_codes::SUCCESS
    } else {
        print_validation(&result);
        Status::warning("Imported descriptor needs edits before it validates");
        exit_codes::VALIDATION_ERROR
    }
}

fn run_render(ctx: &Context, path: &Path, output: Option<&Path>) -> i32 {
    let (descriptor, _) = match load_valid(path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(e),
    };

    write_output(ctx, &gradle_kts::render(&descriptor), output, "Gradle script")
}
