//! Gradle Kotlin DSL bridge
//!
//! [`import`] extracts a [`BuildDescriptor`] from an app module's
//! `build.gradle.kts`; [`render`] writes one back out. Extraction is
//! structural: the script is split into block headers and statements, and
//! only literal assignments in known blocks are taken. Anything computed
//! (`flutter.minSdkVersion`, `System.getenv(..)`) is reported as skipped.

use crate::descriptor::{BuildDescriptor, BuildType, FlutterConfig, JavaVersion};
use crate::error::DescriptorError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+)$").unwrap());

static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"((?:[^"\\$]|\\.)*)"$"#).unwrap());

static INT_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());

static NAMED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:getByName|create|named|register|maybeCreate)\(\s*"([^"]+)"\s*\)$"#).unwrap()
});

static PLUGIN_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^id\(\s*"([^"]+)"\s*\)(.*)$"#).unwrap());

static KOTLIN_PLUGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^kotlin\(\s*"([^"]+)"\s*\)(.*)$"#).unwrap());

static BACKTICK_PLUGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^`([^`]+)`$").unwrap());

static FILE_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^file\((.*)\)$").unwrap());

static SIGNING_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^signingConfigs(?:\.getByName\(\s*"([^"]+)"\s*\)|\[\s*"([^"]+)"\s*\])$"#).unwrap()
});

static SRC_DIRS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:java|kotlin)\.(?:srcDirs?|setSrcDirs)\((.*)\)$").unwrap()
});

static JAVA_CONSTANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^JavaVersion\.(VERSION_[0-9_]+)(?:\.toString\(\))?$").unwrap());

static JAVA_TO_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^JavaVersion\.toVersion\(\s*"?([0-9.]+)"?\s*\)$"#).unwrap());

static JVM_TARGET_CONSTANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^JvmTarget\.JVM_([0-9_]+)$").unwrap());

static JVM_TARGET_SET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^jvmTarget\.set\((.+)\)$").unwrap());

/// Outcome of importing a Gradle script
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// Everything that could be read as a literal
    pub descriptor: BuildDescriptor,
    /// Assignments to known settings whose value is not a literal
    pub skipped: Vec<SkippedAssignment>,
}

/// A recognised setting that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAssignment {
    /// 1-based line where the statement starts
    pub line: usize,
    /// Dotted block path and key, e.g. `android.defaultConfig.minSdk`
    pub key: String,
    /// Source text of the value
    pub expression: String,
}

/// Extract a descriptor from `build.gradle.kts` text
///
/// # Errors
///
/// [`DescriptorError::Malformed`] when braces do not balance.
pub fn import(content: &str, source_name: &str) -> Result<ImportReport, DescriptorError> {
    let mut importer = Importer::default();
    let mut stack: Vec<String> = Vec::new();
    let mut last_line = 1;

    for token in tokenize(content) {
        match token {
            Token::Open { header, line } => {
                stack.push(block_name(&header));
                importer.open(&path_of(&stack));
                last_line = line;
            }
            Token::Close { line } => {
                if stack.pop().is_none() {
                    return Err(DescriptorError::Malformed {
                        source_name: source_name.to_string(),
                        line: Some(line),
                        message: "unexpected '}'".to_string(),
                    });
                }
                last_line = line;
            }
            Token::Statement { text, line } => {
                importer.statement(&path_of(&stack), &text, line);
                last_line = line;
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(DescriptorError::Malformed {
            source_name: source_name.to_string(),
            line: Some(last_line),
            message: format!("unclosed block '{}'", open),
        });
    }

    tracing::debug!(
        source = source_name,
        skipped = importer.skipped.len(),
        "Imported Gradle script"
    );

    Ok(ImportReport {
        descriptor: importer.descriptor,
        skipped: importer.skipped,
    })
}

/// Read and import a `build.gradle.kts` file
pub fn import_file(path: &Path) -> Result<ImportReport, DescriptorError> {
    let content = std::fs::read_to_string(path).map_err(|e| DescriptorError::io(path, e))?;
    import(&content, &path.display().to_string())
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Open { header: String, line: usize },
    Statement { text: String, line: usize },
    Close { line: usize },
}

/// Split a script into block openings, statements and block closings.
///
/// Newlines inside parentheses do not end a statement; comments are dropped.
fn tokenize(content: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut buf_line = 1;
    let mut line = 1;
    let mut in_string = false;
    let mut paren_depth = 0i32;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            buf.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        buf.push(escaped);
                    }
                }
                '"' => in_string = false,
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }

        match c {
            '/' if chars.peek() == Some(&'/') => {
                while chars.peek().is_some_and(|&n| n != '\n') {
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if n == '\n' {
                        line += 1;
                    }
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            '{' => {
                tokens.push(Token::Open {
                    header: buf.trim().to_string(),
                    line: if buf.trim().is_empty() { line } else { buf_line },
                });
                buf.clear();
            }
            '}' => {
                flush(&mut tokens, &mut buf, buf_line);
                tokens.push(Token::Close { line });
            }
            '\n' => {
                if paren_depth > 0 || continues(&buf) {
                    buf.push(' ');
                } else {
                    flush(&mut tokens, &mut buf, buf_line);
                }
                line += 1;
            }
            ';' if paren_depth <= 0 => flush(&mut tokens, &mut buf, buf_line),
            _ => {
                match c {
                    '"' => in_string = true,
                    '(' => paren_depth += 1,
                    ')' => paren_depth -= 1,
                    _ => {}
                }
                if buf.trim().is_empty() && !c.is_whitespace() {
                    buf_line = line;
                }
                buf.push(c);
            }
        }
    }

    flush(&mut tokens, &mut buf, buf_line);
    tokens
}

/// A statement ending in `=` or a binary operator carries on to the next line
fn continues(buf: &str) -> bool {
    let text = buf.trim_end();
    if text.ends_with("++") || text.ends_with("--") {
        return false;
    }
    text.ends_with(['=', '+', '-', '*', '/', '%', '&', '|', ',', ':', '.'])
}

fn flush(tokens: &mut Vec<Token>, buf: &mut String, line: usize) {
    let text = buf.trim();
    if !text.is_empty() {
        tokens.push(Token::Statement {
            text: text.to_string(),
            line,
        });
    }
    buf.clear();
}

/// `getByName("debug")` and friends name the block after their argument
fn block_name(header: &str) -> String {
    NAMED_BLOCK
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| header.to_string(), |m| m.as_str().to_string())
}

fn path_of(stack: &[String]) -> Vec<&str> {
    stack.iter().map(String::as_str).collect()
}

/// Split a call's argument list on top-level commas
fn split_args(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in args.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    parts.push(args[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

enum Literal {
    Str(String),
    Int(i32),
    Other,
}

fn literal(expr: &str) -> Literal {
    let expr = expr.trim();
    if let Some(caps) = STRING_LITERAL.captures(expr) {
        return Literal::Str(unescape(&caps[1]));
    }
    if INT_LITERAL.is_match(expr) {
        if let Ok(n) = expr.parse() {
            return Literal::Int(n);
        }
    }
    Literal::Other
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Language level from a string literal or a `JavaVersion`/`JvmTarget` expression
fn java_level(expr: &str) -> Option<String> {
    let expr = expr.trim();
    if let Literal::Str(s) = literal(expr) {
        return Some(s);
    }
    if let Some(caps) = JAVA_CONSTANT.captures(expr) {
        let constant = &caps[1];
        return Some(match JavaVersion::from_gradle_constant(constant) {
            Some(v) => v.as_str().to_string(),
            None => constant.trim_start_matches("VERSION_").replace('_', "."),
        });
    }
    if let Some(caps) = JAVA_TO_VERSION.captures(expr) {
        return Some(caps[1].to_string());
    }
    JVM_TARGET_CONSTANT
        .captures(expr)
        .map(|caps| caps[1].replace('_', "."))
}

#[derive(Default)]
struct Importer {
    descriptor: BuildDescriptor,
    skipped: Vec<SkippedAssignment>,
}

impl Importer {
    fn open(&mut self, path: &[&str]) {
        if let ["android", "signingConfigs", name] = path {
            self.descriptor
                .signing_configs
                .entry((*name).to_string())
                .or_default();
        }
    }

    fn statement(&mut self, path: &[&str], text: &str, line: usize) {
        match path {
            ["plugins"] => self.plugin(text, line),
            ["android", "sourceSets", set] => self.source_dirs(path, set, text, line),
            ["android", "kotlinOptions"] | ["kotlin", "compilerOptions"]
                if JVM_TARGET_SET.is_match(text) =>
            {
                if let Some(caps) = JVM_TARGET_SET.captures(text) {
                    self.jvm_target(path, &caps[1], line);
                }
            }
            _ => {
                let Some(caps) = ASSIGNMENT.captures(text) else {
                    tracing::trace!(line, statement = text, "Ignoring statement");
                    return;
                };
                let key = caps[1].to_string();
                let expr = caps[2].trim().to_string();
                self.assignment(path, &key, &expr, line);
            }
        }
    }

    fn assignment(&mut self, path: &[&str], key: &str, expr: &str, line: usize) {
        match (path, key) {
            (["android"], "namespace") => {
                if let Some(v) = self.string(path, key, expr, line) {
                    self.descriptor.namespace = v;
                }
            }
            (["android"], "compileSdk" | "compileSdkVersion") => {
                if let Some(v) = self.int(path, key, expr, line) {
                    self.descriptor.compile_sdk_version = v;
                }
            }
            (["android"], "ndkVersion") => {
                self.descriptor.ndk_version = self.string(path, key, expr, line);
            }
            (["android", "compileOptions"], "sourceCompatibility") => {
                if let Some(v) = self.level(path, key, expr, line) {
                    self.descriptor.source_compatibility = v;
                }
            }
            (["android", "compileOptions"], "targetCompatibility") => {
                if let Some(v) = self.level(path, key, expr, line) {
                    self.descriptor.target_compatibility = v;
                }
            }
            (["android", "kotlinOptions"] | ["kotlin", "compilerOptions"], "jvmTarget") => {
                self.jvm_target(path, expr, line);
            }
            (["android", "defaultConfig"], "applicationId") => {
                if let Some(v) = self.string(path, key, expr, line) {
                    self.descriptor.application_id = v;
                }
            }
            (["android", "defaultConfig"], "minSdk" | "minSdkVersion") => {
                if let Some(v) = self.int(path, key, expr, line) {
                    self.descriptor.min_sdk_version = v;
                }
            }
            (["android", "defaultConfig"], "targetSdk" | "targetSdkVersion") => {
                if let Some(v) = self.int(path, key, expr, line) {
                    self.descriptor.target_sdk_version = v;
                }
            }
            (["android", "defaultConfig"], "versionCode") => {
                if let Some(v) = self.int(path, key, expr, line) {
                    self.descriptor.version_code = v;
                }
            }
            (["android", "defaultConfig"], "versionName") => {
                if let Some(v) = self.string(path, key, expr, line) {
                    self.descriptor.version_name = v;
                }
            }
            (["android", "signingConfigs", name], _) => self.signing_field(path, name, key, expr, line),
            (["android", "buildTypes", name], "signingConfig") => {
                let target = SIGNING_REF
                    .captures(expr)
                    .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
                    .map(|m| m.as_str().to_string());
                match target {
                    Some(target) => {
                        self.descriptor
                            .build_types
                            .insert((*name).to_string(), BuildType::signed_with(target));
                    }
                    None => self.skip(path, key, expr, line),
                }
            }
            (["flutter"], "source") => {
                if let Some(source) = self.string(path, key, expr, line) {
                    self.descriptor.flutter = Some(FlutterConfig { source });
                }
            }
            _ => tracing::trace!(line, key, "Ignoring assignment"),
        }
    }

    fn signing_field(&mut self, path: &[&str], name: &str, key: &str, expr: &str, line: usize) {
        let value = match key {
            "storeFile" => match FILE_CALL.captures(expr).map(|caps| literal(&caps[1])) {
                Some(Literal::Str(file)) => Some(file),
                _ => {
                    self.skip(path, key, expr, line);
                    None
                }
            },
            "storePassword" | "keyAlias" | "keyPassword" => self.string(path, key, expr, line),
            _ => return,
        };

        let Some(value) = value else { return };
        let cred = self
            .descriptor
            .signing_configs
            .entry(name.to_string())
            .or_default();
        match key {
            "storeFile" => cred.keystore_file = value,
            "storePassword" => cred.store_password = value,
            "keyAlias" => cred.key_alias = value,
            _ => cred.key_password = value,
        }
    }

    fn plugin(&mut self, text: &str, line: usize) {
        let (id, rest) = if let Some(caps) = PLUGIN_ID.captures(text) {
            (caps[1].to_string(), caps[2].to_string())
        } else if let Some(caps) = KOTLIN_PLUGIN.captures(text) {
            (format!("org.jetbrains.kotlin.{}", &caps[1]), caps[2].to_string())
        } else if let Some(caps) = BACKTICK_PLUGIN.captures(text) {
            (caps[1].to_string(), String::new())
        } else {
            self.skipped.push(SkippedAssignment {
                line,
                key: "plugins".to_string(),
                expression: text.to_string(),
            });
            return;
        };

        if rest.contains("apply false") {
            tracing::trace!(plugin = %id, "Plugin declared but not applied");
            return;
        }
        if !self.descriptor.plugin_activations.contains(&id) {
            self.descriptor.plugin_activations.push(id);
        }
    }

    fn source_dirs(&mut self, path: &[&str], set: &str, text: &str, line: usize) {
        let Some(caps) = SRC_DIRS.captures(text) else {
            return;
        };

        let mut found = Vec::new();
        for arg in split_args(&caps[1]) {
            match literal(arg) {
                Literal::Str(dir) => found.push(dir),
                _ => self.skip(path, "srcDirs", arg, line),
            }
        }

        let dirs = self
            .descriptor
            .source_directory_overrides
            .entry(set.to_string())
            .or_default();
        for dir in found {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
    }

    fn jvm_target(&mut self, path: &[&str], expr: &str, line: usize) {
        if let Some(v) = self.level(path, "jvmTarget", expr, line) {
            self.descriptor.jvm_target = Some(v);
        }
    }

    fn string(&mut self, path: &[&str], key: &str, expr: &str, line: usize) -> Option<String> {
        match literal(expr) {
            Literal::Str(s) => Some(s),
            _ => {
                self.skip(path, key, expr, line);
                None
            }
        }
    }

    fn int(&mut self, path: &[&str], key: &str, expr: &str, line: usize) -> Option<i32> {
        match literal(expr) {
            Literal::Int(n) => Some(n),
            _ => {
                self.skip(path, key, expr, line);
                None
            }
        }
    }

    fn level(&mut self, path: &[&str], key: &str, expr: &str, line: usize) -> Option<String> {
        let level = java_level(expr);
        if level.is_none() {
            self.skip(path, key, expr, line);
        }
        level
    }

    fn skip(&mut self, path: &[&str], key: &str, expr: &str, line: usize) {
        let key = format!("{}.{}", path.join("."), key);
        tracing::debug!(line, key = %key, expression = expr, "Skipping non-literal assignment");
        self.skipped.push(SkippedAssignment {
            line,
            key,
            expression: expr.to_string(),
        });
    }
}

/// Render a descriptor as a `build.gradle.kts` app module script
pub fn render(d: &BuildDescriptor) -> String {
    let mut out = String::new();

    if !d.plugin_activations.is_empty() {
        out.push_str("plugins {\n");
        for id in &d.plugin_activations {
            match id.strip_prefix("org.jetbrains.kotlin.") {
                Some(short) => push(&mut out, 1, &format!("kotlin({})", kotlin_string(short))),
                None => push(&mut out, 1, &format!("id({})", kotlin_string(id))),
            }
        }
        out.push_str("}\n\n");
    }

    out.push_str("android {\n");
    if !d.namespace.is_empty() {
        push(&mut out, 1, &format!("namespace = {}", kotlin_string(&d.namespace)));
    }
    if d.compile_sdk_version != 0 {
        push(&mut out, 1, &format!("compileSdk = {}", d.compile_sdk_version));
    }
    if let Some(ndk) = &d.ndk_version {
        push(&mut out, 1, &format!("ndkVersion = {}", kotlin_string(ndk)));
    }

    if !d.source_compatibility.is_empty() || !d.target_compatibility.is_empty() {
        out.push('\n');
        push(&mut out, 1, "compileOptions {");
        if !d.source_compatibility.is_empty() {
            push(&mut out, 2, &format!("sourceCompatibility = {}", java_expr(&d.source_compatibility)));
        }
        if !d.target_compatibility.is_empty() {
            push(&mut out, 2, &format!("targetCompatibility = {}", java_expr(&d.target_compatibility)));
        }
        push(&mut out, 1, "}");
    }

    if let Some(jvm_target) = &d.jvm_target {
        out.push('\n');
        push(&mut out, 1, "kotlinOptions {");
        push(&mut out, 2, &format!("jvmTarget = {}", kotlin_string(jvm_target)));
        push(&mut out, 1, "}");
    }

    if !d.source_directory_overrides.is_empty() {
        out.push('\n');
        push(&mut out, 1, "sourceSets {");
        for (set, dirs) in &d.source_directory_overrides {
            push(&mut out, 2, &format!("getByName({}) {{", kotlin_string(set)));
            let args: Vec<String> = dirs.iter().map(|dir| kotlin_string(dir)).collect();
            push(&mut out, 3, &format!("java.srcDirs({})", args.join(", ")));
            push(&mut out, 2, "}");
        }
        push(&mut out, 1, "}");
    }

    out.push('\n');
    push(&mut out, 1, "defaultConfig {");
    if !d.application_id.is_empty() {
        push(&mut out, 2, &format!("applicationId = {}", kotlin_string(&d.application_id)));
    }
    for (key, value) in [
        ("minSdk", d.min_sdk_version),
        ("targetSdk", d.target_sdk_version),
        ("versionCode", d.version_code),
    ] {
        if value != 0 {
            push(&mut out, 2, &format!("{} = {}", key, value));
        }
    }
    if !d.version_name.is_empty() {
        push(&mut out, 2, &format!("versionName = {}", kotlin_string(&d.version_name)));
    }
    push(&mut out, 1, "}");

    if !d.signing_configs.is_empty() {
        out.push('\n');
        push(&mut out, 1, "signingConfigs {");
        for (name, cred) in &d.signing_configs {
            push(&mut out, 2, &format!("{} {{", named_block(name, &["debug"])));
            if !cred.keystore_file.is_empty() {
                push(&mut out, 3, &format!("storeFile = file({})", kotlin_string(&cred.keystore_file)));
            }
            for (key, value) in [
                ("storePassword", &cred.store_password),
                ("keyAlias", &cred.key_alias),
                ("keyPassword", &cred.key_password),
            ] {
                if !value.is_empty() {
                    push(&mut out, 3, &format!("{} = {}", key, kotlin_string(value)));
                }
            }
            push(&mut out, 2, "}");
        }
        push(&mut out, 1, "}");
    }

    if !d.build_types.is_empty() {
        out.push('\n');
        push(&mut out, 1, "buildTypes {");
        for (name, build_type) in &d.build_types {
            push(&mut out, 2, &format!("{} {{", named_block(name, &["debug", "release"])));
            if !build_type.signing_config.is_empty() {
                push(
                    &mut out,
                    3,
                    &format!(
                        "signingConfig = signingConfigs.getByName({})",
                        kotlin_string(&build_type.signing_config)
                    ),
                );
            }
            push(&mut out, 2, "}");
        }
        push(&mut out, 1, "}");
    }
    out.push_str("}\n");

    if let Some(flutter) = &d.flutter {
        out.push_str("\nflutter {\n");
        push(&mut out, 1, &format!("source = {}", kotlin_string(&flutter.source)));
        out.push_str("}\n");
    }

    out
}

fn push(out: &mut String, indent: usize, text: &str) {
    out.push_str(&"    ".repeat(indent));
    out.push_str(text);
    out.push('\n');
}

/// AGP predeclares some containers' entries; everything else must be created
fn named_block(name: &str, predeclared: &[&str]) -> String {
    if predeclared.contains(&name) {
        format!("getByName({})", kotlin_string(name))
    } else {
        format!("create({})", kotlin_string(name))
    }
}

fn java_expr(level: &str) -> String {
    match level.parse::<JavaVersion>() {
        Ok(v) => format!("JavaVersion.{}", v.gradle_constant()),
        Err(_) => format!("JavaVersion.toVersion({})", kotlin_string(level)),
    }
}

fn kotlin_string(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('\n', "\\n")
        .replace('\t', "\\t");
    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{GRADLE_KTS, SAMPLE};
    use crate::loader::load_str;

    fn expected_from_gradle() -> BuildDescriptor {
        let mut d = load_str(SAMPLE, "sample").unwrap();
        d.plugin_activations = vec![
            "com.android.application".to_string(),
            "dev.flutter.flutter-gradle-plugin".to_string(),
            "org.jetbrains.kotlin.android".to_string(),
        ];
        d.jvm_target = Some("1.8".to_string());
        d.flutter = Some(FlutterConfig {
            source: "../..".to_string(),
        });
        d
    }

    #[test]
    fn test_import_flutter_module() {
        let report = import(GRADLE_KTS, "build.gradle.kts").unwrap();
        assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
        assert_eq!(report.descriptor, expected_from_gradle());
    }

    #[test]
    fn test_render_then_import() {
        let d = expected_from_gradle();
        let script = render(&d);
        let report = import(&script, "rendered").unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(report.descriptor, d);
    }

    #[test]
    fn test_render_shape() {
        let script = render(&expected_from_gradle());
        assert!(script.starts_with("plugins {\n    id(\"com.android.application\")\n"));
        assert!(script.contains("    kotlin(\"android\")\n"));
        assert!(script.contains("sourceCompatibility = JavaVersion.VERSION_1_8"));
        assert!(script.contains("storeFile = file(\"debug.keystore\")"));
        assert!(script.contains("signingConfig = signingConfigs.getByName(\"debug\")"));
        assert!(script.ends_with("flutter {\n    source = \"../..\"\n}\n"));
    }

    #[test]
    fn test_render_creates_custom_entries() {
        let mut d = expected_from_gradle();
        let cred = d.signing_configs["debug"].clone();
        d.signing_configs.insert("upload".to_string(), cred);
        d.build_types
            .insert("staging".to_string(), BuildType::signed_with("upload"));

        let script = render(&d);
        assert!(script.contains("create(\"upload\") {"));
        assert!(script.contains("create(\"staging\") {"));
        assert_eq!(import(&script, "rendered").unwrap().descriptor, d);
    }

    #[test]
    fn test_non_literal_values_are_skipped() {
        let script = r#"
android {
    namespace = "com.example.app"
    compileSdk = flutter.compileSdkVersion
    defaultConfig {
        minSdk = flutter.minSdkVersion
        versionCode = 7
    }
    signingConfigs {
        create("release") {
            storeFile = file(System.getenv("KEYSTORE"))
            storePassword = System.getenv("STORE_PASSWORD")
            keyAlias = "upload"
        }
    }
}
"#;
        let report = import(script, "flutter-template").unwrap();
        let keys: Vec<_> = report.skipped.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "android.compileSdk",
                "android.defaultConfig.minSdk",
                "android.signingConfigs.release.storeFile",
                "android.signingConfigs.release.storePassword",
            ]
        );
        assert_eq!(report.skipped[1].line, 6);
        assert_eq!(report.descriptor.version_code, 7);
        assert_eq!(report.descriptor.signing_configs["release"].key_alias, "upload");
        assert!(report.descriptor.signing_configs["release"].keystore_file.is_empty());
    }

    #[test]
    fn test_plugin_forms() {
        let script = r#"
plugins {
    id("com.android.application") version "8.7.0"
    id("org.jetbrains.kotlin.android") version "2.0.0" apply false
    `kotlin-android`
    alias(libs.plugins.compose)
}
"#;
        let report = import(script, "plugins").unwrap();
        assert_eq!(
            report.descriptor.plugin_activations,
            vec!["com.android.application", "kotlin-android"]
        );
        assert_eq!(report.skipped[0].expression, "alias(libs.plugins.compose)");
    }

    #[test]
    fn test_language_level_forms() {
        let script = r#"
android {
    compileOptions {
        sourceCompatibility = JavaVersion.VERSION_17
        targetCompatibility = JavaVersion.toVersion("11")
    }
    kotlinOptions { jvmTarget = JavaVersion.VERSION_1_8.toString() }
}
kotlin {
    compilerOptions {
        jvmTarget.set(JvmTarget.JVM_17)
    }
}
"#;
        let d = import(script, "levels").unwrap().descriptor;
        assert_eq!(d.source_compatibility, "17");
        assert_eq!(d.target_compatibility, "11");
        assert_eq!(d.jvm_target.as_deref(), Some("17"));
    }

    #[test]
    fn test_multiline_source_dirs() {
        let script = "android {\n    sourceSets {\n        getByName(\"main\") {\n            java.srcDirs(\n                \"src/main/kotlin\",\n                \"src/main/generated\"\n            )\n        }\n    }\n}\n";
        let d = import(script, "dirs").unwrap().descriptor;
        assert_eq!(
            d.source_directory_overrides["main"],
            vec!["src/main/kotlin", "src/main/generated"]
        );
    }

    #[test]
    fn test_escaped_paths_survive_render() {
        let mut d = expected_from_gradle();
        d.source_directory_overrides.insert(
            "main".to_string(),
            vec![
                "src/main/kotlin".to_string(),
                "build/$gen".to_string(),
                "src\\win".to_string(),
                "odd\"dir".to_string(),
            ],
        );
        d.signing_configs.get_mut("debug").unwrap().keystore_file = "keys/$HOME\\k\"s.jks".to_string();

        let script = render(&d);
        let report = import(&script, "rendered").unwrap();
        assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
        assert_eq!(report.descriptor, d);
    }

    #[test]
    fn test_computed_source_dirs_are_skipped() {
        let script = "android {\n    sourceSets {\n        getByName(\"main\") {\n            java.srcDirs(\"src/a\", file(\"gen, more\"), \"src/b\")\n        }\n    }\n}\n";
        let report = import(script, "dirs").unwrap();
        assert_eq!(
            report.descriptor.source_directory_overrides["main"],
            vec!["src/a", "src/b"]
        );
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].key, "android.sourceSets.main.srcDirs");
        assert_eq!(report.skipped[0].expression, "file(\"gen, more\")");
        assert_eq!(report.skipped[0].line, 4);
    }

    #[test]
    fn test_assignment_wrapped_onto_next_line() {
        let script = "android {\n    namespace =\n        \"com.example.app\"\n    compileSdk = 30 +\n        5\n    defaultConfig {\n        versionCode--\n        versionName = \"2.0\"\n    }\n}\n";
        let report = import(script, "wrapped").unwrap();
        assert_eq!(report.descriptor.namespace, "com.example.app");
        assert_eq!(report.descriptor.version_name, "2.0");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].key, "android.compileSdk");
        assert_eq!(report.skipped[0].line, 4);
    }

    #[test]
    fn test_split_args() {
        assert_eq!(
            split_args(r#""a, b", f(1, 2), "c\"," "#),
            vec![r#""a, b""#, "f(1, 2)", r#""c\",""#]
        );
        assert!(split_args("  ").is_empty());
    }

    #[test]
    fn test_signing_ref_index_syntax() {
        let script = "android {\n    buildTypes {\n        release {\n            signingConfig = signingConfigs[\"upload\"]\n        }\n    }\n}\n";
        let d = import(script, "index").unwrap().descriptor;
        assert_eq!(d.build_types["release"], BuildType::signed_with("upload"));
    }

    #[test]
    fn test_unbalanced_braces() {
        let err = import("android {\n    namespace = \"a.b\"\n", "open").unwrap_err();
        assert!(err.to_string().contains("unclosed block 'android'"));

        match import("}\n", "close") {
            Err(DescriptorError::Malformed { line, .. }) => assert_eq!(line, Some(1)),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_tokenize_strips_comments() {
        let tokens = tokenize("a = \"x // not a comment\" // comment\n/* block\n */ b = 2");
        assert_eq!(
            tokens,
            vec![
                Token::Statement {
                    text: "a = \"x // not a comment\"".to_string(),
                    line: 1
                },
                Token::Statement {
                    text: "b = 2".to_string(),
                    line: 3
                },
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(kotlin_string("a\"b$c"), "\"a\\\"b\\$c\"");
        match literal("\"a\\\"b\\$c\"") {
            Literal::Str(s) => assert_eq!(s, "a\"b$c"),
            _ => panic!("expected string literal"),
        }
        assert!(matches!(literal("\"${rootDir}/key\""), Literal::Other));
    }
}
