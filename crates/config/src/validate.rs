//! Configuration validation.
//!
//! Reports syntax errors, unknown (usually misspelled) keys, type errors and
//! values that would make every conversion fail.

use std::path::{Path, PathBuf};

use crate::{loader, schema::BridgeConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "media.ffmpeg_path"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration file.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Known keys per section.
const KNOWN_SECTIONS: &[(&str, &[&str])] = &[
    ("media", &[
        "ffmpeg_path",
        "transcode_timeout_secs",
        "max_download_bytes",
    ]),
    ("store", &["dir"]),
    ("destination", &["server"]),
];

/// Validate the config file at `path`, or the discovered one when `None`.
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = path.map(Path::to_path_buf).or_else(loader::find_config_file);

    let Some(actual_path) = config_path else {
        let mut result = validate_config(&BridgeConfig::default());
        result.push(Severity::Info, "", "no config file found; using defaults");
        return result;
    };

    let mut result = ValidationResult {
        config_path: Some(actual_path.clone()),
        ..Default::default()
    };

    let value = match loader::load_config_value(&actual_path) {
        Ok(v) => v,
        Err(e) => {
            result.push(Severity::Error, "", format!("syntax error: {e}"));
            return result;
        },
    };
    check_unknown_keys(&value, &mut result);

    match loader::load_config(&actual_path) {
        Ok(cfg) => result
            .diagnostics
            .extend(validate_config(&cfg).diagnostics),
        Err(e) => result.push(Severity::Error, "", format!("type error: {e}")),
    }
    result
}

/// Semantic checks on an already-parsed config.
#[must_use]
pub fn validate_config(cfg: &BridgeConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if cfg.media.transcode_timeout_secs == 0 {
        result.push(
            Severity::Error,
            "media.transcode_timeout_secs",
            "must be greater than zero",
        );
    }
    if cfg.media.max_download_bytes == 0 {
        result.push(
            Severity::Error,
            "media.max_download_bytes",
            "must be greater than zero",
        );
    }
    match cfg.destination.server.as_deref() {
        Some(server) if server.trim().is_empty() => {
            result.push(Severity::Error, "destination.server", "must not be empty");
        },
        Some(server) if server.contains('@') => result.push(
            Severity::Error,
            "destination.server",
            "must be a bare server name without '@'",
        ),
        _ => {},
    }
    match &cfg.media.ffmpeg_path {
        Some(path) if !path.is_file() => result.push(
            Severity::Warning,
            "media.ffmpeg_path",
            format!("{} does not exist; falling back to PATH", path.display()),
        ),
        None if which::which("ffmpeg").is_err() => result.push(
            Severity::Warning,
            "media.ffmpeg_path",
            "ffmpeg not found in PATH; voice notes and animated images will fail",
        ),
        _ => {},
    }

    result
}

fn check_unknown_keys(value: &serde_json::Value, result: &mut ValidationResult) {
    let Some(root) = value.as_object() else {
        result.push(Severity::Error, "", "config root must be a table");
        return;
    };
    for (section, body) in root {
        let Some((_, fields)) = KNOWN_SECTIONS
            .iter()
            .find(|(name, _)| *name == section.as_str())
        else {
            result.push(Severity::Error, section.as_str(), "unknown section");
            continue;
        };
        let Some(body) = body.as_object() else {
            continue;
        };
        for key in body.keys() {
            if !fields.contains(&key.as_str()) {
                result.push(
                    Severity::Error,
                    format!("{section}.{key}"),
                    "unknown field",
                );
            }
        }
    }
}
