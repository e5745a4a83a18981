//! Loader configuration.
//!
//! Layered as: built-in defaults, then `uuvr-loader.toml` in the loader
//! directory (when present), then `UUVR_LOADER_*` environment variables.
//! Empty environment values are ignored. A malformed config file is an
//! error; everything else falls back to defaults.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `UUVR_LOADER_IMPL_DIR` | `implementation` | Candidate directory (relative to the loader directory) |
//! | `UUVR_LOADER_PREFIX` | `UUVR` | Artifact filename prefix |
//! | `UUVR_LOADER_EXTENSION` | platform library extension | Artifact filename extension |
//! | `UUVR_LOADER_ENTRY_SYMBOL` | `uuvr_implementation_start` | Implementation entry point |
//! | `UUVR_LOADER_GAME_DIR` | process working directory | Directory probed for host facts |
//! | `UUVR_LOADER_BACKEND` | probed | Backend override (`Mono` / `IL2CPP`) |
//! | `UUVR_LOADER_ABI` | probed | ABI tag override |
//! | `UUVR_LOADER_ENGINE_VERSION` | probed | Engine version override |
//! | `UUVR_LOADER_MARKER_VAR` | `UUVR_LOADER_ACTIVE` | Activation marker variable |
//! | `UUVR_LOADER_LOG_LEVEL` | `info` | Log filter |
//! | `UUVR_LOADER_LOG_FORMAT` | `pretty` | `pretty` or `json` |
//! | `UUVR_LOADER_LOG_FILE` | unset | Log file (stderr when unset) |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::activation::{DEFAULT_MARKER_VAR, ENTRY_SYMBOL};
use crate::discovery::ArtifactPattern;
use crate::error::ResolveError;
use crate::probe::{BackendKind, ProbeOverrides};
use crate::telemetry::{LogConfig, LogFormat};

/// Config file looked up in the loader directory.
pub const CONFIG_FILE_NAME: &str = "uuvr-loader.toml";

/// Default candidate directory, relative to the loader directory.
pub const DEFAULT_IMPL_DIR: &str = "implementation";

/// Default artifact filename prefix.
pub const DEFAULT_PREFIX: &str = "UUVR";

/// Environment keys read by [`LoaderConfig::apply_env`].
pub const ENV_KEYS: &[&str] = &[
    "UUVR_LOADER_IMPL_DIR",
    "UUVR_LOADER_PREFIX",
    "UUVR_LOADER_EXTENSION",
    "UUVR_LOADER_ENTRY_SYMBOL",
    "UUVR_LOADER_GAME_DIR",
    "UUVR_LOADER_BACKEND",
    "UUVR_LOADER_ABI",
    "UUVR_LOADER_ENGINE_VERSION",
    "UUVR_LOADER_MARKER_VAR",
    "UUVR_LOADER_LOG_LEVEL",
    "UUVR_LOADER_LOG_FORMAT",
    "UUVR_LOADER_LOG_FILE",
];

/// All loader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    pub implementation_dir: PathBuf,
    pub prefix: String,
    pub extension: String,
    pub entry_symbol: String,
    pub game_dir: Option<PathBuf>,
    pub backend: Option<String>,
    pub abi: Option<String>,
    pub engine_version: Option<String>,
    pub marker_var: String,
    pub log_level: String,
    pub log_format: String,
    pub log_file: Option<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            implementation_dir: PathBuf::from(DEFAULT_IMPL_DIR),
            prefix: DEFAULT_PREFIX.to_string(),
            extension: std::env::consts::DLL_EXTENSION.to_string(),
            entry_symbol: ENTRY_SYMBOL.to_string(),
            game_dir: None,
            backend: None,
            abi: None,
            engine_version: None,
            marker_var: DEFAULT_MARKER_VAR.to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            log_file: None,
        }
    }
}

/// Read a non-empty, trimmed env var.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Load configuration for a loader installed in `loader_dir`.
pub fn load(loader_dir: &Path) -> Result<LoaderConfig, ResolveError> {
    let file = loader_dir.join(CONFIG_FILE_NAME);
    let mut config = if file.is_file() {
        LoaderConfig::from_file(&file)?
    } else {
        LoaderConfig::default()
    };
    config.apply_env();
    Ok(config)
}

impl LoaderConfig {
    /// Parse a TOML config document.
    pub fn from_toml_str(content: &str) -> Result<Self, ResolveError> {
        toml::from_str(content).map_err(|e| ResolveError::Config(format!("invalid config: {}", e)))
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ResolveError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResolveError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Overlay `UUVR_LOADER_*` environment variables.
    pub fn apply_env(&mut self) {
        if let Some(v) = env_string("UUVR_LOADER_IMPL_DIR") {
            self.implementation_dir = PathBuf::from(v);
        }
        if let Some(v) = env_string("UUVR_LOADER_PREFIX") {
            self.prefix = v;
        }
        if let Some(v) = env_string("UUVR_LOADER_EXTENSION") {
            self.extension = v;
        }
        if let Some(v) = env_string("UUVR_LOADER_ENTRY_SYMBOL") {
            self.entry_symbol = v;
        }
        if let Some(v) = env_string("UUVR_LOADER_GAME_DIR") {
            self.game_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = env_string("UUVR_LOADER_BACKEND") {
            self.backend = Some(v);
        }
        if let Some(v) = env_string("UUVR_LOADER_ABI") {
            self.abi = Some(v);
        }
        if let Some(v) = env_string("UUVR_LOADER_ENGINE_VERSION") {
            self.engine_version = Some(v);
        }
        if let Some(v) = env_string("UUVR_LOADER_MARKER_VAR") {
            self.marker_var = v;
        }
        if let Some(v) = env_string("UUVR_LOADER_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = env_string("UUVR_LOADER_LOG_FORMAT") {
            self.log_format = v;
        }
        if let Some(v) = env_string("UUVR_LOADER_LOG_FILE") {
            self.log_file = Some(PathBuf::from(v));
        }
    }

    /// Absolute candidate directory for a loader installed in `loader_dir`.
    pub fn implementation_dir(&self, loader_dir: &Path) -> PathBuf {
        if self.implementation_dir.is_absolute() {
            self.implementation_dir.clone()
        } else {
            loader_dir.join(&self.implementation_dir)
        }
    }

    /// Directory the probe inspects.
    pub fn game_dir(&self) -> PathBuf {
        self.game_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
    }

    pub fn artifact_pattern(&self) -> Result<ArtifactPattern, ResolveError> {
        ArtifactPattern::new(&self.prefix, &self.extension)
    }

    pub fn probe_overrides(&self) -> Result<ProbeOverrides, ResolveError> {
        let backend = self
            .backend
            .as_deref()
            .map(str::parse::<BackendKind>)
            .transpose()
            .map_err(ResolveError::Config)?;
        Ok(ProbeOverrides {
            backend,
            abi_tag: self.abi.clone(),
            engine_version: self.engine_version.clone(),
        })
    }

    /// Logging settings. An unknown format falls back to pretty output.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format.parse().unwrap_or(LogFormat::Pretty),
            level: self.log_level.clone(),
            output_path: self.log_file.clone(),
        }
    }

    /// Problems worth reporting to an operator. Empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if let Err(e) = self.artifact_pattern() {
            problems.push(e.to_string());
        }
        if let Err(e) = self.probe_overrides() {
            problems.push(e.to_string());
        }
        if let Some(version) = &self.engine_version {
            if crate::version::VersionTriple::parse(version).is_unparseable() {
                problems.push(format!("engine version override '{}' is not a version", version));
            }
        }
        if self.entry_symbol.is_empty() {
            problems.push("entry symbol cannot be empty".to_string());
        }
        if self.marker_var.is_empty() || self.marker_var.contains('=') {
            problems.push(format!("marker variable '{}' is not a valid name", self.marker_var));
        }
        if self.log_format.parse::<LogFormat>().is_err() {
            problems.push(format!("log format '{}' must be pretty or json", self.log_format));
        }
        problems
    }

    /// Effective values as `(env key, value)` pairs.
    pub fn effective(&self) -> Vec<(&'static str, String)> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        let opt_path = |v: &Option<PathBuf>| v.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
        vec![
            ("UUVR_LOADER_IMPL_DIR", self.implementation_dir.display().to_string()),
            ("UUVR_LOADER_PREFIX", self.prefix.clone()),
            ("UUVR_LOADER_EXTENSION", self.extension.clone()),
            ("UUVR_LOADER_ENTRY_SYMBOL", self.entry_symbol.clone()),
            ("UUVR_LOADER_GAME_DIR", opt_path(&self.game_dir)),
            ("UUVR_LOADER_BACKEND", opt(&self.backend)),
            ("UUVR_LOADER_ABI", opt(&self.abi)),
            ("UUVR_LOADER_ENGINE_VERSION", opt(&self.engine_version)),
            ("UUVR_LOADER_MARKER_VAR", self.marker_var.clone()),
            ("UUVR_LOADER_LOG_LEVEL", self.log_level.clone()),
            ("UUVR_LOADER_LOG_FORMAT", self.log_format.clone()),
            ("UUVR_LOADER_LOG_FILE", opt_path(&self.log_file)),
        ]
    }
}

/// Serializes unit tests that mutate `UUVR_LOADER_*` variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) fn clear_env_vars() {
    for k in ENV_KEYS {
        std::env::remove_var(k);
    }
}
