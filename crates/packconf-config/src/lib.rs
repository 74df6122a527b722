//! Configuration management for packconf
//!
//! The configuration is a small TOML file holding overrides for toolchain
//! discovery and artifact lookup. Every field is optional; the accessors fall
//! back to defaults matching a stock Swift toolchain.

pub mod platform;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "PACKCONF_CONFIG";

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const KNOWN_KEYS: &[&str] = &[
    "compiler-path",
    "compiler-name",
    "tools-version-prefix",
    "support-library",
    "support-library-dir",
    "declaration-marker",
    "build-dirs",
    "handoff-dir",
];

pub const DEFAULT_COMPILER_NAME: &str = "swiftc";
pub const DEFAULT_TOOLS_VERSION_PREFIX: &str = "swift";
pub const DEFAULT_SUPPORT_LIBRARY: &str = "PackageConfig";
pub const DEFAULT_SUPPORT_LIBRARY_DIR: &str = "lib/swift/pm";
pub const DEFAULT_DECLARATION_MARKER: &str = "PackageConfigs";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown config key: {0}. Supported keys: {keys}", keys = KNOWN_KEYS.join(", "))]
    UnknownKey(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Explicit compiler binary, skips discovery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_path: Option<String>,
    /// Compiler to discover when no explicit path is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_name: Option<String>,
    /// Tool name in the `// <tool>-tools-version:` pragma
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_version_prefix: Option<String>,
    /// Configuration-support library linked into every evaluation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_library: Option<String>,
    /// Manifest-support directory relative to the toolchain root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_library_dir: Option<String>,
    /// Marker identifying the declared library list in the manifest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration_marker: Option<String>,
    /// Build output directories searched for artifacts, relative to the manifest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_dirs: Option<Vec<String>>,
    /// Directory holding handoff files (defaults to the temp directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff_dir: Option<String>,
}

impl Config {
    pub fn path() -> PathBuf {
        // Honor explicit override for tests / isolated runs.
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        let default = Self::default_path();

        // A pointer file next to the default config redirects to another location.
        if let Some(parent) = default.parent() {
            let pointer = parent.join(".packconf_config_path");
            if let Ok(contents) = fs::read_to_string(&pointer) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
        }

        default
    }

    fn default_path() -> PathBuf {
        #[cfg(not(target_os = "windows"))]
        {
            dirs::home_dir().map_or_else(
                || PathBuf::from(".config/packconf/packconf.toml"),
                |h| h.join(".config").join("packconf").join("packconf.toml"),
            )
        }

        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map_or_else(
                || PathBuf::from("config\\packconf\\packconf.toml"),
                |c| c.join("packconf").join("packconf.toml"),
            )
        }
    }

    /// Path of the pointer file used by `config path <new>`
    pub fn pointer_path() -> PathBuf {
        Self::default_path()
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(".packconf_config_path")
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path())
    }

    /// Load from `path`, returning the default config if the file doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::path())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "compiler-path" => self.compiler_path.clone(),
            "compiler-name" => self.compiler_name.clone(),
            "tools-version-prefix" => self.tools_version_prefix.clone(),
            "support-library" => self.support_library.clone(),
            "support-library-dir" => self.support_library_dir.clone(),
            "declaration-marker" => self.declaration_marker.clone(),
            "build-dirs" => self.build_dirs.as_ref().map(|dirs| dirs.join(",")),
            "handoff-dir" => self.handoff_dir.clone(),
            _ => None,
        }
    }

    /// Set a key; `build-dirs` takes a comma-separated list
    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "compiler-path" => self.compiler_path = Some(value),
            "compiler-name" => self.compiler_name = Some(value),
            "tools-version-prefix" => self.tools_version_prefix = Some(value),
            "support-library" => self.support_library = Some(value),
            "support-library-dir" => self.support_library_dir = Some(value),
            "declaration-marker" => self.declaration_marker = Some(value),
            "build-dirs" => {
                self.build_dirs = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                );
            }
            "handoff-dir" => self.handoff_dir = Some(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Config::default()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KNOWN_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    pub fn compiler_name(&self) -> &str {
        self.compiler_name
            .as_deref()
            .unwrap_or(DEFAULT_COMPILER_NAME)
    }

    pub fn tools_version_prefix(&self) -> &str {
        self.tools_version_prefix
            .as_deref()
            .unwrap_or(DEFAULT_TOOLS_VERSION_PREFIX)
    }

    pub fn support_library(&self) -> &str {
        self.support_library
            .as_deref()
            .unwrap_or(DEFAULT_SUPPORT_LIBRARY)
    }

    pub fn support_library_dir(&self) -> &str {
        self.support_library_dir
            .as_deref()
            .unwrap_or(DEFAULT_SUPPORT_LIBRARY_DIR)
    }

    pub fn declaration_marker(&self) -> &str {
        self.declaration_marker
            .as_deref()
            .unwrap_or(DEFAULT_DECLARATION_MARKER)
    }

    /// Build output directories for a package rooted at `package_root`
    pub fn build_dirs(&self, package_root: &Path) -> Vec<PathBuf> {
        match &self.build_dirs {
            Some(dirs) => dirs.iter().map(|d| package_root.join(d)).collect(),
            None => platform::default_build_dirs(package_root),
        }
    }

    /// Directory holding handoff files
    pub fn handoff_dir(&self) -> PathBuf {
        self.handoff_dir
            .as_ref()
            .map_or_else(std::env::temp_dir, PathBuf::from)
    }
}
