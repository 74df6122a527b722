//! Compiler and manifest-support library discovery
//!
//! The compiler is found from, in order, an explicit `compiler-path` in the
//! config, `xcrun --find` on macOS, then a `PATH` lookup. The manifest-support
//! directory sits next to it in the toolchain (`<root>/bin/swiftc` gives
//! `<root>/lib/swift/pm`) and holds one subdirectory per supported version.

use crate::errors::EvalError;
use packconf_config::Config;
use packconf_logger as logger;
use packconf_manifest::ToolsVersion;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Library every manifest links against
pub const MANIFEST_LIBRARY: &str = "PackageDescription";

/// A located toolchain, ready to evaluate a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolchain {
    /// Compiler binary
    pub compiler: PathBuf,
    /// Manifest-support directory holding the version subdirectories
    pub support_dir: PathBuf,
    /// Selected version subdirectory
    pub version_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_version: Option<ToolsVersion>,
}

impl Toolchain {
    /// Search, link and language-mode flags for the manifest-support library
    pub fn manifest_flags(&self) -> Vec<String> {
        let dir = self.version_dir.display().to_string();
        let mut flags = vec![
            "-L".to_string(),
            dir.clone(),
            "-I".to_string(),
            dir,
            format!("-l{}", MANIFEST_LIBRARY),
        ];
        if let Some(version) = self.tools_version {
            flags.push("-swift-version".to_string());
            flags.push(version.major.to_string());
        }
        flags
    }
}

pub struct ToolchainLocator<'a> {
    config: &'a Config,
}

impl<'a> ToolchainLocator<'a> {
    pub fn new(config: &'a Config) -> Self {
        ToolchainLocator { config }
    }

    /// Find the compiler and the support library version for `tools_version`
    pub fn locate(&self, tools_version: Option<ToolsVersion>) -> Result<Toolchain, EvalError> {
        let compiler = self.find_compiler()?;
        logger::debug(&format!("Using compiler at {}", compiler.display()));

        let support_dir = support_dir_for(&compiler, self.config.support_library_dir());
        let version_dir = select_version_dir(&support_dir, tools_version)?;
        logger::debug(&format!(
            "Using manifest-support library at {}",
            version_dir.display()
        ));

        Ok(Toolchain {
            compiler,
            support_dir,
            version_dir,
            tools_version,
        })
    }

    fn find_compiler(&self) -> Result<PathBuf, EvalError> {
        let name = self.config.compiler_name();

        if let Some(path) = &self.config.compiler_path {
            let path = PathBuf::from(path);
            if !path.is_file() {
                return Err(EvalError::CompilerNotFound {
                    compiler: path.display().to_string(),
                    reason: "configured compiler-path does not exist".to_string(),
                });
            }
            return Ok(canonical(path));
        }

        if cfg!(target_os = "macos") {
            if let Some(path) = xcrun_find(name) {
                return Ok(canonical(path));
            }
        }

        which::which(name)
            .map(canonical)
            .map_err(|e| EvalError::CompilerNotFound {
                compiler: name.to_string(),
                reason: e.to_string(),
            })
    }
}

fn canonical(path: PathBuf) -> PathBuf {
    fs::canonicalize(&path).unwrap_or(path)
}

fn xcrun_find(name: &str) -> Option<PathBuf> {
    logger::debug(&format!("Asking xcrun for {}", name));
    let output = std::process::Command::new("xcrun")
        .args(["--find", name])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

/// Manifest-support directory for a compiler at `<root>/bin/<compiler>`
pub fn support_dir_for(compiler: &Path, relative: &str) -> PathBuf {
    let root = compiler
        .parent()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new("/"));
    root.join(relative)
}

/// Pick the version subdirectory of `support_dir`.
///
/// A pragma version wins when one of its directory spellings is installed;
/// otherwise the lexically greatest installed version is used.
pub fn select_version_dir(
    support_dir: &Path,
    tools_version: Option<ToolsVersion>,
) -> Result<PathBuf, EvalError> {
    let entries = fs::read_dir(support_dir).map_err(|e| EvalError::ToolchainVersionMissing {
        dir: support_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut installed: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    installed.sort();

    if let Some(version) = tools_version {
        for candidate in version.directory_candidates() {
            if installed.contains(&candidate) {
                return Ok(support_dir.join(candidate));
            }
        }
        logger::debug(&format!(
            "Tools version {} not installed in {}, using the latest",
            version,
            support_dir.display()
        ));
    }

    installed
        .last()
        .map(|latest| support_dir.join(latest))
        .ok_or_else(|| EvalError::ToolchainVersionMissing {
            dir: support_dir.to_path_buf(),
            reason: "no version directories installed".to_string(),
        })
}
