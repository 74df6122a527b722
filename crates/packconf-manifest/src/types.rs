use crate::errors::{ManifestError, SectionProblem};
use crate::scanner::{scan_declared_libraries, scan_import_modules};
use crate::tools_version::{parse_pragma, ToolsVersion};
use packconf_config::{Config, DEFAULT_DECLARATION_MARKER, DEFAULT_TOOLS_VERSION_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What to look for while scanning a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Marker naming the declared library list
    pub marker: String,
    /// Tool name used in the version pragma
    pub tools_version_prefix: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            marker: DEFAULT_DECLARATION_MARKER.to_string(),
            tools_version_prefix: DEFAULT_TOOLS_VERSION_PREFIX.to_string(),
        }
    }
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        ScanOptions {
            marker: config.declaration_marker().to_string(),
            tools_version_prefix: config.tools_version_prefix().to_string(),
        }
    }
}

/// Facts lifted from a manifest's source text without evaluating it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDescriptor {
    pub source_path: PathBuf,
    pub declared_library_names: Vec<String>,
    pub declared_import_modules: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_version: Option<ToolsVersion>,
}

impl ManifestDescriptor {
    /// Read and scan the manifest at `path`
    pub fn read(path: &Path, options: &ScanOptions) -> Result<Self, ManifestError> {
        debug!("Scanning manifest: {}", path.display());
        let source = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(path, &source, options)
    }

    /// Scan manifest text.
    ///
    /// A manifest without the marker declares no libraries. A marker whose list
    /// cannot be delimited is an error.
    pub fn from_source(
        path: &Path,
        source: &str,
        options: &ScanOptions,
    ) -> Result<Self, ManifestError> {
        let declared_library_names = match scan_declared_libraries(source, &options.marker) {
            Ok(names) => names,
            Err(ManifestError::SectionNotFound {
                problem: SectionProblem::MarkerAbsent,
                ..
            }) => {
                debug!(
                    "No '{}' declaration in {}, assuming no libraries",
                    options.marker,
                    path.display()
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(ManifestDescriptor {
            source_path: path.to_path_buf(),
            declared_library_names,
            declared_import_modules: scan_import_modules(source),
            tools_version: parse_pragma(source, &options.tools_version_prefix),
        })
    }

    /// Directory containing the manifest; build outputs are resolved against it
    pub fn package_root(&self) -> PathBuf {
        match self.source_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
