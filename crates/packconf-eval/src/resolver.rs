//! Locating built configuration libraries
//!
//! Each library declared by the manifest must already be built. The resolver
//! looks for its shared library in the package's build directories, first
//! match wins, and remembers the answer for the rest of the evaluation.

use crate::errors::EvalError;
use packconf_config::platform::{shared_library_file_name, SHARED_LIBRARY_EXTENSION};
use packconf_config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A built library the manifest links against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryArtifact {
    pub name: String,
    /// Directory containing the library
    pub resolved_path: PathBuf,
    pub platform_extension: String,
}

impl LibraryArtifact {
    pub fn file_path(&self) -> PathBuf {
        self.resolved_path.join(shared_library_file_name(&self.name))
    }

    /// `-L <dir> -I <dir> -l<name>`
    pub fn link_arguments(&self) -> Vec<String> {
        let dir = self.resolved_path.display().to_string();
        vec![
            "-L".to_string(),
            dir.clone(),
            "-I".to_string(),
            dir,
            format!("-l{}", self.name),
        ]
    }
}

#[derive(Debug)]
pub struct ArtifactResolver {
    search_dirs: Vec<PathBuf>,
    cache: HashMap<String, LibraryArtifact>,
}

impl ArtifactResolver {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        ArtifactResolver {
            search_dirs,
            cache: HashMap::new(),
        }
    }

    /// Search the configured (or default) build directories under `package_root`
    pub fn from_config(config: &Config, package_root: &Path) -> Self {
        Self::new(config.build_dirs(package_root))
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    pub fn resolve(&mut self, name: &str) -> Result<LibraryArtifact, EvalError> {
        if let Some(artifact) = self.cache.get(name) {
            return Ok(artifact.clone());
        }

        let file_name = shared_library_file_name(name);
        let found = self
            .search_dirs
            .iter()
            .find(|dir| dir.join(&file_name).is_file())
            .ok_or_else(|| EvalError::ArtifactNotFound {
                name: name.to_string(),
                searched: self.search_dirs.clone(),
            })?;

        debug!("Resolved {} in {}", file_name, found.display());
        let artifact = LibraryArtifact {
            name: name.to_string(),
            resolved_path: found.clone(),
            platform_extension: SHARED_LIBRARY_EXTENSION.to_string(),
        };
        self.cache.insert(name.to_string(), artifact.clone());
        Ok(artifact)
    }

    /// Resolve every name in order, stopping at the first failure
    pub fn resolve_all<S: AsRef<str>>(
        &mut self,
        names: &[S],
    ) -> Result<Vec<LibraryArtifact>, EvalError> {
        names.iter().map(|n| self.resolve(n.as_ref())).collect()
    }
}
