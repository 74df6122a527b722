//! Loading a package's configuration end to end
//!
//! Scan the manifest, resolve its declared libraries, locate the toolchain,
//! run the manifest, then read and decode the handoff file. Everything that
//! can be checked without running anything is checked before the compiler
//! is spawned.

use crate::errors::LoadError;
use crate::evaluator::{Evaluator, ProcessRunner, SystemRunner};
use crate::locator::{Toolchain, ToolchainLocator};
use crate::resolver::{ArtifactResolver, LibraryArtifact};
use packconf_config::Config;
use packconf_logger::{self as logger, Verbosity};
use packconf_manifest::{ManifestDescriptor, ManifestError, ScanOptions};
use packconf_value::{
    AliasRegistry, Aliased, CodecError, HandoffChannel, HandoffRecord, PackageConfig,
    PackageConfigDocument, UntypedConfiguration,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manifest file name looked up when no path is given
pub const DEFAULT_MANIFEST: &str = "Package.swift";

/// Where the manifest process writes its configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HandoffMode {
    /// A fresh file per evaluation, removed after reading
    #[default]
    Session,
    /// The shared `package-config.json` slot in the handoff directory
    Fixed,
    /// An explicit path
    At(PathBuf),
}

#[derive(Debug, Clone)]
pub struct EvaluationOptions {
    pub manifest_path: PathBuf,
    pub verbosity: Verbosity,
    pub config: Config,
    pub handoff: HandoffMode,
    /// Treat a manifest that writes nothing as having no configuration
    pub optional: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        EvaluationOptions {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            verbosity: Verbosity::default(),
            config: Config::default(),
            handoff: HandoffMode::default(),
            optional: false,
        }
    }
}

impl EvaluationOptions {
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        EvaluationOptions {
            manifest_path: manifest_path.into(),
            ..Self::default()
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::from(&self.config)
    }

    /// The compiler runs inside the package directory, so relative handoff
    /// locations are fixed against the caller's working directory first.
    fn channel(&self) -> HandoffChannel {
        match &self.handoff {
            HandoffMode::Session => HandoffChannel::session(&absolute(&self.config.handoff_dir())),
            HandoffMode::Fixed => HandoffChannel::fixed(&absolute(&self.config.handoff_dir())),
            HandoffMode::At(path) => HandoffChannel::at(absolute(path)),
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

/// Everything needed to run a manifest, gathered without running it
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationPlan {
    pub descriptor: ManifestDescriptor,
    pub artifacts: Vec<LibraryArtifact>,
    pub toolchain: Toolchain,
}

pub struct Loader<R: ProcessRunner = SystemRunner> {
    options: EvaluationOptions,
    evaluator: Evaluator<R>,
}

impl Loader<SystemRunner> {
    pub fn new(options: EvaluationOptions) -> Self {
        Self::with_runner(options, SystemRunner)
    }
}

impl<R: ProcessRunner> Loader<R> {
    pub fn with_runner(options: EvaluationOptions, runner: R) -> Self {
        let evaluator = Evaluator::new(runner, options.verbosity);
        Loader { options, evaluator }
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    pub fn runner(&self) -> &R {
        self.evaluator.runner()
    }

    /// Scan the manifest, resolve its libraries and locate the toolchain.
    ///
    /// The manifest path is made absolute first so the build directories and
    /// link flags derived from it hold inside the compiler's working directory.
    ///
    /// Artifacts are resolved before the toolchain is looked up so a missing
    /// build is reported even where no compiler is installed.
    pub fn plan(&self) -> Result<EvaluationPlan, LoadError> {
        let config = &self.options.config;
        let manifest_path = &self.options.manifest_path;
        let manifest = fs::canonicalize(manifest_path).map_err(|source| ManifestError::Io {
            path: manifest_path.clone(),
            source,
        })?;
        let descriptor = ManifestDescriptor::read(&manifest, &self.options.scan_options())?;
        debug!(
            "Manifest declares {} configuration libraries",
            descriptor.declared_library_names.len()
        );

        let mut names = descriptor.declared_library_names.clone();
        let support = config.support_library();
        if !support.is_empty() && !names.iter().any(|n| n == support) {
            names.push(support.to_string());
        }

        let mut resolver = ArtifactResolver::from_config(config, &descriptor.package_root());
        let artifacts = resolver.resolve_all(&names)?;

        let toolchain = ToolchainLocator::new(config).locate(descriptor.tools_version)?;

        Ok(EvaluationPlan {
            descriptor,
            artifacts,
            toolchain,
        })
    }

    /// Run the manifest and return what it wrote.
    ///
    /// `None` only in optional mode, when the manifest wrote nothing.
    pub fn evaluate(&mut self) -> Result<Option<HandoffRecord>, LoadError> {
        let plan = self.plan()?;
        let channel = self.options.channel();
        channel.clear()?;

        logger::spinner_start("Evaluating manifest...");
        let outcome = self.evaluator.evaluate(
            &plan.toolchain,
            &plan.artifacts,
            &plan.descriptor.source_path,
            &channel,
        );
        logger::spinner_stop();

        let record = outcome.map_err(LoadError::from).and_then(|_| {
            if self.options.optional {
                Ok(channel.read_optional()?)
            } else {
                Ok(Some(channel.read()?))
            }
        });

        if self.options.handoff == HandoffMode::Session {
            if let Err(e) = channel.clear() {
                logger::warn(&format!("Could not remove handoff file: {}", e));
            }
        }
        record
    }

    /// Decode the handoff document as named, aliased configurations
    pub fn load_package_config(
        &mut self,
        registry: &AliasRegistry,
    ) -> Result<PackageConfig, LoadError> {
        let Some(record) = self.evaluate()? else {
            return Ok(PackageConfig::new());
        };
        let document: PackageConfigDocument = record.decode()?;
        Ok(PackageConfig::decode(&document, registry)?)
    }

    /// The configuration stored under `name`.
    ///
    /// In optional mode a missing document or entry is `None`; otherwise it is
    /// an error.
    pub fn load<T: Aliased>(
        &mut self,
        name: &str,
        registry: &AliasRegistry,
    ) -> Result<Option<T>, LoadError> {
        let mut package = self.load_package_config(registry)?;
        match package.take::<T>(name) {
            Ok(configuration) => Ok(Some(configuration)),
            Err(CodecError::MissingEntry(_)) if self.options.optional => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Decode the whole handoff document as `T`
    pub fn load_configuration<T: DeserializeOwned>(&mut self) -> Result<Option<T>, LoadError> {
        match self.evaluate()? {
            Some(record) => Ok(Some(record.decode()?)),
            None => Ok(None),
        }
    }

    /// The handoff document as a flat object of plain values
    pub fn load_untyped(&mut self) -> Result<UntypedConfiguration, LoadError> {
        Ok(self
            .load_configuration::<UntypedConfiguration>()?
            .unwrap_or_default())
    }
}

/// Evaluate the manifest and return the configuration stored under `name`
pub fn load<T: Aliased>(
    name: &str,
    registry: &AliasRegistry,
    options: &EvaluationOptions,
) -> Result<Option<T>, LoadError> {
    Loader::new(options.clone()).load(name, registry)
}

/// Evaluate the manifest and return all of its named configurations
pub fn load_package_config(
    registry: &AliasRegistry,
    options: &EvaluationOptions,
) -> Result<PackageConfig, LoadError> {
    Loader::new(options.clone()).load_package_config(registry)
}

/// Evaluate the manifest and return its configuration as plain values
pub fn load_untyped(options: &EvaluationOptions) -> Result<UntypedConfiguration, LoadError> {
    Loader::new(options.clone()).load_untyped()
}
