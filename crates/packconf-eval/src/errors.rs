use packconf_config::ConfigError;
use packconf_manifest::{ManifestError, SectionProblem};
use packconf_value::{CodecError, HandoffError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating the toolchain or running the manifest
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Could not find the compiler '{compiler}': {reason}")]
    CompilerNotFound { compiler: String, reason: String },

    #[error("No manifest-support library version found in {}: {reason}", .dir.display())]
    ToolchainVersionMissing { dir: PathBuf, reason: String },

    #[error("Could not find lib{name} to link against (searched {})", format_dirs(.searched))]
    ArtifactNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Manifest evaluation failed (exit code {})", format_status(.status))]
    EvaluationFailed { status: Option<i32>, stderr: String },

    #[error("Failed to launch {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn format_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_status(status: &Option<i32>) -> String {
    status.map_or_else(|| "none, terminated by signal".to_string(), |c| c.to_string())
}

impl EvalError {
    /// A remedial suggestion for the user, when there is one
    pub fn hint(&self) -> Option<String> {
        match self {
            EvalError::CompilerNotFound { compiler, .. } => Some(format!(
                "install a toolchain providing '{}' or set `compiler-path` with `packconf config set compiler-path <path>`",
                compiler
            )),
            EvalError::ToolchainVersionMissing { .. } => Some(
                "check that the toolchain is complete or set `support-library-dir`".to_string(),
            ),
            EvalError::ArtifactNotFound { name, .. } => Some(format!(
                "is it possible you've not built yet? Build the target first, e.g. `swift build --target {}`",
                name
            )),
            EvalError::EvaluationFailed { stderr, .. } if !stderr.trim().is_empty() => {
                Some(format!("compiler output:\n{}", stderr.trim_end()))
            }
            EvalError::EvaluationFailed { .. } => {
                Some("re-run with --verbose to see the compiler output".to_string())
            }
            EvalError::Spawn { .. } => None,
        }
    }
}

/// Everything that can go wrong between scanning a manifest and returning its configuration
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Handoff(#[from] HandoffError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl LoadError {
    pub fn hint(&self) -> Option<String> {
        match self {
            LoadError::Eval(e) => e.hint(),
            LoadError::Handoff(HandoffError::HandoffMissing(_)) => Some(
                "the manifest did not write a configuration; make sure it calls `write()`".to_string(),
            ),
            LoadError::Codec(CodecError::UnregisteredAlias(alias)) => Some(format!(
                "register the configuration type for '{}' before loading",
                alias
            )),
            LoadError::Manifest(ManifestError::SectionNotFound { marker, problem }) => match problem {
                SectionProblem::ClosingBracketAbsent => {
                    Some(format!("close the '{}' list with ']'", marker))
                }
                SectionProblem::OpeningBracketAbsent => Some(format!(
                    "declare '{}' as a list of library names, e.g. `let {} = [\"MyConfig\"]`",
                    marker, marker
                )),
                SectionProblem::MarkerAbsent => None,
            },
            _ => None,
        }
    }
}
