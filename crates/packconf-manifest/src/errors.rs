use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why the declared list could not be located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionProblem {
    /// No line contains the declaration marker
    MarkerAbsent,
    /// The marker was found but no `[` follows it
    OpeningBracketAbsent,
    /// The list is never closed with `]`
    ClosingBracketAbsent,
}

impl std::fmt::Display for SectionProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionProblem::MarkerAbsent => write!(f, "marker not found"),
            SectionProblem::OpeningBracketAbsent => write!(f, "no '[' after the marker"),
            SectionProblem::ClosingBracketAbsent => write!(f, "no closing ']'"),
        }
    }
}

/// Errors that can occur while scanning a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error reading manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Declaration '{marker}' not found in manifest ({problem})")]
    SectionNotFound {
        marker: String,
        problem: SectionProblem,
    },
}
