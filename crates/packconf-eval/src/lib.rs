//! Manifest evaluation for packconf
//!
//! Turns a manifest on disk into the configuration it produces: the declared
//! configuration libraries are resolved in the build tree, the compiler and
//! its manifest-support library are located, and the manifest is run as a
//! program that writes its configuration to a handoff file.

pub mod errors;
pub mod evaluator;
pub mod loader;
pub mod locator;
pub mod resolver;

pub use errors::{EvalError, LoadError};
pub use evaluator::{build_arguments, Evaluator, Invocation, ProcessOutcome, ProcessRunner, SystemRunner};
pub use loader::{
    load, load_package_config, load_untyped, EvaluationOptions, EvaluationPlan, HandoffMode, Loader,
    DEFAULT_MANIFEST,
};
pub use locator::{Toolchain, ToolchainLocator, MANIFEST_LIBRARY};
pub use resolver::{ArtifactResolver, LibraryArtifact};
