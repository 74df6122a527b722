//! Configuration values exchanged between a manifest and a tool
//!
//! This crate is linked by both sides. The manifest process builds a
//! configuration and calls [`write`] (or [`PackageConfig::write`]); the tool
//! reads the handoff file afterwards and decodes it, restoring concrete types
//! through an [`AliasRegistry`].
//!
//! ```ignore
//! // manifest side
//! PackageConfig::new()
//!     .with("lint", LintConfiguration { rules: vec!["no-tabs".into()] })
//!     .write()?;
//!
//! // tool side
//! let mut registry = AliasRegistry::new();
//! registry.register::<LintConfiguration>()?;
//! ```

pub mod errors;
pub mod handoff;
pub mod package;
pub mod registry;
pub mod value;

pub use errors::{CodecError, HandoffError};
pub use handoff::{HandoffChannel, HandoffRecord, HANDOFF_ENV, HANDOFF_FILE_NAME};
pub use package::{PackageConfig, PackageConfigDocument, PackageName, UntypedConfiguration};
pub use registry::{AliasRegistry, Aliased, AliasedPayload, AnyConfiguration};
pub use value::{from_value, to_value, ConfigurationValue};

use serde::Serialize;
use std::path::PathBuf;

/// Write a configuration document for the tool that is evaluating this manifest.
///
/// Returns the path written to.
pub fn write<T: Serialize + ?Sized>(configuration: &T) -> Result<PathBuf, HandoffError> {
    let channel = HandoffChannel::from_env();
    channel.write_value(configuration)?;
    Ok(channel.path().to_path_buf())
}
