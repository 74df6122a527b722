//! Manifest scanning for packconf
//!
//! Reads a build manifest as plain text and lifts out what is needed before
//! evaluating it: the declared configuration libraries, the imported modules
//! and the tools-version pragma. The manifest language itself is never parsed.

pub mod errors;
pub mod scanner;
pub mod tools_version;
pub mod types;

pub use errors::{ManifestError, SectionProblem};
pub use scanner::{scan_declared_libraries, scan_import_modules};
pub use tools_version::{parse_pragma, ToolsVersion};
pub use types::{ManifestDescriptor, ScanOptions};
