//! Version pragma handling
//!
//! A manifest may pin the manifest-support library it expects with a comment
//! such as `// swift-tools-version:4.2` among its leading comment lines.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Version requested by the manifest's tools-version pragma
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToolsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
}

impl ToolsVersion {
    pub fn new(major: u32, minor: u32, patch: Option<u32>) -> Self {
        ToolsVersion {
            major,
            minor,
            patch,
        }
    }

    /// Directory names an installed support library for this version may use,
    /// most specific first (`4_2`, `4.2`, `4`).
    pub fn directory_candidates(&self) -> Vec<String> {
        let mut candidates = Vec::with_capacity(4);
        if let Some(patch) = self.patch {
            candidates.push(format!("{}_{}_{}", self.major, self.minor, patch));
        }
        candidates.push(format!("{}_{}", self.major, self.minor));
        candidates.push(format!("{}.{}", self.major, self.minor));
        candidates.push(self.major.to_string());
        candidates
    }
}

impl fmt::Display for ToolsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

/// Read the `// <prefix>-tools-version:MAJOR.MINOR[.PATCH]` pragma.
///
/// Only the leading block of comment and blank lines is inspected; the first
/// line of code ends the search. Returns `None` when no pragma is present or
/// it does not parse.
pub fn parse_pragma(source: &str, prefix: &str) -> Option<ToolsVersion> {
    let pattern = format!(
        r"^//\s*{}-tools-version\s*:\s*(\d+)\.(\d+)(?:\.(\d+))?",
        regex::escape(prefix)
    );
    let re = Regex::new(&pattern).ok()?;

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !trimmed.starts_with("//") {
            break;
        }
        if let Some(caps) = re.captures(trimmed) {
            let major = caps.get(1)?.as_str().parse().ok()?;
            let minor = caps.get(2)?.as_str().parse().ok()?;
            let patch = caps.get(3).and_then(|m| m.as_str().parse().ok());
            let version = ToolsVersion::new(major, minor, patch);
            debug!("Found tools-version pragma: {}", version);
            return Some(version);
        }
    }

    debug!("No {}-tools-version pragma found", prefix);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pragma_major_minor() {
        let source = "// swift-tools-version:4.2\n// The swift-tools-version declares ...\nimport PackageDescription\n";
        assert_eq!(
            parse_pragma(source, "swift"),
            Some(ToolsVersion::new(4, 2, None))
        );
    }

    #[test]
    fn test_parse_pragma_with_patch_and_spaces() {
        let source = "\n//  swift-tools-version: 5.7.1\nimport PackageDescription\n";
        assert_eq!(
            parse_pragma(source, "swift"),
            Some(ToolsVersion::new(5, 7, Some(1)))
        );
    }

    #[test]
    fn test_pragma_after_code_is_ignored() {
        let source = "import PackageDescription\n// swift-tools-version:4.2\n";
        assert_eq!(parse_pragma(source, "swift"), None);
    }

    #[test]
    fn test_pragma_other_tool_is_ignored() {
        let source = "// rust-tools-version:1.0\n";
        assert_eq!(parse_pragma(source, "swift"), None);
        assert_eq!(
            parse_pragma(source, "rust"),
            Some(ToolsVersion::new(1, 0, None))
        );
    }

    #[test]
    fn test_directory_candidates() {
        assert_eq!(
            ToolsVersion::new(4, 2, None).directory_candidates(),
            vec!["4_2", "4.2", "4"]
        );
        assert_eq!(
            ToolsVersion::new(5, 9, Some(1)).directory_candidates(),
            vec!["5_9_1", "5_9", "5.9", "5"]
        );
        assert_eq!(ToolsVersion::new(5, 9, Some(1)).to_string(), "5.9.1");
    }
}
