//! Lexical extraction of the declared library list
//!
//! The manifest is never parsed. Line comments are dropped, then the scanner
//! looks for the last line that mentions the declaration marker and reads the
//! array literal that follows:
//!
//! ```text
//! let PackageConfigs = [
//!     "ExampleConfig", // comment
//!     "OtherConfig",
//! ]
//! ```
//!
//! Known limitations: the list ends at the first `]`, so nested arrays or a
//! `]` inside a string literal truncate it, and `//` inside a string literal is
//! treated as a comment.

use crate::errors::{ManifestError, SectionProblem};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static IMPORT_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:@\w+\s+)*import\s+(?:(?:struct|class|enum|protocol|func|var|let|typealias)\s+)?([A-Za-z_][A-Za-z0-9_]*)",
    )
    .ok()
});

/// Extract the quoted names of the list declared after `marker`.
pub fn scan_declared_libraries(source: &str, marker: &str) -> Result<Vec<String>, ManifestError> {
    let not_found = |problem| ManifestError::SectionNotFound {
        marker: marker.to_string(),
        problem,
    };

    let lines: Vec<&str> = source.lines().map(strip_line_comment).collect();
    let start = lines
        .iter()
        .rposition(|line| line.contains(marker))
        .ok_or_else(|| not_found(SectionProblem::MarkerAbsent))?;

    let section = lines[start..].join("\n");
    let open = section
        .find('[')
        .ok_or_else(|| not_found(SectionProblem::OpeningBracketAbsent))?;

    let mut body = String::new();
    let mut closed = false;
    for code in section[open + 1..].split('\n') {
        if let Some(close) = code.find(']') {
            body.push_str(&code[..close]);
            closed = true;
            break;
        }
        body.push_str(code);
    }

    if !closed {
        return Err(not_found(SectionProblem::ClosingBracketAbsent));
    }

    let names = split_names(&body);
    debug!("Declared libraries after '{}': {:?}", marker, names);
    Ok(names)
}

/// Module names of every `import` line, in order of first appearance.
pub fn scan_import_modules(source: &str) -> Vec<String> {
    let Some(re) = IMPORT_RE.as_ref() else {
        return Vec::new();
    };

    let mut modules: Vec<String> = Vec::new();
    for line in source.lines() {
        if let Some(name) = re.captures(line).and_then(|caps| caps.get(1)) {
            let name = name.as_str();
            if !modules.iter().any(|m| m == name) {
                modules.push(name.to_string());
            }
        }
    }
    modules
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn split_names(body: &str) -> Vec<String> {
    let cleaned: String = body
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '[' | ']' | ')' | ','))
        .collect();

    cleaned
        .replace("\"\"", "\"")
        .split('"')
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}
