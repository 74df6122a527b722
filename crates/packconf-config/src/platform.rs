//! Platform-specific naming for build outputs
//!
//! Shared libraries are named `lib<name>.so` on Linux, `lib<name>.dylib` on
//! macOS and `<name>.dll` on Windows. The build tree also contains a
//! platform-qualified debug directory (e.g. `.build/x86_64-unknown-linux/debug`).

use std::path::{Path, PathBuf};

/// Extension of a shared library on this platform
#[cfg(target_os = "macos")]
pub const SHARED_LIBRARY_EXTENSION: &str = "dylib";
#[cfg(target_os = "windows")]
pub const SHARED_LIBRARY_EXTENSION: &str = "dll";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const SHARED_LIBRARY_EXTENSION: &str = "so";

/// Filename prefix of a shared library on this platform
#[cfg(target_os = "windows")]
pub const SHARED_LIBRARY_PREFIX: &str = "";
#[cfg(not(target_os = "windows"))]
pub const SHARED_LIBRARY_PREFIX: &str = "lib";

/// Platform component of a target triple as used by build trees
#[cfg(target_os = "macos")]
const TRIPLE_SUFFIX: &str = "apple-macosx";
#[cfg(target_os = "windows")]
const TRIPLE_SUFFIX: &str = "unknown-windows-msvc";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const TRIPLE_SUFFIX: &str = "unknown-linux";

/// Name of the build output directory next to the manifest
pub const BUILD_DIR: &str = ".build";

/// File name of a shared library for `name` on this platform
pub fn shared_library_file_name(name: &str) -> String {
    format!(
        "{}{}.{}",
        SHARED_LIBRARY_PREFIX, name, SHARED_LIBRARY_EXTENSION
    )
}

/// The host triple as it appears in a build tree, e.g. `x86_64-unknown-linux`
pub fn build_triple() -> String {
    format!("{}-{}", std::env::consts::ARCH, TRIPLE_SUFFIX)
}

/// Default build output directories, in lookup order.
///
/// Debug build first, then the platform-qualified debug build, then release.
pub fn default_build_dirs(package_root: &Path) -> Vec<PathBuf> {
    let build = package_root.join(BUILD_DIR);
    vec![
        build.join("debug"),
        build.join(build_triple()).join("debug"),
        build.join("release"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_os = "linux")]
    fn test_linux_library_name() {
        assert_eq!(shared_library_file_name("ExampleConfig"), "libExampleConfig.so");
        assert!(build_triple().ends_with("-unknown-linux"));
    }

    #[test]
    #[cfg(target_os = "macos")]
    fn test_macos_library_name() {
        assert_eq!(
            shared_library_file_name("ExampleConfig"),
            "libExampleConfig.dylib"
        );
    }

    #[test]
    fn test_default_build_dirs_order() {
        let dirs = default_build_dirs(Path::new("/pkg"));
        assert_eq!(dirs.len(), 3);
        assert!(dirs[0].ends_with(".build/debug"));
        assert!(dirs[1].ends_with("debug"));
        assert!(dirs[1].to_string_lossy().contains(&build_triple()));
        assert!(dirs[2].ends_with(".build/release"));
    }
}
