//! Locating native extension libraries on disk
//!
//! Extensions live in a single library directory and are addressed as
//! `<library_dir>/<name>`. SQLite appends the platform suffix itself when the
//! bare path fails to load, but it never tries a `lib` prefix, which is how
//! most build systems name shared objects.

use crate::error::Result;
use crate::validation::ExtensionName;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shared library suffix for the target platform (without the dot)
pub fn dylib_suffix() -> &'static str {
    if cfg!(target_os = "windows") {
        "dll"
    } else if cfg!(any(target_os = "macos", target_os = "ios")) {
        "dylib"
    } else {
        "so"
    }
}

/// `<dir>/<name>`, exactly as given
pub fn library_path(dir: &Path, name: &ExtensionName) -> PathBuf {
    dir.join(name.as_str())
}

/// Candidate file names for an extension, in lookup order
fn candidates(dir: &Path, name: &ExtensionName) -> [PathBuf; 3] {
    let suffix = dylib_suffix();
    [
        library_path(dir, name),
        dir.join(format!("{}.{}", name, suffix)),
        dir.join(format!("lib{}.{}", name, suffix)),
    ]
}

/// Resolve the library file for `name` inside `dir`
///
/// Returns the first candidate that exists on disk. When none does, the bare
/// `<dir>/<name>` path is returned so SQLite can apply its own suffix rules
/// and report a load error with the path the caller configured.
pub fn resolve_library(dir: &Path, name: &ExtensionName) -> PathBuf {
    for candidate in candidates(dir, name) {
        if candidate.is_file() {
            debug!("Resolved extension '{}' to {:?}", name, candidate);
            return candidate;
        }
    }

    let fallback = library_path(dir, name);
    debug!(
        "No library file found for extension '{}' in {:?}, using {:?}",
        name, dir, fallback
    );
    fallback
}

/// Directory containing the running executable
///
/// Plays the role of the platform's native library directory: extensions are
/// expected to be shipped next to the binary.
pub fn default_library_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}
