//! Path helpers for CLI and config file arguments

use std::path::{Path, PathBuf};

/// Replace a leading `~` with the home directory
fn expand_tilde(path: &str) -> PathBuf {
    let home = || dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if path == "~" {
        home()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home().join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Expand a user-supplied path to an absolute path.
///
/// Tilde expands to the home directory; relative paths, bare names included,
/// are joined onto the current directory. Components are not canonicalized,
/// so the file does not need to exist yet.
///
/// ```text
/// expand_path("~/.csvq/csvq.json") // -> /home/user/.csvq/csvq.json
/// expand_path("data/in.csv")       // -> /current/dir/data/in.csv
/// expand_path("/tmp/out.csv")      // -> /tmp/out.csv
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = expand_tilde(path.trim());

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Resolve `path` against `base` unless it is absolute or tilde-prefixed.
///
/// Used for paths written inside a config file, which are relative to that
/// file rather than to the current directory.
pub fn resolve_against(base: &Path, path: &str) -> PathBuf {
    let path = path.trim();
    let expanded = expand_tilde(path);
    if expanded.is_relative() {
        base.join(expanded)
    } else {
        expanded
    }
}
