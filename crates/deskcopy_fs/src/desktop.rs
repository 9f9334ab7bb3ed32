//! Desktop folder discovery.

use std::path::{Path, PathBuf};

use crate::conf::TUP_DESKTOP_DIR_NAMES;

/// Locate the base directory projects are copied into.
///
/// Probes [`TUP_DESKTOP_DIR_NAMES`] under the home directory and falls back
/// to the home directory itself. Never fails; when the home directory is
/// unknown the returned path is empty and callers reject it.
pub fn resolve_desktop_path() -> PathBuf {
    log::debug!("host os: {}", std::env::consts::OS);
    let path_dir_home = dirs::home_dir().unwrap_or_default();
    resolve_desktop_path_from(&path_dir_home, &TUP_DESKTOP_DIR_NAMES)
}

/// Return the first `path_dir_home/<name>` that is an existing directory,
/// or `path_dir_home` when none is.
pub fn resolve_desktop_path_from<S: AsRef<str>>(path_dir_home: &Path, names: &[S]) -> PathBuf {
    let path_found = names
        .iter()
        .map(|name| path_dir_home.join(name.as_ref()))
        .find(|path_candidate| path_candidate.is_dir());

    match path_found {
        Some(path_dir_desktop) => {
            log::info!("Desktop path detected: {}", path_dir_desktop.display());
            path_dir_desktop
        }
        None => {
            log::info!("Could not detect the desktop folder automatically.");
            log::info!(
                "Using the home directory as base: {}",
                path_dir_home.display()
            );
            path_dir_home.to_path_buf()
        }
    }
}
