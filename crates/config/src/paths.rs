//! Home directory expansion for configured paths

use gotools_errors::{ConfigError, Error};
use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` against the user's home directory.
///
/// Only the bare `~` prefix is supported (`~user` forms are left untouched,
/// as are paths without a tilde).
///
/// # Errors
///
/// Returns an error if the path starts with `~` and the home directory
/// cannot be determined.
pub fn expand_home(path: &Path) -> Result<PathBuf, Error> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let home = dirs::home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
            Ok(home.join(components.as_path()))
        }
        _ => Ok(path.to_path_buf()),
    }
}

/// The user's home directory.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn home_dir() -> Result<PathBuf, Error> {
    dirs::home_dir().ok_or_else(|| ConfigError::HomeDirUnavailable.into())
}
