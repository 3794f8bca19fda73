//! Target binary lookup.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Locate the target binary.
///
/// If `name` names an existing file as given (absolute or cwd-relative), it
/// is used directly. Otherwise each directory of `$PATH` is probed in order
/// and the first existing file wins.
///
/// # Errors
///
/// Returns [`Error::Lookup`] if the binary is found neither way.
pub fn locate(name: &str) -> Result<PathBuf> {
    let direct = Path::new(name);
    if direct.exists() {
        return Ok(direct.to_path_buf());
    }

    env::var_os("PATH")
        .and_then(|path| search_dirs(env::split_paths(&path), name))
        .ok_or_else(|| Error::Lookup(name.to_string()))
}

/// Probe `dirs` in order for a file called `name`.
fn search_dirs(dirs: impl IntoIterator<Item = PathBuf>, name: &str) -> Option<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
