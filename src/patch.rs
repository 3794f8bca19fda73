//! Runtime search-path rewriting.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result as AnyResult};
use tracing::info;

use crate::error::{Error, Result};
use crate::relocate::Bundle;

/// Search path embedded in the relocated binary: the `lib` directory one
/// level up from the executable's own directory.
pub const BINARY_SEARCH_PATH: &str = "$ORIGIN/../lib";

/// Search path embedded in each relocated library: its own directory, so
/// libraries find their siblings without going through the binary's path.
pub const LIBRARY_SEARCH_PATH: &str = "$ORIGIN";

/// Mutates a file's runtime search-path field in place.
///
/// The byte-level rewrite is a black box; the driver only computes the
/// search-path string and sequences the calls.
pub trait SearchPathPatcher {
    fn set_search_path(&self, file: &Path, search_path: &str) -> AnyResult<()>;
}

/// Production patcher backed by `patchelf --set-rpath`.
#[derive(Debug, Default)]
pub struct PatchelfPatcher;

impl SearchPathPatcher for PatchelfPatcher {
    fn set_search_path(&self, file: &Path, search_path: &str) -> AnyResult<()> {
        let output = Command::new("patchelf")
            .arg("--set-rpath")
            .arg(search_path)
            .arg(file)
            .output()
            .context("patchelf command not found - install patchelf")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("patchelf failed on {}: {}", file.display(), stderr.trim());
        }
        Ok(())
    }
}

/// Rewrite search paths across a laid-out bundle: the binary first, then
/// each library (library order is immaterial).
///
/// # Errors
///
/// Returns [`Error::Patch`] on the first patcher failure and stops there,
/// leaving the remaining files unpatched. Copies happen strictly before any
/// patching, so the originals are never touched.
pub fn patch_bundle(patcher: &dyn SearchPathPatcher, bundle: &Bundle) -> Result<()> {
    set_search_path(patcher, &bundle.binary, BINARY_SEARCH_PATH)?;
    for lib in &bundle.libraries {
        set_search_path(patcher, lib, LIBRARY_SEARCH_PATH)?;
    }
    Ok(())
}

fn set_search_path(patcher: &dyn SearchPathPatcher, file: &Path, search_path: &str) -> Result<()> {
    info!(file = %file.display(), rpath = search_path, "setting search path");
    patcher
        .set_search_path(file, search_path)
        .map_err(|source| Error::Patch {
            path: file.to_path_buf(),
            source,
        })
}
