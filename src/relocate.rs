//! Output directory layout and copy-once relocation.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};

/// Paths of a laid-out bundle, consumed by the search-path rewriter.
#[derive(Debug)]
pub struct Bundle {
    pub bin_dir: PathBuf,
    pub lib_dir: PathBuf,
    /// The copied binary inside `bin_dir`.
    pub binary: PathBuf,
    /// The copied libraries inside `lib_dir`, in deterministic order.
    pub libraries: Vec<PathBuf>,
}

/// Build the output tree and copy the binary plus its dependency closure.
///
/// Layout (fixed beyond the two roots):
/// ```text
/// <out_dir>/<prefix-without-leading-slash>/bin/<binary-name>
/// <out_dir>/<prefix-without-leading-slash>/lib/<each-dependency-name>
/// ```
///
/// When `clean` is set, every immediate child of the resolved output
/// directory is removed first, so a re-run leaves only the current run's
/// artifacts. The binary is copied executable; closure members are written
/// with mode 0755 and not separately marked executable. The closure is a
/// set, so each distinct library path is copied exactly once.
///
/// # Errors
///
/// Any mkdir, read, write, or chmod failure is an [`Error::Io`] and aborts
/// the relocation; files already copied are left in place.
pub fn layout(
    out_dir: &Path,
    prefix: &str,
    binary: &Path,
    closure: &BTreeSet<PathBuf>,
    clean: bool,
) -> Result<Bundle> {
    make_directories(out_dir)?;
    if clean {
        info!(directory = %out_dir.display(), "cleaning");
        clean_directory(out_dir)?;
    }

    let root = out_dir.join(prefix.trim_start_matches('/'));
    let bin_dir = root.join("bin");
    let lib_dir = root.join("lib");
    make_directories(&bin_dir)?;
    make_directories(&lib_dir)?;

    let bin_out = bin_dir.join(base_name(binary));
    copy_file(binary, &bin_out, true)?;

    let mut libraries = Vec::with_capacity(closure.len());
    for lib in closure {
        let lib_out = lib_dir.join(base_name(lib));
        copy_file(lib, &lib_out, false)?;
        libraries.push(lib_out);
    }

    Ok(Bundle {
        bin_dir,
        lib_dir,
        binary: bin_out,
        libraries,
    })
}

fn base_name(path: &Path) -> &std::ffi::OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

/// Copy `src` to `dst`, reading the whole file into memory and writing it
/// out with mode 0755. The executable flag re-asserts 0755 permissions so a
/// pre-existing destination file ends up executable too.
fn copy_file(src: &Path, dst: &Path, executable: bool) -> Result<()> {
    info!(from = %src.display(), to = %dst.display(), "copying");

    let data = fs::read(src).map_err(|source| Error::Io {
        context: "failed to read source file",
        path: src.to_path_buf(),
        source,
    })?;

    let write_err = |source| Error::Io {
        context: "failed to write destination file",
        path: dst.to_path_buf(),
        source,
    };
    let mut out = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o755)
        .open(dst)
        .map_err(write_err)?;
    out.write_all(&data).map_err(write_err)?;

    if executable {
        make_executable(dst)?;
    }
    Ok(())
}

/// Make a file executable (chmod 755).
fn make_executable(path: &Path) -> Result<()> {
    let io_err = |source| Error::Io {
        context: "failed to set permissions",
        path: path.to_path_buf(),
        source,
    };
    let mut perms = fs::metadata(path).map_err(io_err)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).map_err(io_err)
}

fn make_directories(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::Io {
        context: "failed to create directory",
        path: path.to_path_buf(),
        source,
    })
}

/// Remove every immediate child of `dir`, recursively.
///
/// Children are removed by their full path under `dir`, so cleaning works
/// regardless of the process's current working directory.
fn clean_directory(dir: &Path) -> Result<()> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| Error::Io {
            context: "failed to clean output directory",
            path,
            source,
        }
    };

    let entries = fs::read_dir(dir).map_err(io_err(dir))?;
    for entry in entries {
        let entry = entry.map_err(io_err(dir))?;
        let path = entry.path();
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(io_err(&path))?;
        } else {
            fs::remove_file(&path).map_err(io_err(&path))?;
        }
    }
    Ok(())
}
