//! Dynamic dependency listing via ldd.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Lists the *direct* shared-library dependencies of a file.
///
/// Implementations return absolute resolved paths in the order reported.
/// The resolver treats this as a black box; failures are wrapped into
/// [`crate::Error::DependencyList`] by the caller.
pub trait DependencyLister {
    fn list(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Production lister backed by the `ldd` tool.
///
/// `ldd` resolves each needed library through the host dynamic linker and
/// prints the absolute path it would load, which is exactly the identity
/// the dependency graph is keyed on.
#[derive(Debug, Default)]
pub struct LddLister;

impl DependencyLister for LddLister {
    fn list(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !path.exists() {
            bail!("file does not exist: {}", path.display());
        }

        let output = Command::new("ldd")
            .arg(path)
            .output()
            .context("ldd command not found - install glibc tools")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Statically linked files are a legitimate empty case, reported
            // by ldd as a failure on some systems.
            if stdout.contains("not a dynamic executable")
                || stderr.contains("not a dynamic executable")
            {
                return Ok(Vec::new());
            }
            bail!("ldd failed on {}: {}", path.display(), stderr.trim());
        }

        let deps = parse_ldd_output(&stdout)?;
        for dep in &deps {
            debug!(file = %path.display(), dep = %dep.display(), "dynamic link");
        }
        Ok(deps)
    }
}

/// Parse ldd stdout into absolute dependency paths.
///
/// Example ldd output:
/// ```text
///     linux-vdso.so.1 (0x00007ffd0e5f2000)
///     libtinfo.so.6 => /lib/x86_64-linux-gnu/libtinfo.so.6 (0x00007f29c1a0e000)
///     libc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x00007f29c1800000)
///     /lib64/ld-linux-x86-64.so.2 (0x00007f29c1a4a000)
/// ```
///
/// Lines with `=>` yield the resolved path on the right-hand side; lines
/// starting with an absolute path (the interpreter) yield that path; virtual
/// entries like `linux-vdso.so.1` have no file behind them and are skipped.
/// A `not found` resolution is an error naming the unresolved library.
pub fn parse_ldd_output(output: &str) -> Result<Vec<PathBuf>> {
    let mut deps = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line == "statically linked" {
            continue;
        }

        if let Some((name, rest)) = line.split_once("=>") {
            let rest = rest.trim();
            if rest.starts_with("not found") {
                bail!("dependency not found by loader: {}", name.trim());
            }
            // Strip the trailing load address: "/path/lib.so (0x...)"
            let path = rest.split_whitespace().next().unwrap_or_default();
            if path.starts_with('/') {
                deps.push(PathBuf::from(path));
            }
        } else if line.starts_with('/') {
            // Interpreter line: "/lib64/ld-linux-x86-64.so.2 (0x...)"
            let path = line.split_whitespace().next().unwrap_or_default();
            deps.push(PathBuf::from(path));
        }
        // Anything else (vdso and friends) has no path on disk.
    }

    Ok(deps)
}
