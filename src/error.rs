//! Error kinds surfaced by the relocation pipeline.

use std::path::PathBuf;

/// Errors from any stage of the pipeline.
///
/// There is no local recovery anywhere in the core: the first error aborts
/// the remaining stages and propagates to the caller unchanged. Output files
/// already written before a failure are left on disk.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The target binary was found neither at the given path nor on `$PATH`.
    #[error("binary not found: {0}")]
    Lookup(String),

    /// The dependency lister failed to enumerate a file's dependencies.
    #[error("failed to list dependencies of {}", path.display())]
    DependencyList {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A discovered dependency path does not exist on disk.
    #[error("dependency does not exist on disk: {}", .0.display())]
    MissingFile(PathBuf),

    /// Directory creation, file copy, or permission-set failure.
    #[error("{}: {}", context, path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The search-path patcher failed on a file.
    #[error("failed to set search path on {}", path.display())]
    Patch {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
