//! Recursive dependency resolution into the graph.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::DepGraph;
use crate::list::DependencyLister;

/// Resolve `path` and all of its transitive dependencies into `graph`.
///
/// Ensures a vertex for `path` exists, queries the lister for its direct
/// dependencies, and for each dependency: adds (or reuses) its vertex, adds
/// a depends-on edge, and recurses only when the vertex is newly added.
/// Revisit avoidance is keyed on vertex existence, so shared dependencies
/// are expanded once and cycles are truncated rather than re-walked.
/// Recursion depth equals the longest dependency chain in the closure.
///
/// Read-only with respect to the filesystem (stat calls only); the graph is
/// the only thing mutated.
///
/// # Errors
///
/// - [`Error::DependencyList`] if the lister fails on any file.
/// - [`Error::MissingFile`] if a discovered dependency does not exist on
///   disk. Dependency listers normally return paths they resolved, so this
///   guards against the file vanishing between listing and traversal.
///
/// Either error aborts the whole resolution; no partial graph is salvaged.
pub fn resolve(lister: &dyn DependencyLister, graph: &mut DepGraph, path: &Path) -> Result<()> {
    let (vertex, _) = graph.add_vertex(path);
    info!(vertex = %path.display(), "traverse");

    let deps = lister.list(path).map_err(|source| Error::DependencyList {
        path: path.to_path_buf(),
        source,
    })?;

    for dep in deps {
        let (dep_vertex, already_existed) = graph.add_vertex(&dep);
        debug!(from = %path.display(), to = %dep.display(), "edge");
        graph.add_edge(vertex, dep_vertex);

        if already_existed {
            continue;
        }
        if !dep.exists() {
            return Err(Error::MissingFile(dep));
        }
        resolve(lister, graph, &dep)?;
    }

    Ok(())
}
