//! Directed dependency graph keyed by absolute file path.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};

/// A directed "depends-on" graph over resolved file paths.
///
/// The vertex key is the absolute resolved `PathBuf` itself, so two
/// dependency mentions that resolve to the same file always map to the same
/// vertex. Built fresh per run and discarded afterwards; nothing persists.
///
/// Cycles are tolerated, not rejected: a vertex reached again via a
/// different path simply reuses its existing index and is not re-expanded
/// by callers keyed on [`DepGraph::add_vertex`]'s `already_existed` bit.
#[derive(Debug, Default)]
pub struct DepGraph {
    graph: DiGraph<PathBuf, ()>,
    node_map: HashMap<PathBuf, NodeIndex>,
}

impl DepGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex for `path`, reusing an existing one.
    ///
    /// Returns the vertex index and whether it already existed. Idempotent:
    /// a second call with the same path returns the same index and leaves
    /// the vertex count unchanged.
    pub fn add_vertex(&mut self, path: &Path) -> (NodeIndex, bool) {
        if let Some(&idx) = self.node_map.get(path) {
            return (idx, true);
        }
        let idx = self.graph.add_node(path.to_path_buf());
        self.node_map.insert(path.to_path_buf(), idx);
        (idx, false)
    }

    /// Add a depends-on edge `from → to`.
    ///
    /// Duplicate edges are a no-op (petgraph allows parallel edges by
    /// default; dependency multiplicity is irrelevant here). Returns whether
    /// the edge was newly added.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        if self.graph.contains_edge(from, to) {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    /// Look up the vertex index for a path.
    #[must_use]
    pub fn vertex(&self, path: &Path) -> Option<NodeIndex> {
        self.node_map.get(path).copied()
    }

    /// Full descendant closure of `path`: every vertex reachable via
    /// depends-on edges, each exactly once regardless of how many paths
    /// reach it.
    ///
    /// The root itself is not a member unless a dependency cycle reaches
    /// back to it. Returns an empty set for an unknown path. The set is
    /// ordered so downstream iteration (and copy order) is deterministic.
    #[must_use]
    pub fn descendants(&self, path: &Path) -> BTreeSet<PathBuf> {
        let mut closure = BTreeSet::new();
        let Some(root) = self.vertex(path) else {
            return closure;
        };

        let mut stack: Vec<NodeIndex> = self.graph.neighbors(root).collect();
        let mut visited = BTreeSet::new();
        while let Some(idx) = stack.pop() {
            if !visited.insert(idx) {
                continue;
            }
            closure.insert(self.graph[idx].clone());
            stack.extend(self.graph.neighbors(idx));
        }
        closure
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl fmt::Display for DepGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vertices, {} edges",
            self.vertex_count(),
            self.edge_count()
        )
    }
}
