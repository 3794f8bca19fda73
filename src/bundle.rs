//! End-to-end relocation pipeline.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::info;

use crate::error::Result;
use crate::graph::DepGraph;
use crate::list::DependencyLister;
use crate::lookup;
use crate::patch::{self, SearchPathPatcher};
use crate::relocate::{self, Bundle};
use crate::resolve;

/// Parameters of a single relocation run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Binary name or path; looked up on `$PATH` when not a path on disk.
    pub binary: String,
    /// Root of the output tree.
    pub out_dir: PathBuf,
    /// Installation prefix; a leading slash is trimmed inside `out_dir`.
    pub prefix: String,
    /// Remove all immediate children of `out_dir` before building.
    pub clean: bool,
}

/// What a completed run produced, for summary output.
#[derive(Debug)]
pub struct Report {
    /// The resolved source binary.
    pub binary: PathBuf,
    /// The full descendant closure that was copied.
    pub closure: BTreeSet<PathBuf>,
    pub vertex_count: usize,
    pub edge_count: usize,
    /// The laid-out, patched bundle.
    pub bundle: Bundle,
}

/// Run the whole pipeline: locate the binary, resolve its dependency graph,
/// lay out the output tree, and rewrite search paths — strictly in that
/// order, so patching mutates copies and never the originals, and so a
/// resolution failure happens before any file is written.
///
/// The graph lives only inside this call: built during resolution, read
/// once for the root's closure, then dropped.
///
/// # Errors
///
/// Any stage's error aborts the remaining stages and propagates unchanged.
pub fn run(
    lister: &dyn DependencyLister,
    patcher: &dyn SearchPathPatcher,
    options: &Options,
) -> Result<Report> {
    let binary = lookup::locate(&options.binary)?;
    info!(binary = %binary.display(), "resolved target");

    let mut graph = DepGraph::new();
    resolve::resolve(lister, &mut graph, &binary)?;
    let closure = graph.descendants(&binary);
    info!(graph = %graph, dependencies = closure.len(), "resolution complete");

    let bundle = relocate::layout(
        &options.out_dir,
        &options.prefix,
        &binary,
        &closure,
        options.clean,
    )?;
    patch::patch_bundle(patcher, &bundle)?;

    Ok(Report {
        binary,
        closure,
        vertex_count: graph.vertex_count(),
        edge_count: graph.edge_count(),
        bundle,
    })
}
