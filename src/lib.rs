//! Relocate ELF binaries and their shared-library dependencies into a
//! self-contained, portable prefix.
//!
//! The pipeline resolves a binary's transitive dynamic dependencies into a
//! directed graph (one vertex per resolved path, shared dependencies
//! deduplicated), copies the binary and the root's descendant closure into a
//! `bin/` + `lib/` tree, and rewrites each copy's runtime search path so the
//! bundle runs from anywhere: `$ORIGIN/../lib` on the binary, `$ORIGIN` on
//! every library.
//!
//! Dependency listing and the byte-level rpath rewrite are collaborator
//! traits ([`DependencyLister`], [`SearchPathPatcher`]) with `ldd`- and
//! `patchelf`-backed production implementations.

mod bundle;
mod error;
mod graph;
mod list;
mod lookup;
mod patch;
mod relocate;
mod resolve;

pub use bundle::{run, Options, Report};
pub use error::{Error, Result};
pub use graph::DepGraph;
pub use list::{parse_ldd_output, DependencyLister, LddLister};
pub use lookup::locate;
pub use patch::{
    patch_bundle, PatchelfPatcher, SearchPathPatcher, BINARY_SEARCH_PATH, LIBRARY_SEARCH_PATH,
};
pub use relocate::{layout, Bundle};
pub use resolve::resolve;
