//! End-to-end pipeline tests over temp directories, using a scripted
//! dependency lister and a recording patcher instead of invoking ldd and
//! patchelf.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use haul::{
    run, DependencyLister, Error, Options, SearchPathPatcher, BINARY_SEARCH_PATH,
    LIBRARY_SEARCH_PATH,
};
use tempfile::TempDir;

struct ScriptedLister {
    deps: HashMap<PathBuf, Vec<PathBuf>>,
}

impl DependencyLister for ScriptedLister {
    fn list(&self, path: &Path) -> anyhow::Result<Vec<PathBuf>> {
        Ok(self.deps.get(path).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct RecordingPatcher {
    calls: RefCell<Vec<(PathBuf, String)>>,
}

impl SearchPathPatcher for RecordingPatcher {
    fn set_search_path(&self, file: &Path, search_path: &str) -> anyhow::Result<()> {
        self.calls
            .borrow_mut()
            .push((file.to_path_buf(), search_path.to_string()));
        Ok(())
    }
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, name).unwrap();
    path
}

fn options(binary: &Path, out: &Path) -> Options {
    Options {
        binary: binary.to_str().unwrap().to_string(),
        out_dir: out.to_path_buf(),
        prefix: "/opt/haul".to_string(),
        clean: true,
    }
}

#[test]
fn chain_scenario_builds_full_bundle() {
    // app depends on libfoo.so; libfoo.so depends on libbar.so.
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let app = touch(src.path(), "app");
    let libfoo = touch(src.path(), "libfoo.so");
    let libbar = touch(src.path(), "libbar.so");

    let lister = ScriptedLister {
        deps: HashMap::from([
            (app.clone(), vec![libfoo.clone()]),
            (libfoo.clone(), vec![libbar.clone()]),
        ]),
    };
    let patcher = RecordingPatcher::default();

    let report = run(&lister, &patcher, &options(&app, out.path())).unwrap();

    assert_eq!(report.closure.len(), 2);
    assert!(report.closure.contains(&libfoo));
    assert!(report.closure.contains(&libbar));

    let root = out.path().join("opt/haul");
    assert!(root.join("bin/app").exists());
    assert!(root.join("lib/libfoo.so").exists());
    assert!(root.join("lib/libbar.so").exists());

    // Binary patched first with the parent-relative lib expression, then
    // every library with the own-directory expression.
    let calls = patcher.calls.borrow();
    assert_eq!(calls[0].0, root.join("bin/app"));
    assert_eq!(calls[0].1, BINARY_SEARCH_PATH);
    assert_eq!(calls.len(), 3);
    for (file, rpath) in &calls[1..] {
        assert!(
            file.starts_with(root.join("lib")),
            "library patch outside lib/: {}",
            file.display()
        );
        assert_eq!(rpath, LIBRARY_SEARCH_PATH);
    }
}

#[test]
fn diamond_dependency_copied_once() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let app = touch(src.path(), "app");
    let liba = touch(src.path(), "libA.so");
    let libb = touch(src.path(), "libB.so");
    let libc = touch(src.path(), "libC.so");

    let lister = ScriptedLister {
        deps: HashMap::from([
            (app.clone(), vec![liba.clone(), libb.clone()]),
            (liba.clone(), vec![libc.clone()]),
            (libb.clone(), vec![libc.clone()]),
        ]),
    };
    let patcher = RecordingPatcher::default();

    let report = run(&lister, &patcher, &options(&app, out.path())).unwrap();

    assert_eq!(report.closure.len(), 3, "C must be a single vertex");
    let lib_dir = out.path().join("opt/haul/lib");
    let copied: Vec<_> = fs::read_dir(&lib_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(copied.len(), 3, "C must be copied exactly once: {copied:?}");
}

#[test]
fn zero_dependency_binary_gets_empty_lib_dir() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let app = touch(src.path(), "static-app");

    let lister = ScriptedLister {
        deps: HashMap::new(),
    };
    let patcher = RecordingPatcher::default();

    let report = run(&lister, &patcher, &options(&app, out.path())).unwrap();

    assert!(report.closure.is_empty());
    let lib_dir = out.path().join("opt/haul/lib");
    assert!(lib_dir.is_dir());
    assert_eq!(fs::read_dir(&lib_dir).unwrap().count(), 0);
    // Only the binary gets a search-path rewrite.
    assert_eq!(patcher.calls.borrow().len(), 1);
}

#[test]
fn copied_binary_is_executable() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let app = touch(src.path(), "app");

    let lister = ScriptedLister {
        deps: HashMap::new(),
    };
    run(&lister, &RecordingPatcher::default(), &options(&app, out.path())).unwrap();

    let mode = fs::metadata(out.path().join("opt/haul/bin/app"))
        .unwrap()
        .permissions()
        .mode();
    assert_ne!(mode & 0o111, 0, "expected executable bits, got {mode:o}");
}

#[test]
fn clean_rerun_leaves_only_current_artifacts() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let app = touch(src.path(), "app");
    let libfoo = touch(src.path(), "libfoo.so");

    let patcher = RecordingPatcher::default();

    // First run with a dependency.
    let lister = ScriptedLister {
        deps: HashMap::from([(app.clone(), vec![libfoo.clone()])]),
    };
    run(&lister, &patcher, &options(&app, out.path())).unwrap();
    assert!(out.path().join("opt/haul/lib/libfoo.so").exists());

    // Second run: the dependency is gone; clean must erase the stale copy.
    let lister = ScriptedLister {
        deps: HashMap::new(),
    };
    run(&lister, &patcher, &options(&app, out.path())).unwrap();

    assert!(out.path().join("opt/haul/bin/app").exists());
    assert!(!out.path().join("opt/haul/lib/libfoo.so").exists());
}

#[test]
fn missing_dependency_aborts_before_any_copy() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let app = touch(src.path(), "app");
    let ghost = src.path().join("libghost.so");

    let lister = ScriptedLister {
        deps: HashMap::from([(app.clone(), vec![ghost.clone()])]),
    };
    let patcher = RecordingPatcher::default();

    let err = run(&lister, &patcher, &options(&app, out.path())).unwrap_err();
    assert!(matches!(err, Error::MissingFile(p) if p == ghost));

    // Resolution failed before relocation: nothing was copied or patched.
    assert!(!out.path().join("opt/haul").exists());
    assert!(patcher.calls.borrow().is_empty());
}

#[test]
fn unknown_binary_is_lookup_error() {
    let out = TempDir::new().unwrap();
    let lister = ScriptedLister {
        deps: HashMap::new(),
    };
    let opts = Options {
        binary: "no-such-binary-xyzzy".to_string(),
        out_dir: out.path().to_path_buf(),
        prefix: "/opt/haul".to_string(),
        clean: true,
    };

    let err = run(&lister, &RecordingPatcher::default(), &opts).unwrap_err();
    assert!(matches!(err, Error::Lookup(_)));
}
