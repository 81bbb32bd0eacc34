use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;
use subst_config::{AliasState, Config};
use subst_core::{normalize_drive, AliasRegistry, DriveSubst, Error, MirrorTool, SubstManager};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SubstCall {
    Bind(String, String),
    Unbind(String),
}

/// Drive substitution fake keeping an in-memory binding table.
#[derive(Default, Clone)]
struct FakeSubst {
    mounted: Rc<RefCell<Vec<String>>>,
    calls: Rc<RefCell<Vec<SubstCall>>>,
}

impl FakeSubst {
    fn with_mounted(drive: &str) -> Self {
        let fake = Self::default();
        fake.mounted.borrow_mut().push(normalize_drive(drive));
        fake
    }
}

impl DriveSubst for FakeSubst {
    fn bind(&self, drive: &str, path: &str) -> io::Result<()> {
        self.calls
            .borrow_mut()
            .push(SubstCall::Bind(drive.to_string(), path.to_string()));
        self.mounted.borrow_mut().push(normalize_drive(drive));
        Ok(())
    }

    fn unbind(&self, drive: &str) -> io::Result<()> {
        self.calls
            .borrow_mut()
            .push(SubstCall::Unbind(drive.to_string()));
        let target = normalize_drive(drive);
        self.mounted.borrow_mut().retain(|d| *d != target);
        Ok(())
    }

    fn bindings(&self) -> io::Result<Vec<String>> {
        Ok(self.mounted.borrow().clone())
    }
}

/// Mirroring fake recording every invocation without touching the
/// filesystem.
#[derive(Default, Clone)]
struct FakeMirror {
    calls: Rc<RefCell<Vec<(PathBuf, PathBuf, &'static str)>>>,
}

impl MirrorTool for FakeMirror {
    fn mirror(&self, src: &Path, dst: &Path) -> io::Result<()> {
        self.calls
            .borrow_mut()
            .push((src.to_path_buf(), dst.to_path_buf(), "mirror"));
        Ok(())
    }

    fn diff_only(&self, src: &Path, dst: &Path) -> io::Result<()> {
        self.calls
            .borrow_mut()
            .push((src.to_path_buf(), dst.to_path_buf(), "diff"));
        Ok(())
    }
}

struct Fixture {
    _dir: TempDir,
    cache_dir: PathBuf,
    mirror: FakeMirror,
    subst: FakeSubst,
    mgr: SubstManager<FakeMirror, FakeSubst>,
}

fn fixture(subst: FakeSubst) -> Fixture {
    let dir = TempDir::new().unwrap();
    let cache_dir = dir.path().join("cache");

    let mut cfg = Config::load_from(dir.path().join("config.json")).unwrap();
    cfg.set_drive("Z:");
    cfg.set_cache_directory(&cache_dir.display().to_string());

    let mirror = FakeMirror::default();
    let mgr = SubstManager::new(cfg, mirror.clone(), subst.clone());

    Fixture {
        _dir: dir,
        cache_dir,
        mirror,
        subst,
        mgr,
    }
}

#[test]
fn upsert_is_idempotent_and_updates_in_place() {
    let mut f = fixture(FakeSubst::default());
    let mut registry = f.mgr.registry();

    assert!(registry.upsert("a", "p").unwrap());
    assert!(!registry.upsert("a", "p").unwrap());
    assert!(!registry.upsert("a", "q").unwrap());

    let entries = registry.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "a");
    assert_eq!(entries[0].remote_path, "q");
}

#[test]
fn list_follows_insertion_order_and_marks_active() {
    let mut f = fixture(FakeSubst::with_mounted("Z:"));
    {
        let mut registry = f.mgr.registry();
        registry.upsert("zeta", "/z").unwrap();
        registry.upsert("alpha", "/a").unwrap();
    }
    f.mgr.switch("alpha").unwrap();

    let entries = f.mgr.registry().list();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert!(!entries[0].active);
    assert!(entries[1].active);
}

#[test]
fn resolve_active_path_prefers_recorded_local_when_state_is_local() {
    let dir = TempDir::new().unwrap();
    let mut cfg = Config::load_from(dir.path().join("config.json")).unwrap();

    let mut aliases = IndexMap::new();
    aliases.insert("x".to_string(), "/remote".to_string());
    cfg.set_aliases(aliases);

    let mut locals = IndexMap::new();
    locals.insert("x".to_string(), "/local".to_string());
    cfg.set_alias_locals(locals);

    let mut states = IndexMap::new();
    states.insert("x".to_string(), AliasState::Local);
    cfg.set_alias_states(states);

    cfg.set_active("x");

    let registry = AliasRegistry::new(&mut cfg);
    assert_eq!(
        registry.resolve_active_path().unwrap(),
        ("x".to_string(), "/local".to_string())
    );

    cfg.set_alias_states(IndexMap::new());
    let registry = AliasRegistry::new(&mut cfg);
    assert_eq!(
        registry.resolve_active_path().unwrap(),
        ("x".to_string(), "/remote".to_string())
    );
}

#[test]
fn resolve_active_path_requires_an_active_alias() {
    let dir = TempDir::new().unwrap();
    let mut cfg = Config::load_from(dir.path().join("config.json")).unwrap();

    let registry = AliasRegistry::new(&mut cfg);
    assert!(matches!(
        registry.resolve_active_path(),
        Err(Error::NoActiveAlias)
    ));
}

#[test]
fn same_state_transition_is_a_no_op() {
    let mut f = fixture(FakeSubst::default());
    f.mgr.registry().upsert("x", "/r").unwrap();

    let err = f.mgr.set_state(Some("x"), AliasState::Remote).unwrap_err();
    assert!(matches!(err, Error::AlreadyInState(..)));

    // No sync was fired and no state entry was written.
    assert!(f.mirror.calls.borrow().is_empty());
    assert!(f.mgr.config().alias_states().is_empty());
}

#[test]
fn local_transition_fires_exactly_one_mirror_sync() {
    let mut f = fixture(FakeSubst::default());
    f.mgr.registry().upsert("x", "/r").unwrap();

    f.mgr.set_state(Some("x"), AliasState::Local).unwrap();

    let expected_local = f.cache_dir.join("x");
    let calls = f.mirror.calls.borrow();
    assert_eq!(
        *calls,
        vec![(PathBuf::from("/r"), expected_local.clone(), "mirror")]
    );

    assert!(expected_local.is_dir());
    assert_eq!(f.mgr.config().alias_states()["x"], AliasState::Local);
    assert_eq!(
        f.mgr.config().alias_locals()["x"],
        expected_local.display().to_string()
    );
}

#[test]
fn local_transition_of_the_active_alias_remounts() {
    let mut f = fixture(FakeSubst::with_mounted("Z:"));
    f.mgr.registry().upsert("x", "/r").unwrap();
    f.mgr.switch("x").unwrap();
    f.subst.calls.borrow_mut().clear();

    f.mgr.set_state(Some("x"), AliasState::Local).unwrap();

    let local = f.cache_dir.join("x").display().to_string();
    assert_eq!(
        *f.subst.calls.borrow(),
        vec![
            SubstCall::Unbind("Z:".to_string()),
            SubstCall::Bind("Z:".to_string(), local),
        ]
    );
}

#[test]
fn back_to_remote_records_without_syncing() {
    let mut f = fixture(FakeSubst::default());
    f.mgr.registry().upsert("x", "/r").unwrap();
    f.mgr.set_state(Some("x"), AliasState::Local).unwrap();
    f.mirror.calls.borrow_mut().clear();

    f.mgr.set_state(Some("x"), AliasState::Remote).unwrap();

    assert!(f.mirror.calls.borrow().is_empty());
    assert_eq!(f.mgr.config().alias_states()["x"], AliasState::Remote);
    // The lazily created local path stays recorded.
    assert!(f.mgr.config().alias_locals().contains_key("x"));
}

#[test]
fn switch_unmounts_then_mounts_with_the_resolved_path() {
    let mut f = fixture(FakeSubst::with_mounted("Z:"));
    {
        let mut registry = f.mgr.registry();
        registry.upsert("a", "/ra").unwrap();
        registry.upsert("b", "/rb").unwrap();
    }
    f.mgr.switch("a").unwrap();
    f.subst.calls.borrow_mut().clear();

    f.mgr.switch("b").unwrap();

    assert_eq!(f.mgr.config().active(), Some("b"));
    assert_eq!(
        *f.subst.calls.borrow(),
        vec![
            SubstCall::Unbind("Z:".to_string()),
            SubstCall::Bind("Z:".to_string(), "/rb".to_string()),
        ]
    );
}

#[test]
fn switch_to_unknown_alias_is_rejected() {
    let mut f = fixture(FakeSubst::default());
    f.mgr.registry().upsert("a", "/ra").unwrap();
    f.mgr.switch("a").unwrap();
    f.subst.calls.borrow_mut().clear();

    let err = f.mgr.switch("nope").unwrap_err();
    assert!(matches!(err, Error::AliasNotFound(_)));
    assert_eq!(f.mgr.config().active(), Some("a"));
    assert!(f.subst.calls.borrow().is_empty());
}

#[test]
fn unalias_leaves_the_active_pointer_dangling_and_status_survives() {
    let mut f = fixture(FakeSubst::with_mounted("Z:"));
    f.mgr.registry().upsert("x", "/r").unwrap();
    f.mgr.switch("x").unwrap();
    f.mgr.set_state(Some("x"), AliasState::Local).unwrap();

    f.mgr.registry().remove("x").unwrap();

    // The alias entry is gone but the other references stay behind.
    assert_eq!(f.mgr.config().active(), Some("x"));
    assert!(f.mgr.config().alias_states().contains_key("x"));
    assert!(f.mgr.config().alias_locals().contains_key("x"));

    let report = f.mgr.status();
    assert_eq!(report.active.as_deref(), Some("x"));
    assert_eq!(report.remote_path, None);
    assert_eq!(report.state, AliasState::Local);
}

#[test]
fn unmount_is_a_no_op_when_the_drive_is_not_substituted() {
    let mut f = fixture(FakeSubst::default());

    assert!(!f.mgr.unmount().unwrap());
    assert!(f.subst.calls.borrow().is_empty());
}

#[test]
fn unmount_removes_an_existing_binding() {
    let mut f = fixture(FakeSubst::with_mounted("Z:"));

    assert!(f.mgr.unmount().unwrap());
    assert_eq!(
        *f.subst.calls.borrow(),
        vec![SubstCall::Unbind("Z:".to_string())]
    );
}

#[test]
fn mount_requires_a_configured_drive() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::load_from(dir.path().join("config.json")).unwrap();
    let mut mgr = SubstManager::new(cfg, FakeMirror::default(), FakeSubst::default());

    let err = mgr.mount_active().unwrap_err();
    assert!(matches!(err, Error::MissingConfigValue("subst.drive")));
}

#[test]
fn local_transition_requires_a_cache_directory() {
    let dir = TempDir::new().unwrap();
    let mut cfg = Config::load_from(dir.path().join("config.json")).unwrap();
    cfg.set_drive("Z:");
    let mut mgr = SubstManager::new(cfg, FakeMirror::default(), FakeSubst::default());

    mgr.registry().upsert("x", "/r").unwrap();
    let err = mgr.set_state(Some("x"), AliasState::Local).unwrap_err();
    assert!(matches!(err, Error::MissingCacheDirectory));
}

#[test]
fn update_resyncs_the_local_cache_in_mirror_mode() {
    let mut f = fixture(FakeSubst::with_mounted("Z:"));
    f.mgr.registry().upsert("x", "/r").unwrap();
    f.mgr.switch("x").unwrap();

    // No alias argument: the active alias is updated.
    f.mgr.update(None).unwrap();

    let local = f.cache_dir.join("x");
    assert_eq!(
        *f.mirror.calls.borrow(),
        vec![(PathBuf::from("/r"), local, "mirror")]
    );
}

#[test]
fn fetch_reports_changes_without_mirroring() {
    let mut f = fixture(FakeSubst::default());
    f.mgr.registry().upsert("x", "/r").unwrap();

    f.mgr.fetch(Some("x")).unwrap();

    let local = f.cache_dir.join("x");
    assert_eq!(
        *f.mirror.calls.borrow(),
        vec![(PathBuf::from("/r"), local, "diff")]
    );
}

#[test]
fn ensure_local_path_is_stable_across_calls() {
    let mut f = fixture(FakeSubst::default());
    f.mgr.registry().upsert("x", "/r").unwrap();

    f.mgr.update(Some("x")).unwrap();
    f.mgr.update(Some("x")).unwrap();

    let locals = f.mgr.config().alias_locals();
    assert_eq!(locals.len(), 1);

    let calls = f.mirror.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, calls[1].1);
}
