use crate::engine::Engine;
use crate::engine::tests::helpers::*;
use tempfile::TempDir;

/// put followed by clean-shutdown-persist followed by restart preserves
/// every get/range result.
#[test]
fn persist_and_reopen_preserves_data() {
    let tmp = TempDir::new().unwrap();
    let mut engine = Engine::open(tmp.path(), small_tree_config()).unwrap();
    for k in 0..30 {
        engine.put(k, (k as i64) * 7).unwrap();
    }
    engine.close_persist().unwrap();

    let mut engine = Engine::open(tmp.path(), small_tree_config()).unwrap();
    for k in 0..30 {
        assert_eq!(engine.get(k).unwrap(), Some((k as i64) * 7));
    }
    assert_eq!(
        engine.range(0, 30).unwrap().len(),
        30,
        "range must see every key after a restart"
    );
}

#[test]
fn reopen_rebuilds_fence_and_bloom_for_every_level() {
    let tmp = TempDir::new().unwrap();
    let mut engine = Engine::open(tmp.path(), small_tree_config()).unwrap();
    for k in 0..20 {
        engine.put(k, k as i64).unwrap();
    }
    let before = engine.level_summary();
    engine.close_persist().unwrap();

    let mut engine = Engine::open(tmp.path(), small_tree_config()).unwrap();
    let after = engine.level_summary();
    assert_eq!(before, after);
    for k in 0..20 {
        assert_eq!(engine.get(k).unwrap(), Some(k as i64));
    }
}

#[test]
fn close_wipe_removes_the_data_directory() {
    let tmp = TempDir::new().unwrap();
    let mut engine = Engine::open(tmp.path(), buffer_only_config()).unwrap();
    engine.put(1, 10).unwrap();
    engine.close_wipe().unwrap();
    assert!(!tmp.path().join("catalog.data").exists());
    assert!(!tmp.path().join("k0.data").exists());
}
