mod common;
use common::ENV_LOCK;

use chrono::{Duration, Utc};
use geoquiz::app::App;
use geoquiz::config::QuizConfig;
use geoquiz::constants::storage::{LEGACY_STUDY_KEY, PROGRESS_KEY, SESSION_KEY};
use geoquiz::quiz::hint::HintLevel;
use geoquiz::stores::{FileKvStore, KeyValueStore, MemoryKvStore};
use std::sync::Arc;

fn file_store(path: &std::path::Path) -> Arc<dyn KeyValueStore> {
    Arc::new(FileKvStore::open(path).expect("open state file"))
}

#[test]
fn active_session_survives_a_restart() {
    let dir = common::tmp_dir("geoquiz-restart");
    let path = dir.join("state.json");

    let mut engine = common::engine_with_store(file_store(&path), vec![0]);
    engine.start_session();
    engine.change_filter("Asien").unwrap();
    engine.change_group("O").unwrap();
    engine.open_hint().unwrap();
    engine.reveal_full().unwrap();
    assert_eq!(engine.submit("Oman").matched_name(), Some("Oman"));
    engine.change_group("J").unwrap();
    engine.submit("Japan");
    drop(engine);

    let mut restored = common::engine_with_store(file_store(&path), vec![]);
    let report = restored.restore();
    assert!(report.progress_restored);
    assert!(report.session_restored);
    assert_eq!(report.restored_found, 2);
    assert!(report.dropped.is_empty());
    assert!(restored.is_session_active());
    assert_eq!(restored.current_filter().as_tag(), "Asien");
    assert_eq!(restored.current_group(), "J");
    assert_eq!(restored.hint_level("Oman"), Some(HintLevel::Heavy));
    assert_eq!(restored.hint_level("Japan"), Some(HintLevel::None));
    assert!(restored.is_group_complete("J"));
    assert!(restored.is_group_complete("O"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn paused_sessions_do_not_write_progress() {
    let store = MemoryKvStore::new();
    let mut engine = common::engine_with_store(Arc::new(store.clone()), vec![]);
    engine.submit("Albanien");
    assert!(store.get(PROGRESS_KEY).unwrap().is_none());

    engine.start_session();
    engine.submit("Algerien");
    engine.pause_session();
    let saved = store.get(PROGRESS_KEY).unwrap().expect("progress saved");
    engine.submit("Afghanistan");
    assert_eq!(store.get(PROGRESS_KEY).unwrap().unwrap(), saved);
    let session: serde_json::Value =
        serde_json::from_str(&store.get(SESSION_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(session["snapshot"]["is_active"], false);
}

#[test]
fn stale_state_is_discarded_on_restore() {
    let store = MemoryKvStore::new();
    let old = (Utc::now() - Duration::hours(30)).to_rfc3339();
    let progress = serde_json::json!({
        "version": 1,
        "snapshot": {
            "found_by_group": { "M": ["Malta"] },
            "filter_tag": "Alle",
            "last_updated_at": old,
        }
    });
    store.set(PROGRESS_KEY, &progress.to_string()).unwrap();
    store.set(LEGACY_STUDY_KEY, "{\"cards\":[]}").unwrap();

    let mut engine = common::engine_with_store(Arc::new(store.clone()), vec![]);
    let report = engine.restore();
    assert!(!report.progress_restored);
    assert_eq!(engine.total_found(), 0);
    assert!(store.is_empty());
}

#[test]
fn corrupt_state_is_discarded_and_unknown_names_dropped() {
    let store = MemoryKvStore::new();
    store.set(SESSION_KEY, "garbage").unwrap();
    let progress = serde_json::json!({
        "version": 1,
        "snapshot": {
            "found_by_group": { "M": ["Malta", "Atlantis"] },
            "filter_tag": "Europa",
            "last_updated_at": Utc::now().to_rfc3339(),
            "current_group": "M",
            "hint_levels": { "Malta": "light" }
        }
    });
    store.set(PROGRESS_KEY, &progress.to_string()).unwrap();

    let mut engine = common::engine_with_store(Arc::new(store.clone()), vec![]);
    let report = engine.restore();
    assert!(report.progress_restored);
    assert!(!report.session_restored);
    assert_eq!(report.dropped, vec!["Atlantis"]);
    assert_eq!(engine.current_group(), "M");
    assert_eq!(engine.hint_level("Malta"), Some(HintLevel::Light));
    assert!(store.get(SESSION_KEY).unwrap().is_none());
    assert!(!engine.is_session_active());
}

#[test]
fn reset_all_clears_storage() {
    let store = MemoryKvStore::new();
    let mut engine = common::engine_with_store(Arc::new(store.clone()), vec![]);
    engine.start_session();
    engine.submit("Albanien");
    assert!(!store.is_empty());
    engine.reset_all();
    assert!(store.is_empty());
    assert_eq!(engine.total_found(), 0);
}

#[test]
fn unusable_state_file_falls_back_to_memory() {
    let dir = common::tmp_dir("geoquiz-fallback");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("state.json");
    std::fs::write(&path, "[1,2]").unwrap();

    let config = QuizConfig {
        catalog_path: common::sample_catalog_path(),
        state_path: path.clone(),
        ..QuizConfig::default()
    };
    let mut app = App::initialize(config).expect("app starts despite a broken state file");
    assert!(!app.restore.progress_restored);
    app.engine.start_session();
    assert_eq!(app.engine.submit("Albanien").matched_name(), Some("Albanien"));
    assert_eq!(app.engine.total_found(), 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1,2]");

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn app_initializes_from_env() {
    let _guard = ENV_LOCK.lock().await;
    let dir = common::tmp_dir("geoquiz-app");
    std::env::set_var("GEOQUIZ_CATALOG_PATH", common::sample_catalog_path());
    std::env::set_var("GEOQUIZ_STATE_PATH", dir.join("state.json"));
    std::env::set_var("GEOQUIZ_MATCH_THRESHOLD", "0.9");
    std::env::remove_var("GEOQUIZ_IN_MEMORY");

    let config = QuizConfig::from_env().expect("config");
    let mut app = App::initialize(config).expect("app");
    assert_eq!(app.engine.threshold(), 0.9);
    assert!(!app.restore.progress_restored);
    app.engine.start_session();
    app.engine.submit("Albanien");
    assert!(dir.join("state.json").exists());

    std::env::set_var("GEOQUIZ_CATALOG_PATH", dir.join("missing.json"));
    let err = App::initialize(QuizConfig::from_env().unwrap()).err().expect("missing catalog");
    assert_eq!(err.code, "NOT_FOUND");

    for key in [
        "GEOQUIZ_CATALOG_PATH",
        "GEOQUIZ_STATE_PATH",
        "GEOQUIZ_MATCH_THRESHOLD",
    ] {
        std::env::remove_var(key);
    }
    let _ = std::fs::remove_dir_all(dir);
}
