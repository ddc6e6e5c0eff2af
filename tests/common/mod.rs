#![allow(dead_code)]

use geoquiz::quiz::catalog::Catalog;
use geoquiz::quiz::engine::QuizEngine;
use geoquiz::quiz::random::ScriptedPicks;
use geoquiz::services::logger::Logger;
use geoquiz::services::persistence::Persistence;
use geoquiz::stores::KeyValueStore;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub fn tmp_dir(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()))
}

pub fn sample_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("countries.json")
}

pub fn city_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("cities.json")
}

pub fn sample_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::load(&sample_catalog_path()).expect("sample catalog loads"))
}

pub fn engine(picks: Vec<usize>) -> QuizEngine {
    QuizEngine::new(sample_catalog(), &Logger::silent("test"))
        .expect("engine")
        .with_random_source(Box::new(ScriptedPicks::new(picks)))
}

pub fn engine_with_store(store: Arc<dyn KeyValueStore>, picks: Vec<usize>) -> QuizEngine {
    let logger = Logger::silent("test");
    engine(picks).with_persistence(Persistence::new(store, &logger))
}
