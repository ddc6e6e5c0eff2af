use crate::config::QuizConfig;
use crate::errors::QuizError;
use crate::quiz::catalog::Catalog;
use crate::quiz::engine::{QuizEngine, RestoreReport};
use crate::services::logger::Logger;
use crate::services::persistence::Persistence;
use crate::stores::{FileKvStore, KeyValueStore, MemoryKvStore};
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub config: QuizConfig,
    pub engine: QuizEngine,
    pub restore: RestoreReport,
}

impl App {
    fn open_store(config: &QuizConfig, logger: &Logger) -> Arc<dyn KeyValueStore> {
        if config.in_memory {
            logger.info("Using in-memory state", None);
            return Arc::new(MemoryKvStore::new());
        }
        match FileKvStore::open(&config.state_path) {
            Ok(store) => {
                logger.debug(
                    "Using state file",
                    Some(&serde_json::json!({"path": store.path().display().to_string()})),
                );
                Arc::new(store)
            }
            Err(err) => {
                logger.warn(
                    "State file unusable, keeping state in memory",
                    Some(&serde_json::json!({
                        "path": config.state_path.display().to_string(),
                        "error": err.to_string(),
                    })),
                );
                Arc::new(MemoryKvStore::new())
            }
        }
    }

    pub fn initialize(config: QuizConfig) -> Result<Self, QuizError> {
        let logger = Logger::new("geoquiz");
        let catalog = Arc::new(Catalog::load(&config.catalog_path)?);
        logger.info(
            "Catalog loaded",
            Some(&serde_json::json!({
                "path": config.catalog_path.display().to_string(),
                "items": catalog.len(),
            })),
        );

        let store = Self::open_store(&config, &logger);
        let persistence = Persistence::new(store, &logger).with_freshness(config.freshness());
        let mut engine = QuizEngine::new(catalog, &logger)?
            .with_threshold(config.match_threshold)
            .with_persistence(persistence);
        let restore = engine.restore();

        Ok(Self {
            logger,
            config,
            engine,
            restore,
        })
    }
}
