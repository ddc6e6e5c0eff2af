use crate::constants::storage::{
    DEFAULT_FRESHNESS_HOURS, LEGACY_STUDY_KEY, PROGRESS_KEY, SESSION_KEY, SNAPSHOT_VERSION,
};
use crate::quiz::hint::HintLevel;
use crate::services::logger::Logger;
use crate::stores::KeyValueStore;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub found_by_group: BTreeMap<String, Vec<String>>,
    pub filter_tag: String,
    pub last_updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_group: Option<String>,
    #[serde(default)]
    pub hint_levels: BTreeMap<String, HintLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub is_active: bool,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub filter_tag: String,
    pub total_found: usize,
    pub updated_at: DateTime<Utc>,
}

trait Stamped {
    fn stamp(&self) -> DateTime<Utc>;
}

impl Stamped for ProgressSnapshot {
    fn stamp(&self) -> DateTime<Utc> {
        self.last_updated_at
    }
}

impl Stamped for SessionSnapshot {
    fn stamp(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    snapshot: T,
}

#[derive(Default)]
struct PersistenceStats {
    loaded: u64,
    missing: u64,
    stale: u64,
    corrupt: u64,
    writes: u64,
    errors: u64,
}

/// Snapshot save/restore over a [`KeyValueStore`].
///
/// Nothing here fails the caller: backend errors are logged and counted,
/// and stale or unreadable snapshots are discarded and removed.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
    freshness: Duration,
    logger: Logger,
    stats: Arc<Mutex<PersistenceStats>>,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>, logger: &Logger) -> Self {
        Self {
            store,
            freshness: Duration::hours(DEFAULT_FRESHNESS_HOURS),
            logger: logger.child("persistence"),
            stats: Arc::new(Mutex::new(PersistenceStats::default())),
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub fn save_progress(&self, snapshot: &ProgressSnapshot) {
        self.save(PROGRESS_KEY, snapshot);
    }

    pub fn load_progress(&self) -> Option<ProgressSnapshot> {
        self.load(PROGRESS_KEY)
    }

    pub fn save_session(&self, snapshot: &SessionSnapshot) {
        self.save(SESSION_KEY, snapshot);
    }

    pub fn load_session(&self) -> Option<SessionSnapshot> {
        self.load(SESSION_KEY)
    }

    pub fn clear_all(&self) {
        for key in [PROGRESS_KEY, SESSION_KEY, LEGACY_STUDY_KEY] {
            self.remove(key);
        }
    }

    pub fn clear_legacy(&self) {
        self.remove(LEGACY_STUDY_KEY);
    }

    fn save<T: Serialize>(&self, key: &str, snapshot: &T) {
        let envelope = Envelope {
            version: SNAPSHOT_VERSION,
            snapshot,
        };
        let payload = match serde_json::to_string(&envelope) {
            Ok(payload) => payload,
            Err(err) => {
                self.bump(|s| s.errors += 1);
                self.logger.error(
                    "Snapshot serialization failed",
                    Some(&json!({"key": key, "error": err.to_string()})),
                );
                return;
            }
        };
        match self.store.set(key, &payload) {
            Ok(()) => {
                self.bump(|s| s.writes += 1);
                self.logger.debug("Snapshot saved", Some(&json!({"key": key})));
            }
            Err(err) => {
                self.bump(|s| s.errors += 1);
                self.logger.warn(
                    "Snapshot write failed",
                    Some(&json!({"key": key, "error": err.to_string()})),
                );
            }
        }
    }

    fn load<T: DeserializeOwned + Stamped>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.bump(|s| s.missing += 1);
                return None;
            }
            Err(err) => {
                self.bump(|s| s.errors += 1);
                self.logger.warn(
                    "Snapshot read failed",
                    Some(&json!({"key": key, "error": err.to_string()})),
                );
                return None;
            }
        };
        let envelope: Envelope<T> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                self.discard_corrupt(key, &err.to_string());
                return None;
            }
        };
        if envelope.version != SNAPSHOT_VERSION {
            self.discard_corrupt(key, &format!("unsupported version {}", envelope.version));
            return None;
        }
        if self.is_stale(envelope.snapshot.stamp()) {
            self.bump(|s| s.stale += 1);
            self.logger.info(
                "Discarding stale snapshot",
                Some(&json!({
                    "key": key,
                    "stamp": envelope.snapshot.stamp().to_rfc3339(),
                    "freshness_hours": self.freshness.num_hours(),
                })),
            );
            self.remove(key);
            return None;
        }
        self.bump(|s| s.loaded += 1);
        Some(envelope.snapshot)
    }

    fn is_stale(&self, stamp: DateTime<Utc>) -> bool {
        Utc::now().signed_duration_since(stamp) > self.freshness
    }

    fn discard_corrupt(&self, key: &str, reason: &str) {
        self.bump(|s| s.corrupt += 1);
        self.logger.warn(
            "Discarding corrupt snapshot",
            Some(&json!({"key": key, "error": reason})),
        );
        self.remove(key);
    }

    fn remove(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            self.bump(|s| s.errors += 1);
            self.logger.warn(
                "Snapshot removal failed",
                Some(&json!({"key": key, "error": err.to_string()})),
            );
        }
    }

    fn bump(&self, update: impl FnOnce(&mut PersistenceStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            update(&mut stats);
        }
    }

    pub fn stats(&self) -> serde_json::Value {
        let stats = self.stats.lock().unwrap_or_else(|err| err.into_inner());
        json!({
            "loaded": stats.loaded,
            "missing": stats.missing,
            "stale": stats.stale,
            "corrupt": stats.corrupt,
            "writes": stats.writes,
            "errors": stats.errors,
        })
    }
}
