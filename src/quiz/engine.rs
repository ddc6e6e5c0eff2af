use crate::constants::matching::DEFAULT_THRESHOLD;
use crate::errors::QuizError;
use crate::quiz::catalog::{Catalog, Filter};
use crate::quiz::hint::{HintError, HintLevel, HintMachine, HintView};
use crate::quiz::normalize::group_key;
use crate::quiz::progress::{FoundRecord, ProgressTracker, SubmitOutcome};
use crate::quiz::random::RandomSource;
use crate::quiz::summary::SessionSummary;
use crate::services::logger::Logger;
use crate::services::persistence::{Persistence, ProgressSnapshot, SessionSnapshot};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub progress_restored: bool,
    pub session_restored: bool,
    pub restored_found: usize,
    /// Persisted names the current catalog no longer knows.
    pub dropped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupProgress {
    pub group: String,
    pub found: usize,
    pub total: usize,
    pub current: bool,
}

impl GroupProgress {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.found == self.total
    }
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    active: bool,
    started_at: Option<DateTime<Utc>>,
}

pub struct QuizEngine {
    catalog: Arc<Catalog>,
    tracker: ProgressTracker,
    hints: HintMachine,
    current_group: String,
    current_filter: Filter,
    session: SessionState,
    persistence: Option<Persistence>,
    rng: Box<dyn RandomSource + Send>,
    threshold: f64,
    logger: Logger,
}

impl QuizEngine {
    pub fn new(catalog: Arc<Catalog>, logger: &Logger) -> Result<Self, QuizError> {
        let current_group = catalog
            .groups(&Filter::All)
            .into_iter()
            .next()
            .ok_or_else(|| {
                QuizError::invalid_catalog("Catalog has no candidates")
                    .with_hint("Point --catalog at a non-empty candidate list")
            })?;
        Ok(Self {
            tracker: ProgressTracker::new(catalog.clone()),
            catalog,
            hints: HintMachine::new(),
            current_group,
            current_filter: Filter::All,
            session: SessionState::default(),
            persistence: None,
            rng: Box::new(StdRng::from_entropy()),
            threshold: DEFAULT_THRESHOLD,
            logger: logger.child("engine"),
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_persistence(mut self, persistence: Persistence) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_random_source(mut self, rng: Box<dyn RandomSource + Send>) -> Self {
        self.rng = rng;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        let hints = &mut self.hints;
        let outcome = self.tracker.submit(
            text,
            &self.current_group,
            &self.current_filter,
            self.threshold,
            |name| hints.resolve(name),
        );
        if let SubmitOutcome::Matched { name, hint_level } = &outcome {
            self.logger.info(
                "Candidate resolved",
                Some(&json!({
                    "name": name,
                    "group": self.current_group,
                    "hint_level": hint_level,
                })),
            );
            self.persist_progress();
        }
        outcome
    }

    pub fn open_hint(&mut self) -> Result<HintView, HintError> {
        let pool = self.tracker.pool(&self.current_group, &self.current_filter);
        let view = self.hints.open(&pool, self.rng.as_mut())?;
        self.logger.debug(
            "Hint opened",
            Some(&json!({"group": self.current_group, "pool": pool.len()})),
        );
        Ok(view)
    }

    pub fn reveal_next_letter(&mut self) -> Result<HintView, HintError> {
        self.hints.reveal_next_letter()
    }

    pub fn reveal_full(&mut self) -> Result<HintView, HintError> {
        self.hints.reveal_full()
    }

    /// Resolves the hinted target as a heavy find and closes the hint.
    pub fn direct_reveal(&mut self) -> Result<String, HintError> {
        let name = self.hints.direct_reveal()?;
        self.tracker.record(&name, HintLevel::Heavy);
        self.logger
            .info("Candidate revealed", Some(&json!({"name": name})));
        self.persist_progress();
        Ok(name)
    }

    pub fn close_hint(&mut self) -> bool {
        self.hints.close()
    }

    /// Switches to the group of `key` (a letter, or any text starting with one).
    pub fn change_group(&mut self, key: &str) -> Result<(), QuizError> {
        let group = group_key(key)
            .ok_or_else(|| QuizError::invalid_input("Group key must not be empty"))?;
        if self.catalog.group_items(&group, &self.current_filter).next().is_none() {
            return Err(QuizError::not_found(format!(
                "No candidates in group {} for filter {}",
                group, self.current_filter
            ))
            .with_hint("List groups with :groups"));
        }
        self.hints.reset();
        self.current_group = group;
        self.persist_progress();
        Ok(())
    }

    /// Moves to the next group with candidates under the current filter, wrapping around.
    pub fn next_group(&mut self) -> Option<String> {
        let next = self
            .catalog
            .next_group(&self.current_group, &self.current_filter)?;
        self.hints.reset();
        self.current_group = next.clone();
        self.persist_progress();
        Some(next)
    }

    /// Applies a filter tag; the current group moves to the first non-empty one
    /// when it has no candidates under the new filter.
    pub fn change_filter(&mut self, tag: &str) -> Result<(), QuizError> {
        let filter = Filter::parse(tag);
        if !self.catalog.knows_filter(&filter) {
            let known: Vec<String> = self
                .catalog
                .filters()
                .iter()
                .map(|filter| filter.as_tag().to_string())
                .collect();
            return Err(QuizError::not_found(format!("Unknown filter: {}", tag.trim()))
                .with_hint("List filters with :filters")
                .with_details(json!({ "filters": known })));
        }
        self.hints.reset();
        self.current_filter = filter;
        self.settle_group();
        self.persist_progress();
        Ok(())
    }

    /// Forgets the finds of the current group only.
    pub fn reset_group(&mut self) -> Vec<String> {
        let removed = self.tracker.reset_group(&self.current_group);
        self.hints.reset();
        self.logger.info(
            "Group reset",
            Some(&json!({"group": self.current_group, "removed": removed.len()})),
        );
        self.persist_progress();
        removed
    }

    pub fn reset_all(&mut self) {
        self.tracker.reset_all();
        self.hints.reset();
        self.session = SessionState::default();
        if let Some(first) = self.catalog.groups(&self.current_filter).into_iter().next() {
            self.current_group = first;
        }
        if let Some(persistence) = &self.persistence {
            persistence.clear_all();
        }
        self.logger.info("Quiz reset", None);
    }

    pub fn start_session(&mut self) {
        self.session.active = true;
        if self.session.started_at.is_none() {
            self.session.started_at = Some(Utc::now());
        }
        self.persist_session();
        self.persist_progress();
    }

    pub fn pause_session(&mut self) {
        self.session.active = false;
        self.persist_session();
    }

    /// Loads persisted progress and session; expired or corrupt state is discarded.
    pub fn restore(&mut self) -> RestoreReport {
        let mut report = RestoreReport::default();
        let Some(persistence) = self.persistence.clone() else {
            return report;
        };
        persistence.clear_legacy();

        if let Some(snapshot) = persistence.load_progress() {
            self.apply_progress(snapshot, &mut report);
            report.progress_restored = true;
        }
        if let Some(session) = persistence.load_session() {
            if !report.progress_restored {
                let filter = Filter::parse(&session.filter_tag);
                if self.catalog.knows_filter(&filter) {
                    self.current_filter = filter;
                    self.settle_group();
                }
            }
            self.session = SessionState {
                active: session.is_active,
                started_at: session.started_at,
            };
            report.session_restored = true;
        }
        if !report.dropped.is_empty() {
            self.logger.warn(
                "Dropped unknown names from persisted progress",
                Some(&json!({"names": report.dropped})),
            );
        }
        self.logger.info(
            "Restore finished",
            Some(&json!({
                "progress": report.progress_restored,
                "session": report.session_restored,
                "found": report.restored_found,
            })),
        );
        report
    }

    fn apply_progress(&mut self, snapshot: ProgressSnapshot, report: &mut RestoreReport) {
        self.tracker.reset_all();
        self.hints.reset();
        let filter = Filter::parse(&snapshot.filter_tag);
        if self.catalog.knows_filter(&filter) {
            self.current_filter = filter;
        }
        for name in snapshot.found_by_group.values().flatten() {
            let level = snapshot.hint_levels.get(name).copied().unwrap_or_default();
            if self.tracker.record(name, level) {
                report.restored_found += 1;
            } else if !self.catalog.contains(name) {
                report.dropped.push(name.clone());
            }
        }
        if let Some(group) = snapshot.current_group {
            self.current_group = group;
        }
        self.settle_group();
    }

    /// Falls back to the first group with candidates when the current one is empty
    /// under the current filter.
    fn settle_group(&mut self) {
        let groups = self.catalog.groups(&self.current_filter);
        if !groups.contains(&self.current_group) {
            if let Some(first) = groups.into_iter().next() {
                self.current_group = first;
            }
        }
    }

    pub fn current_group(&self) -> &str {
        &self.current_group
    }

    pub fn current_filter(&self) -> &Filter {
        &self.current_filter
    }

    /// `(found, total)` for `group` under the current filter. Unknown or
    /// empty groups report `(0, 0)`.
    pub fn group_progress(&self, group: &str) -> (usize, usize) {
        match group_key(group) {
            Some(key) => self.tracker.group_progress(&key, &self.current_filter),
            None => (0, 0),
        }
    }

    pub fn is_group_complete(&self, group: &str) -> bool {
        let (found, total) = self.group_progress(group);
        total > 0 && found == total
    }

    pub fn filter_progress(&self, tag: &str) -> (usize, usize) {
        self.tracker.filter_progress(&Filter::parse(tag))
    }

    pub fn is_filter_complete(&self, tag: &str) -> bool {
        self.tracker.is_filter_complete(&Filter::parse(tag))
    }

    /// Progress of every non-empty group under the current filter, sorted by key.
    pub fn group_overview(&self) -> Vec<GroupProgress> {
        self.catalog
            .groups(&self.current_filter)
            .into_iter()
            .map(|group| {
                let (found, total) = self.tracker.group_progress(&group, &self.current_filter);
                GroupProgress {
                    current: group == self.current_group,
                    group,
                    found,
                    total,
                }
            })
            .collect()
    }

    pub fn total_found(&self) -> usize {
        self.tracker.total_found()
    }

    pub fn found_in_group(&self) -> Vec<&FoundRecord> {
        self.tracker
            .found_in_group(&self.current_group, &self.current_filter)
    }

    pub fn hint_level(&self, name: &str) -> Option<HintLevel> {
        self.tracker.hint_level(name)
    }

    pub fn hint_view(&self) -> Option<HintView> {
        self.hints.view()
    }

    /// Names hinted since the last group change, as `(light, heavy)`.
    pub fn hint_sets(&self) -> (&BTreeSet<String>, &BTreeSet<String>) {
        (self.hints.ever_light(), self.hints.ever_heavy())
    }

    /// Scores the finds of the current filter.
    pub fn summary(&self) -> SessionSummary {
        let total = self.catalog.filter_items(&self.current_filter).count();
        SessionSummary::from_records(self.tracker.found_in_filter(&self.current_filter), total)
    }

    pub fn available_groups(&self) -> Vec<String> {
        self.catalog.groups(&self.current_filter)
    }

    pub fn available_filters(&self) -> Vec<Filter> {
        self.catalog.filters()
    }

    pub fn is_session_active(&self) -> bool {
        self.session.active
    }

    pub fn session_started_at(&self) -> Option<DateTime<Utc>> {
        self.session.started_at
    }

    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        let hint_levels = self
            .tracker
            .records()
            .into_iter()
            .filter(|record| record.hint_level != HintLevel::None)
            .map(|record| (record.canonical_name.clone(), record.hint_level))
            .collect();
        ProgressSnapshot {
            found_by_group: self.tracker.found_by_group(),
            filter_tag: self.current_filter.as_tag().to_string(),
            last_updated_at: Utc::now(),
            current_group: Some(self.current_group.clone()),
            hint_levels,
        }
    }

    pub fn session_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            is_active: self.session.active,
            started_at: self.session.started_at,
            filter_tag: self.current_filter.as_tag().to_string(),
            total_found: self.tracker.total_found(),
            updated_at: Utc::now(),
        }
    }

    fn persist_progress(&self) {
        if !self.session.active {
            return;
        }
        if let Some(persistence) = &self.persistence {
            persistence.save_progress(&self.progress_snapshot());
            persistence.save_session(&self.session_snapshot());
        }
    }

    fn persist_session(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.save_session(&self.session_snapshot());
        }
    }
}
