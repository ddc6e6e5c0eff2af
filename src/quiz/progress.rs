use crate::quiz::catalog::{CandidateItem, Catalog, Filter};
use crate::quiz::hint::HintLevel;
use crate::quiz::normalize::normalize;
use crate::quiz::similarity::{best_match, is_exact_match};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundRecord {
    pub canonical_name: String,
    pub hint_level: HintLevel,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Blank submission; nothing happened.
    Ignored,
    AlreadyFound { name: String },
    Matched { name: String, hint_level: HintLevel },
    NoMatch,
}

impl SubmitOutcome {
    pub fn matched_name(&self) -> Option<&str> {
        match self {
            SubmitOutcome::Matched { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Resolved candidates of the active catalog, keyed by canonical name.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    catalog: Arc<Catalog>,
    found: HashMap<String, FoundRecord>,
    next_sequence: u64,
}

impl ProgressTracker {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            found: HashMap::new(),
            next_sequence: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Matches `input` against the unresolved pool of `group` under `filter`.
    /// `classify` is asked for the hint level only once a match is certain.
    pub fn submit<F>(
        &mut self,
        input: &str,
        group: &str,
        filter: &Filter,
        threshold: f64,
        classify: F,
    ) -> SubmitOutcome
    where
        F: FnOnce(&str) -> HintLevel,
    {
        if normalize(input).is_empty() {
            return SubmitOutcome::Ignored;
        }
        if let Some(name) = self.already_found(input) {
            return SubmitOutcome::AlreadyFound { name };
        }
        let matched = {
            let pool = self.pool(group, filter);
            best_match(input, pool, threshold).map(|m| m.candidate.canonical_name().to_string())
        };
        match matched {
            Some(name) => {
                let hint_level = classify(&name);
                self.record(&name, hint_level);
                SubmitOutcome::Matched { name, hint_level }
            }
            None => SubmitOutcome::NoMatch,
        }
    }

    fn already_found(&self, input: &str) -> Option<String> {
        self.found
            .keys()
            .filter_map(|name| self.catalog.get(name))
            .find(|candidate| is_exact_match(input, candidate))
            .map(|candidate| candidate.canonical_name().to_string())
    }

    /// Inserts a resolution; re-recording a name or an unknown name is a no-op.
    pub fn record(&mut self, name: &str, hint_level: HintLevel) -> bool {
        if self.found.contains_key(name) || !self.catalog.contains(name) {
            return false;
        }
        self.next_sequence += 1;
        self.found.insert(
            name.to_string(),
            FoundRecord {
                canonical_name: name.to_string(),
                hint_level,
                sequence: self.next_sequence,
            },
        );
        true
    }

    pub fn is_found(&self, name: &str) -> bool {
        self.found.contains_key(name)
    }

    pub fn hint_level(&self, name: &str) -> Option<HintLevel> {
        self.found.get(name).map(|record| record.hint_level)
    }

    /// Unresolved candidates of `group` under `filter`, in catalog order.
    pub fn pool<'a>(&'a self, group: &'a str, filter: &'a Filter) -> Vec<&'a CandidateItem> {
        self.catalog
            .group_items(group, filter)
            .filter(|item| !self.found.contains_key(item.canonical_name()))
            .collect()
    }

    pub fn group_progress(&self, group: &str, filter: &Filter) -> (usize, usize) {
        count_found(self.catalog.group_items(group, filter), &self.found)
    }

    pub fn is_group_complete(&self, group: &str, filter: &Filter) -> bool {
        let (found, total) = self.group_progress(group, filter);
        total > 0 && found == total
    }

    pub fn filter_progress(&self, filter: &Filter) -> (usize, usize) {
        count_found(self.catalog.filter_items(filter), &self.found)
    }

    pub fn is_filter_complete(&self, filter: &Filter) -> bool {
        let (found, total) = self.filter_progress(filter);
        total > 0 && found == total
    }

    pub fn total_found(&self) -> usize {
        self.found.len()
    }

    /// Records of `group` under `filter`, oldest first.
    pub fn found_in_group(&self, group: &str, filter: &Filter) -> Vec<&FoundRecord> {
        let mut records: Vec<&FoundRecord> = self
            .catalog
            .group_items(group, filter)
            .filter_map(|item| self.found.get(item.canonical_name()))
            .collect();
        records.sort_by_key(|record| record.sequence);
        records
    }

    pub fn found_in_filter(&self, filter: &Filter) -> Vec<&FoundRecord> {
        let mut records: Vec<&FoundRecord> = self
            .catalog
            .filter_items(filter)
            .filter_map(|item| self.found.get(item.canonical_name()))
            .collect();
        records.sort_by_key(|record| record.sequence);
        records
    }

    pub fn records(&self) -> Vec<&FoundRecord> {
        let mut records: Vec<&FoundRecord> = self.found.values().collect();
        records.sort_by_key(|record| record.sequence);
        records
    }

    /// Found names bucketed by group, each bucket in resolution order.
    pub fn found_by_group(&self) -> BTreeMap<String, Vec<String>> {
        let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for record in self.records() {
            if let Some(item) = self.catalog.get(&record.canonical_name) {
                out.entry(item.group_key().to_string())
                    .or_default()
                    .push(record.canonical_name.clone());
            }
        }
        out
    }

    /// Removes only the records filed under `group`; returns their names.
    pub fn reset_group(&mut self, group: &str) -> Vec<String> {
        let catalog = self.catalog.clone();
        let mut removed: Vec<String> = Vec::new();
        self.found.retain(|name, _| {
            let in_group = catalog
                .get(name)
                .map(|item| item.group_key() == group)
                .unwrap_or(false);
            if in_group {
                removed.push(name.clone());
            }
            !in_group
        });
        removed.sort();
        removed
    }

    pub fn reset_all(&mut self) {
        self.found.clear();
        self.next_sequence = 0;
    }
}

fn count_found<'a, I>(items: I, found: &HashMap<String, FoundRecord>) -> (usize, usize)
where
    I: Iterator<Item = &'a CandidateItem>,
{
    items.fold((0, 0), |(hits, total), item| {
        let hit = usize::from(found.contains_key(item.canonical_name()));
        (hits + hit, total + 1)
    })
}

#[cfg(test)]
mod tests {
    use super::{ProgressTracker, SubmitOutcome};
    use crate::quiz::catalog::{CandidateItem, Catalog, Filter};
    use crate::quiz::hint::HintLevel;
    use std::sync::Arc;

    const THRESHOLD: f64 = 0.8;

    fn tracker() -> ProgressTracker {
        let items = vec![
            CandidateItem::new("Austria", "Europe").unwrap(),
            CandidateItem::new("Australia", "Oceania").unwrap(),
            CandidateItem::new("Albania", "Europe").unwrap(),
            CandidateItem::new("Belgium", "Europe").unwrap(),
            CandidateItem::new("Brazil", "South America")
                .unwrap()
                .with_alternates(["Brasil"]),
        ];
        ProgressTracker::new(Arc::new(Catalog::new(items).unwrap()))
    }

    fn unaided(_: &str) -> HintLevel {
        HintLevel::None
    }

    #[test]
    fn typo_matches_the_closest_unresolved_candidate() {
        let mut tracker = tracker();
        let outcome = tracker.submit("Austia", "A", &Filter::All, THRESHOLD, unaided);
        assert_eq!(outcome.matched_name(), Some("Austria"));
        assert!(tracker.is_found("Austria"));
        assert!(!tracker.is_found("Australia"));
    }

    #[test]
    fn second_submission_reports_already_found() {
        let mut tracker = tracker();
        let first = tracker.submit("Brasil", "B", &Filter::All, THRESHOLD, unaided);
        assert_eq!(first.matched_name(), Some("Brazil"));
        let before = tracker.total_found();
        let second = tracker.submit("brazil", "B", &Filter::All, THRESHOLD, unaided);
        assert_eq!(
            second,
            SubmitOutcome::AlreadyFound {
                name: "Brazil".to_string()
            }
        );
        assert_eq!(tracker.total_found(), before);
        assert_eq!(before, 1);
    }

    #[test]
    fn blank_and_unknown_inputs_change_nothing() {
        let mut tracker = tracker();
        assert_eq!(
            tracker.submit("   ", "A", &Filter::All, THRESHOLD, unaided),
            SubmitOutcome::Ignored
        );
        assert_eq!(
            tracker.submit("Autsralia", "A", &Filter::All, THRESHOLD, unaided),
            SubmitOutcome::NoMatch
        );
        assert_eq!(tracker.total_found(), 0);
    }

    #[test]
    fn pool_is_scoped_to_group_and_filter() {
        let mut tracker = tracker();
        let europe = Filter::tag("Europe");
        assert_eq!(
            tracker.submit("Australia", "A", &europe, THRESHOLD, unaided),
            SubmitOutcome::NoMatch
        );
        assert_eq!(
            tracker.submit("Belgium", "A", &Filter::All, THRESHOLD, unaided),
            SubmitOutcome::NoMatch
        );
        assert_eq!(tracker.group_progress("A", &europe), (0, 2));
        assert_eq!(tracker.group_progress("A", &Filter::All), (0, 3));
    }

    #[test]
    fn classification_is_attached_to_the_record() {
        let mut tracker = tracker();
        let outcome = tracker.submit("Albania", "A", &Filter::All, THRESHOLD, |name| {
            assert_eq!(name, "Albania");
            HintLevel::Heavy
        });
        assert_eq!(
            outcome,
            SubmitOutcome::Matched {
                name: "Albania".to_string(),
                hint_level: HintLevel::Heavy
            }
        );
        assert_eq!(tracker.hint_level("Albania"), Some(HintLevel::Heavy));
    }

    #[test]
    fn completion_queries() {
        let mut tracker = tracker();
        assert!(!tracker.is_group_complete("B", &Filter::All));
        assert!(!tracker.is_group_complete("Z", &Filter::All));
        tracker.record("Belgium", HintLevel::None);
        tracker.record("Brazil", HintLevel::Light);
        assert!(tracker.is_group_complete("B", &Filter::All));
        assert!(!tracker.is_filter_complete(&Filter::tag("Europe")));
        tracker.record("Austria", HintLevel::None);
        tracker.record("Albania", HintLevel::None);
        assert!(tracker.is_filter_complete(&Filter::tag("Europe")));
        assert!(!tracker.is_filter_complete(&Filter::All));
        assert!(!tracker.is_filter_complete(&Filter::tag("Antarctica")));
    }

    #[test]
    fn record_is_idempotent_and_rejects_unknown_names() {
        let mut tracker = tracker();
        assert!(tracker.record("Belgium", HintLevel::None));
        assert!(!tracker.record("Belgium", HintLevel::Heavy));
        assert_eq!(tracker.hint_level("Belgium"), Some(HintLevel::None));
        assert!(!tracker.record("Atlantis", HintLevel::None));
        assert_eq!(tracker.total_found(), 1);
    }

    #[test]
    fn reset_group_leaves_other_groups_alone() {
        let mut tracker = tracker();
        for name in ["Austria", "Australia", "Albania", "Belgium", "Brazil"] {
            tracker.record(name, HintLevel::None);
        }
        let before_b = tracker.group_progress("B", &Filter::All);
        let removed = tracker.reset_group("A");
        assert_eq!(removed, vec!["Albania", "Australia", "Austria"]);
        assert_eq!(tracker.group_progress("A", &Filter::All), (0, 3));
        assert_eq!(tracker.group_progress("B", &Filter::All), before_b);
        assert_eq!(before_b, (2, 2));
    }

    #[test]
    fn found_lists_keep_resolution_order() {
        let mut tracker = tracker();
        tracker.record("Brazil", HintLevel::None);
        tracker.record("Albania", HintLevel::None);
        tracker.record("Belgium", HintLevel::None);
        let names: Vec<&str> = tracker
            .found_in_group("B", &Filter::All)
            .into_iter()
            .map(|r| r.canonical_name.as_str())
            .collect();
        assert_eq!(names, vec!["Brazil", "Belgium"]);
        let by_group = tracker.found_by_group();
        assert_eq!(by_group["A"], vec!["Albania"]);
        assert_eq!(by_group["B"], vec!["Brazil", "Belgium"]);
    }
}
