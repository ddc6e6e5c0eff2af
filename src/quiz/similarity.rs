use crate::quiz::catalog::CandidateItem;
use crate::quiz::normalize::normalize;

/// Levenshtein distance over chars with unit costs.
pub fn edit_distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn score_normalized(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = edit_distance(a, b);
    (max_len - distance.min(max_len)) as f64 / max_len as f64
}

/// Similarity in `[0, 1]` between the normalized forms of both strings.
pub fn score(input: &str, target: &str) -> f64 {
    score_normalized(&normalize(input), &normalize(target))
}

fn best_normalized<'a>(normalized_input: &str, candidate: &'a CandidateItem) -> (f64, &'a str) {
    let mut best = (0.0, candidate.canonical_name());
    for name in candidate.names() {
        let value = score_normalized(normalized_input, &normalize(name));
        if value >= 1.0 {
            return (1.0, name);
        }
        if value > best.0 {
            best = (value, name);
        }
    }
    best
}

/// Highest score over the canonical name and every alternate.
pub fn best_name_score(input: &str, candidate: &CandidateItem) -> f64 {
    best_normalized(&normalize(input), candidate).0
}

pub fn is_acceptable_match(input: &str, candidate: &CandidateItem, threshold: f64) -> bool {
    best_name_score(input, candidate) >= threshold
}

/// Normalized input equals the canonical name or one of the alternates.
pub fn is_exact_match(input: &str, candidate: &CandidateItem) -> bool {
    let normalized = normalize(input);
    candidate.names().any(|name| normalize(name) == normalized)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    pub candidate: &'a CandidateItem,
    pub matched_name: &'a str,
    pub score: f64,
}

/// Best acceptable candidate of `pool`; ties keep the first one seen.
pub fn best_match<'a, I>(input: &str, pool: I, threshold: f64) -> Option<Match<'a>>
where
    I: IntoIterator<Item = &'a CandidateItem>,
{
    let normalized = normalize(input);
    let mut best: Option<Match<'a>> = None;
    for candidate in pool {
        let (value, matched_name) = best_normalized(&normalized, candidate);
        if value < threshold {
            continue;
        }
        let improves = best.as_ref().map(|b| value > b.score).unwrap_or(true);
        if improves {
            best = Some(Match {
                candidate,
                matched_name,
                score: value,
            });
        }
        if value >= 1.0 {
            break;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::{best_match, best_name_score, edit_distance, is_acceptable_match, score};
    use crate::quiz::catalog::CandidateItem;

    fn item(name: &str) -> CandidateItem {
        CandidateItem::new(name, "Europe").unwrap()
    }

    #[test]
    fn edit_distance_counts_unicode_chars() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("færø", "faro"), 2);
    }

    #[test]
    fn identical_strings_score_one_after_normalization() {
        for s in ["Chad", "  côte d'ivoire", "", "ÄGYPTEN"] {
            assert_eq!(score(s, s), 1.0);
        }
        assert_eq!(score("Ägypten", "agypten"), 1.0);
        assert_eq!(score("", ""), 1.0);
    }

    #[test]
    fn single_edit_scores_length_ratio() {
        let five = score("Malts", "Malta");
        assert!((five - 0.8).abs() < 1e-9);
        assert!(five >= 0.8);
        let three = score("Pru", "Peru");
        assert!((three - 0.75).abs() < 1e-9);
        let short = score("Cub", "Cuba");
        assert!(short < 0.8);
        let tiny = score("Irn", "Ira");
        assert!((tiny - 2.0 / 3.0).abs() < 1e-9);
        assert!(tiny < 0.8);
    }

    #[test]
    fn alternates_count_towards_acceptance() {
        let candidate = item("Elfenbeinküste").with_alternates(["Côte d'Ivoire", "Ivory Coast"]);
        assert!(is_acceptable_match("ivory cost", &candidate, 0.8));
        assert!(is_acceptable_match("Cote d'Ivoire", &candidate, 0.8));
        assert!(best_name_score("cote divoire", &candidate) > 0.9);
        assert!(!is_acceptable_match("Ghana", &candidate, 0.8));
    }

    #[test]
    fn best_match_prefers_the_closer_candidate() {
        let pool = vec![item("Austria"), item("Australia")];
        let found = best_match("Austia", &pool, 0.8).expect("match");
        assert_eq!(found.candidate.canonical_name(), "Austria");
        assert!((found.score - 6.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn transposition_costs_two_edits() {
        let pool = vec![item("Austria"), item("Australia")];
        assert!((score("Autsralia", "Australia") - 7.0 / 9.0).abs() < 1e-9);
        assert!(best_match("Autsralia", &pool, 0.8).is_none());
    }

    #[test]
    fn ties_keep_first_seen_candidate() {
        let pool = vec![item("Abcde"), item("Abcdf")];
        let found = best_match("abcdx", &pool, 0.8).expect("match");
        assert_eq!(found.candidate.canonical_name(), "Abcde");
    }

    #[test]
    fn exact_alternate_match_wins_over_fuzzy_canonical() {
        let pool = vec![
            item("Niger"),
            item("Weißrussland").with_alternates(["Belarus"]),
        ];
        let found = best_match("belarus", &pool, 0.8).expect("match");
        assert_eq!(found.candidate.canonical_name(), "Weißrussland");
        assert_eq!(found.matched_name, "Belarus");
        assert_eq!(found.score, 1.0);
    }

    #[test]
    fn best_match_on_empty_pool_is_none() {
        let pool: Vec<CandidateItem> = Vec::new();
        assert!(best_match("Chad", &pool, 0.8).is_none());
    }
}
