use crate::constants::matching::{DEFAULT_THRESHOLD, MAX_THRESHOLD, MIN_THRESHOLD};
use crate::constants::storage::DEFAULT_FRESHNESS_HOURS;
use crate::errors::QuizError;
use crate::utils::feature_flags::is_in_memory_state_enabled;
use crate::utils::paths::{resolve_catalog_path, resolve_state_path};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct QuizConfig {
    pub match_threshold: f64,
    pub freshness_hours: i64,
    pub catalog_path: PathBuf,
    pub state_path: PathBuf,
    pub in_memory: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_THRESHOLD,
            freshness_hours: DEFAULT_FRESHNESS_HOURS,
            catalog_path: PathBuf::from("data").join("countries.json"),
            state_path: PathBuf::from("state.json"),
            in_memory: false,
        }
    }
}

impl QuizConfig {
    pub fn from_env() -> Result<Self, QuizError> {
        let match_threshold = match std::env::var("GEOQUIZ_MATCH_THRESHOLD") {
            Ok(raw) if !raw.trim().is_empty() => parse_threshold(&raw)?,
            _ => DEFAULT_THRESHOLD,
        };
        let freshness_hours = match std::env::var("GEOQUIZ_FRESHNESS_HOURS") {
            Ok(raw) if !raw.trim().is_empty() => parse_freshness_hours(&raw)?,
            _ => DEFAULT_FRESHNESS_HOURS,
        };
        Ok(Self {
            match_threshold,
            freshness_hours,
            catalog_path: resolve_catalog_path(),
            state_path: resolve_state_path(),
            in_memory: is_in_memory_state_enabled(),
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, QuizError> {
        self.match_threshold = check_threshold(threshold)?;
        Ok(self)
    }

    pub fn freshness(&self) -> chrono::Duration {
        chrono::Duration::hours(self.freshness_hours)
    }
}

pub fn parse_threshold(raw: &str) -> Result<f64, QuizError> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        QuizError::config(format!("Match threshold is not a number: {}", raw.trim()))
    })?;
    check_threshold(value)
}

fn check_threshold(value: f64) -> Result<f64, QuizError> {
    if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&value) {
        return Err(QuizError::config(format!(
            "Match threshold {} is out of range",
            value
        ))
        .with_hint(format!(
            "Use a value between {} and {}",
            MIN_THRESHOLD, MAX_THRESHOLD
        )));
    }
    Ok(value)
}

fn parse_freshness_hours(raw: &str) -> Result<i64, QuizError> {
    match raw.trim().parse::<i64>() {
        Ok(hours) if hours > 0 => Ok(hours),
        _ => Err(QuizError::config(format!(
            "GEOQUIZ_FRESHNESS_HOURS must be a positive integer, got {}",
            raw.trim()
        ))),
    }
}
