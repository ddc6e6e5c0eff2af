use crate::constants::scoring::{
    ASSISTED_PERCENT, FAIR_PERCENT, GOOD_PERCENT, GREAT_PERCENT, HEAVY_HINT_WEIGHT, LIGHT_HINT_WEIGHT,
    UNAIDED_WEIGHT,
};
use crate::quiz::hint::HintLevel;
use crate::quiz::progress::FoundRecord;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    Perfect,
    Great,
    Good,
    Fair,
    Assisted,
    KeepPracticing,
}

impl Performance {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            p if p >= 100 => Performance::Perfect,
            p if p >= GREAT_PERCENT => Performance::Great,
            p if p >= GOOD_PERCENT => Performance::Good,
            p if p >= FAIR_PERCENT => Performance::Fair,
            p if p >= ASSISTED_PERCENT => Performance::Assisted,
            _ => Performance::KeepPracticing,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Performance::Perfect => "perfect",
            Performance::Great => "great",
            Performance::Good => "good",
            Performance::Fair => "fair",
            Performance::Assisted => "assisted",
            Performance::KeepPracticing => "keep practicing",
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub unaided: usize,
    pub light: usize,
    pub heavy: usize,
    pub total_found: usize,
    pub total_candidates: usize,
    pub effective_points: f64,
    pub effective_percentage: u32,
    pub performance: Performance,
}

impl SessionSummary {
    /// Scores `records` against a pool of `total_candidates`.
    pub fn from_records<'a, I>(records: I, total_candidates: usize) -> Self
    where
        I: IntoIterator<Item = &'a FoundRecord>,
    {
        let (mut unaided, mut light, mut heavy) = (0, 0, 0);
        for record in records {
            match record.hint_level {
                HintLevel::None => unaided += 1,
                HintLevel::Light => light += 1,
                HintLevel::Heavy => heavy += 1,
            }
        }
        let effective_points = unaided as f64 * UNAIDED_WEIGHT
            + light as f64 * LIGHT_HINT_WEIGHT
            + heavy as f64 * HEAVY_HINT_WEIGHT;
        let effective_percentage = if total_candidates == 0 {
            0
        } else {
            (effective_points / total_candidates as f64 * 100.0).round() as u32
        };
        Self {
            unaided,
            light,
            heavy,
            total_found: unaided + light + heavy,
            total_candidates,
            effective_points,
            effective_percentage,
            performance: Performance::from_percentage(effective_percentage),
        }
    }

    pub fn missing(&self) -> usize {
        self.total_candidates.saturating_sub(self.total_found)
    }
}
