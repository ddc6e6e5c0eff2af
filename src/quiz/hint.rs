//! Graduated hints for one unresolved candidate at a time.
//!
//! Opening a hint shows the first two letters (a light hint). Revealing any
//! further letter, or the whole name, escalates the episode to a heavy hint.
//! The `ever_*` sets remember which names were hinted so the found list can
//! mark them; they survive `close` and are wiped on group change and reset.

use crate::constants::hints::{LIGHT_PREFIX_LEN, MASK_CHAR};
use crate::quiz::catalog::CandidateItem;
use crate::quiz::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintLevel {
    #[default]
    None,
    Light,
    Heavy,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HintError {
    #[error("a hint is already open")]
    AlreadyActive,
    #[error("no unresolved candidates left to hint")]
    NoCandidates,
    #[error("no hint is open")]
    NotActive,
    #[error("the hinted name is already fully revealed")]
    FullyRevealed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveHint {
    target: String,
    len: usize,
    revealed: usize,
    escalated: bool,
}

impl ActiveHint {
    fn level(&self) -> HintLevel {
        if self.escalated {
            HintLevel::Heavy
        } else {
            HintLevel::Light
        }
    }

    fn view(&self) -> HintView {
        let prefix: String = self.target.chars().take(self.revealed).collect();
        let mut masked = prefix.clone();
        masked.extend(std::iter::repeat(MASK_CHAR).take(self.len - self.revealed));
        HintView {
            target: self.target.clone(),
            revealed: self.revealed,
            len: self.len,
            prefix,
            masked,
            can_reveal_more: self.revealed < self.len,
            is_fully_revealed: self.revealed == self.len,
            level: self.level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintView {
    pub target: String,
    pub revealed: usize,
    pub len: usize,
    pub prefix: String,
    pub masked: String,
    pub can_reveal_more: bool,
    pub is_fully_revealed: bool,
    pub level: HintLevel,
}

#[derive(Debug, Clone, Default)]
pub struct HintMachine {
    active: Option<ActiveHint>,
    ever_light: BTreeSet<String>,
    ever_heavy: BTreeSet<String>,
}

impl HintMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn target(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.target.as_str())
    }

    /// Revealed prefix length; 0 while inactive.
    pub fn revealed(&self) -> usize {
        self.active.as_ref().map(|a| a.revealed).unwrap_or(0)
    }

    /// Classification a resolution of the target would get right now.
    pub fn current_level(&self) -> HintLevel {
        self.active
            .as_ref()
            .map(ActiveHint::level)
            .unwrap_or(HintLevel::None)
    }

    pub fn view(&self) -> Option<HintView> {
        self.active.as_ref().map(ActiveHint::view)
    }

    pub fn ever_light(&self) -> &BTreeSet<String> {
        &self.ever_light
    }

    pub fn ever_heavy(&self) -> &BTreeSet<String> {
        &self.ever_heavy
    }

    /// Picks a target uniformly from `pool` and shows the light prefix.
    pub fn open(
        &mut self,
        pool: &[&CandidateItem],
        rng: &mut dyn RandomSource,
    ) -> Result<HintView, HintError> {
        if self.active.is_some() {
            return Err(HintError::AlreadyActive);
        }
        if pool.is_empty() {
            return Err(HintError::NoCandidates);
        }
        let pick = rng.pick_index(pool.len()).min(pool.len() - 1);
        let target = pool[pick].canonical_name().to_string();
        let len = target.chars().count();
        let active = ActiveHint {
            revealed: LIGHT_PREFIX_LEN.min(len),
            len,
            escalated: false,
            target,
        };
        if !self.ever_heavy.contains(&active.target) {
            self.ever_light.insert(active.target.clone());
        }
        let view = active.view();
        self.active = Some(active);
        Ok(view)
    }

    pub fn reveal_next_letter(&mut self) -> Result<HintView, HintError> {
        let active = self.active.as_mut().ok_or(HintError::NotActive)?;
        if active.revealed >= active.len {
            return Err(HintError::FullyRevealed);
        }
        active.revealed += 1;
        if active.revealed > LIGHT_PREFIX_LEN {
            self.escalate();
        }
        self.view().ok_or(HintError::NotActive)
    }

    pub fn reveal_full(&mut self) -> Result<HintView, HintError> {
        let active = self.active.as_mut().ok_or(HintError::NotActive)?;
        active.revealed = active.len;
        self.escalate();
        self.view().ok_or(HintError::NotActive)
    }

    /// Ends the episode by handing the target over as a heavy resolution.
    pub fn direct_reveal(&mut self) -> Result<String, HintError> {
        if self.active.is_none() {
            return Err(HintError::NotActive);
        }
        self.escalate();
        let active = self.active.take().ok_or(HintError::NotActive)?;
        Ok(active.target)
    }

    /// Classifies a normal-path resolution of `name` and closes the episode
    /// when `name` is the hinted target. Other names resolve unaided.
    pub fn resolve(&mut self, name: &str) -> HintLevel {
        match &self.active {
            Some(active) if active.target == name => {
                let level = active.level();
                self.active = None;
                level
            }
            _ => HintLevel::None,
        }
    }

    /// Closes the popup; history is kept.
    pub fn close(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Closes any episode and forgets hint history (group change, reset).
    pub fn reset(&mut self) {
        self.active = None;
        self.ever_light.clear();
        self.ever_heavy.clear();
    }

    fn escalate(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.escalated = true;
            self.ever_light.remove(&active.target);
            self.ever_heavy.insert(active.target.clone());
        }
    }
}
