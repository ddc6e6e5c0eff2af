use rand::Rng;

/// Source of uniform picks for hint targets; seeded in tests.
pub trait RandomSource {
    /// Uniform index in `0..len`; callers never pass `len == 0`.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Replays a fixed list of indices, wrapping each into range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPicks {
    picks: Vec<usize>,
    cursor: usize,
}

impl ScriptedPicks {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, cursor: 0 }
    }
}

impl RandomSource for ScriptedPicks {
    fn pick_index(&mut self, len: usize) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let raw = self.picks[self.cursor % self.picks.len()];
        self.cursor += 1;
        raw % len
    }
}
