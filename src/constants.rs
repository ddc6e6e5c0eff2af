pub mod matching {
    pub const DEFAULT_THRESHOLD: f64 = 0.8;
    pub const MIN_THRESHOLD: f64 = 0.5;
    pub const MAX_THRESHOLD: f64 = 1.0;
}

pub mod hints {
    /// Prefix length shown when a hint opens; revealing past it makes the hint heavy.
    pub const LIGHT_PREFIX_LEN: usize = 2;
    pub const MASK_CHAR: char = '_';
}

pub mod scoring {
    pub const UNAIDED_WEIGHT: f64 = 1.0;
    pub const LIGHT_HINT_WEIGHT: f64 = 0.7;
    pub const HEAVY_HINT_WEIGHT: f64 = 0.4;
    pub const GREAT_PERCENT: u32 = 90;
    pub const GOOD_PERCENT: u32 = 75;
    pub const FAIR_PERCENT: u32 = 60;
    pub const ASSISTED_PERCENT: u32 = 40;
}

pub mod storage {
    pub const PROGRESS_KEY: &str = "geoquiz-progress";
    pub const SESSION_KEY: &str = "geoquiz-session";
    pub const LEGACY_STUDY_KEY: &str = "geoquiz-study-progress";
    pub const SNAPSHOT_VERSION: u32 = 1;
    pub const DEFAULT_FRESHNESS_HOURS: i64 = 24;
    pub const FILE_MODE: u32 = 0o600;
}

pub mod messages {
    pub const SUCCESS_MS: u64 = 2_000;
    pub const ERROR_MS: u64 = 3_000;
    pub const INFO_MS: u64 = 2_000;
    pub const FADE_LEAD_MS: u64 = 500;
}

pub mod filters {
    pub const ALL: &str = "Alle";
    pub const ALL_ALIASES: &[&str] = &["alle", "all", "*"];
    pub const REGION_SEPARATOR: char = '/';
}
