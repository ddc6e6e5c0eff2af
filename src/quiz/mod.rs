pub mod catalog;
pub mod engine;
pub mod hint;
pub mod message;
pub mod normalize;
pub mod progress;
pub mod random;
pub mod similarity;
pub mod summary;

pub use catalog::{CandidateItem, Catalog, Filter};
pub use engine::{GroupProgress, QuizEngine, RestoreReport};
pub use hint::{HintError, HintLevel, HintView};
pub use progress::{FoundRecord, SubmitOutcome};
pub use summary::{Performance, SessionSummary};
