mod quiz_error;
mod store_error;

pub use quiz_error::{QuizError, QuizErrorKind};
pub use store_error::StoreError;
