use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizErrorKind {
    InvalidInput,
    InvalidCatalog,
    NotFound,
    Config,
    Io,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizError {
    pub kind: QuizErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl QuizError {
    pub fn new(kind: QuizErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(QuizErrorKind::InvalidInput, "INVALID_INPUT", message)
    }

    pub fn invalid_catalog(message: impl Into<String>) -> Self {
        Self::new(QuizErrorKind::InvalidCatalog, "INVALID_CATALOG", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(QuizErrorKind::NotFound, "NOT_FOUND", message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(QuizErrorKind::Config, "CONFIG", message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(QuizErrorKind::Io, "IO", message)
    }
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hint {
            Some(hint) => write!(f, "{} ({})", self.message, hint),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Error for QuizError {}

impl From<std::io::Error> for QuizError {
    fn from(err: std::io::Error) -> Self {
        QuizError::io(err.to_string())
    }
}
