use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store file {path} does not hold a json object")]
    NotAnObject { path: String },
}
