pub mod logger;
pub mod persistence;
