pub mod app;
pub mod config;
pub mod constants;
pub mod errors;
pub mod quiz;
pub mod repl;
pub mod services;
pub mod stores;
pub mod utils;
