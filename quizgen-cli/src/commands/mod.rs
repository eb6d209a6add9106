//! CLI command implementations

pub mod config;
pub mod export;
pub mod generate;
pub mod serve;
pub mod status;
