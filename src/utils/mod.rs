// src/utils/mod.rs
pub mod config;
pub mod error;
pub mod logging;

pub use config::ExtractorConfig; // Re-export main config type for convenience
