pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod metrics;
pub mod stats;
pub mod strategy;
