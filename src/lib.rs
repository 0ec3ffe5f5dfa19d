// dor-admin library - administrative utilities for the digital object repository
// The binary is a thin clap front end over these modules

pub mod batch;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod datastreams;
pub mod druid;
pub mod external;
pub mod fs;
pub mod keys;
pub mod progress;
pub mod reports;
pub mod robots;
pub mod services;
pub mod telemetry;
pub mod transfer;
pub mod workflows;

#[cfg(test)]
mod testing;

// Re-export key types for easy access
pub use batch::{BatchReport, ItemFailure, ItemOutcome};
pub use cleanup::{is_affirmative, CleanupError, CleanupRunner, CleanupStep, Prompter};
pub use config::{DorConfig, DorEnvironment};
pub use druid::{staging_path, Druid, DruidError};
pub use services::{ServiceError, Services};
pub use telemetry::{create_batch_span, generate_correlation_id, init_telemetry};
