pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::storage::{LocalStorage, S3Storage};
pub use config::{toml_config::ToolConfig, CliConfig};
pub use core::{engine::BatchEngine, pipeline::SamplePipeline};
pub use domain::model::{ResultEnvelope, RunSummary, SampleStatus};
pub use utils::error::{Result, RunnerError};
