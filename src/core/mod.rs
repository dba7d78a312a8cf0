pub mod engine;
pub mod humann2;
pub mod pipeline;
pub mod reads;
pub mod refdb;

pub use crate::domain::model::{ResultEnvelope, RunSummary, StagedSample};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
