// Adapters layer: concrete implementations for external systems (processes, http, s3, storage).

pub mod command;
pub mod http;
pub mod s3;
pub mod storage;

use crate::config::toml_config::S3Config;
use crate::utils::error::{RunnerError, Result};

/// Network clients shared by every stage of a run.
#[derive(Debug, Clone, Default)]
pub struct RemoteClients {
    pub http: reqwest::Client,
    pub s3: Option<s3::S3Transfer>,
}

impl RemoteClients {
    pub async fn connect(needs_s3: bool, settings: &S3Config) -> Self {
        let s3 = if needs_s3 {
            Some(s3::S3Transfer::from_config(settings).await)
        } else {
            None
        };
        Self {
            http: reqwest::Client::new(),
            s3,
        }
    }

    pub fn s3(&self) -> Result<&s3::S3Transfer> {
        self.s3.as_ref().ok_or_else(|| RunnerError::ConfigError {
            message: "S3 client was not configured for this run".to_string(),
        })
    }
}
