use crate::domain::model::{ResultEnvelope, StagedSample};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Destination folder for result documents.
pub trait Storage: Send + Sync {
    fn exists(&self, name: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    /// Writes `data` under `name` and returns the full destination.
    fn write_file(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
    fn describe(&self, name: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn inputs(&self) -> Vec<String>;
    fn ref_db(&self) -> &str;
    fn output_folder(&self) -> &str;
    fn temp_folder(&self) -> &Path;
    fn threads(&self) -> usize;
}

/// One sample through fetch, HUMAnN2 and delivery.
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Returns `None` when the result already exists.
    async fn extract(&self, input: &str) -> Result<Option<StagedSample>>;
    async fn transform(&self, sample: &StagedSample) -> Result<ResultEnvelope>;
    async fn load(&self, sample: StagedSample, envelope: ResultEnvelope) -> Result<String>;
}
