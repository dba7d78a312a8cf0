use crate::adapters::RemoteClients;
use crate::config::toml_config::ToolConfig;
use crate::core::humann2::{collect_outputs, run_humann2};
use crate::core::reads::{normalize_read_suffix, ReadFetcher};
use crate::core::refdb::ReferenceDatabase;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::location::Location;
use crate::domain::model::{ResultEnvelope, RunParameters, StagedSample};
use crate::utils::error::Result;
use crate::utils::logger::LogBuffer;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::sync::Arc;

/// Runs one sample at a time against a resolved reference database.
pub struct SamplePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    tools: ToolConfig,
    clients: Arc<RemoteClients>,
    database: Arc<ReferenceDatabase>,
    logs: LogBuffer,
}

impl<S: Storage, C: ConfigProvider> SamplePipeline<S, C> {
    pub fn new(
        storage: S,
        config: C,
        tools: ToolConfig,
        clients: Arc<RemoteClients>,
        database: Arc<ReferenceDatabase>,
        logs: LogBuffer,
    ) -> Self {
        Self {
            storage,
            config,
            tools,
            clients,
            database,
            logs,
        }
    }

    /// Output file name for an input, `<last path segment>.json.gz`.
    pub fn output_name(input: &str) -> Result<String> {
        Ok(format!("{}.json.gz", read_prefix(input)?))
    }
}

fn read_prefix(input: &str) -> Result<String> {
    Location::parse(input)?.sample_name()
}

/// Serializes and gzips a result document.
pub fn encode_envelope(envelope: &ResultEnvelope) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    serde_json::to_writer(&mut encoder, envelope)?;
    encoder.flush()?;
    Ok(encoder.finish()?)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SamplePipeline<S, C> {
    async fn extract(&self, input: &str) -> Result<Option<StagedSample>> {
        let prefix = read_prefix(input)?;
        let output_name = Self::output_name(input)?;

        tracing::info!("Making sure that the output path doesn't already exist");
        if self.storage.exists(&output_name).await? {
            tracing::info!(
                "Output already exists ({})",
                self.storage.describe(&output_name)
            );
            return Ok(None);
        }

        // 每個樣本一個獨立的暫存資料夾
        let workdir = tempfile::Builder::new().tempdir_in(self.config.temp_folder())?;
        tracing::debug!("Sample folder: {}", workdir.path().display());

        let fetcher = ReadFetcher::new(&self.clients, &self.tools);
        let reads = fetcher.fetch(input, workdir.path()).await?;
        let reads = normalize_read_suffix(&reads).await?;

        Ok(Some(StagedSample {
            input: input.to_string(),
            prefix,
            reads,
            workdir,
        }))
    }

    async fn transform(&self, sample: &StagedSample) -> Result<ResultEnvelope> {
        run_humann2(
            &self.tools.tools,
            &sample.reads,
            &self.database,
            sample.workdir.path(),
            self.config.threads(),
        )
        .await?;

        let outputs = collect_outputs(sample.workdir.path())?;
        tracing::info!(
            "Collected {} gene families, {} pathway abundances, {} pathway coverages",
            outputs.gene_families.len(),
            outputs.pathway_abund.len(),
            outputs.pathway_cov.len()
        );

        let parameters = RunParameters {
            db: self.database.source().to_string(),
            input: sample.input.clone(),
            threads: self.config.threads(),
        };

        tracing::info!("Reading in the logs");
        Ok(ResultEnvelope::new(outputs, parameters, self.logs.lines()))
    }

    async fn load(&self, sample: StagedSample, envelope: ResultEnvelope) -> Result<String> {
        let data = encode_envelope(&envelope)?;
        let name = format!("{}.json.gz", sample.prefix);

        tracing::debug!("Writing {} ({} bytes) to storage", name, data.len());
        let destination = self.storage.write_file(&name, &data).await?;

        sample.workdir.close()?;
        Ok(destination)
    }
}
