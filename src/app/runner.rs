use crate::adapters::storage::{LocalStorage, S3Storage};
use crate::adapters::RemoteClients;
use crate::config::toml_config::ToolConfig;
use crate::config::CliConfig;
use crate::core::engine::BatchEngine;
use crate::core::pipeline::SamplePipeline;
use crate::core::refdb::ReferenceDatabase;
use crate::core::{ConfigProvider, RunSummary, Storage};
use crate::domain::location::Location;
use crate::utils::error::{RunnerError, Result};
use crate::utils::logger::LogBuffer;
use crate::utils::validation::Validate;
use std::sync::Arc;

/// Whole run: resolve the database, process every input, clean up.
pub async fn run(config: CliConfig, tools: ToolConfig, logs: LogBuffer) -> Result<RunSummary> {
    config.validate()?;
    tools.validate()?;

    let clients = Arc::new(RemoteClients::connect(needs_s3(&config), &tools.s3).await);

    tokio::fs::create_dir_all(config.temp_folder()).await?;
    let database = Arc::new(
        ReferenceDatabase::resolve(config.ref_db(), config.temp_folder(), &clients).await?,
    );
    tracing::info!("Threads: {}", config.threads());

    let result = match Location::parse(config.output_folder())? {
        Location::Local(path) => {
            let storage = LocalStorage::new(path);
            run_with(storage, config, tools, clients.clone(), database.clone(), logs).await
        }
        Location::S3 { bucket, key } => {
            let storage = S3Storage::new(clients.s3()?.clone(), bucket, &key);
            run_with(storage, config, tools, clients.clone(), database.clone(), logs).await
        }
        other => Err(RunnerError::InvalidLocation {
            value: other.to_string(),
            reason: "output folder must be a local path or s3:// folder".to_string(),
        }),
    };

    // 刪除下載的參考資料庫
    let closed = match Arc::try_unwrap(database) {
        Ok(database) => database.close(),
        Err(_) => {
            tracing::warn!("Reference database still in use, leaving it in place");
            Ok(())
        }
    };

    let summary = result?;
    closed?;
    Ok(summary)
}

async fn run_with<S: Storage>(
    storage: S,
    config: CliConfig,
    tools: ToolConfig,
    clients: Arc<RemoteClients>,
    database: Arc<ReferenceDatabase>,
    logs: LogBuffer,
) -> Result<RunSummary> {
    let inputs = config.inputs();
    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = SamplePipeline::new(storage, config, tools, clients, database, logs);
    let engine = BatchEngine::new_with_monitoring(pipeline, monitor_enabled);
    engine.run(&inputs).await
}

fn needs_s3(config: &CliConfig) -> bool {
    config
        .inputs()
        .iter()
        .map(String::as_str)
        .chain([config.ref_db(), config.output_folder()])
        .any(|value| matches!(Location::parse(value), Ok(Location::S3 { .. })))
}
