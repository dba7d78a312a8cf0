use clap::Parser;
use humann2_runner::utils::logger;
use humann2_runner::{app, CliConfig, SampleStatus, ToolConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    let logs = logger::init_cli_logger(config.verbose, config.log_format);

    tracing::info!("Starting humann2-runner");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let tools = match ToolConfig::load(config.config.as_deref()) {
        Ok(tools) => tools,
        Err(e) => {
            tracing::error!("❌ Failed to load tool config: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    match app::run(config, tools, logs).await {
        Ok(summary) => {
            for sample in &summary.samples {
                match &sample.status {
                    SampleStatus::Written(destination) => {
                        println!("✅ {} -> {}", sample.input, destination)
                    }
                    SampleStatus::Skipped => println!("⏭️  {} (output already exists)", sample.input),
                }
            }
            tracing::info!(
                "✅ Done: {} written, {} skipped",
                summary.written(),
                summary.skipped()
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
