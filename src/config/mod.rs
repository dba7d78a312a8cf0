pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::location::split_inputs;
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_inputs, validate_location, validate_path, validate_positive_number, LocationRole,
    Validate,
};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[cfg_attr(feature = "cli", command(name = "humann2-runner"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Analyze a set of reads with HUMAnN2 and save the results")
)]
pub struct CliConfig {
    /// Location for input file(s), comma-separated (sra://, s3://, ftp://, http(s):// or local path)
    #[cfg_attr(feature = "cli", arg(long))]
    pub input: String,

    /// Folder containing the reference database (s3:// or local path)
    #[cfg_attr(feature = "cli", arg(long))]
    pub ref_db: String,

    /// Folder to place results (s3:// or local path)
    #[cfg_attr(feature = "cli", arg(long))]
    pub output_folder: String,

    /// Folder used for temporary files
    #[cfg_attr(feature = "cli", arg(long, default_value = "/share"))]
    pub temp_folder: PathBuf,

    /// Number of threads to use for analysis
    #[cfg_attr(feature = "cli", arg(long, default_value = "1"))]
    pub threads: usize,

    /// Optional TOML file with tool paths and S3 settings
    #[cfg_attr(feature = "cli", arg(long))]
    pub config: Option<PathBuf>,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value = "compact"))]
    pub log_format: LogFormat,

    #[cfg_attr(feature = "cli", arg(long, help = "Log CPU and memory usage per sample"))]
    pub monitor: bool,
}

impl CliConfig {
    /// Config with defaults for everything but the three required locations.
    pub fn new(input: &str, ref_db: &str, output_folder: &str, temp_folder: PathBuf) -> Self {
        Self {
            input: input.to_string(),
            ref_db: ref_db.to_string(),
            output_folder: output_folder.to_string(),
            temp_folder,
            threads: 1,
            config: None,
            verbose: false,
            log_format: LogFormat::Compact,
            monitor: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn inputs(&self) -> Vec<String> {
        split_inputs(&self.input)
    }

    fn ref_db(&self) -> &str {
        &self.ref_db
    }

    fn output_folder(&self) -> &str {
        &self.output_folder
    }

    fn temp_folder(&self) -> &Path {
        &self.temp_folder
    }

    fn threads(&self) -> usize {
        self.threads
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_inputs("input", &self.input)?;
        validate_location("ref_db", &self.ref_db, LocationRole::ReferenceDatabase)?;
        validate_location("output_folder", &self.output_folder, LocationRole::OutputFolder)?;
        validate_path("temp_folder", &self.temp_folder.to_string_lossy())?;
        validate_positive_number("threads", self.threads, 1)?;

        tracing::debug!("✅ CLI configuration validation passed");
        Ok(())
    }
}
