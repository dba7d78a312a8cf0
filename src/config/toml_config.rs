use crate::utils::error::{RunnerError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tool paths and remote storage settings, loaded from `--config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub tools: ToolsConfig,
    pub sra: SraConfig,
    pub s3: S3Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub humann2: String,
    pub prefetch: String,
    pub fastq_dump: String,
    pub wget: String,
    pub humann2_extra_args: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            humann2: "humann2".to_string(),
            prefetch: "prefetch".to_string(),
            fastq_dump: "fastq-dump".to_string(),
            wget: "wget".to_string(),
            humann2_extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SraConfig {
    /// Where `prefetch` leaves `<accession>.sra` files.
    pub cache_dir: PathBuf,
}

impl Default for SraConfig {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/root".to_string());
        Self {
            cache_dir: Path::new(&home).join("ncbi").join("public").join("sra"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub server_side_encryption: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            server_side_encryption: true,
        }
    }
}

impl ToolConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RunnerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RunnerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Loads `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${HOME})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RunnerError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for ToolConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("tools.humann2", &self.tools.humann2)?;
        validate_non_empty_string("tools.prefetch", &self.tools.prefetch)?;
        validate_non_empty_string("tools.fastq_dump", &self.tools.fastq_dump)?;
        validate_non_empty_string("tools.wget", &self.tools.wget)?;
        validate_path("sra.cache_dir", &self.sra.cache_dir.to_string_lossy())?;

        if let Some(endpoint) = &self.s3.endpoint_url {
            let url = url::Url::parse(endpoint).map_err(|e| RunnerError::InvalidConfigValueError {
                field: "s3.endpoint_url".to_string(),
                value: endpoint.clone(),
                reason: format!("Invalid URL format: {}", e),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(RunnerError::InvalidConfigValueError {
                    field: "s3.endpoint_url".to_string(),
                    value: endpoint.clone(),
                    reason: format!("Unsupported URL scheme: {}", url.scheme()),
                });
            }
        }

        Ok(())
    }
}
