use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("TSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid location '{value}': {reason}")]
    InvalidLocation { value: String, reason: String },

    #[error("Reference database folder not found: {}", .path.display())]
    MissingDatabaseFolder { path: PathBuf },

    #[error("Input file not found: {}", .path.display())]
    MissingInputFile { path: PathBuf },

    #[error("Failed to start '{program}': {source}")]
    CommandSpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' failed with exit code {}", .code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("No *_{kind}.tsv file found in HUMAnN2 output")]
    MissingOutput { kind: String },

    #[error("Multiple *_{kind}.tsv files found in HUMAnN2 output")]
    DuplicateOutput { kind: String },

    #[error("Malformed TSV {}:{line}: {message}", .path.display())]
    MalformedTsv {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    ExternalTool,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RunnerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RunnerError::ConfigError { .. }
            | RunnerError::ConfigValidationError { .. }
            | RunnerError::InvalidConfigValueError { .. }
            | RunnerError::MissingConfigError { .. }
            | RunnerError::InvalidLocation { .. } => ErrorCategory::Configuration,
            RunnerError::HttpError(_) => ErrorCategory::Network,
            RunnerError::StorageError { .. }
            | RunnerError::MissingDatabaseFolder { .. }
            | RunnerError::MissingInputFile { .. } => ErrorCategory::Storage,
            RunnerError::CommandSpawnError { .. } | RunnerError::CommandFailed { .. } => {
                ErrorCategory::ExternalTool
            }
            RunnerError::CsvError(_)
            | RunnerError::SerializationError(_)
            | RunnerError::MissingOutput { .. }
            | RunnerError::DuplicateOutput { .. }
            | RunnerError::MalformedTsv { .. } => ErrorCategory::Data,
            RunnerError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::ExternalTool | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RunnerError::InvalidLocation { .. } => {
                "Use a local path or one of the s3://, sra://, ftp://, http(s):// schemes"
            }
            RunnerError::MissingDatabaseFolder { .. } => {
                "The reference database must contain 'chocophlan' and 'uniref' folders"
            }
            RunnerError::MissingInputFile { .. } => "Check that the input path exists",
            RunnerError::CommandSpawnError { .. } => {
                "Make sure the tool is installed and on PATH, or set its path in the [tools] config"
            }
            RunnerError::CommandFailed { .. } => {
                "Inspect the subprocess output in the log above for the cause"
            }
            RunnerError::MissingOutput { .. } | RunnerError::DuplicateOutput { .. } => {
                "Check that the temporary folder is only used by this run"
            }
            RunnerError::MalformedTsv { .. } | RunnerError::CsvError(_) => {
                "HUMAnN2 output could not be parsed; check the tool version"
            }
            RunnerError::HttpError(_) => "Check network connectivity and the input URL",
            RunnerError::StorageError { .. } => {
                "Check AWS credentials, bucket name and region"
            }
            RunnerError::IoError(_) => "Check disk space and permissions of the temp folder",
            RunnerError::SerializationError(_) => "This is likely a bug; please report it",
            RunnerError::ConfigError { .. }
            | RunnerError::ConfigValidationError { .. }
            | RunnerError::InvalidConfigValueError { .. }
            | RunnerError::MissingConfigError { .. } => {
                "Review the command line flags and the TOML config file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Download failed: {}", self),
            ErrorCategory::Storage => format!("Storage problem: {}", self),
            ErrorCategory::ExternalTool => format!("External tool failed: {}", self),
            ErrorCategory::Data => format!("Could not read HUMAnN2 results: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 依嚴重程度決定程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
