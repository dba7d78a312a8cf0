use crate::utils::error::{Result, RunnerError};
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use url::Url;

/// Where a sample, a reference database or the output folder lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    S3 { bucket: String, key: String },
    Sra(String),
    Ftp(Url),
    Http(Url),
}

fn accession_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[SED]RR[0-9]+$").expect("valid accession regex"))
}

impl Location {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(invalid(value, "location cannot be empty"));
        }

        let Some((scheme, rest)) = value.split_once("://") else {
            return Ok(Location::Local(PathBuf::from(value)));
        };

        match scheme {
            "s3" => {
                let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
                if bucket.is_empty() {
                    return Err(invalid(value, "missing S3 bucket name"));
                }
                Ok(Location::S3 {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            "sra" => {
                let accession = rest.trim_end_matches('/').rsplit('/').next().unwrap_or("");
                if !accession_regex().is_match(accession) {
                    return Err(invalid(
                        value,
                        "SRA accession must look like SRR123456, ERR123456 or DRR123456",
                    ));
                }
                Ok(Location::Sra(accession.to_string()))
            }
            "ftp" | "http" | "https" => {
                let url = Url::parse(value).map_err(|e| invalid(value, &e.to_string()))?;
                if url.host_str().is_none() {
                    return Err(invalid(value, "URL has no host"));
                }
                if scheme == "ftp" {
                    Ok(Location::Ftp(url))
                } else {
                    Ok(Location::Http(url))
                }
            }
            other => Err(invalid(value, &format!("unsupported scheme '{}'", other))),
        }
    }

    /// 最後一段路徑，用作本地檔名與輸出前綴
    pub fn file_name(&self) -> String {
        match self {
            Location::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Location::S3 { key, .. } => last_segment(key),
            Location::Sra(accession) => accession.clone(),
            Location::Ftp(url) | Location::Http(url) => last_segment(url.path()),
        }
    }

    /// 輸入必須指向檔案，不能是資料夾
    pub fn sample_name(&self) -> Result<String> {
        let name = self.file_name();
        if name.is_empty() {
            return Err(invalid(
                &self.to_string(),
                "input must name a file, not a folder",
            ));
        }
        Ok(name)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::S3 { bucket, key } => write!(f, "s3://{}/{}", bucket, key),
            Location::Sra(accession) => write!(f, "sra://{}", accession),
            Location::Ftp(url) | Location::Http(url) => write!(f, "{}", url),
        }
    }
}

/// Splits the comma-separated `--input` value, ignoring empty entries.
pub fn split_inputs(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn last_segment(path: &str) -> String {
    path.rsplit('/').next().unwrap_or("").to_string()
}

fn invalid(value: &str, reason: &str) -> RunnerError {
    RunnerError::InvalidLocation {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
