use crate::adapters::command::run_cmds;
use crate::adapters::http::download_to_file;
use crate::adapters::RemoteClients;
use crate::config::toml_config::ToolConfig;
use crate::domain::location::Location;
use crate::utils::error::{RunnerError, Result};
use std::path::{Path, PathBuf};

/// HUMAnN2 only recognizes a fixed set of file suffixes.
const SUFFIX_REPLACEMENTS: [(&str, &str); 6] = [
    (".fna.gz", ".fasta.gz"),
    (".fa.gz", ".fasta.gz"),
    (".fq.gz", ".fastq.gz"),
    (".fna", ".fasta"),
    (".fa", ".fasta"),
    (".fq", ".fastq"),
];

/// Brings sample reads from wherever they live into a sample folder.
pub struct ReadFetcher<'a> {
    clients: &'a RemoteClients,
    tools: &'a ToolConfig,
}

impl<'a> ReadFetcher<'a> {
    pub fn new(clients: &'a RemoteClients, tools: &'a ToolConfig) -> Self {
        Self { clients, tools }
    }

    pub async fn fetch(&self, input: &str, sample_dir: &Path) -> Result<PathBuf> {
        tracing::info!("Getting reads from {}", input);
        let location = Location::parse(input)?;
        let filename = location.sample_name()?;
        let local_path = sample_dir.join(&filename);

        tracing::info!("Filename: {}", filename);
        tracing::info!("Local path: {}", local_path.display());

        match &location {
            Location::S3 { bucket, key } => {
                tracing::info!("Getting reads from S3");
                self.clients.s3()?.download(bucket, key, &local_path).await?;
                Ok(local_path)
            }
            Location::Ftp(url) => {
                tracing::info!("Getting reads from FTP");
                let dir = sample_dir.to_string_lossy().into_owned();
                run_cmds(&self.tools.tools.wget, ["-P", dir.as_str(), url.as_str()]).await?;
                Ok(local_path)
            }
            Location::Http(url) => {
                tracing::info!("Getting reads over HTTP");
                download_to_file(&self.clients.http, url.as_str(), &local_path).await?;
                Ok(local_path)
            }
            Location::Sra(accession) => self.fetch_sra(accession, sample_dir).await,
            Location::Local(path) => {
                tracing::info!("Copying reads from local path");
                if !path.is_file() {
                    return Err(RunnerError::MissingInputFile { path: path.clone() });
                }
                tokio::fs::copy(path, &local_path).await?;
                Ok(local_path)
            }
        }
    }

    async fn fetch_sra(&self, accession: &str, sample_dir: &Path) -> Result<PathBuf> {
        tracing::info!("Getting reads from SRA: {}", accession);
        let tools = &self.tools.tools;
        let local_path = sample_dir.join(format!("{}.fastq", accession));
        let outdir = sample_dir.to_string_lossy().into_owned();

        run_cmds(&tools.prefetch, [accession]).await?;
        run_cmds(
            &tools.fastq_dump,
            [
                "--skip-technical",
                "--readids",
                "--read-filter",
                "pass",
                "--dumpbase",
                "--clip",
                "--outdir",
                outdir.as_str(),
                accession,
            ],
        )
        .await?;

        // fastq-dump 會自動加上 _pass 後綴
        let dumped = sample_dir.join(format!("{}_pass.fastq", accession));
        tokio::fs::rename(&dumped, &local_path).await?;

        let cached = self.tools.sra.cache_dir.join(format!("{}.sra", accession));
        if tokio::fs::try_exists(&cached).await? {
            tracing::info!("Deleting cached SRA file");
            tokio::fs::remove_file(&cached).await?;
        }

        Ok(local_path)
    }
}

/// Renames `path` to a HUMAnN2-compatible suffix if needed.
pub async fn normalize_read_suffix(path: &Path) -> Result<PathBuf> {
    let Some(renamed) = normalized_name(path) else {
        return Ok(path.to_path_buf());
    };

    tracing::debug!("Renaming {} to {}", path.display(), renamed.display());
    tokio::fs::rename(path, &renamed).await?;
    Ok(renamed)
}

fn normalized_name(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    SUFFIX_REPLACEMENTS
        .iter()
        .find_map(|(suffix, replacement)| {
            name.strip_suffix(suffix)
                .map(|stem| format!("{}{}", stem, replacement))
        })
        .map(|new_name| path.with_file_name(new_name))
}
