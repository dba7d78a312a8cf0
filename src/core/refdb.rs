use crate::adapters::RemoteClients;
use crate::domain::location::Location;
use crate::utils::error::{RunnerError, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const NUCLEOTIDE_DB: &str = "chocophlan";
pub const PROTEIN_DB: &str = "uniref";

/// A HUMAnN2 reference database available on local disk.
///
/// Databases downloaded from S3 live in a temporary folder owned by this value
/// and are removed by [`ReferenceDatabase::close`] (or on drop). Local
/// databases are used in place and never removed.
#[derive(Debug)]
pub struct ReferenceDatabase {
    path: PathBuf,
    source: String,
    owned: Option<TempDir>,
}

impl ReferenceDatabase {
    pub async fn resolve(ref_db: &str, temp_folder: &Path, clients: &RemoteClients) -> Result<Self> {
        let database = match Location::parse(ref_db)? {
            Location::S3 { bucket, key } => {
                tracing::info!("Getting reference database from S3: {}", ref_db);

                let dir = tempfile::Builder::new()
                    .suffix(".db")
                    .tempdir_in(temp_folder)?;
                tracing::info!("Saving database to {}", dir.path().display());

                let count = clients.s3()?.sync_prefix(&bucket, &key, dir.path()).await?;
                tracing::info!("Downloaded {} database files", count);

                Self {
                    path: dir.path().to_path_buf(),
                    source: ref_db.to_string(),
                    owned: Some(dir),
                }
            }
            Location::Local(path) => {
                tracing::info!("Getting reference database from local path: {}", ref_db);
                if !path.is_dir() {
                    return Err(RunnerError::MissingDatabaseFolder { path });
                }
                Self {
                    path,
                    source: ref_db.to_string(),
                    owned: None,
                }
            }
            other => {
                return Err(RunnerError::InvalidLocation {
                    value: other.to_string(),
                    reason: "reference database must be a local path or s3:// folder".to_string(),
                })
            }
        };

        database.verify()?;
        tracing::info!("Reference database: {}", database.path.display());
        Ok(database)
    }

    /// Both HUMAnN2 sub-databases must be present.
    pub fn verify(&self) -> Result<()> {
        for folder in [self.nucleotide_db(), self.protein_db()] {
            if !folder.is_dir() {
                return Err(RunnerError::MissingDatabaseFolder { path: folder });
            }
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The location as given on the command line.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nucleotide_db(&self) -> PathBuf {
        self.path.join(NUCLEOTIDE_DB)
    }

    pub fn protein_db(&self) -> PathBuf {
        self.path.join(PROTEIN_DB)
    }

    pub fn is_owned(&self) -> bool {
        self.owned.is_some()
    }

    pub fn close(self) -> Result<()> {
        if let Some(dir) = self.owned {
            tracing::info!("Deleting reference database: {}", dir.path().display());
            dir.close()?;
        }
        Ok(())
    }
}
