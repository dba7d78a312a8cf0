use crate::adapters::s3::S3Transfer;
use crate::core::Storage;
use crate::utils::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.base_path.join(name)).await?)
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        // 先寫暫存檔再改名，避免留下不完整的結果
        let full_path = self.base_path.join(name);
        let partial = self.base_path.join(format!(".{}.partial", name));
        tokio::fs::write(&partial, data).await?;
        tokio::fs::rename(&partial, &full_path).await?;

        Ok(full_path.display().to_string())
    }

    fn describe(&self, name: &str) -> String {
        self.base_path.join(name).display().to_string()
    }
}

#[derive(Debug, Clone)]
pub struct S3Storage {
    transfer: S3Transfer,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    pub fn new(transfer: S3Transfer, bucket: String, prefix: &str) -> Self {
        Self {
            transfer,
            bucket,
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }
}

impl Storage for S3Storage {
    async fn exists(&self, name: &str) -> Result<bool> {
        self.transfer.exists(&self.bucket, &self.key(name)).await
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<String> {
        let key = self.key(name);
        self.transfer.upload(&self.bucket, &key, data.to_vec()).await?;
        Ok(self.describe(name))
    }

    fn describe(&self, name: &str) -> String {
        format!("s3://{}/{}", self.bucket, self.key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_storage_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("results"));

        assert!(!storage.exists("SRR1.json.gz").await.unwrap());

        let written = storage.write_file("SRR1.json.gz", b"payload").await.unwrap();
        assert_eq!(written, storage.describe("SRR1.json.gz"));
        assert!(storage.exists("SRR1.json.gz").await.unwrap());
        assert_eq!(
            std::fs::read(dir.path().join("results/SRR1.json.gz")).unwrap(),
            b"payload"
        );
        assert!(!dir.path().join("results/.SRR1.json.gz.partial").exists());
    }

    #[cfg(feature = "s3")]
    #[tokio::test]
    async fn test_s3_storage_checks_and_writes_under_prefix() {
        use crate::adapters::s3::mock;
        use httpmock::prelude::*;

        let server = MockServer::start();
        let existing = server.mock(|when, then| {
            when.method(GET)
                .path("/results/")
                .query_param("prefix", "humann2/SRR1.json.gz");
            then.status(200).body(mock::list_objects_xml(
                "results",
                "humann2/SRR1.json.gz",
                &["humann2/SRR1.json.gz"],
            ));
        });
        let absent = server.mock(|when, then| {
            when.method(GET)
                .path("/results/")
                .query_param("prefix", "humann2/SRR2.json.gz");
            then.status(200)
                .body(mock::list_objects_xml("results", "humann2/SRR2.json.gz", &[]));
        });
        let put = server.mock(|when, then| {
            when.method(PUT)
                .path("/results/humann2/SRR2.json.gz")
                .header("x-amz-server-side-encryption", "AES256");
            then.status(200);
        });

        let storage = S3Storage::new(
            mock::transfer(&server.base_url(), true),
            "results".to_string(),
            "humann2/",
        );

        assert!(storage.exists("SRR1.json.gz").await.unwrap());
        assert!(!storage.exists("SRR2.json.gz").await.unwrap());
        let written = storage.write_file("SRR2.json.gz", b"payload").await.unwrap();

        existing.assert();
        absent.assert();
        put.assert();
        assert_eq!(written, "s3://results/humann2/SRR2.json.gz");
    }
}
