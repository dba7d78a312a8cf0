use crate::config::toml_config::S3Config;
use crate::utils::error::{RunnerError, Result};
use std::path::{Component, Path, PathBuf};

#[cfg(feature = "s3")]
use aws_config::BehaviorVersion;
#[cfg(feature = "s3")]
use aws_sdk_s3::config::Region;
#[cfg(feature = "s3")]
use aws_sdk_s3::error::DisplayErrorContext;
#[cfg(feature = "s3")]
use aws_sdk_s3::operation::get_object::GetObjectError;
#[cfg(feature = "s3")]
use aws_sdk_s3::primitives::ByteStream;
#[cfg(feature = "s3")]
use aws_sdk_s3::types::ServerSideEncryption;
#[cfg(feature = "s3")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "s3")]
use tokio::io::AsyncWriteExt;

/// Object transfers against S3 (or an S3-compatible endpoint).
#[cfg(feature = "s3")]
#[derive(Debug, Clone)]
pub struct S3Transfer {
    client: S3Client,
    server_side_encryption: bool,
}

#[cfg(feature = "s3")]
impl S3Transfer {
    pub fn new(client: S3Client, server_side_encryption: bool) -> Self {
        Self {
            client,
            server_side_encryption,
        }
    }

    pub async fn from_config(settings: &S3Config) -> Self {
        let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(region) = &settings.region {
            builder = builder.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(
            S3Client::from_conf(builder.build()),
            settings.server_side_encryption,
        )
    }

    /// Downloads one object to `dest`.
    pub async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64> {
        tracing::debug!("Downloading s3://{}/{} to {}", bucket, key, dest.display());

        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                GetObjectError::NoSuchKey(_) => RunnerError::StorageError {
                    message: format!("s3://{}/{} does not exist", bucket, key),
                },
                err => storage_error("download", bucket, key, err),
            })?;

        let mut body = resp.body;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(bytes) = body
            .try_next()
            .await
            .map_err(|e| storage_error("read", bucket, key, e))?
        {
            file.write_all(&bytes).await?;
            written += bytes.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    /// Copies every object under `prefix` into `dest`, keeping the folder layout.
    pub async fn sync_prefix(&self, bucket: &str, prefix: &str, dest: &Path) -> Result<usize> {
        let prefix = folder_prefix(prefix);
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(&prefix)
            .into_paginator()
            .send();

        let mut count = 0;
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| storage_error("list", bucket, &prefix, e))?;
            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                let Some(relative) = relative_object_path(&prefix, key) else {
                    tracing::debug!("Skipping s3://{}/{}", bucket, key);
                    continue;
                };

                let target = dest.join(relative);
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                self.download(bucket, key, &target).await?;
                count += 1;
            }
        }

        tracing::debug!("Synced {} objects from s3://{}/{}", count, bucket, prefix);
        Ok(count)
    }

    /// True if any object key starts with `key`.
    pub async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(key)
            .max_keys(1)
            .send()
            .await
            .map_err(|e| storage_error("list", bucket, key, e))?;

        Ok(!resp.contents().is_empty())
    }

    pub async fn upload(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data));
        if self.server_side_encryption {
            request = request.server_side_encryption(ServerSideEncryption::Aes256);
        }

        request
            .send()
            .await
            .map_err(|e| storage_error("upload", bucket, key, e.into_service_error()))?;
        Ok(())
    }
}

#[cfg(feature = "s3")]
fn storage_error<E: std::error::Error>(action: &str, bucket: &str, key: &str, err: E) -> RunnerError {
    RunnerError::StorageError {
        message: format!(
            "Failed to {} s3://{}/{}: {}",
            action,
            bucket,
            key,
            DisplayErrorContext(err)
        ),
    }
}

// 未啟用 s3 feature 時的空實現
#[cfg(not(feature = "s3"))]
#[derive(Debug, Clone)]
pub struct S3Transfer;

#[cfg(not(feature = "s3"))]
impl S3Transfer {
    pub async fn from_config(_settings: &S3Config) -> Self {
        Self
    }

    pub async fn download(&self, _bucket: &str, _key: &str, _dest: &Path) -> Result<u64> {
        Err(disabled())
    }

    pub async fn sync_prefix(&self, _bucket: &str, _prefix: &str, _dest: &Path) -> Result<usize> {
        Err(disabled())
    }

    pub async fn exists(&self, _bucket: &str, _key: &str) -> Result<bool> {
        Err(disabled())
    }

    pub async fn upload(&self, _bucket: &str, _key: &str, _data: Vec<u8>) -> Result<()> {
        Err(disabled())
    }
}

#[cfg(not(feature = "s3"))]
fn disabled() -> RunnerError {
    RunnerError::ConfigError {
        message: "s3:// locations require the 's3' feature".to_string(),
    }
}

/// `db` and `db/` both list the folder `db/`, never `db2/`.
fn folder_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

/// Path of `key` below `prefix`; `None` for folder markers and unsafe keys.
fn relative_object_path(prefix: &str, key: &str) -> Option<PathBuf> {
    let relative = key.strip_prefix(prefix)?;
    if relative.is_empty() || relative.ends_with('/') {
        return None;
    }

    let path = PathBuf::from(relative);
    if path
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        Some(path)
    } else {
        None
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_prefix() {
        assert_eq!(folder_prefix("humann2/db"), "humann2/db/");
        assert_eq!(folder_prefix("humann2/db/"), "humann2/db/");
        assert_eq!(folder_prefix(""), "");
        assert_eq!(folder_prefix("/"), "");
    }

    #[test]
    fn test_relative_object_path() {
        assert_eq!(
            relative_object_path("db/", "db/chocophlan/g__Bacteroides.ffn.gz"),
            Some(PathBuf::from("chocophlan/g__Bacteroides.ffn.gz"))
        );
        assert_eq!(relative_object_path("db/", "db/uniref/"), None);
        assert_eq!(relative_object_path("db/", "db/"), None);
        assert_eq!(relative_object_path("db/", "other/file"), None);
        assert_eq!(relative_object_path("db/", "db/../escape"), None);
    }

    #[cfg(feature = "s3")]
    mod transfer {
        use super::super::mock;
        use httpmock::prelude::*;
        use tempfile::TempDir;

        #[tokio::test]
        async fn test_sync_prefix_downloads_folder() {
            let server = MockServer::start();
            let list = server.mock(|when, then| {
                when.method(GET)
                    .path("/refs/")
                    .query_param("list-type", "2")
                    .query_param("prefix", "humann2/db/");
                then.status(200).body(mock::list_objects_xml(
                    "refs",
                    "humann2/db/",
                    &[
                        "humann2/db/chocophlan/",
                        "humann2/db/chocophlan/g__A.ffn.gz",
                        "humann2/db/uniref/uniref90.dmnd",
                    ],
                ));
            });
            let nucleotide = server.mock(|when, then| {
                when.method(GET).path("/refs/humann2/db/chocophlan/g__A.ffn.gz");
                then.status(200).body("ACGT");
            });
            let protein = server.mock(|when, then| {
                when.method(GET).path("/refs/humann2/db/uniref/uniref90.dmnd");
                then.status(200).body("MKV!");
            });

            let dest = TempDir::new().unwrap();
            let transfer = mock::transfer(&server.base_url(), true);
            let count = transfer
                .sync_prefix("refs", "humann2/db", dest.path())
                .await
                .unwrap();

            list.assert();
            nucleotide.assert();
            protein.assert();
            assert_eq!(count, 2);
            assert_eq!(
                std::fs::read_to_string(dest.path().join("chocophlan/g__A.ffn.gz")).unwrap(),
                "ACGT"
            );
            assert_eq!(
                std::fs::read_to_string(dest.path().join("uniref/uniref90.dmnd")).unwrap(),
                "MKV!"
            );
        }

        #[tokio::test]
        async fn test_exists_checks_key_prefix() {
            let server = MockServer::start();
            let found = server.mock(|when, then| {
                when.method(GET)
                    .path("/results/")
                    .query_param("prefix", "out/SRR1.json.gz")
                    .query_param("max-keys", "1");
                then.status(200).body(mock::list_objects_xml(
                    "results",
                    "out/SRR1.json.gz",
                    &["out/SRR1.json.gz"],
                ));
            });
            let missing = server.mock(|when, then| {
                when.method(GET)
                    .path("/results/")
                    .query_param("prefix", "out/SRR2.json.gz");
                then.status(200)
                    .body(mock::list_objects_xml("results", "out/SRR2.json.gz", &[]));
            });

            let transfer = mock::transfer(&server.base_url(), true);
            assert!(transfer.exists("results", "out/SRR1.json.gz").await.unwrap());
            assert!(!transfer.exists("results", "out/SRR2.json.gz").await.unwrap());

            found.assert();
            missing.assert();
        }

        #[tokio::test]
        async fn test_upload_requests_aes256() {
            let server = MockServer::start();
            let put = server.mock(|when, then| {
                when.method(PUT)
                    .path("/results/out/SRR1.json.gz")
                    .header("x-amz-server-side-encryption", "AES256");
                then.status(200).header("ETag", "\"abc\"");
            });

            let transfer = mock::transfer(&server.base_url(), true);
            transfer
                .upload("results", "out/SRR1.json.gz", b"gzipped".to_vec())
                .await
                .unwrap();

            put.assert();
        }

        #[tokio::test]
        async fn test_download_missing_object() {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(GET).path("/reads/none.fq");
                then.status(404).body(
                    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
<Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message></Error>",
                );
            });

            let dest = TempDir::new().unwrap();
            let transfer = mock::transfer(&server.base_url(), false);
            let err = transfer
                .download("reads", "none.fq", &dest.path().join("none.fq"))
                .await
                .unwrap_err();

            assert!(err.to_string().contains("s3://reads/none.fq"));
            assert_eq!(err.exit_code(), 2);
        }
    }
}
