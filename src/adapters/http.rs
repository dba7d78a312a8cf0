use crate::utils::error::Result;
use reqwest::Client;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Streams `url` into `dest`, returning the number of bytes written.
pub async fn download_to_file(client: &Client, url: &str, dest: &Path) -> Result<u64> {
    tracing::debug!("Making HTTP request to: {}", url);
    let mut response = client.get(url).send().await?.error_for_status()?;
    tracing::debug!("HTTP response status: {}", response.status());

    let mut file = tokio::fs::File::create(dest).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    tracing::debug!("Downloaded {} bytes to {}", written, dest.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_download_writes_body() {
        let server = MockServer::start();
        let reads_mock = server.mock(|when, then| {
            when.method(GET).path("/reads/sample.fastq");
            then.status(200).body("@r1\nACGT\n+\nIIII\n");
        });

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("sample.fastq");
        let written = download_to_file(&Client::new(), &server.url("/reads/sample.fastq"), &dest)
            .await
            .unwrap();

        reads_mock.assert();
        assert_eq!(written, 16);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "@r1\nACGT\n+\nIIII\n");
    }

    #[tokio::test]
    async fn test_download_http_error() {
        let server = MockServer::start();
        let missing_mock = server.mock(|when, then| {
            when.method(GET).path("/missing.fq");
            then.status(404);
        });

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing.fq");
        let result = download_to_file(&Client::new(), &server.url("/missing.fq"), &dest).await;

        missing_mock.assert();
        assert!(result.is_err());
        assert!(!dest.exists());
    }
}
