use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::error::Result;
use crate::models::GeneratedImage;

/// A generated image written to a uniquely named temporary file ahead of
/// its upload. The file is removed when the value is dropped, so every
/// exit path of a request (including cancellation) cleans up after itself.
#[derive(Debug)]
pub struct StagingFile {
    path: TempPath,
    file_name: String,
    content_type: String,
    size_bytes: u64,
}

impl StagingFile {
    pub async fn create(dir: &Path, request_id: &str, image: &GeneratedImage) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let path = tempfile::Builder::new()
            .prefix(&format!("relay-{}-", request_id))
            .suffix(&format!(".{}", image.file_extension()))
            .tempfile_in(dir)?
            .into_temp_path();

        tokio::fs::write(&path, &image.bytes).await?;
        let size_bytes = tokio::fs::metadata(&path).await?.len();

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image.png")
            .to_string();

        log::debug!("Staged {} bytes at {}", size_bytes, path.display());

        Ok(Self {
            path,
            file_name,
            content_type: image.content_type.clone(),
            size_bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Size in KiB rounded to one decimal.
    pub fn size_kb(&self) -> f64 {
        (self.size_bytes as f64 / 1024.0 * 10.0).round() / 10.0
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    /// Removes the file now and reports failures instead of swallowing them
    /// the way the drop path does.
    pub fn close(self) -> Result<PathBuf> {
        let path = self.path.to_path_buf();
        self.path.close()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(bytes: &[u8]) -> GeneratedImage {
        GeneratedImage {
            bytes: bytes.to_vec(),
            content_type: "image/png".to_string(),
            source_url: "http://generator/prompt/x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_stages_bytes_and_removes_on_close() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagingFile::create(dir.path(), "req1", &image(b"hello"))
            .await
            .unwrap();

        assert!(staged.path().exists());
        assert!(staged.file_name().starts_with("relay-req1-"));
        assert!(staged.file_name().ends_with(".png"));
        assert_eq!(staged.read().await.unwrap(), b"hello");
        assert_eq!(staged.size_bytes(), 5);

        let path = staged.close().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagingFile::create(dir.path(), "req2", &image(b"bytes"))
            .await
            .unwrap();
        let path = staged.path().to_path_buf();
        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let staged = StagingFile::create(&nested, "req3", &image(b"x")).await.unwrap();
        assert!(staged.path().starts_with(&nested));
    }

    #[tokio::test]
    async fn test_size_kb_rounds_to_one_decimal() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagingFile::create(dir.path(), "req4", &image(&vec![0u8; 1536]))
            .await
            .unwrap();
        assert_eq!(staged.size_kb(), 1.5);

        let staged = StagingFile::create(dir.path(), "req5", &image(&vec![0u8; 1000]))
            .await
            .unwrap();
        assert_eq!(staged.size_kb(), 1.0);
    }

    #[tokio::test]
    async fn test_concurrent_staging_never_collides() {
        let dir = tempfile::tempdir().unwrap();
        let images: Vec<GeneratedImage> = (0..32)
            .map(|i| image(format!("payload-{}", i).as_bytes()))
            .collect();

        // Same request id on purpose: uniqueness must not depend on it.
        let staged = futures::future::join_all(
            images
                .iter()
                .map(|img| StagingFile::create(dir.path(), "shared", img)),
        )
        .await;

        let mut names = std::collections::HashSet::new();
        for (i, file) in staged.iter().enumerate() {
            let file = file.as_ref().unwrap();
            assert!(names.insert(file.file_name().to_string()));
            assert_eq!(
                file.read().await.unwrap(),
                format!("payload-{}", i).into_bytes()
            );
        }
    }
}
