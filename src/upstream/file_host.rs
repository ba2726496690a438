use crate::{
    error::{RelayError, Result},
    models::HostedAsset,
    staging::StagingFile,
    upstream::FileHost,
};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use std::time::Duration;

/// Multipart uploader for catbox-style hosts: `POST <base>/api.php` with
/// `reqtype=fileupload` and the file in `fileToUpload`, answered by a
/// plain-text URL.
#[derive(Clone)]
pub struct FileHostClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl FileHostClient {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn upload_url(&self) -> String {
        format!("{}/api.php", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl FileHost for FileHostClient {
    async fn upload(&self, file: &StagingFile) -> Result<HostedAsset> {
        let bytes = file.read().await?;

        let part = Part::bytes(bytes)
            .file_name(file.file_name().to_string())
            .mime_str(file.content_type())
            .map_err(|e| RelayError::UploadFailed(format!("invalid content type: {}", e)))?;

        let form = Form::new()
            .text("reqtype", "fileupload")
            .part("fileToUpload", part);

        log::debug!(
            "Uploading {} ({} bytes) to {}",
            file.file_name(),
            file.size_bytes(),
            self.upload_url()
        );

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::UploadFailed(format!("timed out after {:?}", self.timeout))
                } else {
                    RelayError::UploadFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RelayError::UploadFailed(format!(
                "file host returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RelayError::UploadFailed(e.to_string()))?;
        let permanent_url = body.trim();

        if !(permanent_url.starts_with("http://") || permanent_url.starts_with("https://")) {
            return Err(RelayError::UploadFailed(format!(
                "file host answered with an unexpected body: {:?}",
                permanent_url.chars().take(200).collect::<String>()
            )));
        }

        Ok(HostedAsset {
            permanent_url: permanent_url.to_string(),
        })
    }
}
