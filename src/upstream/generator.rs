use crate::{
    error::{RelayError, Result},
    models::{GeneratedImage, DEFAULT_CONTENT_TYPE},
    upstream::ImageGenerator,
};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use std::time::Duration;

#[derive(Clone)]
pub struct GeneratorClient {
    client: Client,
}

impl GeneratorClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(RelayError::UpstreamUnavailable {
                status: status.as_u16(),
            })
        }
    }
}

/// Splits reqwest failures into timeouts and everything else.
fn classify_transport_error(err: reqwest::Error, timeout: Duration) -> RelayError {
    if err.is_timeout() {
        RelayError::UpstreamTimeout(timeout)
    } else {
        RelayError::UpstreamTransportError(err.to_string())
    }
}

#[async_trait]
impl ImageGenerator for GeneratorClient {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<()> {
        log::debug!("Probing generator: {}", url);

        let response = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        Self::check_status(response)?;
        Ok(())
    }

    async fn download(&self, url: &str, timeout: Duration) -> Result<GeneratedImage> {
        log::debug!("Downloading from generator: {}", url);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        let response = Self::check_status(response)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        Ok(GeneratedImage {
            bytes: bytes.to_vec(),
            content_type,
            source_url: url.to_string(),
        })
    }
}
