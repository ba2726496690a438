use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Generator returned HTTP {status}")]
    UpstreamUnavailable { status: u16 },
    #[error("Generator did not answer within {0:?}")]
    UpstreamTimeout(Duration),
    #[error("Generator transport error: {0}")]
    UpstreamTransportError(String),
    #[error("Staging error: {0}")]
    StagingError(#[from] std::io::Error),
    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

impl RelayError {
    /// HTTP status the caller sees for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            RelayError::ValidationError(_) => 400,
            _ => 500,
        }
    }

    /// Message safe to show to callers. Internal details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            RelayError::ValidationError(msg) => msg.clone(),
            RelayError::UpstreamUnavailable { .. } => {
                "Image generation failed. Please try again.".to_string()
            }
            RelayError::UpstreamTimeout(_) => {
                "The image generation request timed out. Please try again.".to_string()
            }
            RelayError::UpstreamTransportError(_) => {
                "Error generating the image. Please try again.".to_string()
            }
            RelayError::StagingError(_) => "Error staging the generated image.".to_string(),
            RelayError::UploadFailed(_) => {
                "The image was generated but uploading it to the file host failed.".to_string()
            }
            RelayError::ConfigError(_) => "The relay is misconfigured.".to_string(),
        }
    }

    /// Stable identifier for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::ConfigError(_) => "config",
            RelayError::ValidationError(_) => "validation",
            RelayError::UpstreamUnavailable { .. } => "upstream_unavailable",
            RelayError::UpstreamTimeout(_) => "upstream_timeout",
            RelayError::UpstreamTransportError(_) => "upstream_transport",
            RelayError::StagingError(_) => "staging",
            RelayError::UploadFailed(_) => "upload_failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
