use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RelayError;

pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// A prompt that passed validation: trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
}

/// Rendering parameters sent to the generator with every prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub nologo: bool,
    /// `None` leaves the flag off the query string.
    pub safe: Option<bool>,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        GenerationParameters {
            model: "flux-realism".to_string(),
            width: 1024,
            height: 1024,
            nologo: true,
            safe: Some(false),
        }
    }
}

impl GenerationParameters {
    pub fn with_safe(mut self, safe: Option<bool>) -> Self {
        self.safe = safe;
        self
    }

    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Image bytes fetched from the generator, alive for a single request.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub source_url: String,
}

impl GeneratedImage {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn file_extension(&self) -> &'static str {
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        match essence {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// Durable reference returned by the file host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedAsset {
    pub permanent_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayMode {
    /// HEAD the generator URL and hand it back as JSON.
    Probe,
    /// Download the image and pass the bytes through.
    Download,
    /// Redirect the caller straight to the generator URL.
    Redirect,
    /// Download, stage on disk, re-upload to the file host.
    DownloadAndUpload,
}

impl RelayMode {
    /// Whether this mode answers with a JSON document rather than an image.
    pub fn replies_with_json(&self) -> bool {
        matches!(self, RelayMode::Probe | RelayMode::DownloadAndUpload)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelayMode::Probe => "probe",
            RelayMode::Download => "download",
            RelayMode::Redirect => "redirect",
            RelayMode::DownloadAndUpload => "upload",
        }
    }
}

impl fmt::Display for RelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelayMode {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "probe" | "link" => Ok(RelayMode::Probe),
            "download" | "passthrough" => Ok(RelayMode::Download),
            "redirect" => Ok(RelayMode::Redirect),
            "upload" | "download_and_upload" => Ok(RelayMode::DownloadAndUpload),
            other => Err(RelayError::ConfigError(format!(
                "Unknown relay mode '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = GenerationParameters::default();
        assert_eq!(params.model, "flux-realism");
        assert_eq!(params.resolution(), "1024x1024");
        assert!(params.nologo);
        assert_eq!(params.safe, Some(false));
    }

    #[test]
    fn test_relay_mode_parsing() {
        assert_eq!("probe".parse::<RelayMode>().unwrap(), RelayMode::Probe);
        assert_eq!(" Redirect ".parse::<RelayMode>().unwrap(), RelayMode::Redirect);
        assert_eq!(
            "download_and_upload".parse::<RelayMode>().unwrap(),
            RelayMode::DownloadAndUpload
        );
        assert!("teleport".parse::<RelayMode>().is_err());
    }

    #[test]
    fn test_file_extension_follows_content_type() {
        let mut image = GeneratedImage {
            bytes: vec![],
            content_type: "image/jpeg; charset=binary".to_string(),
            source_url: String::new(),
        };
        assert_eq!(image.file_extension(), "jpg");
        image.content_type = "application/octet-stream".to_string();
        assert_eq!(image.file_extension(), "png");
    }
}
