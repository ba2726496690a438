use serde::Serialize;

use crate::error::RelayError;
use crate::models::generation::GeneratedImage;

pub const USAGE_HINT: &str = "/generate?prompt=your_description";
pub const IMAGE_USAGE_HINT: &str = "/image?prompt=your_description";

/// Static attribution fields appended to every JSON body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Attribution {
    pub developer: &'static str,
    pub repository: &'static str,
}

pub const ATTRIBUTION: Attribution = Attribution {
    developer: env!("CARGO_PKG_AUTHORS"),
    repository: env!("CARGO_PKG_REPOSITORY"),
};

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl ErrorBody {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            usage: None,
            attribution: ATTRIBUTION,
        }
    }
}

impl From<&RelayError> for ErrorBody {
    fn from(err: &RelayError) -> Self {
        let mut body = ErrorBody::new(err.http_status(), err.client_message());
        if let RelayError::ValidationError(_) = err {
            body.usage = Some(format!("{} or {}", USAGE_HINT, IMAGE_USAGE_HINT));
        }
        body
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BannerReply {
    pub status_code: u16,
    pub message: String,
    pub usage: Vec<String>,
    #[serde(flatten)]
    pub attribution: Attribution,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelsReply {
    pub status_code: u16,
    pub available_models: Vec<String>,
    #[serde(flatten)]
    pub attribution: Attribution,
}

/// Probe mode body: the generator URL is the only image reference.
#[derive(Debug, Clone, Serialize)]
pub struct LinkReply {
    pub status_code: u16,
    pub message: String,
    pub prompt: String,
    pub image_url: String,
    pub model: String,
    pub resolution: String,
    #[serde(flatten)]
    pub attribution: Attribution,
}

/// Download-and-upload body.
#[derive(Debug, Clone, Serialize)]
pub struct HostedReply {
    pub status_code: u16,
    pub message: String,
    pub prompt: String,
    pub temporary_generation_url: String,
    pub permanent_url: String,
    pub model: String,
    pub resolution: String,
    pub file_size_kb: f64,
    #[serde(flatten)]
    pub attribution: Attribution,
}

/// What the orchestrator hands back to the HTTP layer on success.
#[derive(Debug)]
pub enum RelayReply {
    Link(LinkReply),
    Image(GeneratedImage),
    Redirect(String),
    Hosted(HostedReply),
}
