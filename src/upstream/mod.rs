pub mod file_host;
pub mod generator;

use crate::{
    error::Result,
    models::{GeneratedImage, HostedAsset},
    staging::StagingFile,
};
use async_trait::async_trait;
use std::time::Duration;

pub use file_host::FileHostClient;
pub use generator::GeneratorClient;

/// The text-to-image endpoint.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Lightweight availability check, no body transfer.
    async fn probe(&self, url: &str, timeout: Duration) -> Result<()>;

    async fn download(&self, url: &str, timeout: Duration) -> Result<GeneratedImage>;
}

/// The file-hosting endpoint that turns a staged file into a durable URL.
#[async_trait]
pub trait FileHost: Send + Sync {
    async fn upload(&self, file: &StagingFile) -> Result<HostedAsset>;
}
