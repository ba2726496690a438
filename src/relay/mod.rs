pub mod url_builder;
pub mod validator;

use crate::{
    config::{Config, TimeoutConfig},
    error::{RelayError, Result},
    logger,
    models::{
        GenerationParameters, GenerationRequest, HostedReply, LinkReply, RelayMode, RelayReply,
        ATTRIBUTION,
    },
    staging::StagingFile,
    upstream::{FileHost, FileHostClient, GeneratorClient, ImageGenerator},
};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub use url_builder::build_generation_url;
pub use validator::validate_prompt;

/// Turns a prompt into a caller-facing reply according to a [`RelayMode`].
///
/// Holds configuration and client handles only; every call to
/// [`Relay::handle`] is independent of the others.
#[derive(Clone)]
pub struct Relay {
    generator: Arc<dyn ImageGenerator>,
    file_host: Arc<dyn FileHost>,
    generator_base_url: String,
    parameters: GenerationParameters,
    timeouts: TimeoutConfig,
    staging_dir: PathBuf,
    max_prompt_chars: usize,
    generate_mode: RelayMode,
    image_mode: RelayMode,
}

impl Relay {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::ConfigError(format!("HTTP client: {}", e)))?;

        let generator = Arc::new(GeneratorClient::new(client.clone()));
        let file_host = Arc::new(FileHostClient::new(
            client,
            config.hosting.base_url.clone(),
            config.hosting.upload_timeout,
        ));

        Ok(Self::with_backends(config, generator, file_host))
    }

    pub fn with_backends(
        config: &Config,
        generator: Arc<dyn ImageGenerator>,
        file_host: Arc<dyn FileHost>,
    ) -> Self {
        Self {
            generator,
            file_host,
            generator_base_url: config.generator.base_url.clone(),
            parameters: config.generator.parameters.clone(),
            timeouts: config.timeouts,
            staging_dir: config.staging_dir(),
            max_prompt_chars: config.max_prompt_chars,
            generate_mode: config.generate_mode,
            image_mode: config.image_mode,
        }
    }

    pub fn parameters(&self) -> &GenerationParameters {
        &self.parameters
    }

    pub fn generation_url(&self, prompt: &str) -> String {
        build_generation_url(&self.generator_base_url, prompt, &self.parameters)
    }

    /// Serves `/generate`.
    pub async fn generate(&self, prompt: Option<&str>) -> Result<RelayReply> {
        self.handle(prompt, self.generate_mode).await
    }

    /// Serves `/image`.
    pub async fn image(&self, prompt: Option<&str>) -> Result<RelayReply> {
        self.handle(prompt, self.image_mode).await
    }

    pub async fn handle(&self, prompt: Option<&str>, mode: RelayMode) -> Result<RelayReply> {
        let request = match validate_prompt(prompt, self.max_prompt_chars) {
            Ok(request) => request,
            Err(e) => {
                log::debug!("Rejected prompt: {}", e);
                return Err(e);
            }
        };

        let request_id = Uuid::new_v4().simple().to_string();
        let url = self.generation_url(&request.prompt);
        log::info!(
            "[req:{}] {} relay, prompt of {} chars",
            request_id,
            mode,
            request.prompt.chars().count()
        );

        let result = match (mode, self.timeouts.for_mode(mode)) {
            (RelayMode::Redirect, _) => Ok(RelayReply::Redirect(url)),
            (RelayMode::Probe, Some(budget)) => {
                self.probe_and_link(&request_id, request, url, budget).await
            }
            (RelayMode::Download, Some(budget)) => {
                self.download_and_pass(&request_id, url, budget).await
            }
            (RelayMode::DownloadAndUpload, Some(budget)) => {
                self.download_stage_upload(&request_id, request, url, budget)
                    .await
            }
            (_, None) => Err(RelayError::ConfigError(format!(
                "no timeout budget for {} mode",
                mode
            ))),
        };

        if let Err(e) = &result {
            match e {
                RelayError::UploadFailed(_) | RelayError::StagingError(_) => log::error!(
                    "[req:{}] {} after successful generation: {}",
                    request_id,
                    e.kind(),
                    e
                ),
                _ => log::warn!("[req:{}] {}: {}", request_id, e.kind(), e),
            }
        }

        result
    }

    async fn probe_and_link(
        &self,
        request_id: &str,
        request: GenerationRequest,
        url: String,
        budget: Duration,
    ) -> Result<RelayReply> {
        {
            let _timer = logger::timer(format!("[req:{}] generator probe", request_id));
            self.generator.probe(&url, budget).await?;
        }

        Ok(RelayReply::Link(LinkReply {
            status_code: 200,
            message: "Image generated successfully".to_string(),
            prompt: request.prompt,
            image_url: url,
            model: self.parameters.model.clone(),
            resolution: self.parameters.resolution(),
            attribution: ATTRIBUTION,
        }))
    }

    async fn download_and_pass(
        &self,
        request_id: &str,
        url: String,
        budget: Duration,
    ) -> Result<RelayReply> {
        let _timer = logger::timer(format!("[req:{}] generator download", request_id));
        let image = self.generator.download(&url, budget).await?;
        Ok(RelayReply::Image(image))
    }

    async fn download_stage_upload(
        &self,
        request_id: &str,
        request: GenerationRequest,
        url: String,
        budget: Duration,
    ) -> Result<RelayReply> {
        let image = {
            let _timer = logger::timer(format!("[req:{}] generator download", request_id));
            self.generator.download(&url, budget).await?
        };

        let staged = StagingFile::create(&self.staging_dir, request_id, &image).await?;
        drop(image);

        let asset = {
            let _timer = logger::timer(format!("[req:{}] file host upload", request_id));
            self.file_host.upload(&staged).await?
        };

        let file_size_kb = staged.size_kb();
        if let Err(e) = staged.close() {
            log::warn!("[req:{}] could not remove staging file: {}", request_id, e);
        }

        log::info!(
            "[req:{}] re-hosted {} KB at {}",
            request_id,
            file_size_kb,
            asset.permanent_url
        );

        Ok(RelayReply::Hosted(HostedReply {
            status_code: 200,
            message: "Image generated and uploaded".to_string(),
            prompt: request.prompt,
            temporary_generation_url: url,
            permanent_url: asset.permanent_url,
            model: self.parameters.model.clone(),
            resolution: self.parameters.resolution(),
            file_size_kb,
            attribution: ATTRIBUTION,
        }))
    }
}
