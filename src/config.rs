use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RelayError, Result};
use crate::models::{GenerationParameters, RelayMode};

pub const DEFAULT_GENERATOR_BASE_URL: &str = "https://image.pollinations.ai";
pub const DEFAULT_HOST_BASE_URL: &str = "https://catbox.moe/user";
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 2000;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub parameters: GenerationParameters,
}

#[derive(Debug, Clone)]
pub struct HostingConfig {
    pub base_url: String,
    pub upload_timeout: Duration,
}

/// Budgets for the generate call, one per kind of work the request does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub probe: Duration,
    pub download: Duration,
    pub download_and_upload: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    pub generator: GeneratorConfig,
    pub hosting: HostingConfig,
    pub timeouts: TimeoutConfig,
    pub generate_mode: RelayMode,
    pub image_mode: RelayMode,
    pub staging_dir: Option<PathBuf>,
    pub max_prompt_chars: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            base_url: DEFAULT_GENERATOR_BASE_URL.to_string(),
            parameters: GenerationParameters::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let defaults = GenerationParameters::default();
        let parameters = GenerationParameters {
            model: lookup("GENERATOR_MODEL").unwrap_or(defaults.model),
            width: parse_or(lookup("GENERATOR_WIDTH"), defaults.width),
            height: parse_or(lookup("GENERATOR_HEIGHT"), defaults.height),
            nologo: parse_or(lookup("GENERATOR_NOLOGO"), defaults.nologo),
            safe: match lookup("GENERATOR_SAFE").as_deref() {
                Some("none") | Some("") => None,
                Some(value) => value.parse().ok().or(defaults.safe),
                None => defaults.safe,
            },
        };

        GeneratorConfig {
            base_url: lookup("GENERATOR_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GENERATOR_BASE_URL.to_string()),
            parameters,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for HostingConfig {
    fn default() -> Self {
        HostingConfig {
            base_url: DEFAULT_HOST_BASE_URL.to_string(),
            upload_timeout: Duration::from_secs(300),
        }
    }
}

impl HostingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        HostingConfig {
            base_url: lookup("HOST_BASE_URL").unwrap_or(defaults.base_url),
            upload_timeout: secs_or(lookup("UPLOAD_TIMEOUT_SECS"), defaults.upload_timeout),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        TimeoutConfig {
            probe: Duration::from_secs(15),
            download: Duration::from_secs(60),
            download_and_upload: Duration::from_secs(90),
        }
    }
}

impl TimeoutConfig {
    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        TimeoutConfig {
            probe: secs_or(lookup("PROBE_TIMEOUT_SECS"), defaults.probe),
            download: secs_or(lookup("DOWNLOAD_TIMEOUT_SECS"), defaults.download),
            download_and_upload: secs_or(
                lookup("DOWNLOAD_UPLOAD_TIMEOUT_SECS"),
                defaults.download_and_upload,
            ),
        }
    }

    /// Same budget for every mode; handy in tests.
    pub fn uniform(timeout: Duration) -> Self {
        TimeoutConfig {
            probe: timeout,
            download: timeout,
            download_and_upload: timeout,
        }
    }

    /// Budget for the generate call made in `mode`. Redirect never calls out.
    pub fn for_mode(&self, mode: RelayMode) -> Option<Duration> {
        match mode {
            RelayMode::Probe => Some(self.probe),
            RelayMode::Download => Some(self.download),
            RelayMode::DownloadAndUpload => Some(self.download_and_upload),
            RelayMode::Redirect => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            generator: GeneratorConfig::default(),
            hosting: HostingConfig::default(),
            timeouts: TimeoutConfig::default(),
            generate_mode: RelayMode::DownloadAndUpload,
            image_mode: RelayMode::Redirect,
            staging_dir: None,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the whole configuration from the process environment.
    /// Unknown relay modes are reported, other unparseable values fall back
    /// to their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let generate_mode = match lookup("GENERATE_MODE") {
            Some(value) => value.parse()?,
            None => defaults.generate_mode,
        };
        let image_mode = match lookup("IMAGE_MODE") {
            Some(value) => value.parse()?,
            None => defaults.image_mode,
        };

        Ok(Config {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_or(lookup("PORT"), defaults.port),
            generator: GeneratorConfig::from_lookup(lookup),
            hosting: HostingConfig::from_lookup(lookup),
            timeouts: TimeoutConfig::from_lookup(lookup),
            generate_mode,
            image_mode,
            staging_dir: lookup("STAGING_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            max_prompt_chars: parse_or(lookup("MAX_PROMPT_CHARS"), defaults.max_prompt_chars),
        })
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_hosting(mut self, hosting: HostingConfig) -> Self {
        self.hosting = hosting;
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_modes(mut self, generate_mode: RelayMode, image_mode: RelayMode) -> Self {
        self.generate_mode = generate_mode;
        self.image_mode = image_mode;
        self
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn with_max_prompt_chars(mut self, max: usize) -> Self {
        self.max_prompt_chars = max;
        self
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(env::temp_dir)
    }

    /// `/generate` answers with JSON and `/image` with an image or redirect,
    /// so each route only accepts the modes producing that kind of reply.
    pub fn validate(&self) -> Result<()> {
        if !self.generate_mode.replies_with_json() {
            return Err(RelayError::ConfigError(format!(
                "GENERATE_MODE must be 'probe' or 'upload', got '{}'",
                self.generate_mode
            )));
        }
        if self.image_mode.replies_with_json() {
            return Err(RelayError::ConfigError(format!(
                "IMAGE_MODE must be 'redirect' or 'download', got '{}'",
                self.image_mode
            )));
        }
        if self.max_prompt_chars == 0 {
            return Err(RelayError::ConfigError(
                "MAX_PROMPT_CHARS must be greater than zero".into(),
            ));
        }
        for (name, url) in [
            ("GENERATOR_BASE_URL", &self.generator.base_url),
            ("HOST_BASE_URL", &self.hosting.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(RelayError::ConfigError(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn secs_or(value: Option<String>, default: Duration) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
