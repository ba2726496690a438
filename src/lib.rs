pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod relay;
pub mod server;
pub mod staging;
pub mod upstream;

pub use config::{Config, GeneratorConfig, HostingConfig, TimeoutConfig};
pub use error::{RelayError, Result};
pub use models::*;
pub use relay::Relay;
pub use staging::StagingFile;
pub use upstream::{FileHost, FileHostClient, GeneratorClient, ImageGenerator};
