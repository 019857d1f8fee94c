pub mod app_config;
pub mod collections;
pub mod config;
pub mod product;

pub use app_config::AppConfig;
pub use collections::{load_collections, CollectionConfig, CollectionsFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use product::{Product, ProductKey};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read collections file {path}: {source}")]
    CollectionsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse collections file: {0}")]
    CollectionsFileParse(#[from] serde_yaml::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
