use thiserror::Error;

/// Errors from the inventory endpoint client and credential acquisition.
///
/// [`InventoryError::AuthExpired`] is the one variant callers special-case:
/// it signals that the cached bearer token is no longer accepted and a
/// forced refresh plus a single retry is warranted.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authorization rejected (HTTP {status}) for {url}")]
    AuthExpired { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("credential acquisition failed: {0}")]
    Acquisition(String),

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
