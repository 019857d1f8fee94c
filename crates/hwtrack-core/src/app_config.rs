use std::path::PathBuf;

/// Runtime configuration for a tracking run, loaded from environment
/// variables (see `config.rs` for the variable names and defaults).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the YAML file listing the collections to poll.
    pub collections_path: PathBuf,
    /// Path to the CSV reconciliation store.
    pub store_path: PathBuf,
    pub log_level: String,

    /// Root of the SearchSpring search proxy.
    pub search_base_url: String,
    /// Root of the storefront API carrying the authenticated inventory
    /// endpoint.
    pub inventory_base_url: String,

    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub results_per_page: u32,
    pub inter_request_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,

    /// Conservative validity window for a captured bearer token, shorter
    /// than the true expiry to allow for clock and latency slack.
    pub token_ttl_secs: u64,
    /// Maximum consecutive acquisition attempts before the run degrades to
    /// the no-credential failure mode.
    pub max_refresh_attempts: u32,
    /// External browser-capture command that prints a bearer token on
    /// stdout. `None` disables inventory enrichment entirely.
    pub token_command: Option<String>,
    pub token_command_timeout_secs: u64,
}
