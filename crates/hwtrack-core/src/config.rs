use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let collections_path = PathBuf::from(or_default(
        "HWTRACK_COLLECTIONS_PATH",
        "./config/collections.yaml",
    ));
    let store_path = PathBuf::from(or_default("HWTRACK_STORE_PATH", "./output.csv"));
    let log_level = or_default("HWTRACK_LOG_LEVEL", "info");

    let search_base_url = or_default(
        "HWTRACK_SEARCH_BASE_URL",
        "https://mattel-creations-searchspring-proxy.netlify.app",
    );
    let inventory_base_url = or_default("HWTRACK_INVENTORY_BASE_URL", "https://creations.mattel.com");

    let request_timeout_secs = parse_u64("HWTRACK_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("HWTRACK_USER_AGENT", "hwtrack/0.1 (inventory-tracking)");
    let results_per_page = parse_u32("HWTRACK_RESULTS_PER_PAGE", "99")?;
    let inter_request_delay_ms = parse_u64("HWTRACK_INTER_REQUEST_DELAY_MS", "250")?;
    let max_retries = parse_u32("HWTRACK_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("HWTRACK_RETRY_BACKOFF_BASE_SECS", "5")?;

    let token_ttl_secs = parse_u64("HWTRACK_TOKEN_TTL_SECS", "600")?;
    let max_refresh_attempts = parse_u32("HWTRACK_MAX_REFRESH_ATTEMPTS", "3")?;
    let token_command = lookup("HWTRACK_TOKEN_COMMAND").ok().filter(|s| !s.is_empty());
    let token_command_timeout_secs = parse_u64("HWTRACK_TOKEN_COMMAND_TIMEOUT_SECS", "90")?;

    Ok(AppConfig {
        collections_path,
        store_path,
        log_level,
        search_base_url,
        inventory_base_url,
        request_timeout_secs,
        user_agent,
        results_per_page,
        inter_request_delay_ms,
        max_retries,
        retry_backoff_base_secs,
        token_ttl_secs,
        max_refresh_attempts,
        token_command,
        token_command_timeout_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
