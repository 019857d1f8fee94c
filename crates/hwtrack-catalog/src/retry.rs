//! Retry utilities for the search API client.
//!
//! Provides exponential backoff retry logic for transient HTTP errors such
//! as 429 Rate Limited responses. Non-retriable errors (parse failures,
//! 404s, unexpected statuses) are propagated immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable: [`CatalogError::RateLimited`] (the proxy asked us to back
/// off) and [`CatalogError::Http`] (connection reset, timeout, TLS).
/// Everything else is propagated immediately — retrying a 404 or a parse
/// failure returns the same result.
fn is_retriable(err: &CatalogError) -> bool {
    matches!(
        err,
        CatalogError::RateLimited { .. } | CatalogError::Http(_)
    )
}

/// Executes `operation` with exponential backoff retries on transient
/// errors.
///
/// On a retriable error the function sleeps for
/// `backoff_base_secs * 2^attempt` seconds and tries again, up to
/// `max_retries` additional attempts after the first try. If all retries
/// are exhausted the last error is returned. Non-retriable errors are
/// returned immediately without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                err
            }
        };

        // Exponential backoff: base * 2^attempt seconds, shift capped to
        // prevent overflow on extreme configs.
        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient search API error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
