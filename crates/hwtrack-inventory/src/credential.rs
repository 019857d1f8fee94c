//! Credential lifecycle management.
//!
//! The captured bearer token is a scarce, expiring, rate-limited resource:
//! acquiring one drives a full browser session. [`CredentialManager`]
//! caches the token, refreshes it proactively before expiry or reactively
//! on an authorization failure, and bounds consecutive acquisition
//! attempts so an unavailable capture path cannot cause a retry storm.

use std::time::{Duration, Instant};

use crate::provider::CredentialProvider;

/// A captured bearer token and the moment it was captured.
#[derive(Debug, Clone)]
struct Credential {
    token: String,
    acquired_at: Instant,
}

/// Caches a bearer credential, tracks its validity window, and budgets
/// acquisition attempts.
///
/// State is explicit per instance — independent runs and tests each hold
/// their own manager and counter. The attempt counter is process-scoped
/// and never persisted: once exhausted, only a fresh run recovers.
pub struct CredentialManager<P> {
    provider: P,
    cached: Option<Credential>,
    /// Validity window, conservatively shorter than the true token expiry
    /// to allow for clock and latency slack.
    ttl: Duration,
    /// Consecutive failed acquisition attempts since the last success.
    attempts: u32,
    max_attempts: u32,
}

impl<P: CredentialProvider> CredentialManager<P> {
    #[must_use]
    pub fn new(provider: P, ttl: Duration, max_attempts: u32) -> Self {
        Self {
            provider,
            cached: None,
            ttl,
            attempts: 0,
            max_attempts,
        }
    }

    /// Returns `true` if a cached credential exists and is inside its
    /// validity window. Pure function of cached state and current time.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.cached
            .as_ref()
            .is_some_and(|c| c.acquired_at.elapsed() < self.ttl)
    }

    /// Returns `true` once the acquisition budget is spent; `get` will
    /// fail fast without invoking the provider.
    #[must_use]
    pub fn attempts_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Drops the cached credential. Called when the inventory endpoint
    /// rejects the token (401-class) — an explicit invalidation signal,
    /// stronger than the timer.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Returns a valid bearer token, acquiring one if needed.
    ///
    /// With `force_refresh` false, a cached in-window credential is
    /// returned immediately at no acquisition cost. Otherwise, if the
    /// attempt budget is exhausted, returns `None` without invoking the
    /// provider — callers must treat this as a hard stop, not retry.
    /// Otherwise one acquisition is attempted: on success the credential
    /// is cached and the attempt counter resets to zero; on failure the
    /// counter stays incremented and `None` is returned.
    pub async fn get(&mut self, force_refresh: bool) -> Option<String> {
        if !force_refresh {
            if let Some(credential) = &self.cached {
                if credential.acquired_at.elapsed() < self.ttl {
                    return Some(credential.token.clone());
                }
            }
        }

        if self.attempts_exhausted() {
            tracing::warn!(
                attempts = self.attempts,
                max_attempts = self.max_attempts,
                "credential acquisition budget exhausted; not attempting again this run"
            );
            return None;
        }

        self.attempts += 1;
        match self.provider.acquire().await {
            Ok(Some(token)) => {
                tracing::info!("captured fresh bearer credential");
                self.cached = Some(Credential {
                    token: token.clone(),
                    acquired_at: Instant::now(),
                });
                self.attempts = 0;
                Some(token)
            }
            Ok(None) => {
                tracing::warn!(
                    attempt = self.attempts,
                    max_attempts = self.max_attempts,
                    "credential provider returned no token"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    attempt = self.attempts,
                    max_attempts = self.max_attempts,
                    error = %e,
                    "credential acquisition failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "credential_test.rs"]
mod tests;
