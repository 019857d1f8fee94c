//! Credential acquisition boundary.
//!
//! The bearer token for the inventory endpoint cannot be obtained through
//! an ordinary HTTP call; it is captured by driving a real browser through
//! a checkout page and intercepting an authorized request. That machinery
//! lives outside this crate, behind [`CredentialProvider`] — the core only
//! sees "one blocking acquisition that yields a token or nothing".

use std::time::Duration;

use tokio::process::Command;

use crate::error::InventoryError;

/// A source of bearer tokens for the inventory endpoint.
///
/// `acquire` is expensive (a full browser session in production) and the
/// [`crate::CredentialManager`] amortizes one call across many lookups.
/// Implementations return `Ok(None)` for an ordinary failure to produce a
/// token (timeout, empty capture); `Err` is reserved for unexpected
/// automation failures. The manager treats both identically.
#[allow(async_fn_in_trait)]
pub trait CredentialProvider {
    async fn acquire(&self) -> Result<Option<String>, InventoryError>;
}

/// Runs an external capture command (typically a headless-browser script)
/// and reads the bearer token from its stdout.
///
/// The first non-empty line of stdout is taken as the token. A non-zero
/// exit status, empty output, or exceeding `timeout` all count as "no
/// token" rather than an error.
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandProvider {
    /// Splits `command_line` on whitespace into program and arguments.
    /// Returns `None` for an empty command line.
    #[must_use]
    pub fn from_command_line(command_line: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?.to_string();
        let args = parts.map(str::to_string).collect();
        Some(Self {
            program,
            args,
            timeout,
        })
    }
}

impl CredentialProvider for CommandProvider {
    async fn acquire(&self) -> Result<Option<String>, InventoryError> {
        tracing::info!(program = %self.program, "running token capture command");

        let output = Command::new(&self.program).args(&self.args).output();
        let output = match tokio::time::timeout(self.timeout, output).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(InventoryError::Acquisition(format!(
                    "failed to run '{}': {e}",
                    self.program
                )));
            }
            Err(_) => {
                tracing::warn!(
                    program = %self.program,
                    timeout_secs = self.timeout.as_secs(),
                    "token capture command timed out"
                );
                return Ok(None);
            }
        };

        if !output.status.success() {
            tracing::warn!(
                program = %self.program,
                status = %output.status,
                "token capture command exited with failure"
            );
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let token = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string);

        if token.is_none() {
            tracing::warn!(program = %self.program, "token capture command produced no output");
        }
        Ok(token)
    }
}
