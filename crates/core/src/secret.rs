//! Side-channel secret retrieval.
//!
//! The secret handed to jobs is owned by a sibling service. On every trigger
//! the dispatcher asks a [`SecretProvider`] for the current value; the
//! default provider reads the live environment of a running container with
//! `docker exec <container> env`. Retrieval is best effort: callers treat
//! every [`SecretError`] as a degradation, never as a dispatch failure.

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

/// A secret value. `Debug` never prints the contents.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Secret provider timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Failed to run secret provider: {0}")]
    Io(#[from] std::io::Error),

    #[error("Secret provider exited with code {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("{0} not found in provider output")]
    NotFound(String),

    #[error("Secret provider is disabled")]
    Disabled,
}

/// Source of the secret injected into job environments.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetch the current secret value.
    ///
    /// Implementations must bound the time they spend so a hung upstream
    /// cannot stall a trigger request.
    async fn fetch(&self) -> Result<Secret, SecretError>;
}

/// Reads `VAR=value` lines from the stdout of an external command.
#[derive(Debug, Clone)]
pub struct CommandSecretProvider {
    program: String,
    args: Vec<String>,
    variable: String,
    timeout: Duration,
}

impl CommandSecretProvider {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        variable: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            variable: variable.into(),
            timeout,
        }
    }

    /// Provider that lists the environment of a running docker container.
    pub fn docker_exec(container: &str, variable: impl Into<String>, timeout: Duration) -> Self {
        Self::new(
            "docker",
            vec!["exec".to_string(), container.to_string(), "env".to_string()],
            variable,
            timeout,
        )
    }
}

#[async_trait]
impl SecretProvider for CommandSecretProvider {
    async fn fetch(&self) -> Result<Secret, SecretError> {
        let mut cmd = Command::new(&self.program);
        // `kill_on_drop(true)` reaps the child if the timeout fires first.
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result?,
            Err(_) => return Err(SecretError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            return Err(SecretError::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        find_variable(&stdout, &self.variable)
            .map(Secret::new)
            .ok_or_else(|| SecretError::NotFound(self.variable.clone()))
    }
}

/// Always reports the secret as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSecretProvider;

#[async_trait]
impl SecretProvider for DisabledSecretProvider {
    async fn fetch(&self) -> Result<Secret, SecretError> {
        Err(SecretError::Disabled)
    }
}

/// Returns a fixed value.
#[derive(Debug, Clone)]
pub struct StaticSecretProvider(Secret);

impl StaticSecretProvider {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Secret::new(value))
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn fetch(&self) -> Result<Secret, SecretError> {
        Ok(self.0.clone())
    }
}

/// Value of the first `variable=value` line in an `env` listing.
///
/// Only the first matching line is considered; an empty value there yields
/// `None` even if a later line sets the variable.
pub fn find_variable(listing: &str, variable: &str) -> Option<String> {
    listing
        .lines()
        .filter_map(|line| line.strip_prefix(variable)?.strip_prefix('='))
        .next()
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
