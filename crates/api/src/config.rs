use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use cron_trigger_core::environment::DEFAULT_SECRET_VAR;

/// File name of the server's own activity log inside the log directory.
const ACTIVITY_LOG_FILE_NAME: &str = "cron-trigger-server.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Where the side-channel secret comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// `docker exec <container> env` on a running container.
    Docker,
    /// No secret is ever injected.
    Disabled,
}

impl FromStr for SecretSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docker" => Ok(Self::Docker),
            "none" | "disabled" => Ok(Self::Disabled),
            _ => Err(()),
        }
    }
}

/// Side-channel secret settings.
#[derive(Debug, Clone)]
pub struct SecretConfig {
    pub source: SecretSource,
    /// Container whose environment holds the secret.
    pub container: String,
    /// Variable name both read from the container and set on jobs.
    pub env_var: String,
    /// Upper bound on one retrieval.
    pub timeout: Duration,
}

/// Server configuration loaded from environment variables.
///
/// Defaults match the production host layout; every value can be
/// overridden through the environment or a `.env` file.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: IpAddr,
    /// Bind port (default: `9998`).
    pub port: u16,
    /// Directory holding the built-in job scripts.
    pub scripts_dir: PathBuf,
    /// Directory receiving one `<job>.log` per job.
    pub log_dir: PathBuf,
    /// The server's own append-only activity log.
    pub activity_log_file: PathBuf,
    /// Optional JSON registry replacing the built-in job table.
    pub registry_file: Option<PathBuf>,
    /// Value of `CRON_API_BASE` in every job environment.
    pub api_base: String,
    pub secret: SecretConfig,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                              |
    /// |------------------------|--------------------------------------|
    /// | `HOST`                 | `127.0.0.1`                          |
    /// | `PORT`                 | `9998`                               |
    /// | `SCRIPTS_DIR`          | `/opt/qadhya/scripts`                |
    /// | `LOG_DIR`              | `/var/log/qadhya`                    |
    /// | `ACTIVITY_LOG_FILE`    | `$LOG_DIR/cron-trigger-server.log`   |
    /// | `CRON_REGISTRY_FILE`   | unset (built-in jobs)                |
    /// | `CRON_API_BASE`        | `https://qadhya.tn`                  |
    /// | `SECRET_PROVIDER`      | `docker` (`docker` or `none`)        |
    /// | `SECRET_CONTAINER`     | `qadhya-nextjs`                      |
    /// | `SECRET_ENV_VAR`       | `CRON_SECRET`                        |
    /// | `SECRET_TIMEOUT_SECS`  | `5`                                  |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let host = match get("HOST") {
            Some(v) => parse(&v, "HOST", "IP address")?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        let port: u16 = match get("PORT") {
            Some(v) => parse(&v, "PORT", "u16")?,
            None => 9998,
        };

        let scripts_dir = get("SCRIPTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/opt/qadhya/scripts"));

        let log_dir = get("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/var/log/qadhya"));

        let activity_log_file = get("ACTIVITY_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| log_dir.join(ACTIVITY_LOG_FILE_NAME));

        let registry_file = get("CRON_REGISTRY_FILE").map(PathBuf::from);

        let api_base = get("CRON_API_BASE").unwrap_or_else(|| "https://qadhya.tn".into());

        let source = match get("SECRET_PROVIDER") {
            Some(v) => v.parse::<SecretSource>().map_err(|()| ConfigError::Invalid {
                var: "SECRET_PROVIDER",
                expected: "secret provider (docker, none)",
                value: v.clone(),
            })?,
            None => SecretSource::Docker,
        };

        let secret_timeout_secs: u64 = match get("SECRET_TIMEOUT_SECS") {
            Some(v) => parse(&v, "SECRET_TIMEOUT_SECS", "u64")?,
            None => 5,
        };

        let secret = SecretConfig {
            source,
            container: get("SECRET_CONTAINER").unwrap_or_else(|| "qadhya-nextjs".into()),
            env_var: get("SECRET_ENV_VAR").unwrap_or_else(|| DEFAULT_SECRET_VAR.into()),
            timeout: Duration::from_secs(secret_timeout_secs),
        };

        let request_timeout_secs: u64 = match get("REQUEST_TIMEOUT_SECS") {
            Some(v) => parse(&v, "REQUEST_TIMEOUT_SECS", "u64")?,
            None => 30,
        };

        // A hung secret provider must give up before the request does.
        if request_timeout_secs <= secret_timeout_secs {
            return Err(ConfigError::Invalid {
                var: "REQUEST_TIMEOUT_SECS",
                expected: "u64 greater than SECRET_TIMEOUT_SECS",
                value: request_timeout_secs.to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            scripts_dir,
            log_dir,
            activity_log_file,
            registry_file,
            api_base,
            secret,
            request_timeout_secs,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T: FromStr>(
    value: &str,
    var: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value: value.to_string(),
    })
}
