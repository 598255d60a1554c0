//! Trigger dispatcher.
//!
//! Coordinates one trigger from job name to running process. Held in
//! [`AppState`](crate::state::AppState) as an `Arc<Dispatcher>`.

use std::path::PathBuf;
use std::sync::Arc;

use cron_trigger_core::environment::EnvironmentTemplate;
use cron_trigger_core::error::TriggerError;
use cron_trigger_core::job::JobDescriptor;
use cron_trigger_core::launcher::Launcher;
use cron_trigger_core::registry::JobRegistry;
use cron_trigger_core::secret::{
    CommandSecretProvider, DisabledSecretProvider, SecretProvider,
};

use crate::config::{SecretSource, ServerConfig};

/// Result of a successful dispatch.
#[derive(Debug, Clone)]
pub struct TriggerOutcome {
    pub job: JobDescriptor,
    pub log_file: PathBuf,
    pub pid: Option<u32>,
    pub secret_injected: bool,
}

/// Validates trigger requests and launches the matching job.
///
/// Each call runs independently:
/// 1. Look the job up in the registry.
/// 2. Check script jobs exist on disk.
/// 3. Fetch the side-channel secret (best effort).
/// 4. Build the child environment.
/// 5. Launch the job detached and return.
///
/// No state is kept between calls. Concurrent triggers of the same job each
/// launch their own process.
pub struct Dispatcher {
    registry: Arc<JobRegistry>,
    secrets: Arc<dyn SecretProvider>,
    template: EnvironmentTemplate,
    launcher: Launcher,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<JobRegistry>,
        secrets: Arc<dyn SecretProvider>,
        template: EnvironmentTemplate,
        launcher: Launcher,
    ) -> Self {
        Self {
            registry,
            secrets,
            template,
            launcher,
        }
    }

    /// Wire a dispatcher from server configuration.
    pub fn from_config(config: &ServerConfig, registry: Arc<JobRegistry>) -> Self {
        let secrets: Arc<dyn SecretProvider> = match config.secret.source {
            SecretSource::Docker => Arc::new(CommandSecretProvider::docker_exec(
                &config.secret.container,
                config.secret.env_var.clone(),
                config.secret.timeout,
            )),
            SecretSource::Disabled => Arc::new(DisabledSecretProvider),
        };

        Self::new(
            registry,
            secrets,
            EnvironmentTemplate::new(config.secret.env_var.clone(), config.api_base.clone()),
            Launcher::new(config.log_dir.clone()),
        )
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Launch the job registered as `cron_name`.
    ///
    /// Returns once the process has been created; the job's completion is
    /// never observed. A missing or failing secret provider degrades the
    /// job environment but never fails the trigger.
    pub async fn trigger(&self, cron_name: &str) -> Result<TriggerOutcome, TriggerError> {
        if cron_name.is_empty() {
            return Err(TriggerError::MissingParameter(
                cron_trigger_core::request::CRON_NAME_FIELD,
            ));
        }

        let job = self
            .registry
            .get(cron_name)
            .ok_or_else(|| TriggerError::UnknownJob(cron_name.to_string()))?;

        if job.is_script() && !tokio::fs::try_exists(job.path()).await.unwrap_or(false) {
            tracing::error!(
                cron = %job.name,
                script = %job.path().display(),
                "Script not found",
            );
            return Err(TriggerError::ScriptNotFound(job.executable_path.clone()));
        }

        tracing::info!(
            cron = %job.name,
            description = %job.description,
            "Triggering cron",
        );

        let secret_var = self.template.secret_var();
        let secret = match self.secrets.fetch().await {
            Ok(secret) => Some(secret),
            Err(e) => {
                tracing::warn!(
                    cron = %job.name,
                    secret_var,
                    error = %e,
                    "Secret unavailable, job may fail API calls",
                );
                None
            }
        };

        let env = self.template.build(secret.as_ref());
        if secret.is_some() {
            tracing::info!(cron = %job.name, secret_var, "Secret injected into job environment");
        }
        tracing::info!(
            cron = %job.name,
            api_base = %self.template.api_base(),
            "API base URL set",
        );

        let launched = self.launcher.launch(job, &env).inspect_err(|e| {
            tracing::error!(cron = %job.name, error = %e, "Failed to launch cron");
        })?;

        tracing::info!(
            cron = %job.name,
            pid = ?launched.pid,
            log_file = %launched.log_file.display(),
            "Cron started",
        );

        Ok(TriggerOutcome {
            job: job.clone(),
            log_file: launched.log_file,
            pid: launched.pid,
            secret_injected: secret.is_some(),
        })
    }
}
