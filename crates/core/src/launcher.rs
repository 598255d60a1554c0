//! Detached job launcher.
//!
//! Starts a job's executable as a fire-and-forget child process. The child
//! gets its own process group, reads nothing from stdin, and appends both
//! stdout and stderr to `<log_dir>/<job>.log`. The child handle is dropped
//! right after spawn: the dispatcher never waits on the process, never reads
//! its exit status, and never kills it. Finished children are reaped in the
//! background by the tokio runtime.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

use crate::environment::JobEnvironment;
use crate::error::TriggerError;
use crate::job::JobDescriptor;

/// Interpreter used for `.sh` jobs.
const SCRIPT_INTERPRETER: &str = "bash";

/// What is known about a job once it has been started.
#[derive(Debug, Clone)]
pub struct LaunchedJob {
    /// OS process id at spawn time, for the activity log only.
    pub pid: Option<u32>,
    /// File receiving the job's stdout and stderr.
    pub log_file: PathBuf,
}

/// Spawns jobs with their output redirected under a log directory.
#[derive(Debug, Clone)]
pub struct Launcher {
    log_dir: PathBuf,
}

impl Launcher {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    /// Per-job output log: `<log_dir>/<job_name>.log`.
    pub fn log_file_for(&self, job_name: &str) -> PathBuf {
        self.log_dir.join(format!("{job_name}.log"))
    }

    /// Start `job` with `env` as its complete environment.
    ///
    /// Returns as soon as the OS has created the process. Failing to open the
    /// job log or to spawn is a [`TriggerError::LaunchFailed`] carrying the
    /// OS error.
    pub fn launch(
        &self,
        job: &JobDescriptor,
        env: &JobEnvironment,
    ) -> Result<LaunchedJob, TriggerError> {
        let log_file = self.log_file_for(&job.name);

        // Held only until the spawn below; the child keeps its own copies.
        let stdout = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|e| launch_failed(job, e))?;
        let stderr = stdout.try_clone().map_err(|e| launch_failed(job, e))?;

        let mut cmd = if job.is_script() {
            let mut cmd = Command::new(SCRIPT_INTERPRETER);
            cmd.arg(job.path());
            cmd
        } else {
            Command::new(job.path())
        };

        cmd.env_clear()
            .envs(env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));

        // New process group: signals aimed at the server do not reach jobs.
        #[cfg(unix)]
        cmd.process_group(0);

        tracing::debug!(
            job = %job.name,
            executable = %job.path().display(),
            log_file = %log_file.display(),
            "Spawning detached job",
        );

        let child = cmd.spawn().map_err(|e| launch_failed(job, e))?;
        let pid = child.id();
        drop(child);

        Ok(LaunchedJob { pid, log_file })
    }
}

fn launch_failed(job: &JobDescriptor, source: std::io::Error) -> TriggerError {
    TriggerError::LaunchFailed {
        job: job.name.clone(),
        source,
    }
}
