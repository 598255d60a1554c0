use std::path::PathBuf;

/// Reasons a trigger request is rejected or fails before a job is running.
///
/// Every variant is reported synchronously to the caller; none of them is
/// retried and none of them is fatal to the server.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Invalid JSON: {0}")]
    MalformedRequest(String),

    #[error("{0} is required")]
    MissingParameter(&'static str),

    #[error("Unknown cron: {0}")]
    UnknownJob(String),

    #[error("Script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("Failed to launch {job}: {source}")]
    LaunchFailed {
        job: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_parameter() {
        let err = TriggerError::MissingParameter("cronName");
        assert_eq!(err.to_string(), "cronName is required");
    }

    #[test]
    fn display_unknown_job() {
        let err = TriggerError::UnknownJob("bogus".to_string());
        assert_eq!(err.to_string(), "Unknown cron: bogus");
    }

    #[test]
    fn display_script_not_found() {
        let err = TriggerError::ScriptNotFound(PathBuf::from("/opt/scripts/missing.sh"));
        assert_eq!(err.to_string(), "Script not found: /opt/scripts/missing.sh");
    }

    #[test]
    fn launch_failed_carries_os_error() {
        let err = TriggerError::LaunchFailed {
            job: "check-alerts".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().starts_with("Failed to launch check-alerts:"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
