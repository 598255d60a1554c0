//! Child process environment construction.
//!
//! Jobs inherit the dispatcher's environment with two overlays: the
//! side-channel secret (when one was retrieved) and the API base URL. The
//! result is a standalone map handed to the child; the dispatcher's own
//! environment is never modified.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

use crate::secret::Secret;

/// Variable carrying the base URL jobs call back into.
pub const API_BASE_VAR: &str = "CRON_API_BASE";

/// Variable carrying the side-channel secret unless configured otherwise.
pub const DEFAULT_SECRET_VAR: &str = "CRON_SECRET";

/// Fixed overlay applied to every job environment.
#[derive(Debug, Clone)]
pub struct EnvironmentTemplate {
    secret_var: String,
    api_base: String,
}

impl EnvironmentTemplate {
    pub fn new(secret_var: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            secret_var: secret_var.into(),
            api_base: api_base.into(),
        }
    }

    pub fn secret_var(&self) -> &str {
        &self.secret_var
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build a job environment on top of the current process environment.
    pub fn build(&self, secret: Option<&Secret>) -> JobEnvironment {
        self.build_from(std::env::vars_os(), secret)
    }

    /// Build a job environment on top of an explicit base.
    ///
    /// Without a secret, any inherited variable of the same name is dropped
    /// so the child never sees a stale value.
    pub fn build_from(
        &self,
        base: impl IntoIterator<Item = (OsString, OsString)>,
        secret: Option<&Secret>,
    ) -> JobEnvironment {
        let mut vars: BTreeMap<OsString, OsString> = base.into_iter().collect();

        match secret {
            Some(secret) => {
                vars.insert(self.secret_var.clone().into(), secret.expose().into());
            }
            None => {
                vars.remove(OsStr::new(&self.secret_var));
            }
        }
        vars.insert(API_BASE_VAR.into(), self.api_base.clone().into());

        JobEnvironment { vars }
    }
}

/// Complete environment for one child process.
#[derive(Clone, Default)]
pub struct JobEnvironment {
    vars: BTreeMap<OsString, OsString>,
}

impl JobEnvironment {
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(OsStr::new(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsString, &OsString)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

// Values may hold the secret, so only keys are printed.
impl std::fmt::Debug for JobEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.vars.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Vec<(OsString, OsString)> {
        vec![
            ("PATH".into(), "/usr/bin:/bin".into()),
            ("CRON_SECRET".into(), "inherited".into()),
            ("CRON_API_BASE".into(), "http://localhost:3000".into()),
        ]
    }

    #[test]
    fn secret_and_base_url_are_overlaid() {
        let template = EnvironmentTemplate::new("CRON_SECRET", "https://qadhya.tn");
        let env = template.build_from(base(), Some(&Secret::new("fresh")));

        assert_eq!(env.get("CRON_SECRET"), Some(OsStr::new("fresh")));
        assert_eq!(env.get("CRON_API_BASE"), Some(OsStr::new("https://qadhya.tn")));
        assert_eq!(env.get("PATH"), Some(OsStr::new("/usr/bin:/bin")));
        assert_eq!(env.len(), 3);
    }

    #[test]
    fn missing_secret_drops_inherited_value() {
        let template = EnvironmentTemplate::new("CRON_SECRET", "https://qadhya.tn");
        let env = template.build_from(base(), None);

        assert!(!env.contains("CRON_SECRET"));
        assert_eq!(env.get("CRON_API_BASE"), Some(OsStr::new("https://qadhya.tn")));
    }

    #[test]
    fn custom_secret_variable_name() {
        let template = EnvironmentTemplate::new("JOB_TOKEN", "https://example.test");
        let env = template.build_from(Vec::new(), Some(&Secret::new("t0k3n")));

        assert_eq!(env.get("JOB_TOKEN"), Some(OsStr::new("t0k3n")));
        assert!(!env.contains("CRON_SECRET"));
    }

    #[test]
    fn debug_output_hides_values() {
        let template = EnvironmentTemplate::new("CRON_SECRET", "https://qadhya.tn");
        let env = template.build_from(Vec::new(), Some(&Secret::new("hunter2")));
        let printed = format!("{env:?}");
        assert!(printed.contains("CRON_SECRET"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn process_environment_is_not_modified() {
        let template = EnvironmentTemplate::new("CRON_TRIGGER_TEST_SECRET", "https://qadhya.tn");
        let env = template.build(Some(&Secret::new("value")));

        assert!(env.contains("CRON_TRIGGER_TEST_SECRET"));
        assert!(std::env::var_os("CRON_TRIGGER_TEST_SECRET").is_none());
    }
}
