//! Static job registry.
//!
//! The registry is built once at startup, either from the built-in table or
//! from a JSON file, and is never mutated afterwards. Handlers share it
//! behind an `Arc` without any locking.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::job::JobDescriptor;

/// Built-in jobs as `(name, script file, description)`.
///
/// Script files are resolved against the configured scripts directory.
const BUILTIN_JOBS: &[(&str, &str, &str)] = &[
    (
        "monitor-openai",
        "cron-monitor-openai.sh",
        "Monitoring Budget OpenAI",
    ),
    (
        "check-alerts",
        "cron-check-alerts.sh",
        "Vérification Alertes Système",
    ),
    (
        "refresh-mv-metadata",
        "cron-refresh-mv-metadata.sh",
        "Rafraîchissement Vues Matérialisées",
    ),
    (
        "reanalyze-kb-failures",
        "cron-reanalyze-kb-failures.sh",
        "Réanalyse Échecs KB",
    ),
    (
        "index-kb-progressive",
        "index-kb-progressive.sh",
        "Indexation KB Progressive",
    ),
    (
        "acquisition-weekly",
        "cron-acquisition-weekly.sh",
        "Acquisition Hebdomadaire",
    ),
    (
        "cleanup-executions",
        "cron-cleanup-executions.sh",
        "Nettoyage Anciennes Exécutions",
    ),
];

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to read registry file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse registry file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Job name must not be empty")]
    EmptyName,

    #[error("Duplicate job name: {0}")]
    DuplicateName(String),

    #[error("Job name must not contain path separators: {0}")]
    InvalidName(String),
}

/// On-disk registry format.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    jobs: Vec<RegistryFileEntry>,
}

#[derive(Debug, Deserialize)]
struct RegistryFileEntry {
    name: String,
    script: PathBuf,
    #[serde(default)]
    description: String,
}

/// Immutable mapping from job name to [`JobDescriptor`].
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: BTreeMap<String, JobDescriptor>,
}

impl JobRegistry {
    /// Build a registry from descriptors, rejecting empty, duplicate and
    /// path-like names.
    pub fn from_jobs(
        jobs: impl IntoIterator<Item = JobDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();
        for job in jobs {
            if job.name.trim().is_empty() {
                return Err(RegistryError::EmptyName);
            }
            // The name becomes `<log_dir>/<name>.log`.
            if job.name.contains(['/', '\\', '\0']) {
                return Err(RegistryError::InvalidName(job.name));
            }
            if map.contains_key(&job.name) {
                return Err(RegistryError::DuplicateName(job.name));
            }
            map.insert(job.name.clone(), job);
        }
        Ok(Self { jobs: map })
    }

    /// The built-in job table with scripts located under `scripts_dir`.
    pub fn builtin(scripts_dir: &Path) -> Self {
        let jobs = BUILTIN_JOBS
            .iter()
            .map(|(name, script, description)| {
                let job = JobDescriptor::new(*name, scripts_dir.join(script), *description);
                (job.name.clone(), job)
            })
            .collect();
        Self { jobs }
    }

    /// Load a registry from a JSON file.
    ///
    /// ```json
    /// { "jobs": [ { "name": "check-alerts", "script": "cron-check-alerts.sh", "description": "..." } ] }
    /// ```
    ///
    /// Relative script paths are resolved against `scripts_dir`.
    pub fn load(path: &Path, scripts_dir: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: RegistryFile =
            serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_jobs(file.jobs.into_iter().map(|entry| {
            let script = if entry.script.is_absolute() {
                entry.script
            } else {
                scripts_dir.join(entry.script)
            };
            JobDescriptor::new(entry.name, script, entry.description)
        }))
    }

    pub fn get(&self, name: &str) -> Option<&JobDescriptor> {
        self.jobs.get(name)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Iterate over jobs in name order.
    pub fn iter(&self) -> impl Iterator<Item = &JobDescriptor> {
        self.jobs.values()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;

    use super::*;

    fn write_registry(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("create temp file");
        write!(f, "{body}").expect("write registry");
        f
    }

    #[test]
    fn builtin_registry_has_seven_jobs() {
        let registry = JobRegistry::builtin(Path::new("/opt/qadhya/scripts"));
        assert_eq!(registry.len(), 7);

        let job = registry.get("check-alerts").expect("check-alerts registered");
        assert_eq!(
            job.executable_path,
            PathBuf::from("/opt/qadhya/scripts/cron-check-alerts.sh")
        );
        assert_eq!(job.description, "Vérification Alertes Système");
        assert!(registry.iter().all(JobDescriptor::is_script));
    }

    #[test]
    fn unknown_name_is_absent() {
        let registry = JobRegistry::builtin(Path::new("/opt/qadhya/scripts"));
        assert!(registry.get("bogus").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = JobRegistry::from_jobs([
            JobDescriptor::new("a", "/x/a.sh", "first"),
            JobDescriptor::new("a", "/x/b.sh", "second"),
        ]);
        assert_matches!(result, Err(RegistryError::DuplicateName(name)) if name == "a");
    }

    #[test]
    fn empty_names_are_rejected() {
        let result = JobRegistry::from_jobs([JobDescriptor::new("  ", "/x/a.sh", "blank")]);
        assert_matches!(result, Err(RegistryError::EmptyName));
    }

    #[test]
    fn path_like_names_are_rejected() {
        for name in ["../escape", "nested/job", "..\\escape"] {
            let result = JobRegistry::from_jobs([JobDescriptor::new(name, "/x/a.sh", "bad")]);
            assert_matches!(result, Err(RegistryError::InvalidName(n)) if n == name);
        }
    }

    #[test]
    fn load_rejects_path_like_names() {
        let file = write_registry(r#"{"jobs": [{"name": "../../tmp/x", "script": "x.sh"}]}"#);
        let result = JobRegistry::load(file.path(), Path::new("/srv/scripts"));
        assert_matches!(result, Err(RegistryError::InvalidName(_)));
    }

    #[test]
    fn load_resolves_relative_scripts() {
        let file = write_registry(
            r#"{"jobs": [
                {"name": "nightly", "script": "nightly.sh", "description": "Nightly run"},
                {"name": "indexer", "script": "/usr/local/bin/indexer"}
            ]}"#,
        );

        let registry =
            JobRegistry::load(file.path(), Path::new("/srv/scripts")).expect("load registry");

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("nightly").expect("nightly").executable_path,
            PathBuf::from("/srv/scripts/nightly.sh")
        );
        let indexer = registry.get("indexer").expect("indexer");
        assert_eq!(
            indexer.executable_path,
            PathBuf::from("/usr/local/bin/indexer")
        );
        assert_eq!(indexer.description, "");
    }

    #[test]
    fn load_reports_parse_errors() {
        let file = write_registry("{not json");
        let result = JobRegistry::load(file.path(), Path::new("/srv/scripts"));
        assert_matches!(result, Err(RegistryError::Parse { .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = JobRegistry::load(
            Path::new("/nonexistent/registry.json"),
            Path::new("/srv/scripts"),
        );
        assert_matches!(result, Err(RegistryError::Read { .. }));
    }
}
