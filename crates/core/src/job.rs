//! Job descriptors.

use std::path::{Path, PathBuf};

/// Extension that marks an executable as a bash script.
const SCRIPT_EXTENSION: &str = "sh";

/// A named, pre-registered executable the dispatcher can launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub name: String,
    pub executable_path: PathBuf,
    pub description: String,
}

impl JobDescriptor {
    pub fn new(
        name: impl Into<String>,
        executable_path: impl Into<PathBuf>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            executable_path: executable_path.into(),
            description: description.into(),
        }
    }

    /// Whether the executable is a shell script.
    ///
    /// Scripts are existence-checked before launch and run through `bash`.
    pub fn is_script(&self) -> bool {
        self.executable_path
            .extension()
            .is_some_and(|ext| ext == SCRIPT_EXTENSION)
    }

    pub fn path(&self) -> &Path {
        &self.executable_path
    }
}
