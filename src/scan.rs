//! Upload scan filter
//!
//! Decides which uploaded files are skipped based on the directory
//! components of their relative paths. The default list covers virtual
//! environments, build artifacts, dependency trees, VCS metadata, and tool
//! caches; `SKIP_FOLDERS` in the environment replaces it entirely.

/// Folder names skipped during analysis unless overridden
pub const DEFAULT_SKIP_FOLDERS: &[&str] = &[
    // Virtual environments
    "venv",
    ".venv",
    "env",
    ".env",
    "virtualenv",
    "conda-env",
    // Python internal / build artifacts
    "__pycache__",
    ".eggs",
    "egg-info",
    "dist",
    "build",
    "sdist",
    "site-packages",
    "lib",
    "lib64",
    "scripts",
    "include",
    "share",
    // Package / dependency managers
    "node_modules",
    // Version control & editors
    ".git",
    ".svn",
    ".hg",
    ".idea",
    ".vscode",
    // Testing / linting caches
    ".tox",
    ".nox",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "htmlcov",
    ".coverage",
    // Misc
    "migrations",
    ".terraform",
];

/// Case-insensitive skip filter over relative-path directory components
#[derive(Debug, Clone)]
pub struct SkipFilter {
    /// Lowercased exact folder names
    names: Vec<String>,

    /// Dotted/hyphenated names also matched as suffixes
    /// (catches "something.egg-info" style folders)
    suffixes: Vec<String>,
}

impl SkipFilter {
    /// Build a filter from an explicit name list
    pub fn new<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        for folder in folders {
            let lower = folder.as_ref().trim().to_lowercase();
            if !lower.is_empty() && !names.contains(&lower) {
                names.push(lower);
            }
        }

        let suffixes = names
            .iter()
            .filter(|name| name.contains('-') || name.contains('.'))
            .cloned()
            .collect();

        Self { names, suffixes }
    }

    /// True when any *directory* component of `relative_path` matches a
    /// skip name. The file name itself is never tested. Both slash styles
    /// are accepted since paths arrive from browsers.
    pub fn should_skip(&self, relative_path: &str) -> bool {
        let normalized = relative_path.replace('\\', "/");
        let parts: Vec<&str> = normalized.split('/').collect();

        for part in &parts[..parts.len().saturating_sub(1)] {
            let lower = part.to_lowercase();
            if self.names.contains(&lower) {
                return true;
            }
            if self.suffixes.iter().any(|s| lower.ends_with(s.as_str())) {
                return true;
            }
        }

        false
    }
}

impl Default for SkipFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SKIP_FOLDERS.iter().copied())
    }
}
