//! Driver Configuration
//!
//! Parses the driver config file at `~/.config/feedlane/config.toml`:
//! which worker command to launch and how to answer key-confirmation
//! requests. CLI flags override whatever the file says.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// How `confirm-keys` requests from the worker are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    /// Ask on the terminal. Safe only because the protocol is
    /// single-threaded and nothing else is serviced while we wait.
    #[default]
    Prompt,
    /// Trust every key the worker offers.
    Accept,
    /// Trust nothing; unconfirmed feeds fail.
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    /// Command used to launch the worker subprocess.
    #[serde(default = "default_worker_command")]
    pub worker_command: String,

    /// Extra arguments passed to the worker.
    #[serde(default = "default_worker_args")]
    pub worker_args: Vec<String>,

    /// Key-confirmation policy.
    #[serde(default)]
    pub key_policy: KeyPolicy,
}

fn default_worker_command() -> String {
    "feedlane-worker".to_string()
}

fn default_worker_args() -> Vec<String> {
    vec!["slave".to_string()]
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            worker_command: default_worker_command(),
            worker_args: default_worker_args(),
            key_policy: KeyPolicy::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl DriverConfig {
    /// Load from an explicit path, or from the default location if it
    /// exists, or fall back to built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default config file path (`~/.config/feedlane/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(PathBuf::from(home).join(".config/feedlane/config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_launch_the_bundled_worker() {
        let config = DriverConfig::default();
        assert_eq!(config.worker_command, "feedlane-worker");
        assert_eq!(config.worker_args, vec!["slave".to_string()]);
        assert_eq!(config.key_policy, KeyPolicy::Prompt);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
worker_command = "/opt/feedlane/worker"
worker_args = ["slave", "-v"]
key_policy = "accept"
"#
        )
        .unwrap();

        let config = DriverConfig::load(file.path()).unwrap();
        assert_eq!(config.worker_command, "/opt/feedlane/worker");
        assert_eq!(config.worker_args, vec!["slave".to_string(), "-v".to_string()]);
        assert_eq!(config.key_policy, KeyPolicy::Accept);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"key_policy = "reject""#).unwrap();

        let config = DriverConfig::load(file.path()).unwrap();
        assert_eq!(config.worker_command, "feedlane-worker");
        assert_eq!(config.key_policy, KeyPolicy::Reject);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "key_policy = 42").unwrap();

        let err = DriverConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = DriverConfig::load(Path::new("/nonexistent/feedlane.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
