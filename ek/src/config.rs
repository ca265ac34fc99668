//! editkit configuration types and loading

use eyre::{Context, Result};
use procsup::SupervisorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::style::{ALLMAN2, ProfileSpec};

/// Main editkit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Style profile used for expansion and reindentation
    pub style: String,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Directory holding user template files
    #[serde(rename = "templates-dir")]
    pub templates_dir: Option<PathBuf>,

    /// User-defined style profiles
    pub profiles: Vec<ProfileSpec>,

    /// Process supervisor settings
    pub supervisor: SupervisorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            style: ALLMAN2.to_string(),
            log_level: None,
            templates_dir: None,
            profiles: Vec::new(),
            supervisor: SupervisorConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must load. Otherwise the first readable file among
    /// [`Config::candidate_paths`] wins, and defaults apply when none does.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::candidate_paths() {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => tracing::warn!(path = %candidate.display(), error = %e, "Skipping unreadable config"),
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Implicit config locations, most specific first
    ///
    /// `./.editkit.yml`, then `editkit/editkit.yml` under the user config dir.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".editkit.yml")];
        paths.extend(dirs::config_dir().map(|dir| dir.join("editkit").join("editkit.yml")));
        paths
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Directory for user templates, expanding a leading `~/`
    pub fn templates_dir(&self) -> Option<PathBuf> {
        match &self.templates_dir {
            Some(dir) => {
                let dir_str = dir.to_string_lossy();
                if let Some(rest) = dir_str.strip_prefix("~/") {
                    dirs::home_dir().map(|home| home.join(rest))
                } else {
                    Some(dir.clone())
                }
            }
            None => dirs::config_dir().map(|p| p.join("editkit").join("templates")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::BlockCategory;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.style, ALLMAN2);
        assert!(config.log_level.is_none());
        assert!(config.profiles.is_empty());
        assert!(config.supervisor.sink_dir.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editkit.yml");
        fs::write(
            &path,
            r#"
style: roomy
log-level: DEBUG
templates-dir: /tmp/ek-templates
profiles:
  - name: roomy
    parent: knr4
    offsets:
      case-label: "+"
supervisor:
  sink-dir: /tmp/ek-sinks
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.style, "roomy");
        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));
        assert_eq!(config.templates_dir(), Some(PathBuf::from("/tmp/ek-templates")));
        assert_eq!(config.profiles.len(), 1);
        assert!(config.profiles[0].offsets.contains_key(&BlockCategory::CaseLabel));
        assert_eq!(config.supervisor.sink_dir, Some(PathBuf::from("/tmp/ek-sinks")));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editkit.yml");
        fs::write(&path, "log-level: WARN\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.style, ALLMAN2);
        assert_eq!(config.log_level.as_deref(), Some("WARN"));
        assert!(config.supervisor.sink_dir.is_none());
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_candidate_paths_local_first() {
        let paths = Config::candidate_paths();
        assert_eq!(paths[0], PathBuf::from(".editkit.yml"));
        assert!(paths[1..].iter().all(|p| p.ends_with("editkit/editkit.yml")));
    }

    #[test]
    fn test_load_log_level() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editkit.yml");
        fs::write(&path, "log-level: TRACE\n").unwrap();
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("TRACE"));
    }
}
