//! Runner configuration: environment layering and rules-file loading.

use std::path::{Path, PathBuf};

use aci_checks::checks::RuleSet;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings read from the `ACIMON_` environment, each overridable by the
/// matching CLI flag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Path to the persisted rate-state file.
    pub state_file: Option<PathBuf>,

    /// Path to a rules file overriding check parameters.
    pub rules: Option<PathBuf>,

    /// Emit JSON-formatted log lines, for scheduler-driven runs.
    pub log_json: bool,
}

impl RunnerConfig {
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ACIMON").try_parsing(true))
            .build()
            .context("failed to read ACIMON_* environment")?;

        config
            .try_deserialize()
            .context("failed to parse ACIMON_* environment")
    }

    /// The rate-state path to use: explicit flag, then environment, then
    /// a per-user default.
    pub fn state_file_path(&self, override_path: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = override_path.or_else(|| self.state_file.clone()) {
            return Ok(path);
        }

        let home = dirs_next::home_dir().context("could not determine home directory")?;
        Ok(home
            .join(".local")
            .join("share")
            .join("acimon")
            .join("state.json"))
    }
}

/// Loads a rules file into a [`RuleSet`]. No path means stock defaults;
/// an unreadable or unparsable file is a hard error.
pub fn load_rules(path: Option<&Path>) -> Result<RuleSet> {
    let path = match path {
        Some(path) => path,
        None => return Ok(RuleSet::default()),
    };

    let config = config::Config::builder()
        .add_source(config::File::from(path))
        .build()
        .with_context(|| format!("failed to read rules file {}", path.display()))?;
    config
        .try_deserialize()
        .with_context(|| format!("failed to parse rules file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aci_checks::report::Levels;

    #[test]
    fn test_missing_rules_path_yields_defaults() {
        let rules = load_rules(None).unwrap();
        assert_eq!(rules, RuleSet::default());
    }

    #[test]
    fn test_rules_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(
            &path,
            r#"
[interface_levels.level_crc_errors]
warn = 2.0
crit = 20.0

[interface_discovery.discovery_single]
pad_portnumbers = true

[nodes.health_levels]
warn = 90.0
crit = 80.0
"#,
        )
        .unwrap();

        let rules = load_rules(Some(&path)).unwrap();
        assert_eq!(rules.interface_levels.crc, Levels::new(2.0, 20.0));
        // Untouched keys keep their defaults.
        assert_eq!(rules.interface_levels.fcs, Levels::new(0.01, 1.0));
        assert!(rules.interface_discovery.discovery_single.pad_portnumbers);
        assert!(rules.interface_discovery.discovery_single.enabled);
        assert_eq!(rules.nodes.health_levels, Levels::new(90.0, 80.0));
    }

    #[test]
    fn test_unparsable_rules_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "interface_levels = \"oops").unwrap();
        assert!(load_rules(Some(&path)).is_err());
    }

    #[test]
    fn test_malformed_environment_value_is_an_error() {
        // No other test reads the ACIMON_* environment, so mutating it
        // here cannot race.
        std::env::set_var("ACIMON_LOG_JSON", "sometimes");
        let result = RunnerConfig::load();
        std::env::remove_var("ACIMON_LOG_JSON");

        let error = result.unwrap_err();
        assert!(error.to_string().contains("ACIMON_* environment"));
    }

    #[test]
    fn test_default_state_path_is_under_home() {
        let config = RunnerConfig::default();
        let path = config.state_file_path(None).unwrap();
        assert!(path.ends_with(".local/share/acimon/state.json"));

        let explicit = config
            .state_file_path(Some(PathBuf::from("/tmp/state.json")))
            .unwrap();
        assert_eq!(explicit, PathBuf::from("/tmp/state.json"));
    }
}
