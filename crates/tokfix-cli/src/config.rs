//! Configuration file support for tokfix
//!
//! Loads `.tokfix.toml` from current directory or parent directories.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokfix_fixer::Preset;

pub const CONFIG_FILE_NAME: &str = ".tokfix.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Preset to use (psr2, symfony)
    pub preset: Option<String>,
    /// If set, only these rules will run (overrides preset)
    pub enabled: Option<Vec<String>>,
    /// Rules to exclude (applied after enabled/preset)
    pub disabled: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
    /// File extensions picked up when walking directories
    pub extensions: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            extensions: vec!["php".to_string()],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "diff"
    pub format: Option<String>,
}

impl Config {
    /// Load config from `.tokfix.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Compute the effective set of enabled rules
    ///
    /// Precedence: `--rule` flags, then a preset (CLI before config), then
    /// `[rules] enabled`, then every rule. `[rules] disabled` applies to all
    /// but explicit `--rule` flags.
    pub fn effective_rules(
        &self,
        all_rules: &[&str],
        cli_rules: &[String],
        cli_preset: Option<&str>,
    ) -> Result<HashSet<String>> {
        // CLI rules override config completely
        if !cli_rules.is_empty() {
            return Ok(cli_rules.iter().cloned().collect());
        }

        let preset = cli_preset.or(self.rules.preset.as_deref());

        let mut rules: HashSet<String> = if let Some(name) = preset {
            let Some(preset) = Preset::from_str(name) else {
                bail!("Unknown preset '{}'. Valid options: psr2, symfony", name);
            };
            preset.rules().iter().map(|s| s.to_string()).collect()
        } else {
            match &self.rules.enabled {
                Some(enabled) => enabled.iter().cloned().collect(),
                None => all_rules.iter().map(|s| s.to_string()).collect(),
            }
        };

        // Remove disabled rules
        for disabled in &self.rules.disabled {
            rules.remove(disabled);
        }

        Ok(rules)
    }

    /// Whether a file found while walking a directory should be processed
    pub fn has_php_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.paths.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            // Try glob matching
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                // Also try matching against just the file/dir name
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // Directory patterns match any path component
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}
