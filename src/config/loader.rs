//! Configuration Loader
//!
//! Figment-based resolution: built-in defaults, then the global file under
//! the user config directory, then the project file in the working
//! directory, then `PAPERLENS_*` environment variables. Later sources win.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::types::{PaperLensError, Result};

const PROJECT_FILE: &str = "paperlens.toml";
const ENV_PREFIX: &str = "PAPERLENS_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve the effective configuration from every source
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        for path in [Self::global_config_path(), Some(Self::project_config_path())]
            .into_iter()
            .flatten()
        {
            if path.exists() {
                debug!(path = %path.display(), "Merging config file");
                figment = figment.merge(Toml::file(&path));
            }
        }

        // PAPERLENS_LLM_MODEL -> llm.model, and so on
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split('_').lowercase(true));

        let config = extract(figment)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from one file on top of the defaults, ignoring the usual chain
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config = extract(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(path)),
        )?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Per-user config directory, honoring XDG_CONFIG_HOME
    pub fn global_dir() -> Option<PathBuf> {
        let base = env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("paperlens"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_config_path() -> PathBuf {
        PathBuf::from(PROJECT_FILE)
    }

    // =========================================================================
    // Config Subcommands
    // =========================================================================

    /// Print the config file locations and whether each exists
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        match Self::global_config_path() {
            Some(global) => println!("  Global:  {} {}", marker(&global), global.display()),
            None => println!("  Global:  (not available)"),
        }

        let project = Self::project_config_path();
        println!("  Project: {} {}", marker(&project), project.display());
    }

    /// Print the effective merged configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;
        let rendered = if as_json {
            serde_json::to_string_pretty(&config)?
        } else {
            toml::to_string_pretty(&config).map_err(|e| PaperLensError::Config(e.to_string()))?
        };
        println!("{}", rendered);
        Ok(())
    }

    /// Write a default config file, refusing to clobber without `force`
    pub fn init(global: bool, force: bool) -> Result<PathBuf> {
        let path = if global {
            Self::global_config_path().ok_or_else(|| {
                PaperLensError::Config("Cannot determine global config path".to_string())
            })?
        } else {
            Self::project_config_path()
        };

        if path.exists() && !force {
            return Err(PaperLensError::Config(format!(
                "Config already exists: {} (use --force to overwrite)",
                path.display()
            )));
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(&Config::default())
            .map_err(|e| PaperLensError::Config(e.to_string()))?;
        fs::write(&path, contents)?;

        Ok(path)
    }
}

fn extract(figment: Figment) -> Result<Config> {
    figment
        .extract()
        .map_err(|e| PaperLensError::Config(format!("Configuration error: {}", e)))
}

fn marker(path: &Path) -> &'static str {
    if path.exists() { "✓" } else { "✗" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "[batch]\nconcurrency = 4\n\n[cost]\ninput_rate_per_1k = 0.002\n"
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.batch.concurrency, 4);
        assert!((config.cost.input_rate_per_1k - 0.002).abs() < 1e-12);
        // Untouched sections keep defaults
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[retry]\nmax_attempts = 0\n").unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config =
            ConfigLoader::load_from_file(Path::new("/nonexistent/paperlens.toml")).unwrap();
        assert_eq!(config.batch.concurrency, 1);
    }
}
