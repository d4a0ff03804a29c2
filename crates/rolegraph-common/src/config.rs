//! ---
//! rg_section: "01-common"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Shared configuration and tracing primitives."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LogFormat;

fn default_true() -> bool {
    true
}

fn default_max_hierarchy_depth() -> usize {
    10
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Engine configuration, usually read from `rolegraph.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rebuild the role graph after every grouping mutation.
    #[serde(default = "default_true")]
    pub auto_build_role_links: bool,
    /// Mirror mutations to the attached adapter.
    #[serde(default = "default_true")]
    pub auto_save: bool,
    #[serde(default)]
    pub role_manager: RoleManagerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`EngineConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedEngineConfig {
    pub config: EngineConfig,
    pub source: PathBuf,
}

impl EngineConfig {
    pub const ENV_CONFIG_PATH: &'static str = "ROLEGRAPH_CONFIG";

    /// Load configuration from disk, respecting the `ROLEGRAPH_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedEngineConfig> {
        let env_override = std::env::var(Self::ENV_CONFIG_PATH).ok();
        Self::resolve(env_override.as_deref(), candidates)
    }

    fn resolve<P: AsRef<Path>>(
        env_override: Option<&str>,
        candidates: &[P],
    ) -> Result<LoadedEngineConfig> {
        if let Some(env_path) = env_override.filter(|path| !path.trim().is_empty()) {
            let path = PathBuf::from(env_path);
            let config = Self::from_path(&path)?;
            return Ok(LoadedEngineConfig {
                config,
                source: path,
            });
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(LoadedEngineConfig {
                    config,
                    source: path.to_path_buf(),
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse()
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.role_manager.max_hierarchy_depth == 0 {
            return Err(anyhow!("role_manager.max_hierarchy_depth must be at least 1"));
        }
        if let Some(rule_file) = &self.storage.rule_file {
            if rule_file.as_os_str().is_empty() {
                return Err(anyhow!("storage.rule_file must not be empty when set"));
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_build_role_links: true,
            auto_save: true,
            role_manager: RoleManagerConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl std::str::FromStr for EngineConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: EngineConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Role hierarchy resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleManagerConfig {
    /// Hop ceiling for role and user closure queries.
    #[serde(default = "default_max_hierarchy_depth")]
    pub max_hierarchy_depth: usize,
}

impl Default for RoleManagerConfig {
    fn default() -> Self {
        Self {
            max_hierarchy_depth: default_max_hierarchy_depth(),
        }
    }
}

/// Where rules are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// CSV rule file for the file adapter.
    #[serde(default)]
    pub rule_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Also write JSON logs to a daily rolling file under `directory`.
    #[serde(default)]
    pub file_output: bool,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_output: false,
            file_prefix: None,
        }
    }
}
