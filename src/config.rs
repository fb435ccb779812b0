//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/arborgraph/arborgraph.toml`
//! 3. Explicit config file passed on the command line (`--config`)
//! 4. Environment variables: `ARBORGRAPH_*` prefix, `__` between section and key

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

pub const ENV_PREFIX: &str = "ARBORGRAPH";

/// Tree construction settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TreeSettings {
    /// At most one node per identifier
    pub unique: bool,
}

/// Guards for the searches whose cost grows fastest.
///
/// `None` leaves the search unbounded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Limits {
    pub hamiltonian_max_steps: Option<usize>,
    pub directed_bridge_max_edges: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTreeSettings {
    unique: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLimits {
    hamiltonian_max_steps: Option<usize>,
    directed_bridge_max_edges: Option<usize>,
}

/// Raw settings for intermediate parsing; `None` means "not specified".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    tree: RawTreeSettings,
    limits: RawLimits,
}

/// Unified configuration for arborgraph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub tree: TreeSettings,
    pub limits: Limits,
}

/// Get the XDG config directory for arborgraph.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "arborgraph").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("arborgraph.toml"))
}

fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            tree: TreeSettings {
                unique: overlay.tree.unique.unwrap_or(self.tree.unique),
            },
            limits: Limits {
                hamiltonian_max_steps: overlay
                    .limits
                    .hamiltonian_max_steps
                    .or(self.limits.hamiltonian_max_steps),
                directed_bridge_max_edges: overlay
                    .limits
                    .directed_bridge_max_edges
                    .or(self.limits.directed_bridge_max_edges),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// A missing global file is skipped; a missing `explicit` file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading explicit config");
            current = current.merge_with(&load_raw_settings(path)?);
        }

        Self::apply_env_overrides(current, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    /// Apply `ARBORGRAPH_*` variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("tree.unique") {
            settings.tree.unique = val;
        }
        if let Ok(val) = config.get::<usize>("limits.hamiltonian_max_steps") {
            settings.limits.hamiltonian_max_steps = Some(val);
        }
        if let Ok(val) = config.get::<usize>("limits.directed_bridge_max_edges") {
            settings.limits.directed_bridge_max_edges = Some(val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# arborgraph configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/arborgraph/arborgraph.toml
#   Explicit: arborgraph --config <file>
#   Env:      ARBORGRAPH_* environment variables, e.g. ARBORGRAPH_TREE__UNIQUE=true

[tree]
# Keep at most one node per identifier; re-inserting an identifier replaces it
# unique = false

[limits]
# Abort the Hamiltonian cycle search after this many extension steps
# hamiltonian_max_steps = 1000000

# Refuse the directed bridge search on graphs with more edges than this
# directed_bridge_max_edges = 10000
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
