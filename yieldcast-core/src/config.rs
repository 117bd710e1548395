//! Configuration system for Yieldcast.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from the user config directory and/or `.yieldcast/config.toml`
//! in the workspace directory.

use crate::error::YieldError;
use crate::summary::CropGrouping;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `YIELDCAST_DATA__OBSERVATIONS_PATH`.
pub const ENV_PREFIX: &str = "YIELDCAST_";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YieldConfig {
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub python: PythonConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub regions: RegionsConfig,
}

/// Fitted model artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// The model's input columns in fitted order (`.json` list or pickled list).
    #[serde(default = "default_schema_path")]
    pub schema_path: PathBuf,
    /// Model artifact (`.json` linear model or `.pkl`/`.joblib`).
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            schema_path: default_schema_path(),
            model_path: default_model_path(),
        }
    }
}

fn default_schema_path() -> PathBuf {
    PathBuf::from("model_input_columns.pkl")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("crop_yield_model.pkl")
}

/// Python runtime configuration for pickled artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PythonConfig {
    /// Path to Python executable (`python3` if not set).
    #[serde(default)]
    pub python_path: Option<PathBuf>,
    /// Virtual environment; takes precedence over `python_path`.
    #[serde(default)]
    pub venv_path: Option<PathBuf>,
    /// Timeout for one Python script run (seconds).
    #[serde(default = "default_python_timeout")]
    pub timeout_secs: u64,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            python_path: None,
            venv_path: None,
            timeout_secs: default_python_timeout(),
        }
    }
}

fn default_python_timeout() -> u64 {
    300
}

impl PythonConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the effective Python command (accounting for venv).
    pub fn python_command(&self) -> PathBuf {
        if let Some(venv) = &self.venv_path {
            let bin_dir = if cfg!(windows) { "Scripts" } else { "bin" };
            venv.join(bin_dir).join("python")
        } else {
            self.python_path
                .clone()
                .unwrap_or_else(|| PathBuf::from("python3"))
        }
    }
}

/// Historical observation table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_observations_path")]
    pub observations_path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_region_column")]
    pub region_column: String,
    #[serde(default = "default_crop_column")]
    pub crop_column: String,
    #[serde(default = "default_yield_column")]
    pub yield_column: String,
    /// How stored crop labels that differ only by case are grouped.
    #[serde(default)]
    pub crop_grouping: CropGrouping,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            observations_path: default_observations_path(),
            delimiter: default_delimiter(),
            region_column: default_region_column(),
            crop_column: default_crop_column(),
            yield_column: default_yield_column(),
            crop_grouping: CropGrouping::default(),
        }
    }
}

fn default_observations_path() -> PathBuf {
    PathBuf::from("data/cleaned.csv")
}

fn default_delimiter() -> char {
    ','
}

fn default_region_column() -> String {
    "State Name".to_string()
}

fn default_crop_column() -> String {
    "Crop".to_string()
}

fn default_yield_column() -> String {
    "yield".to_string()
}

/// Region boundary geometry (the authoritative region list).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionsConfig {
    #[serde(default = "default_geometry_path")]
    pub geometry_path: PathBuf,
    /// Feature property holding the region name.
    #[serde(default = "default_name_property")]
    pub name_property: String,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            geometry_path: default_geometry_path(),
            name_property: default_name_property(),
        }
    }
}

fn default_geometry_path() -> PathBuf {
    PathBuf::from("india_states.json")
}

fn default_name_property() -> String {
    "name".to_string()
}

impl YieldConfig {
    /// Resolve every relative path against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.artifacts.schema_path,
            &mut self.artifacts.model_path,
            &mut self.data.observations_path,
            &mut self.regions.geometry_path,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    pub fn to_toml(&self) -> Result<String, YieldError> {
        toml::to_string_pretty(self).map_err(|e| YieldError::config(e.to_string()))
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "yieldcast", "yieldcast")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Workspace-level config file location.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".yieldcast").join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `YIELDCAST_`)
/// 3. Workspace-local config (`.yieldcast/config.toml`)
/// 4. User config
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&YieldConfig>,
) -> Result<YieldConfig, YieldError> {
    load_config_with_file(workspace, None, overrides)
}

/// Like [`load_config`], with an explicit config file merged above the
/// environment. Only the keys the file sets take effect; a missing file is an error.
pub fn load_config_with_file(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
    overrides: Option<&YieldConfig>,
) -> Result<YieldConfig, YieldError> {
    let mut figment = Figment::from(Serialized::defaults(YieldConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // YIELDCAST_DATA__OBSERVATIONS_PATH, YIELDCAST_REGIONS__NAME_PROPERTY, etc.
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if let Some(file) = config_file {
        if !file.exists() {
            return Err(YieldError::config(format!(
                "config file not found: {}",
                file.display()
            )));
        }
        figment = figment.merge(Toml::file(file));
    }

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment
        .extract()
        .map_err(|e| YieldError::config(e.to_string()))
}

/// Check whether a config file exists at either the user or workspace level.
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if user_config_path().is_some_and(|p| p.exists()) {
        return true;
    }
    workspace.is_some_and(|ws| workspace_config_path(ws).exists())
}
