use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, fs, path::PathBuf};
use tracing::{debug, info};

use crate::auth::{DEFAULT_ROLE_PATTERN, DEFAULT_ROLE_PREFIX, RolePolicy};
use crate::metadata::{GroupDeriver, ResourceDescriptor};

/// Application configuration, read from `apiguard.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Pattern a role must match for tokens to be issued
    #[serde(default = "default_role_pattern")]
    pub role_pattern: String,
    /// Prefix that marks a name as a role
    #[serde(default = "default_role_prefix")]
    pub role_prefix: String,
    /// Base resource metadata, before group derivation
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
}

fn default_role_pattern() -> String {
    DEFAULT_ROLE_PATTERN.to_string()
}

fn default_role_prefix() -> String {
    DEFAULT_ROLE_PREFIX.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            role_pattern: default_role_pattern(),
            role_prefix: default_role_prefix(),
            resources: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Invalid configuration file")
    }

    pub fn role_policy(&self) -> Result<RolePolicy> {
        RolePolicy::new(&self.role_pattern, self.role_prefix.clone())
    }

    /// Configured resources with their serialization groups derived.
    pub fn derived_resources(&self) -> Result<Vec<ResourceDescriptor>> {
        Ok(GroupDeriver::derive_all(self.resources.iter().cloned())?)
    }
}

/// Locate the configuration file.
///
/// An explicit path wins, then `APIGUARD_CONFIG`, then
/// `$XDG_CONFIG_HOME/apiguard/apiguard.json`, then `./apiguard.json`.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path);
    }

    if let Ok(p) = env::var("APIGUARD_CONFIG") {
        return Some(PathBuf::from(p));
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let candidate = PathBuf::from(xdg).join("apiguard").join("apiguard.json");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    let candidate = PathBuf::from("apiguard.json");
    if candidate.exists() {
        return Some(candidate);
    }

    None
}

/// Load the configuration, falling back to defaults when no file exists.
pub fn load_config(explicit: Option<PathBuf>) -> Result<AppConfig> {
    let Some(path) = resolve_config_path(explicit) else {
        debug!("No configuration file found, using defaults");
        return Ok(AppConfig::default());
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
    let config = AppConfig::from_json(&raw)
        .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;

    info!(
        path = %path.display(),
        resources = config.resources.len(),
        "Loaded configuration"
    );

    Ok(config)
}
