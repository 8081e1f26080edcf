// ABOUTME: Persisted JSON configuration: environment routing and storage path maps.
// ABOUTME: Files are bootstrapped with defaults on first use, never merged or repaired.

mod env_file;
mod init;

pub use env_file::read_env_var;
pub use init::init_config;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_DIR: &str = ".golive";
pub const ENVIRONMENTS_FILE: &str = "environments.json";
pub const STORAGES_FILE: &str = "storages.json";

/// Reserved routing key used when the resolved ref is a semver tag.
pub const TAGGED_KEY: &str = "_tagged";

/// Parse guard against hostile or corrupt input.
const MAX_JSON_DEPTH: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not encode configuration defaults: {0}")]
    Encode(serde_json::Error),

    #[error("configuration file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

/// Where a branch (or tagged) deploy routes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,

    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default = "default_env")]
    pub env: String,
}

fn default_domain() -> String {
    "example.com".to_string()
}

fn default_env() -> String {
    "production".to_string()
}

/// Branch name (or `_tagged`) to environment descriptor.
pub type EnvironmentMap = BTreeMap<String, EnvironmentConfig>;

/// Release-relative path to storage-root-relative name.
pub type StorageMap = BTreeMap<String, String>;

pub fn default_environments() -> EnvironmentMap {
    BTreeMap::from([
        (
            "master".to_string(),
            EnvironmentConfig {
                name: "testing".to_string(),
                domain: "testing.example.com".to_string(),
                env: "local".to_string(),
            },
        ),
        (
            "stable".to_string(),
            EnvironmentConfig {
                name: "acceptance".to_string(),
                domain: "acceptance.example.com".to_string(),
                env: "production".to_string(),
            },
        ),
        (
            TAGGED_KEY.to_string(),
            EnvironmentConfig {
                name: "production".to_string(),
                domain: "production.example.com".to_string(),
                env: "production".to_string(),
            },
        ),
    ])
}

pub fn default_storage_map() -> StorageMap {
    BTreeMap::from([
        ("/assets".to_string(), "assets".to_string()),
        ("/content".to_string(), "content".to_string()),
        ("/public/assets".to_string(), "public-assets".to_string()),
        (
            "/public/glide-img/containers".to_string(),
            "public-glide-containers".to_string(),
        ),
        (
            "/public/glide-img/paths".to_string(),
            "public-glide-paths".to_string(),
        ),
        ("/storage".to_string(), "framework".to_string()),
    ])
}

/// Load a persisted JSON document, writing `default` first when the file
/// does not exist.
///
/// An existing file short-circuits generation entirely: a malformed or
/// partial file is reported as corrupt, never auto-repaired.
pub fn load_or_bootstrap<T>(path: &Path, default: &T) -> Result<T, ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let body = serde_json::to_string_pretty(default).map_err(ConfigError::Encode)?;
        fs::write(path, body).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    if max_json_depth(&content) > MAX_JSON_DEPTH {
        return Err(ConfigError::Corrupt {
            path: path.to_path_buf(),
            reason: format!("nesting exceeds {MAX_JSON_DEPTH} levels"),
        });
    }

    serde_json::from_str(&content).map_err(|e| ConfigError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load (bootstrapping when absent) both persisted documents for a project.
pub fn load_project_config(
    project_dir: &Path,
) -> Result<(EnvironmentMap, StorageMap), ConfigError> {
    let config_dir = project_dir.join(CONFIG_DIR);
    let environments = load_or_bootstrap(
        &config_dir.join(ENVIRONMENTS_FILE),
        &default_environments(),
    )?;
    let storages = load_or_bootstrap(&config_dir.join(STORAGES_FILE), &default_storage_map())?;
    Ok((environments, storages))
}

/// Maximum brace/bracket nesting depth of a JSON document, ignoring
/// structural characters inside strings.
fn max_json_depth(text: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => {
                depth += 1;
                max = max.max(depth);
            }
            '}' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    max
}
