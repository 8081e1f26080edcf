// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates the .golive JSON documents with routing and storage defaults.

use serde::Serialize;
use std::fs;
use std::path::Path;

use super::{
    CONFIG_DIR, ConfigError, ENVIRONMENTS_FILE, STORAGES_FILE, default_environments,
    default_storage_map,
};

/// Write both configuration documents with their defaults, refusing to
/// overwrite existing files unless `force` is set.
pub fn init_config(project_dir: &Path, force: bool) -> Result<(), ConfigError> {
    let config_dir = project_dir.join(CONFIG_DIR);
    fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
        path: config_dir.clone(),
        source: e,
    })?;

    write_default(
        &config_dir.join(ENVIRONMENTS_FILE),
        &default_environments(),
        force,
    )?;
    write_default(
        &config_dir.join(STORAGES_FILE),
        &default_storage_map(),
        force,
    )?;

    Ok(())
}

fn write_default<T: Serialize>(path: &Path, value: &T, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    let body = serde_json::to_string_pretty(value).map_err(ConfigError::Encode)?;
    fs::write(path, body).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
