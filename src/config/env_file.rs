// ABOUTME: Minimal dotenv-style reader for the shared environment config.
// ABOUTME: Used to look up APP_KEY and APP_URL without sourcing a shell.

use std::fs;
use std::io;
use std::path::Path;

/// Read a single variable from a dotenv-style file.
///
/// Later assignments win, matching shell `source` semantics. Surrounding
/// single or double quotes are stripped from the value.
pub fn read_env_var(path: &Path, key: &str) -> io::Result<Option<String>> {
    let content = fs::read_to_string(path)?;
    let mut found = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        if let Some((name, value)) = line.split_once('=')
            && name.trim() == key
        {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            found = Some(value.to_string());
        }
    }

    Ok(found)
}
