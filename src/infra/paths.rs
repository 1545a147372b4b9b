// src/infra/paths.rs — Config/data path management
//
// MEMCHAT_HOME overrides everything. When unset, config and the
// key-value store live under ~/.memchat/.

use std::path::PathBuf;

/// Returns the MEMCHAT_HOME override, if set.
fn memchat_home() -> Option<PathBuf> {
    std::env::var_os("MEMCHAT_HOME").map(PathBuf::from)
}

/// Configuration directory: $MEMCHAT_HOME/ or ~/.memchat/
pub fn config_dir() -> PathBuf {
    if let Some(home) = memchat_home() {
        return home;
    }
    dirs_home().join(".memchat")
}

/// Home directory, falling back to the working directory when the
/// platform cannot report one.
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default location of the durable key-value store (token, incognito flag).
pub fn storage_file_path() -> PathBuf {
    config_dir().join("storage.json")
}
