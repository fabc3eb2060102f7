//! Platform-specific directory utilities
//!
//! Provides consistent directory paths across different operating systems,
//! following platform conventions for cache and data directories.

use std::path::PathBuf;

const APP_NAME: &str = "league-of-fun";

/// Get the platform-specific log directory
///
/// - macOS: `~/Library/Caches/league-of-fun/logs`
/// - Linux: `~/.cache/league-of-fun/logs` (or `$XDG_CACHE_HOME/league-of-fun/logs`)
/// - Windows: `%LOCALAPPDATA%\league-of-fun\logs`
/// - Fallback: `/tmp/league-of-fun/logs`
pub fn log_dir() -> PathBuf {
    let base_dir = directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp").join(APP_NAME));

    base_dir.join("logs")
}

/// Get the platform-specific data directory
///
/// - macOS: `~/Library/Application Support/league-of-fun`
/// - Linux: `~/.local/share/league-of-fun` (or `$XDG_DATA_HOME/league-of-fun`)
/// - Windows: `%APPDATA%\league-of-fun`
/// - Fallback: `./save_data`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}
