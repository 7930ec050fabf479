// ABOUTME: XDG Base Directory paths for the cross-platform config location
// ABOUTME: Provides the standardized location of config.toml (~/.config/vanir-bot/)

use directories::ProjectDirs;
use std::path::PathBuf;

/// Application identifier for XDG directories
const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "vanir";
const APPLICATION: &str = "vanir-bot";

/// Get XDG-compliant directories for the application
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the config directory path (e.g., ~/.config/vanir-bot/)
/// Falls back to current directory if XDG directories unavailable
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the default config file path
/// e.g., ~/.config/vanir-bot/config.toml
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
