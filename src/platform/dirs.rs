// Platform-specific config and data directories.
//
// Linux:   $XDG_CONFIG_HOME/tabspaces, $XDG_DATA_HOME/tabspaces
// macOS:   ~/Library/Application Support/Tabspaces
// Windows: %APPDATA%/Tabspaces

use std::env;
use std::path::PathBuf;

/// Overrides the data directory on every platform.
pub const DATA_DIR_ENV: &str = "TABSPACES_DATA_DIR";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

#[cfg(target_os = "linux")]
fn base_dir(xdg_var: &str, fallback: &[&str]) -> PathBuf {
    if let Ok(xdg) = env::var(xdg_var) {
        return PathBuf::from(xdg).join("tabspaces");
    }
    let mut path = home_dir();
    for part in fallback {
        path = path.join(part);
    }
    path.join("tabspaces")
}

/// Returns the configuration directory, where `settings.json` lives.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        base_dir("XDG_CONFIG_HOME", &[".config"])
    }
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join("Tabspaces")
    }
    #[cfg(target_os = "windows")]
    {
        match env::var("APPDATA") {
            Ok(appdata) => PathBuf::from(appdata).join("Tabspaces"),
            Err(_) => home_dir().join("AppData").join("Roaming").join("Tabspaces"),
        }
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        home_dir().join(".tabspaces")
    }
}

/// Returns the data directory, where the snapshot database lives.
///
/// `TABSPACES_DATA_DIR` takes precedence when set.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    #[cfg(target_os = "linux")]
    {
        base_dir("XDG_DATA_HOME", &[".local", "share"])
    }
    #[cfg(not(target_os = "linux"))]
    {
        get_config_dir()
    }
}
