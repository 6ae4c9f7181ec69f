// LinkVault platform paths
// Resolves where settings and stored bookmarks live on each OS.

use std::env;
use std::path::PathBuf;

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const APP_DIR: &str = "linkvault";

#[cfg(target_os = "windows")]
fn roaming_app_data() -> PathBuf {
    PathBuf::from(
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming")),
    )
}

#[cfg(not(target_os = "windows"))]
fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Returns the directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/linkvault` or `~/.config/linkvault`
/// - **macOS**: `~/Library/Application Support/LinkVault`
/// - **Windows**: `%APPDATA%/LinkVault`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        roaming_app_data().join("LinkVault")
    }
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join("LinkVault")
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
            _ => home_dir().join(".config").join(APP_DIR),
        }
    }
}

/// Returns the directory holding the key-value files and the SQLite database.
///
/// - **Linux**: `$XDG_DATA_HOME/linkvault` or `~/.local/share/linkvault`
/// - **macOS**: `~/Library/Application Support/LinkVault/data`
/// - **Windows**: `%APPDATA%/LinkVault/data`
pub fn get_data_dir() -> PathBuf {
    #[cfg(any(target_os = "windows", target_os = "macos"))]
    {
        get_config_dir().join("data")
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        match env::var("XDG_DATA_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
            _ => home_dir().join(".local").join("share").join(APP_DIR),
        }
    }
}
