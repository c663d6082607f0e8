use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CliConfig {
    /// Treat CGB-capable ROMs as DMG-only.
    pub force_dmg: bool,
    /// Emulate the MBC1 64-bank multicart wiring when the header fits.
    pub multicart_compat: bool,
    /// `;`-separated Game Genie codes applied after load.
    pub cheats: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("gbmapper").join("config.toml");
        }
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("gbmapper").join("config.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("gbmapper")
            .join("config.toml");
    }

    PathBuf::from("config.toml")
}

pub fn load_from_file(path: &Path) -> CliConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return CliConfig::default(),
    };

    match toml::from_str::<CliConfig>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse config {}: {e}; using defaults",
                path.display()
            );
            CliConfig::default()
        }
    }
}
