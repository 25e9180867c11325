use std::path::PathBuf;

use crate::display::SCREEN_MODE_BACKUP;

/// Environment variable overriding where the settings file is searched for
pub const SEARCH_BASE_VAR: &str = "SETTINGS_SEARCH_BASE_BATH";
/// Proton prefixes of all Steam games
pub const DEFAULT_SEARCH_BASE: &str = "~/.local/share/Steam/steamapps/compatdata";
/// The game's display settings
pub const SETTINGS_FILENAME: &str = "TASystemSettings.ini";
pub const DISPLAY_TOOL: &str = "kscreen-doctor";
pub const SEARCH_TOOL: &str = "find";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory searched recursively for the settings file
    pub search_base: PathBuf,
    pub settings_filename: String,
    /// Where both backups are kept
    pub backup_dir: PathBuf,
    pub display_tool: String,
    pub search_tool: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_base: expand_home(DEFAULT_SEARCH_BASE),
            settings_filename: SETTINGS_FILENAME.to_string(),
            backup_dir: PathBuf::from("."),
            display_tool: DISPLAY_TOOL.to_string(),
            search_tool: SEARCH_TOOL.to_string(),
        }
    }
}

impl Config {
    /// Builds the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base) = lookup(SEARCH_BASE_VAR).filter(|v| !v.is_empty()) {
            config.search_base = expand_home(&base);
        }
        config
    }

    pub fn screen_mode_backup(&self) -> PathBuf {
        self.backup_dir.join(SCREEN_MODE_BACKUP)
    }

    pub fn settings_backup(&self) -> PathBuf {
        self.backup_dir.join(format!("{}.bkp", self.settings_filename))
    }
}

/// Expands a leading `~` to the home directory
fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => {
            log::warn!("Could not determine the home directory, using {} as is", path);
            PathBuf::from(path)
        }
    }
}
