use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::projection::{Filter, SortMode};
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width_percent: u16,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_sort")]
    pub default_sort: String,
    #[serde(default = "default_filter")]
    pub default_filter: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_save")]
    pub save: String,
    #[serde(default = "default_toggle_complete")]
    pub toggle_complete: String,
    #[serde(default = "default_filter_next")]
    pub filter_next: String,
    #[serde(default = "default_filter_prev")]
    pub filter_prev: String,
    #[serde(default = "default_cycle_sort")]
    pub cycle_sort: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_help")]
    pub help: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_tab_bg")]
    pub tab_bg: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sidebar_width_percent: default_sidebar_width(),
            database_path: default_database_path(),
            date_format: default_date_format(),
            default_sort: default_sort(),
            default_filter: default_filter(),
            log_level: default_log_level(),
            key_bindings: KeyBindings::default(),
            current_theme: default_current_theme(),
            themes: HashMap::new(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            new: default_new(),
            edit: default_edit(),
            save: default_save(),
            toggle_complete: default_toggle_complete(),
            filter_next: default_filter_next(),
            filter_prev: default_filter_prev(),
            cycle_sort: default_cycle_sort(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            help: default_help(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            tab_bg: default_tab_bg(),
        }
    }
}

impl Theme {
    /// Get preset themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert("default".to_string(), Theme::default());

        themes.insert("dark".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "cyan".to_string(),
            highlight_fg: "black".to_string(),
            tab_bg: "darkgray".to_string(),
        });

        themes.insert("light".to_string(), Theme {
            fg: "black".to_string(),
            bg: "white".to_string(),
            highlight_bg: "blue".to_string(),
            highlight_fg: "white".to_string(),
            tab_bg: "gray".to_string(),
        });

        themes
    }
}

// Default value functions
fn default_sidebar_width() -> u16 {
    35
}

fn default_database_path() -> String {
    Config::default_database_path_for_profile(utils::Profile::Prod)
}

fn default_date_format() -> String {
    "%-d. %-m. %Y".to_string()
}

fn default_sort() -> String {
    SortMode::default().to_string()
}

fn default_filter() -> String {
    Filter::default().to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_save() -> String {
    "Ctrl+s".to_string()
}

fn default_toggle_complete() -> String {
    "Space".to_string()
}

fn default_filter_next() -> String {
    "f".to_string()
}

fn default_filter_prev() -> String {
    "F".to_string()
}

fn default_cycle_sort() -> String {
    "s".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_current_theme() -> String {
    "default".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_tab_bg() -> String {
    "gray".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

impl Config {
    /// Load configuration from file, or create default if missing
    /// Uses the provided profile to determine config and database paths
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;

        if config_path.exists() {
            let mut config = Self::load_from_path(&config_path)?;
            if config.database_path.trim().is_empty() {
                config.database_path = Self::default_database_path_for_profile(profile);
            }
            Ok(config)
        } else {
            let mut config = Config {
                database_path: Self::default_database_path_for_profile(profile),
                ..Config::default()
            };
            config.save_to_path(&config_path)?;
            Ok(config)
        }
    }

    /// Load an explicit config file; missing keys take their defaults
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the profile's config file
    pub fn save_with_profile(&mut self, profile: utils::Profile) -> Result<(), ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to_path(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default database path for a specific profile
    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        match utils::get_data_dir(profile) {
            Some(data_dir) => data_dir.join("tasks.db").to_string_lossy().to_string(),
            None => format!("~/.local/share/{}/tasks.db", profile.app_name()),
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Filter selected at startup
    pub fn initial_filter(&self) -> Result<Filter, ConfigError> {
        self.default_filter
            .parse()
            .map_err(|message| ConfigError::InvalidValue { key: "default_filter", message })
    }

    /// Sort mode selected at startup
    pub fn initial_sort(&self) -> Result<SortMode, ConfigError> {
        self.default_sort
            .parse()
            .map_err(|message| ConfigError::InvalidValue { key: "default_sort", message })
    }

    /// Get the currently active theme
    /// If highlight_fg is not set (empty string), it will be calculated from highlight_bg
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::widgets::color::{format_color_for_display, get_contrast_text_color, parse_color};

        let mut theme = if let Some(theme) = self.themes.get(&self.current_theme) {
            theme.clone()
        } else if let Some(theme) = Theme::get_preset_themes().get(&self.current_theme) {
            theme.clone()
        } else {
            Theme::default()
        };

        if theme.highlight_fg.is_empty() {
            let highlight_bg_color = parse_color(&theme.highlight_bg);
            let calculated_fg = get_contrast_text_color(highlight_bg_color);
            theme.highlight_fg = format_color_for_display(&calculated_fg);
        }

        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.date_format, "%-d. %-m. %Y");
        assert_eq!(parsed.default_sort, "default");
        assert_eq!(parsed.default_filter, "all");
        assert_eq!(parsed.log_level, "info");
        assert_eq!(parsed.key_bindings.toggle_complete, "Space");
        assert_eq!(parsed.key_bindings.save, "Ctrl+s");
        assert_eq!(parsed.config_version, Some(CURRENT_CONFIG_VERSION));
    }

    #[test]
    fn missing_keys_take_defaults() {
        let parsed: Config = toml::from_str("default_sort = \"time\"\n[key_bindings]\nquit = \"x\"\n").unwrap();
        assert_eq!(parsed.initial_sort().unwrap(), SortMode::Time);
        assert_eq!(parsed.initial_filter().unwrap(), Filter::All);
        assert_eq!(parsed.key_bindings.quit, "x");
        assert_eq!(parsed.key_bindings.new, "n");
        assert_eq!(parsed.sidebar_width_percent, 35);
    }

    #[test]
    fn invalid_view_defaults_are_reported() {
        let config = Config {
            default_filter: "chores".to_string(),
            default_sort: "random".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.initial_filter(),
            Err(ConfigError::InvalidValue { key: "default_filter", .. })
        ));
        assert!(matches!(
            config.initial_sort(),
            Err(ConfigError::InvalidValue { key: "default_sort", .. })
        ));
    }

    #[test]
    fn save_and_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config {
            database_path: "/tmp/custom.db".to_string(),
            current_theme: "light".to_string(),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.database_path, "/tmp/custom.db");
        assert_eq!(loaded.get_database_path(), PathBuf::from("/tmp/custom.db"));
        assert_eq!(loaded.current_theme, "light");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_level = [").unwrap();
        assert!(matches!(Config::load_from_path(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn active_theme_resolution() {
        let mut config = Config::default();
        assert_eq!(config.get_active_theme(), Theme::default());

        config.current_theme = "dark".to_string();
        assert_eq!(config.get_active_theme().highlight_bg, "cyan");

        config.current_theme = "mine".to_string();
        config.themes.insert("mine".to_string(), Theme {
            highlight_bg: "white".to_string(),
            highlight_fg: String::new(),
            ..Theme::default()
        });
        // Empty highlight_fg is derived from the background
        assert_eq!(config.get_active_theme().highlight_fg, "black");

        config.current_theme = "missing".to_string();
        assert_eq!(config.get_active_theme(), Theme::default());
    }
}
