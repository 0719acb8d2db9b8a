use std::fs;
use std::path::Path;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::query_state::{QueryDefaults, SortDirection};

pub static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub bookdesk: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const BOOKDESK_LEVEL: &str = "info";

    fn default() -> Self {
        LoggingConfig {
            bookdesk: Self::BOOKDESK_LEVEL.to_string(),
        }
    }

    fn ensure_valid(&mut self) {
        let str_original = self.bookdesk.clone();
        self.bookdesk = self.bookdesk.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&self.bookdesk.as_str()) {
            eprintln!(
                "Config error: bookdesk log level of '{}' is invalid - using default of '{}'",
                str_original,
                Self::BOOKDESK_LEVEL
            );
            self.bookdesk = Self::BOOKDESK_LEVEL.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdminConfig {
    pub base_url: String,
    pub listing_path: String,
    pub bulk_action_path: String,
}

impl AdminConfig {
    const BASE_URL: &str = "http://localhost:8080";

    fn default() -> Self {
        AdminConfig {
            base_url: Self::BASE_URL.to_string(),
            listing_path: "/admin/kitaplar".to_string(),
            bulk_action_path: "/admin/bulk-action".to_string(),
        }
    }

    fn ensure_valid(&mut self) {
        if reqwest::Url::parse(&self.base_url).is_err() {
            eprintln!(
                "Config error: base_url of '{}' is invalid - using default of '{}'",
                self.base_url,
                Self::BASE_URL
            );
            self.base_url = Self::BASE_URL.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UiConfig {
    pub search_debounce_ms: u64,
    pub page_size: u32,
    pub sort_field: String,
    pub sort_direction: String,
    pub reload_delay_ms: u64,
    pub alert_timeout_ms: u64,
    pub toast_timeout_ms: u64,
    pub export_format: String,
    pub dev_hosts: Vec<String>,
}

impl UiConfig {
    const SORT_DIRECTION: &str = "desc";

    fn default() -> Self {
        UiConfig {
            search_debounce_ms: 300,
            page_size: 10,
            sort_field: "id".to_string(),
            sort_direction: Self::SORT_DIRECTION.to_string(),
            reload_delay_ms: 1000,
            alert_timeout_ms: 5000,
            toast_timeout_ms: 3000,
            export_format: "excel".to_string(),
            dev_hosts: vec!["localhost".to_string()],
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }

    pub fn alert_timeout(&self) -> Duration {
        Duration::from_millis(self.alert_timeout_ms)
    }

    pub fn toast_timeout(&self) -> Duration {
        Duration::from_millis(self.toast_timeout_ms)
    }

    pub fn query_defaults(&self) -> QueryDefaults {
        QueryDefaults {
            page_size: self.page_size,
            sort_field: self.sort_field.clone(),
            // ensure_valid guarantees this parses
            sort_direction: self
                .sort_direction
                .parse::<SortDirection>()
                .unwrap_or(SortDirection::Descending),
        }
    }

    fn ensure_valid(&mut self) {
        if self.page_size == 0 {
            eprintln!("Config error: page_size must be at least 1 - using 1");
            self.page_size = 1;
        }

        if self.sort_field.trim().is_empty() {
            eprintln!("Config error: sort_field is empty - using default of 'id'");
            self.sort_field = "id".to_owned();
        }

        let str_original = self.sort_direction.clone();
        self.sort_direction = self.sort_direction.trim().to_ascii_lowercase();
        if self.sort_direction.parse::<SortDirection>().is_err() {
            eprintln!(
                "Config error: sort_direction of '{}' is invalid - using default of '{}'",
                str_original,
                Self::SORT_DIRECTION
            );
            self.sort_direction = Self::SORT_DIRECTION.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging: LoggingConfig::default(),
            admin: AdminConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file located in the app's data directory,
    /// overlaid with `BOOKDESK_` environment variables (`__` separates sections).
    /// If the file is missing or fails to parse, defaults are used.
    /// Additionally, writes the default config to disk if no file exists.
    pub fn load_config(project_dirs: &ProjectDirs) -> Self {
        let config_path = project_dirs.data_local_dir().join("config.toml");
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Self {
        let default_config = Config::default();

        // If the config file doesn't exist, write the default configuration to disk.
        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    eprintln!(
                        "Failed to create configuration directory {}: {}",
                        parent.display(),
                        e
                    );
                }
            }
            if let Ok(toml_string) = toml::to_string_pretty(&default_config) {
                if let Err(e) = fs::write(config_path, toml_string) {
                    eprintln!(
                        "Failed to write default config to {}: {}",
                        config_path.display(),
                        e
                    );
                }
            } else {
                eprintln!("Failed to serialize default config.");
            }
        }

        let figment = Figment::from(Serialized::defaults(default_config.clone()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("BOOKDESK_").split("__"));

        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load config file {}: {}. Using default configuration.",
                config_path.display(),
                err
            );
            default_config
        });

        config.ensure_valid();

        config
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
        self.admin.ensure_valid();
        self.ui.ensure_valid();
    }
}
