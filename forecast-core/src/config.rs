use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Weatherbit daily forecast endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.weatherbit.io/v2.0/forecast/daily";

/// City searched automatically when the widget starts.
pub const DEFAULT_CITY: &str = "Mumbai";

const CONFIG_FILE_NAME: &str = "config.toml";

pub const API_KEY_ENV: &str = "WEATHERBIT_API_KEY";
pub const BASE_URL_ENV: &str = "FORECAST_BASE_URL";
pub const DEFAULT_CITY_ENV: &str = "FORECAST_DEFAULT_CITY";

/// Process-wide configuration, resolved once at startup and handed to the
/// provider explicitly.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Pune"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Provider API key. Absence is reported at first fetch, not at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_city")]
    pub default_city: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self { api_key: None, base_url: default_base_url(), default_city: default_city() }
    }
}

impl Config {
    /// Load the config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        Ok(Self::load_file()?.with_env(|name| std::env::var(name).ok()))
    }

    /// The settings file alone, without environment overrides.
    pub fn load_file() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    /// Where `forecast configure` keeps its settings.
    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "forecast", "forecast-cli")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or_else(|| anyhow!("No home directory to keep forecast settings in"))
    }

    /// A file that does not exist yet yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("Invalid forecast settings in {}", path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("Cannot read {}", path.display())),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Write the settings to `path`, creating missing directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }

        let text = toml::to_string_pretty(self).context("Cannot encode forecast settings")?;
        fs::write(path, text).with_context(|| format!("Cannot write {}", path.display()))
    }

    /// Overlay values from `lookup` (normally the process environment).
    /// Blank values are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = var(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(url) = var(BASE_URL_ENV) {
            self.base_url = url;
        }
        if let Some(city) = var(DEFAULT_CITY_ENV) {
            self.default_city = city;
        }
        self
    }

    /// Returns the API key, treating a blank key as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn set_default_city(&mut self, city: String) {
        self.default_city = city;
    }
}
