use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::geocoding::Place;
use crate::error::ConfigError;

pub const GEONAMES_USERNAME_ENV: &str = "UMBRELLA_GEONAMES_USERNAME";
pub const WEATHERBIT_KEY_ENV: &str = "UMBRELLA_WEATHERBIT_KEY";

const CONFIG_FILE: &str = "config.toml";
const LOCATION_FILE: &str = "location.toml";
const LOG_FILE: &str = "umbrella.log";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("umbrella/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GeoNamesConfig {
    pub base_url: String,
    pub username: String,
    pub max_rows: u32,
}

impl Default for GeoNamesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://api.geonames.org".to_string(),
            username: String::new(),
            max_rows: 5,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WeatherbitConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for WeatherbitConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.weatherbit.io/v2.0".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MetNoConfig {
    pub base_url: String,
}

impl Default for MetNoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.met.no/weatherapi/locationforecast/2.0".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 310,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub geonames: GeoNamesConfig,
    pub weatherbit: WeatherbitConfig,
    pub metno: MetNoConfig,
    pub chart: ChartConfig,
}

impl Config {
    /// Loads `path`, falling back to defaults when the file does not exist.
    /// Credentials from the environment take precedence over the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            tracing::info!("no configuration at {}, using defaults", path.display());
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(username) = lookup(GEONAMES_USERNAME_ENV).filter(|v| !v.is_empty()) {
            self.geonames.username = username;
        }
        if let Some(key) = lookup(WEATHERBIT_KEY_ENV).filter(|v| !v.is_empty()) {
            self.weatherbit.api_key = key;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "http.timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        if self.geonames.max_rows == 0 {
            return Err(ConfigError::Invalid {
                field: "geonames.max_rows",
                message: "must be at least 1".to_string(),
            });
        }
        // room for the plot margins plus some plot area
        if self.chart.width < 200 || self.chart.height < 160 {
            return Err(ConfigError::Invalid {
                field: "chart",
                message: format!(
                    "{}x{} is too small, minimum is 200x160",
                    self.chart.width, self.chart.height
                ),
            });
        }
        Ok(())
    }
}

/// `<platform config dir>/umbrella`
pub fn default_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("umbrella"))
        .ok_or(ConfigError::NoConfigDir)
}

pub fn default_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

pub fn default_log_path(dir: &Path) -> PathBuf {
    dir.join(LOG_FILE)
}

/// Where the config, the log and the saved location live.
#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    pub config: PathBuf,
    pub log: PathBuf,
    /// Directory holding `location.toml`.
    pub state: PathBuf,
}

impl Paths {
    /// An explicit config file anchors the other files in its directory.
    /// The platform config dir is only looked up without one.
    pub fn resolve(config: Option<PathBuf>, log: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::resolve_with(config, log, default_dir)
    }

    fn resolve_with(
        config: Option<PathBuf>,
        log: Option<PathBuf>,
        default_dir: impl FnOnce() -> Result<PathBuf, ConfigError>,
    ) -> Result<Self, ConfigError> {
        let (config, state) = match config {
            Some(path) => {
                let state = path.parent().map(Path::to_path_buf).unwrap_or_default();
                (path, state)
            }
            None => {
                let dir = default_dir()?;
                (default_config_path(&dir), dir)
            }
        };
        let log = log.unwrap_or_else(|| default_log_path(&state));
        Ok(Self { config, log, state })
    }
}

#[derive(Deserialize, Serialize)]
struct SavedLocation {
    location: Place,
}

/// The last location picked, if one was saved.
pub fn load_location(dir: &Path) -> Option<Place> {
    let path = dir.join(LOCATION_FILE);
    let text = fs::read_to_string(&path).ok()?;
    match toml::from_str::<SavedLocation>(&text) {
        Ok(saved) => Some(saved.location),
        Err(e) => {
            tracing::warn!("ignoring unreadable {}: {}", path.display(), e);
            None
        }
    }
}

pub fn save_location(dir: &Path, place: &Place) -> Result<(), ConfigError> {
    let path = dir.join(LOCATION_FILE);
    let text = toml::to_string(&SavedLocation {
        location: place.clone(),
    })?;
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, text))
        .map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
}
