use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::mount::SerialSettings;
use crate::predict::{Observer, PredictError};
use crate::track::{FilterParams, PathError, PathWindow, RankParams};
use crate::tracker::DEFAULT_CADENCE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid station: {0}")]
    Station(#[from] PredictError),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub station: Option<StationConfig>,
    #[serde(default)]
    pub web: WebConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub mount: MountConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub pointing: PointingConfig,
    #[serde(default)]
    pub filter: FilterParams,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub tle_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    pub device: Option<String>,
    pub baud_rate: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub write_timeout: Duration,
}

impl Default for MountConfig {
    fn default() -> Self {
        let settings = SerialSettings::default();
        Self {
            device: settings.device,
            baud_rate: settings.baud_rate,
            write_timeout: settings.write_timeout,
        }
    }
}

impl MountConfig {
    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            device: self.device.clone(),
            baud_rate: self.baud_rate,
            write_timeout: self.write_timeout,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    #[serde(deserialize_with = "deserialize_duration")]
    pub cadence: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            cadence: DEFAULT_CADENCE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    #[serde(deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub step: Duration,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(90 * 60),
            step: Duration::from_secs(60),
        }
    }
}

impl PathsConfig {
    pub fn window(&self, start: DateTime<Utc>) -> Result<PathWindow, PathError> {
        PathWindow::new(start, self.duration.as_secs_f64(), self.step.as_secs_f64())
    }
}

/// Window of the look-angle preview.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PointingConfig {
    #[serde(deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub step: Duration,
}

impl Default for PointingConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(300),
            step: Duration::from_millis(500),
        }
    }
}

impl PointingConfig {
    pub fn window(&self, start: DateTime<Utc>) -> Result<PathWindow, PathError> {
        PathWindow::new(start, self.duration.as_secs_f64(), self.step.as_secs_f64())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    #[serde(deserialize_with = "deserialize_duration")]
    pub horizon: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub step: Duration,
}

impl Default for RankingConfig {
    fn default() -> Self {
        let params = RankParams::default();
        Self {
            horizon: Duration::from_secs_f64(params.horizon_s),
            step: Duration::from_secs_f64(params.step_s),
        }
    }
}

impl RankingConfig {
    pub fn params(&self) -> RankParams {
        RankParams {
            horizon_s: self.horizon.as_secs_f64(),
            step_s: self.step.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKey {
    pub key: String,
    pub name: String,
    pub permissions: HashSet<Permission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Catalog, ranking, paths, status.
    Read,
    /// Mount commands, tracker sessions, observer and path changes.
    Control,
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("mount.write_timeout", self.mount.write_timeout),
            ("tracker.cadence", self.tracker.cadence),
            ("paths.step", self.paths.step),
            ("pointing.step", self.pointing.step),
            ("ranking.step", self.ranking.step),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        Ok(())
    }

    pub fn station_name(&self) -> Option<&str> {
        self.station.as_ref()?.name.as_deref()
    }

    pub fn find_api_key(&self, key: &str) -> Option<&ApiKey> {
        self.api_keys.iter().find(|k| k.key == key)
    }

    /// Observer from the `station` section, if one is configured.
    pub fn observer(&self) -> Result<Option<Observer>, ConfigError> {
        match &self.station {
            Some(station) => Ok(Some(Observer::from_coordinates(
                &station.coordinates,
                Some(station.altitude_m),
            )?)),
            None => Ok(None),
        }
    }
}
