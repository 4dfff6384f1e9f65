//! Configuration for the motion sensor agent.

use crate::collector::DEFAULT_ADDRESS;
use crate::core::DEFAULT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of deltas in the change-rate window.
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

/// Main configuration for the sensor agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Which bus and device to sample
    pub sensor: SensorConfig,

    /// Time between two sensor reads
    #[serde(with = "duration_millis")]
    pub sample_interval: Duration,

    /// Number of change-rate values averaged
    pub window_capacity: usize,

    /// Mean change rate above which the device is RUN
    pub threshold: f64,

    /// Log file receiving one line per sample
    pub output_path: PathBuf,

    /// Path for storing session statistics
    pub data_path: PathBuf,

    /// Whether sampling is currently paused
    pub paused: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("motion-sensor-agent");

        Self {
            sensor: SensorConfig::default(),
            sample_interval: Duration::from_millis(100),
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            threshold: DEFAULT_THRESHOLD,
            output_path: data_dir.join("accel.csv"),
            data_path: data_dir,
            paused: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from JSON text.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("motion-sensor-agent")
            .join("config.json")
    }

    /// Path of the persisted session statistics.
    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("session_stats.json")
    }

    /// Reject values the sampling loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_capacity == 0 {
            return Err(ConfigError::Invalid(
                "window_capacity must be at least 1".to_string(),
            ));
        }
        if self.sample_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "sample_interval must be positive".to_string(),
            ));
        }
        if !self.threshold.is_finite() {
            return Err(ConfigError::Invalid("threshold must be finite".to_string()));
        }
        Ok(())
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        if let Some(parent) = self.output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }
        Ok(())
    }
}

/// Bus and device selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// i2c-dev character device
    pub bus_path: PathBuf,
    /// 7-bit slave address
    pub address: u8,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            bus_path: PathBuf::from("/dev/i2c-3"),
            address: DEFAULT_ADDRESS,
        }
    }
}

impl SensorConfig {
    /// Parse an address written as `0x19`, `19h` or decimal `25`.
    pub fn parse_address(s: &str) -> Result<u8, ConfigError> {
        let s = s.trim();
        let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u8::from_str_radix(hex, 16)
        } else if let Some(hex) = s.strip_suffix('h') {
            u8::from_str_radix(hex, 16)
        } else {
            s.parse::<u8>()
        };

        match parsed {
            Ok(address) if address <= 0x7F => Ok(address),
            Ok(address) => Err(ConfigError::Invalid(format!(
                "I2C address 0x{address:02X} is not a 7-bit address"
            ))),
            Err(e) => Err(ConfigError::Invalid(format!("invalid I2C address {s:?}: {e}"))),
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration as whole milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sample_interval, Duration::from_millis(100));
        assert_eq!(config.window_capacity, 100);
        assert_eq!(config.threshold, 0.07);
        assert_eq!(config.sensor.address, 0x19);
        assert_eq!(config.sensor.bus_path, PathBuf::from("/dev/i2c-3"));
        assert!(!config.paused);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_interval_serialized_as_millis() {
        let config = Config::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["sample_interval"], 100);

        let text = json.to_string().replace("\"sample_interval\":100", "\"sample_interval\":250");
        let parsed = Config::from_json(&text).unwrap();
        assert_eq!(parsed.sample_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.window_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.sample_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(SensorConfig::parse_address("0x19").unwrap(), 0x19);
        assert_eq!(SensorConfig::parse_address("18h").unwrap(), 0x18);
        assert_eq!(SensorConfig::parse_address("25").unwrap(), 25);
        assert!(SensorConfig::parse_address("0x80").is_err());
        assert!(SensorConfig::parse_address("nope").is_err());
    }

    #[test]
    fn test_parse_error_on_bad_json() {
        assert!(matches!(
            Config::from_json("{not json"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
