//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `homesim.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use homesim_adapter_virtual::WeatherSettings;
use homesim_app::jitter::Jitter;
use homesim_app::services::device_service::InitialDevices;
use homesim_domain::device::{DeviceKey, DeviceState};
use homesim_domain::estimator::EstimatorPolicy;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Aggregation session settings.
    pub thermometer: ThermometerConfig,
    /// Weather station settings.
    pub weather: WeatherConfig,
    /// Devices present at startup.
    pub devices: DevicesConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThermometerConfig {
    /// Room temperature before any event arrives.
    pub initial_temperature: f64,
    /// Mean period of the subscribed re-emission, in milliseconds.
    pub frequency_ms: u64,
    /// Uniform spread around the period, as a fraction of it.
    pub jitter: f64,
    /// Notifications buffered per listener before it starts lagging.
    pub bus_capacity: usize,
    pub policy: EstimatorPolicy,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub enabled: bool,
    pub mean: f64,
    pub amplitude: f64,
    pub frequency_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    /// Number of windows, numbered from 1.
    pub windows: u32,
    pub door: DeviceState,
    pub heatpump_state: DeviceState,
    pub heatpump_temperature: f64,
}

impl Config {
    /// Load configuration from `homesim.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("homesim.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("HOMESIM_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("HOMESIM_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("HOMESIM_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("HOMESIM_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(temperature) =
            var("HOMESIM_INITIAL_TEMPERATURE").and_then(|val| val.parse().ok())
        {
            self.thermometer.initial_temperature = temperature;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.thermometer.frequency_ms == 0 || self.weather.frequency_ms == 0 {
            return Err(ConfigError::Validation(
                "frequency_ms must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.thermometer.jitter) {
            return Err(ConfigError::Validation(
                "thermometer.jitter must be within [0, 1)".to_string(),
            ));
        }
        if self.thermometer.bus_capacity == 0 {
            return Err(ConfigError::Validation(
                "thermometer.bus_capacity must be positive".to_string(),
            ));
        }
        let temperatures = [
            ("thermometer.initial_temperature", self.thermometer.initial_temperature),
            ("weather.mean", self.weather.mean),
            ("weather.amplitude", self.weather.amplitude),
            ("devices.heatpump_temperature", self.devices.heatpump_temperature),
        ];
        if let Some((name, _)) = temperatures.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::Validation(format!("{name} must be finite")));
        }
        self.devices
            .door
            .ensure_fits(DeviceKey::Door)
            .and_then(|_| self.devices.heatpump_state.ensure_fits(DeviceKey::Heatpump))
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Schedule of the subscribed re-emission.
    #[must_use]
    pub fn schedule(&self) -> Jitter {
        Jitter::new(
            Duration::from_millis(self.thermometer.frequency_ms),
            self.thermometer.jitter,
        )
    }

    #[must_use]
    pub fn weather_settings(&self) -> WeatherSettings {
        WeatherSettings {
            mean: self.weather.mean,
            amplitude: self.weather.amplitude,
            schedule: Jitter::new(
                Duration::from_millis(self.weather.frequency_ms),
                self.thermometer.jitter,
            ),
        }
    }

    #[must_use]
    pub fn initial_devices(&self) -> InitialDevices {
        InitialDevices {
            windows: self.devices.windows,
            door: self.devices.door,
            heatpump_state: self.devices.heatpump_state,
            heatpump_temperature: self.devices.heatpump_temperature,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homesimd=info,homesim=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ThermometerConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 20.0,
            frequency_ms: 2000,
            jitter: 0.2,
            bus_capacity: 256,
            policy: EstimatorPolicy::default(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mean: 12.0,
            amplitude: 8.0,
            frequency_ms: 5000,
        }
    }
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            windows: 1,
            door: DeviceState::Closed,
            heatpump_state: DeviceState::Off,
            heatpump_temperature: 24.0,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
