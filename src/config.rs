use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// An RGB triple, as written in `particles.json`.
pub type Rgb = [u8; 3];

/// Tunables for the particle field.
///
/// `Config::default()` is the stock look. A `particles.json` file may override
/// any subset of the fields.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Base speed. Initial velocities lie in `[-speed/2, speed/2]` per axis.
    pub speed: f32,
    /// Speed cap is `speed * max_speed_factor`.
    pub max_speed_factor: f32,
    pub colors: Vec<Rgb>,
    pub alpha_min: f32,
    pub alpha_max: f32,
    pub connect_distance: f32,
    pub line_color: Rgb,
    /// Line alpha at zero distance.
    pub line_opacity: f32,
    pub line_width: f32,
    pub repel_radius: f32,
    pub repel_force: f32,
    /// Scales the repulsion impulse applied per frame.
    pub repel_damping: f32,
    /// Per-frame velocity multiplier.
    pub damping: f32,
    pub background: Rgb,
    pub frame_interval_ms: u64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            count: 80,
            min_radius: 0.5,
            max_radius: 2.5,
            speed: 0.3,
            max_speed_factor: 3.0,
            colors: vec![
                [124, 58, 237],
                [37, 99, 235],
                [167, 139, 250],
                [96, 165, 250],
            ],
            alpha_min: 0.2,
            alpha_max: 0.7,
            connect_distance: 130.0,
            line_color: [124, 58, 237],
            line_opacity: 0.15,
            line_width: 0.5,
            repel_radius: 100.0,
            repel_force: 0.8,
            repel_damping: 0.05,
            damping: 0.99,
            background: [10, 10, 15],
            frame_interval_ms: 16,
            seed: None,
        }
    }
}

impl Config {
    pub fn max_speed(&self) -> f32 {
        self.speed * self.max_speed_factor
    }

    /// Parses and validates a JSON document.
    pub fn from_json(source: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` and parses it with [`Config::from_json`].
    pub async fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let source = tokio::fs::read_to_string(path).await?;
        Config::from_json(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.colors.is_empty() {
            return Err(ConfigError::Invalid("colors must not be empty".into()));
        }
        if self.min_radius < 0.0 || self.min_radius > self.max_radius {
            return Err(ConfigError::Invalid(format!(
                "radius range [{}, {}] is invalid",
                self.min_radius, self.max_radius
            )));
        }
        for (name, value) in [
            ("speed", self.speed),
            ("connect_distance", self.connect_distance),
            ("repel_radius", self.repel_radius),
            ("max_speed_factor", self.max_speed_factor),
        ]
        .iter()
        {
            if !(*value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("repel_force", self.repel_force),
            ("repel_damping", self.repel_damping),
            ("line_width", self.line_width),
        ]
        .iter()
        {
            if !(*value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        if !(self.line_opacity >= 0.0 && self.line_opacity <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "line_opacity must lie in [0, 1], got {}",
                self.line_opacity
            )));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "damping must lie in (0, 1], got {}",
                self.damping
            )));
        }
        if self.alpha_min < 0.0 || self.alpha_max > 1.0 || self.alpha_min > self.alpha_max {
            return Err(ConfigError::Invalid(format!(
                "alpha range [{}, {}] is invalid",
                self.alpha_min, self.alpha_max
            )));
        }
        Ok(())
    }
}

/// Errors that can occur while loading a [`Config`].
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the file.
    Io(std::io::Error),
    /// The file is not valid JSON for a `Config`.
    Parse(serde_json::Error),
    /// The values parse but make no sense together.
    Invalid(String),
}

impl ConfigError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
