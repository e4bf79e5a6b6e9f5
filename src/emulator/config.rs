// Configuration management
//
// Emulator settings, stored as TOML. The core never touches the filesystem
// on its own; hosts call `load`/`save` with a path of their choosing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Output samples per frame at 44.1kHz and 60 frames per second
pub const DEFAULT_SAMPLES_PER_FRAME: usize = 735;

/// Errors raised while reading or writing a configuration file
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid configuration: {}", e),
            ConfigError::Serialize(e) => write!(f, "Could not serialize configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

/// Emulator configuration
///
/// Missing tables and keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Audio settings
    pub audio: AudioConfig,
    /// Debug settings
    pub debug: DebugConfig,
}

/// Audio configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// When false the APU still runs but drained samples are silent
    pub enabled: bool,
    /// Sample count used by `Emulator::frame_samples`
    pub samples_per_frame: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            enabled: true,
            samples_per_frame: DEFAULT_SAMPLES_PER_FRAME,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log a nestest-format line per instruction at trace level
    pub trace_cpu: bool,
}

impl EmulatorConfig {
    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Render as a TOML document
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Save configuration to a file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_core::emulator::EmulatorConfig;
    ///
    /// let config = EmulatorConfig::default();
    /// config.save("nes.toml").expect("Failed to save configuration");
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Load configuration from a file, or the defaults if that fails
    ///
    /// Nothing is written back.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
