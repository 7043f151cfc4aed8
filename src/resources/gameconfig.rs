//! Game configuration resource.
//!
//! Manages clock and animation settings loaded from an INI configuration
//! file. Provides defaults for safe startup and methods to load/save
//! configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [clock]
//! native = true
//! refresh_hz = 60
//! fallback_interval_ms = 16
//!
//! [animation]
//! default_fps = 12
//!
//! [log]
//! level = info
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::clock::frameclock::DEFAULT_FALLBACK_INTERVAL_MS;

/// Default safe values for startup
const DEFAULT_NATIVE: bool = true;
const DEFAULT_REFRESH_HZ: u32 = 60;
const DEFAULT_FPS: f64 = 12.0;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Game configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Use native refresh callbacks when the host has them.
    pub native: bool,
    /// Refresh rate the native scheduler is paced at.
    pub refresh_hz: u32,
    /// Interval between timer-fallback ticks in milliseconds.
    pub fallback_interval_ms: u32,
    /// Rate for animations that do not specify one, in frames per second.
    pub default_fps: f64,
    /// `env_logger` filter used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            native: DEFAULT_NATIVE,
            refresh_hz: DEFAULT_REFRESH_HZ,
            fallback_interval_ms: DEFAULT_FALLBACK_INTERVAL_MS,
            default_fps: DEFAULT_FPS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing or malformed values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [clock] section
        if let Some(native) = config.getbool("clock", "native").ok().flatten() {
            self.native = native;
        }
        if let Some(hz) = Self::get_u32(&config, "clock", "refresh_hz") {
            self.refresh_hz = hz;
        }
        if let Some(interval) = Self::get_u32(&config, "clock", "fallback_interval_ms") {
            self.fallback_interval_ms = interval;
        }

        // [animation] section
        if let Some(fps) = config.getfloat("animation", "default_fps").ok().flatten() {
            if fps.is_finite() && fps > 0.0 {
                self.default_fps = fps;
            }
        }

        // [log] section
        if let Some(level) = config.get("log", "level") {
            self.log_level = level;
        }

        info!(
            "Loaded config: native={}, refresh={}Hz, fallback={}ms, default_fps={}, log={}",
            self.native,
            self.refresh_hz,
            self.fallback_interval_ms,
            self.default_fps,
            self.log_level
        );

        Ok(())
    }

    /// Positive `u32` value of `section.key`; `None` when missing, malformed,
    /// zero or out of range.
    fn get_u32(config: &Ini, section: &str, key: &str) -> Option<u32> {
        let value = config.getuint(section, key).ok().flatten()?;
        u32::try_from(value).ok().filter(|v| *v > 0)
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [clock] section
        config.set("clock", "native", Some(self.native.to_string()));
        config.set("clock", "refresh_hz", Some(self.refresh_hz.to_string()));
        config.set(
            "clock",
            "fallback_interval_ms",
            Some(self.fallback_interval_ms.to_string()),
        );

        // [animation] section
        config.set("animation", "default_fps", Some(self.default_fps.to_string()));

        // [log] section
        config.set("log", "level", Some(self.log_level.clone()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
