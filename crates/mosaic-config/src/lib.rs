//! TOML configuration for the mosaic panel.
//!
//! The file lives at `<config dir>/mosaic/config.toml`. Every section and
//! every field is optional; a missing file yields the defaults.
//!
//! ```toml
//! [display]
//! width = 64
//! height = 32
//! fps = 30
//! brightness = 0.8
//! background = "#000000"
//!
//! [clock]
//! time_format = "twelve_hour"
//! theme = "amber"
//! flip_duration = 0.4
//! easing = "cubic_out"
//!
//! [stack]
//! gap = 2
//! wait_time = 6.0
//! delta = 2
//! reverse_delta = 4
//! speed = 0.0
//!
//! [marquee]
//! text = "hello from mosaic"
//! delta = 1
//! speed = 0.05
//! pause_duration = 1.5
//!
//! [system]
//! poll_interval = 1.0
//! focus_threshold = 0.9
//! ```

mod error;

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use mosaic_core::{ColorTheme, Rgba, TimeFormat};
use mosaic_motion::Easing;
use serde::{Deserialize, Serialize};

pub use error::ConfigError;

/// Panel edges accepted, in pixels.
const MIN_PANEL_SIZE: u32 = 16;
const MAX_PANEL_SIZE: u32 = 512;

const MAX_FPS: u32 = 240;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub clock: ClockConfig,
    pub stack: StackConfig,
    pub marquee: MarqueeConfig,
    pub system: SystemConfig,
}

/// Panel geometry and output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Initial brightness in `[0, 1]`.
    pub brightness: f64,
    #[serde(with = "hex_color")]
    pub background: Rgba<u8>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 32,
            fps: 30,
            brightness: 1.0,
            background: Rgba([0, 0, 0, 255]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub time_format: TimeFormat,
    pub theme: ColorTheme,
    /// Seconds for one digit flip.
    pub flip_duration: f64,
    pub easing: Easing,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::default(),
            theme: ColorTheme::default(),
            flip_duration: 0.4,
            easing: Easing::CubicOut,
        }
    }
}

/// Card carousel below the clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Pixels between cards.
    pub gap: u32,
    /// Seconds each card stays before rotating.
    pub wait_time: f64,
    /// Pixels scrolled per frame towards a later card.
    pub delta: u32,
    /// Pixels scrolled per frame back towards an earlier card.
    pub reverse_delta: u32,
    /// Minimum seconds between scroll moves.
    pub speed: f64,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            gap: 2,
            wait_time: 5.0,
            delta: 1,
            reverse_delta: 3,
            speed: 0.0,
        }
    }
}

/// Scrolling text along the bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    pub text: String,
    pub delta: u32,
    /// Minimum seconds between moves.
    pub speed: f64,
    /// Seconds to rest each time the text wraps around.
    pub pause_duration: f64,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            text: "mosaic".to_string(),
            delta: 1,
            speed: 0.08,
            pause_duration: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Seconds between system load samples.
    pub poll_interval: f64,
    /// CPU usage in `[0, 1]` above which the load card takes focus.
    pub focus_threshold: f32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            poll_interval: 1.0,
            focus_threshold: 0.9,
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "mosaic").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when there
    /// is no file.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("no config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;
        tracing::info!(path = %path.display(), "loaded configuration from file");
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.display;
        let sizes = MIN_PANEL_SIZE..=MAX_PANEL_SIZE;
        if !sizes.contains(&d.width) || !sizes.contains(&d.height) {
            return Err(invalid(format!(
                "display size {}x{} must be between {MIN_PANEL_SIZE} and {MAX_PANEL_SIZE}",
                d.width, d.height
            )));
        }
        if !(1..=MAX_FPS).contains(&d.fps) {
            return Err(invalid(format!("fps {} must be between 1 and {MAX_FPS}", d.fps)));
        }
        check_unit("display.brightness", d.brightness)?;
        check_seconds("clock.flip_duration", self.clock.flip_duration)?;
        check_seconds("stack.wait_time", self.stack.wait_time)?;
        check_seconds("stack.speed", self.stack.speed)?;
        if self.stack.delta == 0 || self.stack.reverse_delta == 0 || self.marquee.delta == 0 {
            return Err(invalid("scroll deltas must be at least 1".to_string()));
        }
        check_seconds("marquee.speed", self.marquee.speed)?;
        check_seconds("marquee.pause_duration", self.marquee.pause_duration)?;
        check_seconds("system.poll_interval", self.system.poll_interval)?;
        if self.system.poll_interval < 0.1 {
            return Err(invalid(format!(
                "system.poll_interval {} must be at least 0.1",
                self.system.poll_interval
            )));
        }
        check_unit("system.focus_threshold", self.system.focus_threshold as f64)?;
        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

fn check_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{field} {value} must be between 0 and 1")))
    }
}

fn check_seconds(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{field} {value} must be a non-negative number of seconds")))
    }
}

/// Colours as `"#rrggbb"` or `"#rrggbbaa"` strings.
mod hex_color {
    use mosaic_core::{Rgba, parse_hex, to_hex};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(color: &Rgba<u8>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgba<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hex(&s).ok_or_else(|| de::Error::custom(format!("invalid colour {s:?}, expected #rrggbb")))
    }
}
