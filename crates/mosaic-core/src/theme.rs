//! Display preferences shared by the screens and the configuration.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::color::hsl_to_rgb;

/// Clock hour format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    TwelveHour,
    #[default]
    TwentyFourHour,
}

impl TimeFormat {
    /// Switch between 12-hour and 24-hour.
    pub fn toggle(self) -> Self {
        match self {
            TimeFormat::TwelveHour => TimeFormat::TwentyFourHour,
            TimeFormat::TwentyFourHour => TimeFormat::TwelveHour,
        }
    }
}

/// Foreground colour theme for panel text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTheme {
    #[default]
    Cyan,
    Green,
    Amber,
    Magenta,
    White,
    /// Hue drifts with the phase passed to [`ColorTheme::color_at`].
    Rainbow,
}

impl ColorTheme {
    const ALL: [ColorTheme; 6] = [
        ColorTheme::Cyan,
        ColorTheme::Green,
        ColorTheme::Amber,
        ColorTheme::Magenta,
        ColorTheme::White,
        ColorTheme::Rainbow,
    ];

    /// Static colour of the theme. Rainbow reports its starting hue.
    pub fn color(self) -> Rgba<u8> {
        self.color_at(0.0)
    }

    /// Colour of the theme at `phase` in `[0, 1)`; only Rainbow varies.
    pub fn color_at(self, phase: f32) -> Rgba<u8> {
        match self {
            ColorTheme::Cyan => Rgba([0, 220, 255, 255]),
            ColorTheme::Green => Rgba([40, 255, 90, 255]),
            ColorTheme::Amber => Rgba([255, 176, 0, 255]),
            ColorTheme::Magenta => Rgba([255, 60, 220, 255]),
            ColorTheme::White => Rgba([235, 235, 235, 255]),
            ColorTheme::Rainbow => hsl_to_rgb(phase.rem_euclid(1.0) * 360.0, 1.0, 0.55),
        }
    }

    /// The next theme in the cycle.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}
