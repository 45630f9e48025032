use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ThemeResult<T> = std::result::Result<T, ThemeError>;

/// Closed set of themes the engine knows how to paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ThemeId {
    #[serde(rename = "light")]
    #[default]
    Light,
    #[serde(rename = "dark")]
    Dark,
    #[serde(rename = "highContrast")]
    HighContrast,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("unknown theme identifier: {0:?}")]
    UnknownTheme(String),
}

impl ThemeId {
    pub const ALL: [ThemeId; 3] = [ThemeId::Light, ThemeId::Dark, ThemeId::HighContrast];

    pub const fn as_str(self) -> &'static str {
        match self {
            ThemeId::Light => "light",
            ThemeId::Dark => "dark",
            ThemeId::HighContrast => "highContrast",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            ThemeId::Light => "Light",
            ThemeId::Dark => "Dark",
            ThemeId::HighContrast => "High Contrast",
        }
    }

    /// Theme picked by automatic mode. High contrast is never auto-selected.
    pub const fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark {
            ThemeId::Dark
        } else {
            ThemeId::Light
        }
    }

    pub fn palette(self) -> &'static ThemePalette {
        match self {
            ThemeId::Light => &LIGHT_PALETTE,
            ThemeId::Dark => &DARK_PALETTE,
            ThemeId::HighContrast => &HIGH_CONTRAST_PALETTE,
        }
    }

    /// Parses a persisted value, treating anything unknown as absent.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl FromStr for ThemeId {
    type Err = ThemeError;

    fn from_str(raw: &str) -> ThemeResult<Self> {
        let trimmed = raw.trim();
        ThemeId::ALL
            .into_iter()
            .find(|id| id.as_str() == trimmed)
            .ok_or_else(|| ThemeError::UnknownTheme(raw.to_string()))
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic color roles, in publication order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Background,
    SecondaryBackground,
    Text,
    SecondaryText,
    Accent,
    AccentHover,
    Border,
    Shadow,
}

impl ColorRole {
    pub const ALL: [ColorRole; 8] = [
        ColorRole::Background,
        ColorRole::SecondaryBackground,
        ColorRole::Text,
        ColorRole::SecondaryText,
        ColorRole::Accent,
        ColorRole::AccentHover,
        ColorRole::Border,
        ColorRole::Shadow,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ColorRole::Background => "background",
            ColorRole::SecondaryBackground => "secondary-background",
            ColorRole::Text => "text",
            ColorRole::SecondaryText => "secondary-text",
            ColorRole::Accent => "accent",
            ColorRole::AccentHover => "accent-hover",
            ColorRole::Border => "border",
            ColorRole::Shadow => "shadow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub background: &'static str,
    pub secondary_background: &'static str,
    pub text: &'static str,
    pub secondary_text: &'static str,
    pub accent: &'static str,
    pub accent_hover: &'static str,
    pub border: &'static str,
    pub shadow: &'static str,
}

impl ThemePalette {
    pub const fn color(&self, role: ColorRole) -> &'static str {
        match role {
            ColorRole::Background => self.background,
            ColorRole::SecondaryBackground => self.secondary_background,
            ColorRole::Text => self.text,
            ColorRole::SecondaryText => self.secondary_text,
            ColorRole::Accent => self.accent,
            ColorRole::AccentHover => self.accent_hover,
            ColorRole::Border => self.border,
            ColorRole::Shadow => self.shadow,
        }
    }

    /// Role/value pairs in [`ColorRole::ALL`] order.
    pub fn entries(&self) -> impl Iterator<Item = (ColorRole, &'static str)> + '_ {
        ColorRole::ALL.into_iter().map(move |role| (role, self.color(role)))
    }
}

pub const LIGHT_PALETTE: ThemePalette = ThemePalette {
    background: "#ffffff",
    secondary_background: "#f3f4f6",
    text: "#111827",
    secondary_text: "#6b7280",
    accent: "#3b82f6",
    accent_hover: "#2563eb",
    border: "#e5e7eb",
    shadow: "rgba(0, 0, 0, 0.1)",
};

pub const DARK_PALETTE: ThemePalette = ThemePalette {
    background: "#0f172a",
    secondary_background: "#1e293b",
    text: "#f1f5f9",
    secondary_text: "#94a3b8",
    accent: "#3b82f6",
    accent_hover: "#2563eb",
    border: "#334155",
    shadow: "rgba(0, 0, 0, 0.3)",
};

pub const HIGH_CONTRAST_PALETTE: ThemePalette = ThemePalette {
    background: "#000000",
    secondary_background: "#1a1a1a",
    text: "#ffffff",
    secondary_text: "#cccccc",
    accent: "#00ff00",
    accent_hover: "#00cc00",
    border: "#ffffff",
    shadow: "rgba(255, 255, 255, 0.2)",
};
