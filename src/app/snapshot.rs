use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::engine::ThemePreference;
use crate::theme::ThemeId;

pub const SNAPSHOT_FILE_NAME: &str = "theme-settings.json";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("theme settings file is not valid JSON")]
    Parse(#[from] serde_json::Error),
    #[error("theme settings file has no currentTheme")]
    MissingTheme,
    #[error("theme settings file names unknown theme {0:?}")]
    UnknownTheme(String),
    #[error("failed to read theme settings file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write theme settings file: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Portable copy of the user's preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSnapshot {
    pub preference: ThemePreference,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDocument<'a> {
    current_theme: ThemeId,
    auto_theme: bool,
    timestamp: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshotDocument {
    #[serde(default)]
    current_theme: Option<String>,
    #[serde(default)]
    auto_theme: Option<bool>,
    #[serde(default)]
    timestamp: Option<String>,
}

impl ThemeSnapshot {
    pub fn new(preference: ThemePreference, timestamp: DateTime<Utc>) -> Self {
        Self {
            preference,
            timestamp,
        }
    }

    pub fn to_json(&self) -> SnapshotResult<String> {
        let timestamp = self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        let document = SnapshotDocument {
            current_theme: self.preference.base_theme,
            auto_theme: self.preference.auto_mode,
            timestamp: &timestamp,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Parses and validates an exported document.
    ///
    /// The theme must be a known identifier; a missing `autoTheme` means
    /// manual mode and a missing or unreadable timestamp is replaced by now.
    pub fn from_json(serialized: &str) -> SnapshotResult<Self> {
        let raw: RawSnapshotDocument = serde_json::from_str(serialized)?;
        let raw_theme = raw.current_theme.ok_or(SnapshotError::MissingTheme)?;
        let base_theme = raw_theme
            .parse::<ThemeId>()
            .map_err(|_| SnapshotError::UnknownTheme(raw_theme.clone()))?;
        let timestamp = raw
            .timestamp
            .as_deref()
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map_or_else(Utc::now, |parsed| parsed.with_timezone(&Utc));

        Ok(Self {
            preference: ThemePreference {
                base_theme,
                auto_mode: raw.auto_theme.unwrap_or(false),
            },
            timestamp,
        })
    }

    pub fn write_to(&self, path: &Path) -> SnapshotResult<()> {
        let serialized = self.to_json()?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SnapshotError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, serialized).map_err(|source| SnapshotError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read_from(path: &Path) -> SnapshotResult<Self> {
        let serialized = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&serialized)
    }
}
