use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::route::{RouteTable, DEFAULT_ROUTE};
use crate::theme::ThemeId;
use crate::ui::MOTION_TOKENS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

pub const APP_DIR: &str = "themestate";
const APP_CONFIG_FILE: &str = "config.json";
pub const LOCAL_STORE_FILE: &str = "local-store.json";
pub const COOKIE_JAR_FILE: &str = "cookies.txt";

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub transition_ms: Option<u64>,
    #[serde(default)]
    pub routes: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub default_route: Option<String>,
}

impl AppConfig {
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(
            self.transition_ms
                .unwrap_or(MOTION_TOKENS.theme_transition_ms),
        )
    }

    pub fn initial_route(&self) -> &str {
        self.default_route.as_deref().unwrap_or(DEFAULT_ROUTE)
    }

    /// Builds the route override table, skipping entries with unknown themes.
    pub fn route_table(&self) -> RouteTable {
        let Some(routes) = self.routes.as_ref() else {
            return RouteTable::default();
        };
        RouteTable::from_overrides(routes.iter().filter_map(|(route, raw)| {
            match raw.parse::<ThemeId>() {
                Ok(theme) => Some((route.clone(), theme)),
                Err(err) => {
                    tracing::warn!(route = route.as_str(), %err, "skipping route override");
                    None
                }
            }
        }))
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

/// Path of a file stored next to `config.json`.
pub fn app_file_path(file_name: &str) -> Result<PathBuf, ConfigPathError> {
    let (xdg_config_home, home) = config_env_dirs();
    app_config_path(APP_DIR, file_name, xdg_config_home.as_deref(), home.as_deref())
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
