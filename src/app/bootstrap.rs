use std::path::PathBuf;
use std::rc::Rc;

use crate::config::{
    app_file_path, load_app_config, AppConfig, ConfigPathError, COOKIE_JAR_FILE, LOCAL_STORE_FILE,
};
use crate::preference::SystemPreferences;
use crate::storage::{CookieJar, JsonFileStore, KeyValueStore, MemoryStore, ServerMarker};

use super::sources::ThemeSources;

/// Everything a host needs to boot a [`ThemeRuntime`](super::ThemeRuntime).
pub struct AppBootstrap {
    pub config: AppConfig,
    pub sources: ThemeSources,
    pub system: Rc<SystemPreferences>,
}

/// Loads config, opens the file-backed adapters next to it and probes the OS
/// color scheme. Adapters that cannot be opened fall back to memory.
pub fn bootstrap_app_runtime(marker: ServerMarker) -> AppBootstrap {
    let config = load_app_config();
    tracing::info!(
        transition_ms = config.transition_duration().as_millis() as u64,
        route = config.initial_route(),
        "loaded app config"
    );

    let cookies = open_cookie_jar(app_file_path(COOKIE_JAR_FILE));
    let local = open_local_store(app_file_path(LOCAL_STORE_FILE));
    let sources = ThemeSources::with_simulated_remote(marker, cookies, local);

    let system = Rc::new(SystemPreferences::detect());
    tracing::info!(
        prefers_dark = system.prefers_dark.current(),
        "detected system color scheme"
    );

    AppBootstrap {
        config,
        sources,
        system,
    }
}

fn open_cookie_jar(path: Result<PathBuf, ConfigPathError>) -> Rc<dyn KeyValueStore> {
    let opened = path
        .map_err(|err| format!("{err:?}"))
        .and_then(|path| CookieJar::open(path).map_err(|err| err.to_string()));
    match opened {
        Ok(jar) => Rc::new(jar),
        Err(err) => {
            tracing::warn!(err = err.as_str(), "failed to open cookie jar; using in-memory cookies");
            Rc::new(CookieJar::new())
        }
    }
}

fn open_local_store(path: Result<PathBuf, ConfigPathError>) -> Rc<dyn KeyValueStore> {
    let opened = path
        .map_err(|err| format!("{err:?}"))
        .and_then(|path| JsonFileStore::open(path).map_err(|err| err.to_string()));
    match opened {
        Ok(store) => Rc::new(store),
        Err(err) => {
            tracing::warn!(err = err.as_str(), "failed to open local device store; using in-memory store");
            Rc::new(MemoryStore::new("local device store"))
        }
    }
}
