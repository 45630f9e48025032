use std::rc::Rc;

use crate::storage::{
    parse_flag, CookieJar, KeyValueStore, LocalUserThemesDb, MemoryStore, RemoteUserStore,
    ServerMarker,
};
use crate::theme::ThemeId;

/// The four backing stores the engine resolves from and writes through.
#[derive(Clone)]
pub struct ThemeSources {
    pub marker: ServerMarker,
    pub cookies: Rc<dyn KeyValueStore>,
    pub local: Rc<dyn KeyValueStore>,
    pub remote: Rc<dyn RemoteUserStore>,
}

impl ThemeSources {
    pub fn new(
        marker: ServerMarker,
        cookies: Rc<dyn KeyValueStore>,
        local: Rc<dyn KeyValueStore>,
        remote: Rc<dyn RemoteUserStore>,
    ) -> Self {
        Self {
            marker,
            cookies,
            local,
            remote,
        }
    }

    /// Cookie jar and local store given, remote simulated inside the local store.
    pub fn with_simulated_remote(
        marker: ServerMarker,
        cookies: Rc<dyn KeyValueStore>,
        local: Rc<dyn KeyValueStore>,
    ) -> Self {
        let remote = Rc::new(LocalUserThemesDb::new(local.clone()));
        Self::new(marker, cookies, local, remote)
    }

    pub fn in_memory() -> Self {
        Self::with_simulated_remote(
            ServerMarker::absent(),
            Rc::new(CookieJar::new()),
            Rc::new(MemoryStore::new("local device store")),
        )
    }
}

/// Reads a theme from `store`, treating failures and unknown values as absent.
pub(crate) fn read_theme(store: &dyn KeyValueStore, key: &str) -> Option<ThemeId> {
    let raw = read_value(store, key)?;
    let theme = ThemeId::parse_lenient(&raw);
    if theme.is_none() {
        tracing::warn!(store = store.name(), key, value = raw.as_str(), "ignoring malformed theme value");
    }
    theme
}

pub(crate) fn read_flag(store: &dyn KeyValueStore, key: &str) -> Option<bool> {
    let raw = read_value(store, key)?;
    let flag = parse_flag(&raw);
    if flag.is_none() {
        tracing::warn!(store = store.name(), key, value = raw.as_str(), "ignoring malformed flag value");
    }
    flag
}

pub(crate) fn read_value(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value.filter(|value| !value.is_empty()),
        Err(err) => {
            tracing::warn!(store = store.name(), key, %err, "source unavailable; skipping");
            None
        }
    }
}
