use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod cookie;
pub mod local;
pub mod marker;
pub mod remote;

pub use cookie::{Cookie, CookieJar, SameSite, COOKIE_MAX_AGE_DAYS};
pub use local::JsonFileStore;
pub use marker::ServerMarker;
pub use remote::{LocalUserThemesDb, RemoteUserStore};

pub const THEME_KEY: &str = "theme";
pub const AUTO_THEME_KEY: &str = "autoTheme";
pub const USER_ID_KEY: &str = "userId";
pub const USER_THEMES_DB_KEY: &str = "userThemesDB";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{store} is unavailable")]
    Unavailable { store: &'static str },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed {store} payload")]
    Malformed {
        store: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("remote store request failed: {0}")]
    Remote(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// String key/value backing store.
///
/// Implementations use interior mutability; every consumer runs on the same
/// event loop thread.
pub trait KeyValueStore {
    fn name(&self) -> &'static str;
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-memory store. Can be switched off to behave like disabled storage.
#[derive(Debug)]
pub struct MemoryStore {
    name: &'static str,
    entries: RefCell<BTreeMap<String, String>>,
    available: Cell<bool>,
}

impl MemoryStore {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RefCell::new(BTreeMap::new()),
            available: Cell::new(true),
        }
    }

    pub fn with_entries<I, K, V>(name: &'static str, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new(name);
        store.entries.borrow_mut().extend(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        store
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.available.get() {
            Ok(())
        } else {
            Err(StorageError::Unavailable { store: self.name })
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &'static str {
        self.name
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_available()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.ensure_available()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Parses a persisted `"true"`/`"false"` flag; anything else is absent.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
