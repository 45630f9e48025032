use std::collections::BTreeMap;
use std::rc::Rc;

use async_trait::async_trait;

use super::{KeyValueStore, StorageError, StorageResult, USER_THEMES_DB_KEY};
use crate::theme::ThemeId;

const USER_THEMES_DB_NAME: &str = "user themes db";

/// Per-user theme store reached asynchronously.
///
/// Futures are not `Send`: the engine polls them on its own event loop.
#[async_trait(?Send)]
pub trait RemoteUserStore {
    async fn get(&self, identity: &str) -> StorageResult<Option<ThemeId>>;
    async fn set(&self, identity: &str, theme: ThemeId) -> StorageResult<()>;
}

/// Remote store simulated inside the local device store under `userThemesDB`.
pub struct LocalUserThemesDb {
    store: Rc<dyn KeyValueStore>,
}

impl LocalUserThemesDb {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read_table(&self) -> StorageResult<BTreeMap<String, String>> {
        let Some(serialized) = self.store.get(USER_THEMES_DB_KEY)? else {
            return Ok(BTreeMap::new());
        };
        serde_json::from_str(&serialized).map_err(|source| StorageError::Malformed {
            store: USER_THEMES_DB_NAME,
            source,
        })
    }
}

#[async_trait(?Send)]
impl RemoteUserStore for LocalUserThemesDb {
    async fn get(&self, identity: &str) -> StorageResult<Option<ThemeId>> {
        let table = self.read_table()?;
        Ok(table.get(identity).and_then(|raw| {
            let theme = ThemeId::parse_lenient(raw);
            if theme.is_none() {
                tracing::warn!(identity, value = raw.as_str(), "ignoring unknown theme in user themes db");
            }
            theme
        }))
    }

    async fn set(&self, identity: &str, theme: ThemeId) -> StorageResult<()> {
        let mut table = self.read_table().unwrap_or_else(|err| {
            tracing::warn!(?err, "resetting unreadable user themes db");
            BTreeMap::new()
        });
        table.insert(identity.to_string(), theme.as_str().to_string());
        let serialized = serde_json::to_string(&table).map_err(|source| StorageError::Malformed {
            store: USER_THEMES_DB_NAME,
            source,
        })?;
        self.store.set(USER_THEMES_DB_KEY, &serialized)
    }
}
