use std::rc::Rc;

use super::engine::ThemePreference;
use super::sources::ThemeSources;
use crate::storage::{KeyValueStore, RemoteUserStore, AUTO_THEME_KEY, THEME_KEY, USER_ID_KEY};
use crate::theme::ThemeId;

/// Adapters that failed during one write-through.
#[derive(Debug, Default)]
pub struct PersistReport {
    pub failed: Vec<&'static str>,
    pub remote_write: Option<RemoteWrite>,
}

impl PersistReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A deferred remote store write; polled on the event loop, never awaited by callers.
pub struct RemoteWrite {
    store: Rc<dyn RemoteUserStore>,
    identity: String,
    theme: ThemeId,
}

impl std::fmt::Debug for RemoteWrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteWrite")
            .field("identity", &self.identity)
            .field("theme", &self.theme)
            .finish()
    }
}

impl RemoteWrite {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn theme(&self) -> ThemeId {
        self.theme
    }

    /// Returns whether the write landed; failures are logged and absorbed.
    pub async fn run(self) -> bool {
        match self.store.set(&self.identity, self.theme).await {
            Ok(()) => {
                tracing::debug!(identity = self.identity.as_str(), theme = %self.theme, "remote theme saved");
                true
            }
            Err(err) => {
                tracing::warn!(identity = self.identity.as_str(), %err, "remote theme write failed");
                false
            }
        }
    }
}

/// Fans preference changes out to every writable adapter.
///
/// Writes are independent: a failing adapter is logged and skipped, and
/// writes that already succeeded stay in place.
pub struct PersistenceSynchronizer {
    cookies: Rc<dyn KeyValueStore>,
    local: Rc<dyn KeyValueStore>,
    remote: Rc<dyn RemoteUserStore>,
}

impl PersistenceSynchronizer {
    pub fn new(sources: &ThemeSources) -> Self {
        Self {
            cookies: sources.cookies.clone(),
            local: sources.local.clone(),
            remote: sources.remote.clone(),
        }
    }

    pub fn persist(&self, preference: ThemePreference, identity: Option<&str>) -> PersistReport {
        let mut report = PersistReport::default();
        let theme = preference.base_theme.as_str();
        let auto = if preference.auto_mode { "true" } else { "false" };

        for store in [self.cookies.as_ref(), self.local.as_ref()] {
            let mut failed = false;
            for (key, value) in [(THEME_KEY, theme), (AUTO_THEME_KEY, auto)] {
                if let Err(err) = store.set(key, value) {
                    tracing::warn!(store = store.name(), key, %err, "failed to persist theme preference");
                    failed = true;
                }
            }
            if failed {
                report.failed.push(store.name());
            }
        }

        report.remote_write = identity.map(|identity| RemoteWrite {
            store: self.remote.clone(),
            identity: identity.to_string(),
            theme: preference.base_theme,
        });

        tracing::debug!(
            theme,
            auto_mode = preference.auto_mode,
            failed = report.failed.len(),
            remote = report.remote_write.is_some(),
            "persisted theme preference"
        );
        report
    }

    /// Stores or forgets the identity reference used at the next boot.
    pub fn remember_identity(&self, identity: Option<&str>) -> bool {
        let result = match identity {
            Some(identity) => self.local.set(USER_ID_KEY, identity),
            None => self.local.remove(USER_ID_KEY),
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(store = self.local.name(), %err, "failed to store user identity");
                false
            }
        }
    }
}
