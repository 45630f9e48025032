use super::engine::ThemePreference;
use super::sources::{read_flag, read_theme, read_value, ThemeSources};
use crate::storage::{AUTO_THEME_KEY, THEME_KEY, USER_ID_KEY};
use crate::theme::ThemeId;

/// Which precedence tier decided the initial base theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    ServerMarker,
    RemoteUserStore,
    Cookie,
    LocalDevice,
    Default,
    /// Auto mode was on, so the live system preference replaced the tier result.
    SystemPreference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub preference: ThemePreference,
    pub source: ResolutionSource,
    pub user_id: Option<String>,
}

/// Resolves the boot-time preference.
///
/// Tiers short-circuit in order: server marker, remote store for the
/// remembered identity, cookie, local device store, then `light`. The marker
/// wins unconditionally because it reflects what was already painted, which
/// can mask a newer remote preference until the next explicit change.
pub async fn resolve_initial(sources: &ThemeSources, prefers_dark: bool) -> Resolution {
    let user_id = read_value(sources.local.as_ref(), USER_ID_KEY);
    let (base_theme, source) = resolve_base_theme(sources, user_id.as_deref()).await;
    let auto_mode = read_flag(sources.cookies.as_ref(), AUTO_THEME_KEY).unwrap_or(false);

    let (base_theme, source) = if auto_mode {
        (ThemeId::from_system(prefers_dark), ResolutionSource::SystemPreference)
    } else {
        (base_theme, source)
    };

    tracing::info!(%base_theme, auto_mode, ?source, has_user = user_id.is_some(), "resolved initial theme");
    Resolution {
        preference: ThemePreference {
            base_theme,
            auto_mode,
        },
        source,
        user_id,
    }
}

async fn resolve_base_theme(
    sources: &ThemeSources,
    user_id: Option<&str>,
) -> (ThemeId, ResolutionSource) {
    if let Some(theme) = sources.marker.theme() {
        tracing::debug!(%theme, "server marker decided theme");
        return (theme, ResolutionSource::ServerMarker);
    }

    if let Some(identity) = user_id {
        match sources.remote.get(identity).await {
            Ok(Some(theme)) => {
                tracing::debug!(%theme, identity, "remote user store decided theme");
                return (theme, ResolutionSource::RemoteUserStore);
            }
            Ok(None) => tracing::debug!(identity, "no remote theme for user"),
            Err(err) => tracing::warn!(identity, %err, "remote user store unavailable; skipping"),
        }
    }

    if let Some(theme) = read_theme(sources.cookies.as_ref(), THEME_KEY) {
        tracing::debug!(%theme, "cookie decided theme");
        return (theme, ResolutionSource::Cookie);
    }

    if let Some(theme) = read_theme(sources.local.as_ref(), THEME_KEY) {
        tracing::debug!(%theme, "local device store decided theme");
        return (theme, ResolutionSource::LocalDevice);
    }

    (ThemeId::default(), ResolutionSource::Default)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::storage::{
        CookieJar, MemoryStore, RemoteUserStore, ServerMarker, StorageError, StorageResult,
        USER_THEMES_DB_KEY,
    };

    fn sources(marker: ServerMarker, cookie_header: &str, local: Rc<MemoryStore>) -> ThemeSources {
        ThemeSources::with_simulated_remote(
            marker,
            Rc::new(CookieJar::from_cookie_header(cookie_header)),
            local,
        )
    }

    fn local(entries: &[(&str, &str)]) -> Rc<MemoryStore> {
        Rc::new(MemoryStore::with_entries(
            "local device store",
            entries.iter().copied(),
        ))
    }

    #[tokio::test]
    async fn nothing_stored_resolves_to_light_manual() {
        let resolution = resolve_initial(&ThemeSources::in_memory(), true).await;
        assert_eq!(
            resolution.preference,
            ThemePreference {
                base_theme: ThemeId::Light,
                auto_mode: false
            }
        );
        assert_eq!(resolution.source, ResolutionSource::Default);
        assert!(resolution.user_id.is_none());
    }

    #[tokio::test]
    async fn server_marker_beats_cookie_and_local_values() {
        let sources = sources(
            ServerMarker::from_class_attribute("theme-dark"),
            "theme=light",
            local(&[("theme", "highContrast")]),
        );
        let resolution = resolve_initial(&sources, false).await;
        assert_eq!(resolution.preference.base_theme, ThemeId::Dark);
        assert_eq!(resolution.source, ResolutionSource::ServerMarker);
    }

    #[tokio::test]
    async fn remote_store_beats_cookie_when_identity_is_remembered() {
        let store = local(&[
            ("userId", "alice"),
            (USER_THEMES_DB_KEY, r#"{"alice":"highContrast"}"#),
        ]);
        let sources = sources(ServerMarker::absent(), "theme=dark", store);
        let resolution = resolve_initial(&sources, false).await;
        assert_eq!(resolution.preference.base_theme, ThemeId::HighContrast);
        assert_eq!(resolution.source, ResolutionSource::RemoteUserStore);
        assert_eq!(resolution.user_id.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn identity_without_remote_entry_falls_through_to_cookie() {
        let sources = sources(
            ServerMarker::absent(),
            "theme=dark",
            local(&[("userId", "bob")]),
        );
        let resolution = resolve_initial(&sources, false).await;
        assert_eq!(resolution.preference.base_theme, ThemeId::Dark);
        assert_eq!(resolution.source, ResolutionSource::Cookie);
        assert_eq!(resolution.user_id.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn malformed_cookie_falls_through_to_local_store() {
        let sources = sources(
            ServerMarker::from_class_attribute("theme-neon"),
            "theme=neon",
            local(&[("theme", "dark")]),
        );
        let resolution = resolve_initial(&sources, false).await;
        assert_eq!(resolution.preference.base_theme, ThemeId::Dark);
        assert_eq!(resolution.source, ResolutionSource::LocalDevice);
    }

    #[tokio::test]
    async fn unavailable_local_store_falls_back_to_default() {
        let store = local(&[("theme", "dark"), ("userId", "alice")]);
        store.set_available(false);
        let sources = sources(ServerMarker::absent(), "", store);
        let resolution = resolve_initial(&sources, false).await;
        assert_eq!(resolution.preference.base_theme, ThemeId::Light);
        assert_eq!(resolution.source, ResolutionSource::Default);
        assert!(resolution.user_id.is_none());
    }

    #[tokio::test]
    async fn auto_cookie_overrides_base_with_system_preference() {
        let sources = sources(
            ServerMarker::absent(),
            "theme=light; autoTheme=true",
            local(&[]),
        );
        let resolution = resolve_initial(&sources, true).await;
        assert_eq!(
            resolution.preference,
            ThemePreference {
                base_theme: ThemeId::Dark,
                auto_mode: true
            }
        );
        assert_eq!(resolution.source, ResolutionSource::SystemPreference);
    }

    #[tokio::test]
    async fn auto_cookie_is_read_even_with_server_marker() {
        let sources = sources(
            ServerMarker::from_class_attribute("theme-highContrast"),
            "autoTheme=true",
            local(&[]),
        );
        let resolution = resolve_initial(&sources, false).await;
        assert!(resolution.preference.auto_mode);
        assert_eq!(resolution.preference.base_theme, ThemeId::Light);
    }

    #[tokio::test]
    async fn remote_errors_are_absorbed() {
        struct Unreachable;

        #[async_trait::async_trait(?Send)]
        impl RemoteUserStore for Unreachable {
            async fn get(&self, _identity: &str) -> StorageResult<Option<ThemeId>> {
                Err(StorageError::Remote("connection refused".to_string()))
            }

            async fn set(&self, _identity: &str, _theme: ThemeId) -> StorageResult<()> {
                Err(StorageError::Remote("connection refused".to_string()))
            }
        }

        let store = local(&[("userId", "alice"), ("theme", "dark")]);
        let sources = ThemeSources::new(
            ServerMarker::absent(),
            Rc::new(CookieJar::new()),
            store,
            Rc::new(Unreachable),
        );
        let resolution = resolve_initial(&sources, false).await;
        assert_eq!(resolution.preference.base_theme, ThemeId::Dark);
        assert_eq!(resolution.source, ResolutionSource::LocalDevice);
    }
}
