use serde::{Deserialize, Serialize};

use super::resolve::Resolution;
use crate::route::RouteOverrideLayer;
use crate::theme::{ThemeId, ThemeResult};

/// The user's durable preference: base theme plus auto mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThemePreference {
    pub base_theme: ThemeId,
    pub auto_mode: bool,
}

/// Side effect queued by a mutation, executed after the state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Persist {
        preference: ThemePreference,
        identity: Option<String>,
    },
    RememberIdentity(Option<String>),
    PublishStyles(ThemeId),
    BeginTransition,
}

/// Single owner of theme state.
///
/// Every mutation updates state synchronously and queues its side effects;
/// the caller drains them with [`drain_effects`](Self::drain_effects).
#[derive(Debug)]
pub struct ThemeEngine {
    preference: ThemePreference,
    user_id: Option<String>,
    system_prefers_dark: bool,
    routes: RouteOverrideLayer,
    effects: Vec<Effect>,
}

impl ThemeEngine {
    /// Builds the engine from a boot resolution and queues the write-back
    /// that brings the cookie and local device stores in line with it.
    ///
    /// The remote store is left alone at boot: a marker or auto-mode result
    /// only masks the user's remote entry until the next explicit change.
    pub fn new(resolution: Resolution, routes: RouteOverrideLayer, system_prefers_dark: bool) -> Self {
        let mut engine = Self {
            preference: resolution.preference,
            user_id: resolution.user_id,
            system_prefers_dark,
            routes,
            effects: Vec::new(),
        };
        engine.effects.push(Effect::Persist {
            preference: engine.preference,
            identity: None,
        });
        engine
            .effects
            .push(Effect::PublishStyles(engine.effective_theme()));
        engine
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn base_theme(&self) -> ThemeId {
        self.preference.base_theme
    }

    pub fn auto_mode(&self) -> bool {
        self.preference.auto_mode
    }

    pub fn effective_theme(&self) -> ThemeId {
        self.routes.effective_theme(self.preference.base_theme)
    }

    pub fn current_route(&self) -> &str {
        self.routes.current_route()
    }

    pub fn routes(&self) -> &RouteOverrideLayer {
        &self.routes
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn system_prefers_dark(&self) -> bool {
        self.system_prefers_dark
    }

    pub fn change_theme(&mut self, theme: ThemeId) {
        tracing::info!(%theme, "change theme");
        self.apply(ThemePreference {
            base_theme: theme,
            auto_mode: false,
        });
    }

    /// Parses `raw` and changes to it; unknown identifiers leave state untouched.
    pub fn change_theme_named(&mut self, raw: &str) -> ThemeResult<()> {
        let theme = raw.parse::<ThemeId>().inspect_err(|err| {
            tracing::warn!(%err, "rejected theme change");
        })?;
        self.change_theme(theme);
        Ok(())
    }

    pub fn toggle_auto_mode(&mut self) {
        let auto_mode = !self.preference.auto_mode;
        let base_theme = if auto_mode {
            ThemeId::from_system(self.system_prefers_dark)
        } else {
            self.preference.base_theme
        };
        tracing::info!(auto_mode, %base_theme, "toggle auto mode");
        self.apply(ThemePreference {
            base_theme,
            auto_mode,
        });
    }

    /// Records the latest system color scheme; base theme follows only in auto mode.
    pub fn observe_system_preference(&mut self, prefers_dark: bool) {
        self.system_prefers_dark = prefers_dark;
        if !self.preference.auto_mode {
            return;
        }
        let base_theme = ThemeId::from_system(prefers_dark);
        if base_theme == self.preference.base_theme {
            return;
        }
        tracing::info!(%base_theme, "auto mode following system preference");
        self.apply(ThemePreference {
            base_theme,
            auto_mode: true,
        });
    }

    /// Applies an imported preference through the same paths as
    /// [`change_theme`](Self::change_theme) and [`toggle_auto_mode`](Self::toggle_auto_mode).
    pub fn apply_preference(&mut self, preference: ThemePreference) {
        let base_theme = if preference.auto_mode {
            ThemeId::from_system(self.system_prefers_dark)
        } else {
            preference.base_theme
        };
        tracing::info!(%base_theme, auto_mode = preference.auto_mode, "apply imported preference");
        self.apply(ThemePreference {
            base_theme,
            auto_mode: preference.auto_mode,
        });
    }

    pub fn navigate_to(&mut self, route: impl Into<String>) {
        let previous = self.effective_theme();
        self.routes.navigate_to(route);
        tracing::debug!(route = self.routes.current_route(), "navigated");
        self.queue_visible_change(previous, false);
    }

    /// Sets or clears the logged-in identity and mirrors the base theme to it.
    pub fn set_user_id(&mut self, identity: Option<String>) {
        if self.user_id == identity {
            return;
        }
        tracing::info!(logged_in = identity.is_some(), "user identity changed");
        self.user_id = identity;
        self.effects
            .push(Effect::RememberIdentity(self.user_id.clone()));
        if self.user_id.is_some() {
            self.queue_persist();
        }
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn apply(&mut self, next: ThemePreference) {
        let previous_effective = self.effective_theme();
        let preference_changed = self.preference != next;
        self.preference = next;
        self.queue_persist();
        self.queue_visible_change(previous_effective, preference_changed);
    }

    fn queue_visible_change(&mut self, previous_effective: ThemeId, preference_changed: bool) {
        let effective = self.effective_theme();
        let effective_changed = effective != previous_effective;
        if effective_changed {
            self.effects.push(Effect::PublishStyles(effective));
        }
        if effective_changed || preference_changed {
            self.effects.push(Effect::BeginTransition);
        }
    }

    fn queue_persist(&mut self) {
        self.effects.push(Effect::Persist {
            preference: self.preference,
            identity: self.user_id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::resolve::ResolutionSource;
    use crate::theme::ThemeError;

    fn engine_with(preference: ThemePreference, system_prefers_dark: bool) -> ThemeEngine {
        let mut engine = ThemeEngine::new(
            Resolution {
                preference,
                source: ResolutionSource::Default,
                user_id: None,
            },
            RouteOverrideLayer::default(),
            system_prefers_dark,
        );
        engine.drain_effects();
        engine
    }

    fn manual(theme: ThemeId) -> ThemePreference {
        ThemePreference {
            base_theme: theme,
            auto_mode: false,
        }
    }

    #[test]
    fn boot_writes_back_locally_without_touching_remote() {
        let mut engine = ThemeEngine::new(
            Resolution {
                preference: manual(ThemeId::Dark),
                source: ResolutionSource::Cookie,
                user_id: Some("alice".to_string()),
            },
            RouteOverrideLayer::default(),
            false,
        );
        assert_eq!(
            engine.drain_effects(),
            vec![
                Effect::Persist {
                    preference: manual(ThemeId::Dark),
                    identity: None,
                },
                Effect::PublishStyles(ThemeId::Dark),
            ]
        );
        assert_eq!(engine.user_id(), Some("alice"));
    }

    #[test]
    fn change_theme_disables_auto_and_is_visible_immediately() {
        let mut engine = engine_with(
            ThemePreference {
                base_theme: ThemeId::Dark,
                auto_mode: true,
            },
            false,
        );
        for theme in [ThemeId::HighContrast, ThemeId::Light, ThemeId::Dark] {
            engine.change_theme(theme);
            assert_eq!(engine.effective_theme(), theme);
            assert!(!engine.auto_mode());
        }
    }

    #[test]
    fn change_theme_queues_persist_then_styles_then_transition() {
        let mut engine = engine_with(manual(ThemeId::Light), false);
        engine.change_theme(ThemeId::Dark);
        assert_eq!(
            engine.drain_effects(),
            vec![
                Effect::Persist {
                    preference: manual(ThemeId::Dark),
                    identity: None,
                },
                Effect::PublishStyles(ThemeId::Dark),
                Effect::BeginTransition,
            ]
        );
    }

    #[test]
    fn repeated_change_theme_is_idempotent() {
        let mut engine = engine_with(manual(ThemeId::Light), false);
        engine.change_theme(ThemeId::HighContrast);
        let once = (engine.preference(), engine.effective_theme());
        engine.drain_effects();

        engine.change_theme(ThemeId::HighContrast);
        assert_eq!((engine.preference(), engine.effective_theme()), once);
        // Only the write-through is repeated; nothing visible changes.
        assert_eq!(
            engine.drain_effects(),
            vec![Effect::Persist {
                preference: manual(ThemeId::HighContrast),
                identity: None,
            }]
        );
    }

    #[test]
    fn unknown_theme_name_is_rejected_without_mutation() {
        let mut engine = engine_with(manual(ThemeId::Dark), false);
        let err = engine.change_theme_named("neon").unwrap_err();
        assert_eq!(err, ThemeError::UnknownTheme("neon".to_string()));
        assert_eq!(engine.preference(), manual(ThemeId::Dark));
        assert!(engine.drain_effects().is_empty());

        engine.change_theme_named("highContrast").unwrap();
        assert_eq!(engine.base_theme(), ThemeId::HighContrast);
    }

    #[test]
    fn enabling_auto_follows_system_then_manual_change_freezes() {
        let mut engine = engine_with(manual(ThemeId::Light), true);
        engine.toggle_auto_mode();
        assert!(engine.auto_mode());
        assert_eq!(engine.base_theme(), ThemeId::Dark);

        engine.change_theme(ThemeId::Light);
        assert!(!engine.auto_mode());
        engine.observe_system_preference(true);
        engine.observe_system_preference(false);
        engine.observe_system_preference(true);
        assert_eq!(engine.base_theme(), ThemeId::Light);
    }

    #[test]
    fn disabling_auto_keeps_last_resolved_theme() {
        let mut engine = engine_with(manual(ThemeId::HighContrast), false);
        engine.toggle_auto_mode();
        assert_eq!(engine.base_theme(), ThemeId::Light);

        engine.observe_system_preference(true);
        assert_eq!(engine.base_theme(), ThemeId::Dark);

        engine.toggle_auto_mode();
        assert!(!engine.auto_mode());
        assert_eq!(engine.base_theme(), ThemeId::Dark);
        engine.observe_system_preference(false);
        assert_eq!(engine.base_theme(), ThemeId::Dark);
    }

    #[test]
    fn system_change_in_auto_mode_persists_new_base() {
        let mut engine = engine_with(
            ThemePreference {
                base_theme: ThemeId::Dark,
                auto_mode: true,
            },
            true,
        );
        engine.observe_system_preference(true);
        assert!(engine.drain_effects().is_empty());

        engine.observe_system_preference(false);
        let effects = engine.drain_effects();
        assert_eq!(
            effects[0],
            Effect::Persist {
                preference: ThemePreference {
                    base_theme: ThemeId::Light,
                    auto_mode: true,
                },
                identity: None,
            }
        );
        assert!(effects.contains(&Effect::BeginTransition));
    }

    #[test]
    fn route_override_shadows_without_touching_base() {
        let mut engine = engine_with(manual(ThemeId::Light), false);
        engine.navigate_to("/trailers");
        assert_eq!(engine.effective_theme(), ThemeId::Dark);
        assert_eq!(engine.base_theme(), ThemeId::Light);
        assert_eq!(
            engine.drain_effects(),
            vec![Effect::PublishStyles(ThemeId::Dark), Effect::BeginTransition]
        );

        engine.change_theme(ThemeId::HighContrast);
        engine.toggle_auto_mode();
        assert_eq!(engine.effective_theme(), ThemeId::Dark);
        engine.drain_effects();

        engine.navigate_to("/");
        assert_eq!(engine.effective_theme(), ThemeId::Light);
        assert!(engine.auto_mode());
    }

    #[test]
    fn navigation_between_same_theme_routes_is_silent() {
        let mut engine = engine_with(manual(ThemeId::Light), false);
        engine.navigate_to("/docs");
        engine.navigate_to("/about");
        assert!(engine.drain_effects().is_empty());
        assert_eq!(engine.current_route(), "/about");
    }

    #[test]
    fn login_remembers_identity_and_mirrors_theme() {
        let mut engine = engine_with(manual(ThemeId::Dark), false);
        engine.set_user_id(Some("alice".to_string()));
        assert_eq!(
            engine.drain_effects(),
            vec![
                Effect::RememberIdentity(Some("alice".to_string())),
                Effect::Persist {
                    preference: manual(ThemeId::Dark),
                    identity: Some("alice".to_string()),
                },
            ]
        );

        engine.set_user_id(Some("alice".to_string()));
        assert!(engine.drain_effects().is_empty());

        engine.set_user_id(None);
        assert_eq!(engine.drain_effects(), vec![Effect::RememberIdentity(None)]);
        assert_eq!(engine.user_id(), None);
    }

    #[test]
    fn imported_auto_preference_resolves_from_system() {
        let mut engine = engine_with(manual(ThemeId::Light), true);
        engine.apply_preference(ThemePreference {
            base_theme: ThemeId::HighContrast,
            auto_mode: true,
        });
        assert_eq!(
            engine.preference(),
            ThemePreference {
                base_theme: ThemeId::Dark,
                auto_mode: true,
            }
        );
    }
}
