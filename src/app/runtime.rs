use std::path::Path;
use std::rc::Rc;

use chrono::Utc;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::time::Instant;

use super::engine::{Effect, ThemeEngine, ThemePreference};
use super::resolve::{resolve_initial, ResolutionSource};
use super::snapshot::{SnapshotResult, ThemeSnapshot};
use super::sources::ThemeSources;
use super::sync::PersistenceSynchronizer;
use crate::config::AppConfig;
use crate::preference::{Subscription, SystemPreferences};
use crate::route::RouteOverrideLayer;
use crate::state::{TransitionCoordinator, TransitionState, TransitionTicket};
use crate::theme::{ThemeId, ThemeResult};
use crate::ui::{root_class, ThemeStylesheet};

/// Something the runtime reacted to while waiting in [`ThemeRuntime::next_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    SystemPreferenceChanged { prefers_dark: bool },
    ReducedMotionChanged { reduced: bool },
    TransitionFinished { generation: u64 },
    RemoteWriteSettled { saved: bool },
}

enum Wake {
    PrefersDark(bool),
    ReducedMotion(bool),
    Deadline(u64),
    Remote(bool),
}

/// Drives a [`ThemeEngine`] on a single-threaded event loop.
///
/// Operations mutate the engine and then run the queued effects in order:
/// local writes happen inline, remote writes and transition timers are
/// awaited by [`next_event`](Self::next_event).
pub struct ThemeRuntime {
    engine: ThemeEngine,
    synchronizer: PersistenceSynchronizer,
    system: Rc<SystemPreferences>,
    dark_changes: Subscription,
    motion_changes: Subscription,
    transitions: TransitionCoordinator,
    stylesheet: ThemeStylesheet,
    remote_writes: FuturesUnordered<LocalBoxFuture<'static, bool>>,
    resolution_source: ResolutionSource,
}

impl ThemeRuntime {
    pub async fn boot(
        sources: ThemeSources,
        system: Rc<SystemPreferences>,
        config: &AppConfig,
    ) -> Self {
        let dark_changes = system.prefers_dark.subscribe();
        let motion_changes = system.prefers_reduced_motion.subscribe();
        let prefers_dark = system.prefers_dark.current();

        let resolution = resolve_initial(&sources, prefers_dark).await;
        let resolution_source = resolution.source;
        let routes = RouteOverrideLayer::new(config.route_table(), config.initial_route());
        let engine = ThemeEngine::new(resolution, routes, prefers_dark);

        let mut runtime = Self {
            engine,
            synchronizer: PersistenceSynchronizer::new(&sources),
            system,
            dark_changes,
            motion_changes,
            transitions: TransitionCoordinator::new(config.transition_duration()),
            stylesheet: ThemeStylesheet::new(),
            remote_writes: FuturesUnordered::new(),
            resolution_source,
        };
        runtime.apply_effects();
        tracing::info!(
            effective = %runtime.effective_theme(),
            route = runtime.current_route(),
            "theme runtime ready"
        );
        runtime
    }

    pub fn effective_theme(&self) -> ThemeId {
        self.engine.effective_theme()
    }

    pub fn base_theme(&self) -> ThemeId {
        self.engine.base_theme()
    }

    pub fn auto_mode(&self) -> bool {
        self.engine.auto_mode()
    }

    pub fn preference(&self) -> ThemePreference {
        self.engine.preference()
    }

    pub fn current_route(&self) -> &str {
        self.engine.current_route()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.engine.user_id()
    }

    pub fn resolution_source(&self) -> ResolutionSource {
        self.resolution_source
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitions.is_transitioning()
    }

    pub fn transition_state(&self) -> TransitionState {
        self.transitions.state()
    }

    pub fn pending_transition(&self) -> Option<TransitionTicket> {
        self.transitions.pending()
    }

    pub fn stylesheet(&self) -> &ThemeStylesheet {
        &self.stylesheet
    }

    pub fn root_class(&self) -> String {
        root_class(self.effective_theme())
    }

    pub fn system(&self) -> &SystemPreferences {
        &self.system
    }

    pub fn change_theme(&mut self, theme: ThemeId) {
        self.catch_up();
        self.engine.change_theme(theme);
        self.apply_effects();
    }

    pub fn change_theme_named(&mut self, raw: &str) -> ThemeResult<()> {
        self.catch_up();
        self.engine.change_theme_named(raw)?;
        self.apply_effects();
        Ok(())
    }

    pub fn toggle_auto_mode(&mut self) {
        self.catch_up();
        self.engine.toggle_auto_mode();
        self.apply_effects();
    }

    pub fn navigate_to(&mut self, route: impl Into<String>) {
        self.catch_up();
        self.engine.navigate_to(route);
        self.apply_effects();
    }

    /// Login with `Some(identity)`, logout with `None`.
    pub fn set_user_id(&mut self, identity: Option<String>) {
        self.catch_up();
        self.engine.set_user_id(identity);
        self.apply_effects();
    }

    pub fn export_snapshot(&self) -> ThemeSnapshot {
        ThemeSnapshot::new(self.preference(), Utc::now())
    }

    pub fn export_json(&self) -> SnapshotResult<String> {
        self.export_snapshot().to_json()
    }

    pub fn export_to_file(&self, path: &Path) -> SnapshotResult<()> {
        let snapshot = self.export_snapshot();
        snapshot.write_to(path)?;
        tracing::info!(path = %path.display(), theme = %snapshot.preference.base_theme, "exported theme settings");
        Ok(())
    }

    pub fn import_snapshot(&mut self, snapshot: &ThemeSnapshot) {
        self.catch_up();
        self.engine.apply_preference(snapshot.preference);
        self.apply_effects();
    }

    /// Validates and applies an exported document; on error nothing changes.
    pub fn import_json(&mut self, serialized: &str) -> SnapshotResult<()> {
        let snapshot = ThemeSnapshot::from_json(serialized).inspect_err(|err| {
            tracing::warn!(%err, "rejected theme settings import");
        })?;
        self.import_snapshot(&snapshot);
        Ok(())
    }

    pub fn import_file(&mut self, path: &Path) -> SnapshotResult<()> {
        let snapshot = ThemeSnapshot::read_from(path).inspect_err(|err| {
            tracing::warn!(path = %path.display(), %err, "rejected theme settings file");
        })?;
        self.import_snapshot(&snapshot);
        Ok(())
    }

    /// Waits for the next signal, timer, or remote write and reacts to it.
    ///
    /// The runtime holds the preference signals, so this only resolves once
    /// something happens; use [`settle`](Self::settle) to drain outstanding work.
    pub async fn next_event(&mut self) -> Option<RuntimeEvent> {
        let pending = self.transitions.pending();
        let wake = tokio::select! {
            Some(prefers_dark) = self.dark_changes.next_change() => Wake::PrefersDark(prefers_dark),
            Some(reduced) = self.motion_changes.next_change() => Wake::ReducedMotion(reduced),
            Some(generation) = transition_deadline(pending) => Wake::Deadline(generation),
            Some(saved) = self.remote_writes.next(), if !self.remote_writes.is_empty() => {
                Wake::Remote(saved)
            }
            else => return None,
        };

        let event = match wake {
            Wake::PrefersDark(prefers_dark) => {
                self.observe_prefers_dark(prefers_dark);
                RuntimeEvent::SystemPreferenceChanged { prefers_dark }
            }
            Wake::ReducedMotion(reduced) => {
                self.observe_reduced_motion(reduced);
                RuntimeEvent::ReducedMotionChanged { reduced }
            }
            Wake::Deadline(generation) => {
                if self.transitions.complete(generation) {
                    tracing::debug!(generation, "theme transition finished");
                }
                RuntimeEvent::TransitionFinished { generation }
            }
            Wake::Remote(saved) => RuntimeEvent::RemoteWriteSettled { saved },
        };
        Some(event)
    }

    /// Runs the loop until no transition or remote write is outstanding.
    pub async fn settle(&mut self) {
        loop {
            self.catch_up();
            if self.transitions.pending().is_none() && self.remote_writes.is_empty() {
                return;
            }
            if self.next_event().await.is_none() {
                return;
            }
        }
    }

    /// Applies signal changes that arrived since the last await point.
    fn catch_up(&mut self) {
        while let Some(prefers_dark) = self.dark_changes.try_next_change() {
            self.observe_prefers_dark(prefers_dark);
        }
        while let Some(reduced) = self.motion_changes.try_next_change() {
            self.observe_reduced_motion(reduced);
        }
    }

    fn observe_prefers_dark(&mut self, prefers_dark: bool) {
        self.engine.observe_system_preference(prefers_dark);
        self.apply_effects();
    }

    fn observe_reduced_motion(&mut self, reduced: bool) {
        tracing::debug!(reduced, "reduced motion preference changed");
        if let Some(theme) = self.stylesheet.theme() {
            self.publish_styles(theme);
        }
    }

    fn reduced_motion(&self) -> bool {
        self.system.prefers_reduced_motion.current()
    }

    fn publish_styles(&mut self, theme: ThemeId) {
        let duration = self.transitions.duration_for(self.reduced_motion());
        self.stylesheet.publish(theme, duration);
    }

    fn apply_effects(&mut self) {
        for effect in self.engine.drain_effects() {
            match effect {
                Effect::Persist {
                    preference,
                    identity,
                } => {
                    let report = self.synchronizer.persist(preference, identity.as_deref());
                    if let Some(write) = report.remote_write {
                        self.remote_writes.push(write.run().boxed_local());
                    }
                }
                Effect::RememberIdentity(identity) => {
                    self.synchronizer.remember_identity(identity.as_deref());
                }
                Effect::PublishStyles(theme) => self.publish_styles(theme),
                Effect::BeginTransition => {
                    let ticket = self.transitions.begin(Instant::now(), self.reduced_motion());
                    tracing::debug!(
                        generation = ticket.generation,
                        duration_ms = ticket.duration.as_millis() as u64,
                        "theme transition started"
                    );
                }
            }
        }
    }
}

async fn transition_deadline(ticket: Option<TransitionTicket>) -> Option<u64> {
    let ticket = ticket?;
    tokio::time::sleep_until(ticket.deadline).await;
    Some(ticket.generation)
}
