use std::rc::Rc;

use themestate::app::{ThemeRuntime, ThemeSources};
use themestate::config::AppConfig;
use themestate::preference::SystemPreferences;
use themestate::storage::{CookieJar, MemoryStore, ServerMarker};
use themestate::ThemeId;

async fn boot_with(
    marker: ServerMarker,
    cookie_header: &str,
    local_entries: &[(&str, &str)],
    system: Rc<SystemPreferences>,
) -> ThemeRuntime {
    let sources = ThemeSources::with_simulated_remote(
        marker,
        Rc::new(CookieJar::from_cookie_header(cookie_header)),
        Rc::new(MemoryStore::with_entries(
            "local device store",
            local_entries.iter().copied(),
        )),
    );
    ThemeRuntime::boot(sources, system, &AppConfig::default()).await
}

async fn boot_empty(system: Rc<SystemPreferences>) -> ThemeRuntime {
    boot_with(ServerMarker::absent(), "", &[], system).await
}

#[tokio::test(start_paused = true)]
async fn change_theme_sets_effective_theme_and_disables_auto() {
    let mut runtime = boot_empty(Rc::new(SystemPreferences::new(true, false))).await;
    runtime.toggle_auto_mode();

    for theme in ThemeId::ALL {
        runtime.change_theme(theme);
        assert_eq!(runtime.effective_theme(), theme);
        assert!(!runtime.auto_mode());
    }
}

#[tokio::test(start_paused = true)]
async fn overridden_routes_always_yield_the_override() {
    let mut runtime = boot_empty(Rc::new(SystemPreferences::new(false, false))).await;
    runtime.navigate_to("/trailers");

    for theme in ThemeId::ALL {
        runtime.change_theme(theme);
        assert_eq!(runtime.effective_theme(), ThemeId::Dark);
    }
    runtime.toggle_auto_mode();
    assert_eq!(runtime.effective_theme(), ThemeId::Dark);

    runtime.navigate_to("/accessibility");
    assert_eq!(runtime.effective_theme(), ThemeId::HighContrast);
}

#[tokio::test(start_paused = true)]
async fn change_theme_twice_equals_once() {
    let mut runtime = boot_empty(Rc::new(SystemPreferences::new(false, false))).await;
    runtime.change_theme(ThemeId::HighContrast);
    let once = (runtime.preference(), runtime.effective_theme());
    runtime.change_theme(ThemeId::HighContrast);
    assert_eq!((runtime.preference(), runtime.effective_theme()), once);
}

#[tokio::test(start_paused = true)]
async fn importing_an_export_changes_nothing_observable() {
    let mut runtime = boot_empty(Rc::new(SystemPreferences::new(true, false))).await;
    runtime.toggle_auto_mode();
    runtime.settle().await;

    let before = (runtime.preference(), runtime.effective_theme());
    let exported = runtime.export_json().unwrap();
    runtime.import_json(&exported).unwrap();
    assert_eq!((runtime.preference(), runtime.effective_theme()), before);
    assert!(!runtime.is_transitioning());
}

#[tokio::test(start_paused = true)]
async fn server_marker_wins_over_stored_values() {
    let runtime = boot_with(
        ServerMarker::from_class_attribute("app theme-dark"),
        "theme=light",
        &[("theme", "highContrast")],
        Rc::new(SystemPreferences::new(false, false)),
    )
    .await;
    assert_eq!(runtime.base_theme(), ThemeId::Dark);
}

#[tokio::test(start_paused = true)]
async fn manual_change_freezes_theme_against_system_events() {
    let system = Rc::new(SystemPreferences::new(true, false));
    let mut runtime = boot_empty(system.clone()).await;

    runtime.toggle_auto_mode();
    assert_eq!(runtime.effective_theme(), ThemeId::Dark);

    runtime.change_theme(ThemeId::Light);
    assert!(!runtime.auto_mode());
    system.prefers_dark.publish(false);
    system.prefers_dark.publish(true);
    runtime.settle().await;
    assert_eq!(runtime.effective_theme(), ThemeId::Light);
}

#[tokio::test(start_paused = true)]
async fn nothing_stored_gives_light_manual() {
    let runtime = boot_empty(Rc::new(SystemPreferences::new(true, false))).await;
    assert_eq!(runtime.base_theme(), ThemeId::Light);
    assert!(!runtime.auto_mode());
}

#[tokio::test(start_paused = true)]
async fn auto_cookie_follows_later_system_notifications() {
    let system = Rc::new(SystemPreferences::new(true, false));
    let mut runtime = boot_with(
        ServerMarker::absent(),
        "theme=dark; autoTheme=true",
        &[],
        system.clone(),
    )
    .await;
    assert!(runtime.auto_mode());
    assert_eq!(runtime.base_theme(), ThemeId::Dark);

    system.prefers_dark.publish(false);
    runtime.next_event().await;
    assert_eq!(runtime.base_theme(), ThemeId::Light);
    assert!(runtime.auto_mode());
}

#[tokio::test(start_paused = true)]
async fn unknown_imported_theme_is_rejected_without_mutation() {
    let mut runtime = boot_empty(Rc::new(SystemPreferences::new(false, false))).await;
    runtime.change_theme(ThemeId::Dark);
    let before = runtime.preference();

    assert!(runtime
        .import_json(r#"{"currentTheme":"neon","autoTheme":false}"#)
        .is_err());
    assert_eq!(runtime.preference(), before);
}
