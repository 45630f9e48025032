pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod preference;
pub mod route;
pub mod state;
pub mod storage;
pub mod theme;
pub mod ui;
pub use app::{ThemeRuntime, ThemeSnapshot};
pub use error::{AppError, AppResult};
pub use theme::ThemeId;

/// Boots a runtime from the on-disk adapters and the OS color scheme.
pub async fn run(marker: storage::ServerMarker) -> ThemeRuntime {
    logging::init();
    tracing::info!("starting themestate");

    let bootstrap = app::bootstrap_app_runtime(marker);
    let runtime =
        ThemeRuntime::boot(bootstrap.sources, bootstrap.system, &bootstrap.config).await;

    tracing::info!(
        theme = %runtime.effective_theme(),
        source = ?runtime.resolution_source(),
        "startup complete"
    );
    runtime
}
