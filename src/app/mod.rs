//! Theme state engine and the single-threaded runtime that drives it.

mod bootstrap;
mod engine;
mod resolve;
mod runtime;
mod snapshot;
mod sources;
mod sync;

pub use bootstrap::{bootstrap_app_runtime, AppBootstrap};
pub use engine::{Effect, ThemeEngine, ThemePreference};
pub use resolve::{resolve_initial, Resolution, ResolutionSource};
pub use runtime::{RuntimeEvent, ThemeRuntime};
pub use snapshot::{SnapshotError, SnapshotResult, ThemeSnapshot, SNAPSHOT_FILE_NAME};
pub use sources::ThemeSources;
pub use sync::{PersistReport, PersistenceSynchronizer, RemoteWrite};
