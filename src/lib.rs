pub mod catalog;
pub mod db;
pub mod errors;
pub mod filter;
pub mod keys;
pub mod merge;
pub mod models;
pub mod progress;
pub mod session;
pub mod store;
pub mod validation;

pub use crate::catalog::Catalog;
pub use crate::db::Database;
pub use crate::errors::{AppError, AppResult};
pub use crate::keys::derive_key;
pub use crate::models::{AddTopicPayload, SessionEvent, SessionSnapshot, Topic, TrackerSettings};
pub use crate::session::SessionState;
pub use crate::store::{MemoryStore, Store};

use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Opens the on-disk store under `app_data_dir`, reads settings and returns an initialized
/// session.
pub async fn open(app_data_dir: &Path) -> AppResult<SessionState> {
    let db_path = app_data_dir.join("state.sqlite");
    let db = Database::new(&db_path)?;
    let settings = db.get_settings()?;
    tracing::info!(path = %db_path.display(), asset = %settings.catalog_asset, "opening tracker store");

    let mut session = SessionState::new(Arc::new(db), Catalog::from_settings(&settings));
    session.initialize().await;
    Ok(session)
}

/// JSON logs to `<app_data_dir>/logs/tracker.log`, rolled daily. `RUST_LOG` overrides the level.
pub fn init_tracing(app_data_dir: &Path) -> AppResult<()> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "tracker.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}
