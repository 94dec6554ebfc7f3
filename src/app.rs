//! App Core for Tabspaces.
//!
//! Wires settings, the snapshot store, the simulated host and the workspace
//! engine, and owns the engine behind an async mutex so UI messages and host
//! events are handled one at a time.

use std::path::PathBuf;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::sync::Mutex;
use tracing::info;

use crate::managers::session_manager::{SessionStore, SqliteSessionStore};
use crate::managers::workspace_manager::WorkspaceManager;
use crate::platform::{self, MemoryHost};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::EngineError;
use crate::types::message::UiEvent;
use crate::types::settings::EngineSettings;

/// Snapshot database location: the configured path, else `<data dir>/tabspaces.db`.
pub fn resolve_database_path(settings: &EngineSettings) -> PathBuf {
    match &settings.database_path {
        Some(path) => PathBuf::from(path),
        None => platform::get_data_dir().join("tabspaces.db"),
    }
}

/// Central application struct holding the settings and the engine.
pub struct App<S: SessionStore = SqliteSessionStore> {
    pub settings_engine: SettingsEngine,
    pub engine: Mutex<WorkspaceManager<MemoryHost, S>>,
}

impl App<SqliteSessionStore> {
    /// Opens the snapshot database named by the settings and seeds the
    /// simulated host with `initial_tabs` tabs.
    pub fn new(settings_engine: SettingsEngine) -> Result<Self, Box<dyn std::error::Error>> {
        let settings = settings_engine.get_settings().clone();
        let db_path = resolve_database_path(&settings);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = SqliteSessionStore::open(&db_path.to_string_lossy())
            .map_err(|e| format!("snapshot store init failed: {}", e))?;
        info!(path = %db_path.display(), "snapshot store opened");

        let host = MemoryHost::with_tabs(settings.initial_tabs);
        Ok(Self::with_parts(settings_engine, host, store))
    }
}

impl<S: SessionStore> App<S> {
    pub fn with_parts(settings_engine: SettingsEngine, host: MemoryHost, store: S) -> Self {
        let settings = settings_engine.get_settings().clone();
        Self {
            settings_engine,
            engine: Mutex::new(WorkspaceManager::new(host, store, settings)),
        }
    }

    /// Startup sequence: restore and validate, settle host events raised by
    /// validation, then attach the UI port. Returns the UI-bound event stream.
    pub async fn startup(&self) -> Result<UnboundedReceiver<UiEvent>, EngineError> {
        let mut engine = self.engine.lock().await;
        engine.restore().await?;
        engine.pump_events().await?;

        let (tx, rx) = unbounded_channel();
        engine.attach_port(tx)?;
        Ok(rx)
    }

    /// Sends a message to the UI through the engine's port.
    pub async fn post(&self, event: UiEvent) {
        self.engine.lock().await.post(event);
    }

    /// Shutdown sequence: persist and drop the UI port, which ends the event stream.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        self.engine.lock().await.detach_port()
    }
}
