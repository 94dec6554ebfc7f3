// Tabspaces host platform abstraction
// The host owns the live tab set: it creates, shows, hides and removes tabs,
// stores a per-tab opaque tag, and reports tab events back to the engine.
//
// `MemoryHost` simulates a browser for tests and the stdio harness.

use async_trait::async_trait;

use crate::types::errors::HostError;
use crate::types::tab::{CreateTab, HostTab, TabHandle, TabUpdate};

pub mod dirs;
pub mod memory;

pub use dirs::{get_config_dir, get_data_dir};
pub use memory::MemoryHost;

/// Tab events delivered by the host. Handlers run to completion per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Activated(TabHandle),
    Created(HostTab),
    Removed(TabHandle),
}

/// Operations the engine needs from the host's tab platform.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Every live tab, in tab-strip order.
    async fn query_tabs(&self) -> Result<Vec<HostTab>, HostError>;
    async fn get_tab(&self, handle: TabHandle) -> Result<HostTab, HostError>;
    /// The focused tab, if any.
    async fn active_tab(&self) -> Result<Option<HostTab>, HostError>;
    async fn create_tab(&self, props: CreateTab) -> Result<HostTab, HostError>;
    async fn show_tabs(&self, handles: &[TabHandle]) -> Result<(), HostError>;
    async fn hide_tabs(&self, handles: &[TabHandle]) -> Result<(), HostError>;
    async fn remove_tabs(&self, handles: &[TabHandle]) -> Result<(), HostError>;
    async fn update_tab(&self, handle: TabHandle, update: TabUpdate) -> Result<HostTab, HostError>;
    /// Session-scoped per-tab value; survives engine reloads within one browser session.
    async fn get_tab_value(&self, handle: TabHandle, key: &str) -> Result<Option<String>, HostError>;
    async fn set_tab_value(&self, handle: TabHandle, key: &str, value: &str)
        -> Result<(), HostError>;
}
