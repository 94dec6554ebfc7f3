use serde::{Deserialize, Serialize};

/// Engine configuration, stored as `settings.json` in the config directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Name given to the group built on first run or recreated by validation.
    pub default_group_name: String,
    /// Name used when a group is created without one.
    pub new_group_name: String,
    /// Snapshot database location. `None` means `<data dir>/tabspaces.db`.
    pub database_path: Option<String>,
    /// Number of tabs the simulated host opens at startup.
    pub initial_tabs: usize,
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_group_name: "Default".to_string(),
            new_group_name: "New Group".to_string(),
            database_path: None,
            initial_tabs: 1,
            log_filter: "info".to_string(),
        }
    }
}
