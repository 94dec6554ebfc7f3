// Tabspaces services
// Stateless helpers and file-backed services: tab identity and settings.

pub mod identity;
pub mod settings_engine;
