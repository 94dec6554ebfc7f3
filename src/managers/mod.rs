// Tabspaces state managers
// Managers own state: the workspace engine and the snapshot store it writes to.

pub mod session_manager;
pub mod workspace_manager;
