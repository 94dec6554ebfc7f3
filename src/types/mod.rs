// Tabspaces shared type definitions
// Each submodule defines types used across the engine, the stores and the UI channel.

pub mod errors;
pub mod group;
pub mod message;
pub mod session;
pub mod settings;
pub mod tab;
pub mod workspace;
