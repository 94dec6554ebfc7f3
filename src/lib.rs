//! Tabspaces: switchable tab groups for a browser.
//!
//! Keeps a persisted group/tab tree consistent with the host's live tab set.
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
