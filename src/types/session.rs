use serde::{Deserialize, Serialize};

use super::tab::Oid;

/// Persisted form of the whole workspace tree, written after every mutation.
///
/// Older snapshots used `active` for the root pointer; it is still accepted on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    #[serde(alias = "active")]
    pub active_group_oid: Oid,
    #[serde(default)]
    pub groups: Vec<GroupSnapshot>,
}

/// Persisted form of one group. Tabs are stored as their bare OIDs, in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupSnapshot {
    #[serde(alias = "yuki")]
    pub oid: Oid,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "active")]
    pub active_tab_oid: Option<Oid>,
    #[serde(default)]
    pub tabs: Vec<Oid>,
}
