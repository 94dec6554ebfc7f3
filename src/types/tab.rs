use std::fmt;

use serde::{Deserialize, Serialize};

/// Durable opaque identifier for a tab or a group.
///
/// Survives browser restarts, unlike [`TabHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Oid(String);

impl Oid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Oid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Oid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Host-assigned tab identifier. Only valid for the current browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabHandle(pub i64);

impl fmt::Display for TabHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live tab as reported by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTab {
    pub handle: TabHandle,
    /// Position in the host's tab strip.
    pub index: usize,
    pub active: bool,
    pub hidden: bool,
}

/// Properties for a tab the engine asks the host to open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTab {
    pub active: bool,
    pub index: Option<usize>,
}

impl CreateTab {
    /// A blank, focused tab at the front of the strip.
    pub fn placeholder() -> Self {
        Self {
            active: true,
            index: Some(0),
        }
    }
}

/// Partial update applied to a live tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabUpdate {
    pub active: Option<bool>,
    pub index: Option<usize>,
}

impl TabUpdate {
    pub fn activate() -> Self {
        Self {
            active: Some(true),
            index: None,
        }
    }

    pub fn move_to(index: usize) -> Self {
        Self {
            active: None,
            index: Some(index),
        }
    }
}

/// A tab as tracked by a group: its durable identity plus the handle
/// it has in this session (`None` when it could not be resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabRef {
    pub oid: Oid,
    pub handle: Option<TabHandle>,
}

impl TabRef {
    pub fn new(oid: Oid, handle: TabHandle) -> Self {
        Self {
            oid,
            handle: Some(handle),
        }
    }

    /// A reference restored from a snapshot, before its handle is resolved.
    pub fn unresolved(oid: Oid) -> Self {
        Self { oid, handle: None }
    }

    /// Tabs persist as their bare OID.
    pub fn encode(&self) -> Oid {
        self.oid.clone()
    }

    pub fn decode(oid: Oid) -> Self {
        Self::unresolved(oid)
    }
}
