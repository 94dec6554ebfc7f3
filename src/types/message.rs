//! Messages exchanged with the UI collaborator, one enum per direction.
//!
//! The JSON shape is `{"type": .., "verb": .., "info": {..}}`.

use serde::{Deserialize, Serialize};

use super::tab::TabHandle;

// --- UI → engine ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UiRequest {
    /// Full group/tab listing for rendering.
    Info,
    Group(GroupCommand),
    Tab(TabCommand),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", content = "info", rename_all = "lowercase")]
pub enum GroupCommand {
    Rename {
        index: usize,
        name: String,
    },
    Create {
        #[serde(default)]
        name: Option<String>,
    },
    Remove {
        index: usize,
    },
    Activate {
        index: usize,
    },
    #[serde(rename_all = "camelCase")]
    Move {
        from_index: usize,
        to_index: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", content = "info", rename_all = "lowercase")]
pub enum TabCommand {
    /// Transfer a tab between groups.
    #[serde(rename_all = "camelCase")]
    Move {
        tab_id: TabHandle,
        from_group: usize,
        to_group: usize,
    },
}

// --- engine → UI ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiEvent {
    /// Channel established and state restored.
    Ready,
    InfoResponse { info: WorkspaceInfo },
    GroupResponse { verb: GroupVerb },
    TabResponse { verb: TabVerb },
    /// Unsolicited push keeping a connected UI in sync.
    Tab(TabNotice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupVerb {
    Create,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabVerb {
    Move,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", content = "info", rename_all = "lowercase")]
pub enum TabNotice {
    Create {
        index: usize,
        position: usize,
        tab: TabHandle,
    },
    Remove {
        index: usize,
        position: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceInfo {
    pub active_index: usize,
    pub groups: Vec<GroupInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub name: String,
    /// Handles ordered by host tab-strip position.
    pub tabs: Vec<TabHandle>,
}

// --- stdio harness ---

/// One line of harness input: either a UI message or a simulated host action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "lowercase")]
pub enum InboundLine {
    Ui { message: UiRequest },
    Host { action: HostAction },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HostAction {
    Open,
    Close { tab: TabHandle },
    Activate { tab: TabHandle },
}
