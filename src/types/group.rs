use super::session::GroupSnapshot;
use super::tab::{Oid, TabHandle, TabRef};

/// A named, ordered collection of tabs with one tracked active tab.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub oid: Oid,
    pub name: String,
    /// Must name a member of `tabs` whenever `tabs` is non-empty.
    pub active_tab: Option<Oid>,
    pub tabs: Vec<TabRef>,
    /// Set while the group's tabs are being closed; suppresses placeholder tabs.
    pub destroying: bool,
}

impl Group {
    pub fn new(oid: Oid, name: impl Into<String>) -> Self {
        Self {
            oid,
            name: name.into(),
            active_tab: None,
            tabs: Vec::new(),
            destroying: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Resolved handles of every member, in group order.
    pub fn handles(&self) -> Vec<TabHandle> {
        self.tabs.iter().filter_map(|t| t.handle).collect()
    }

    pub fn position_of(&self, handle: TabHandle) -> Option<usize> {
        self.tabs.iter().position(|t| t.handle == Some(handle))
    }

    pub fn contains(&self, handle: TabHandle) -> bool {
        self.position_of(handle).is_some()
    }

    pub fn contains_oid(&self, oid: &Oid) -> bool {
        self.tabs.iter().any(|t| &t.oid == oid)
    }

    /// Position of the active tab, falling back to the first tab.
    pub fn active_position(&self) -> Option<usize> {
        if self.tabs.is_empty() {
            return None;
        }
        let found = self
            .active_tab
            .as_ref()
            .and_then(|oid| self.tabs.iter().position(|t| &t.oid == oid));
        Some(found.unwrap_or(0))
    }

    pub fn active_handle(&self) -> Option<TabHandle> {
        self.active_position().and_then(|pos| self.tabs[pos].handle)
    }

    /// Appends a tab and returns its position. The first tab of an empty
    /// group becomes its active tab.
    pub fn append(&mut self, tab: TabRef) -> usize {
        if self.tabs.is_empty() {
            self.active_tab = Some(tab.oid.clone());
        }
        self.tabs.push(tab);
        self.tabs.len() - 1
    }

    /// Detaches the tab with the given handle, returning its former position.
    ///
    /// When the detached tab was active, the nearest neighbour takes over.
    pub fn detach(&mut self, handle: TabHandle) -> Option<(usize, TabRef)> {
        let pos = self.position_of(handle)?;
        let tab = self.tabs.remove(pos);

        if self.active_tab.as_ref() == Some(&tab.oid) {
            self.active_tab = if self.tabs.is_empty() {
                None
            } else {
                let next = pos.min(self.tabs.len() - 1);
                Some(self.tabs[next].oid.clone())
            };
        }

        Some((pos, tab))
    }

    /// Marks the tab with the given handle active. Returns false when it is not a member.
    pub fn set_active(&mut self, handle: TabHandle) -> bool {
        match self.position_of(handle) {
            Some(pos) => {
                self.active_tab = Some(self.tabs[pos].oid.clone());
                true
            }
            None => false,
        }
    }

    /// Points a dangling active tab at the first member. Returns true if anything changed.
    pub fn repair_active(&mut self) -> bool {
        let valid = match &self.active_tab {
            Some(oid) => self.contains_oid(oid),
            None => self.tabs.is_empty(),
        };
        if valid {
            return false;
        }
        self.active_tab = self.tabs.first().map(|t| t.oid.clone());
        true
    }

    pub fn encode(&self) -> GroupSnapshot {
        GroupSnapshot {
            oid: self.oid.clone(),
            name: self.name.clone(),
            active_tab_oid: self.active_tab.clone(),
            tabs: self.tabs.iter().map(TabRef::encode).collect(),
        }
    }

    /// Rebuilds a group from its snapshot. Tab handles are left unresolved.
    pub fn decode(snapshot: GroupSnapshot) -> Self {
        Self {
            oid: snapshot.oid,
            name: snapshot.name,
            active_tab: snapshot.active_tab_oid,
            tabs: snapshot.tabs.into_iter().map(TabRef::decode).collect(),
            destroying: false,
        }
    }
}
