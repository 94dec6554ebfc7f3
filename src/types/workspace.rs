use std::collections::HashSet;

use super::errors::EngineError;
use super::group::Group;
use super::session::WorkspaceSnapshot;
use super::tab::{Oid, TabHandle};

/// The root of the group tree: an ordered list of groups and the active group's OID.
///
/// The active index is always derived from `active_group`, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub active_group: Oid,
    pub groups: Vec<Group>,
}

impl Workspace {
    pub fn new(first: Group) -> Self {
        Self {
            active_group: first.oid.clone(),
            groups: vec![first],
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn index_of(&self, oid: &Oid) -> Option<usize> {
        self.groups.iter().position(|g| &g.oid == oid)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.index_of(&self.active_group)
    }

    pub fn group(&self, index: usize) -> Result<&Group, EngineError> {
        self.groups
            .get(index)
            .ok_or(EngineError::InvalidGroupIndex(index))
    }

    pub fn group_mut(&mut self, index: usize) -> Result<&mut Group, EngineError> {
        self.groups
            .get_mut(index)
            .ok_or(EngineError::InvalidGroupIndex(index))
    }

    /// Locates a tab by handle, checking the active group before the rest in order.
    /// Returns `(group index, position in group)`.
    pub fn find_tab(&self, handle: TabHandle) -> Option<(usize, usize)> {
        let active = self.active_index();
        if let Some(i) = active {
            if let Some(pos) = self.groups[i].position_of(handle) {
                return Some((i, pos));
            }
        }
        self.groups
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != active)
            .find_map(|(i, g)| g.position_of(handle).map(|pos| (i, pos)))
    }

    pub fn is_tracked(&self, handle: TabHandle) -> bool {
        self.groups.iter().any(|g| g.contains(handle))
    }

    /// Union of every group's tab OIDs.
    pub fn recorded_oids(&self) -> HashSet<Oid> {
        self.groups
            .iter()
            .flat_map(|g| g.tabs.iter().map(|t| t.oid.clone()))
            .collect()
    }

    /// Points the active pointer at the first group when it does not resolve.
    /// Returns true if it had to be reset.
    pub fn ensure_active(&mut self) -> bool {
        if self.active_index().is_some() {
            return false;
        }
        match self.groups.first() {
            Some(first) => {
                self.active_group = first.oid.clone();
                true
            }
            None => false,
        }
    }

    /// Drops tab references that could not be resolved this session and
    /// duplicate OIDs (first occurrence wins), then repairs each group's
    /// active tab pointer. Returns how many references were dropped.
    pub fn prune(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut dropped = 0;
        for group in &mut self.groups {
            let before = group.tabs.len();
            group
                .tabs
                .retain(|t| t.handle.is_some() && seen.insert(t.oid.clone()));
            dropped += before - group.tabs.len();
            group.repair_active();
        }
        dropped
    }

    /// Moves the group at `from` so it ends up at `to`.
    pub fn move_group(&mut self, from: usize, to: usize) -> Result<(), EngineError> {
        if from >= self.groups.len() {
            return Err(EngineError::InvalidGroupIndex(from));
        }
        if to >= self.groups.len() {
            return Err(EngineError::InvalidGroupIndex(to));
        }
        let group = self.groups.remove(from);
        self.groups.insert(to, group);
        Ok(())
    }

    pub fn encode(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            active_group_oid: self.active_group.clone(),
            groups: self.groups.iter().map(Group::encode).collect(),
        }
    }

    /// Rebuilds the tree from a snapshot. Tab handles are left unresolved.
    pub fn decode(snapshot: WorkspaceSnapshot) -> Self {
        Self {
            active_group: snapshot.active_group_oid,
            groups: snapshot.groups.into_iter().map(Group::decode).collect(),
        }
    }
}
