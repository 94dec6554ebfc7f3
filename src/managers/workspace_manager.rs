//! Workspace engine: owns the group tree, reconciles it against the host's
//! live tabs, and serves UI commands and host tab events.
//!
//! Every mutating operation ends by writing the full snapshot to the store.
//! A crash between a host call and that write leaves the two out of sync
//! until the next [`WorkspaceManager::validate`] repairs it.

use futures_util::future::try_join_all;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::managers::session_manager::SessionStore;
use crate::platform::{HostEvent, MemoryHost, TabHost};
use crate::services::identity::{new_oid, read_tag, resolve_tab, tag_tab};
use crate::types::errors::{EngineError, HostError};
use crate::types::group::Group;
use crate::types::message::{GroupInfo, TabNotice, UiEvent, WorkspaceInfo};
use crate::types::session::WorkspaceSnapshot;
use crate::types::settings::EngineSettings;
use crate::types::tab::{CreateTab, HostTab, Oid, TabHandle, TabRef, TabUpdate};
use crate::types::workspace::Workspace;

/// Lifecycle of the engine. Commands and events are only accepted when `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Restoring,
    Ready,
}

pub struct WorkspaceManager<H: TabHost, S: SessionStore> {
    host: H,
    store: S,
    settings: EngineSettings,
    state: EngineState,
    workspace: Workspace,
    port: Option<UnboundedSender<UiEvent>>,
}

/// Resolves the live handle of every tab in a freshly decoded group.
async fn resolve_group<H: TabHost>(host: &H, mut group: Group) -> Result<Group, HostError> {
    for tab in &mut group.tabs {
        tab.handle = resolve_tab(host, &tab.oid).await?;
    }
    Ok(group)
}

impl<H: TabHost, S: SessionStore> WorkspaceManager<H, S> {
    pub fn new(host: H, store: S, settings: EngineSettings) -> Self {
        Self {
            host,
            store,
            settings,
            state: EngineState::Uninitialized,
            workspace: Workspace {
                active_group: Oid::new(""),
                groups: Vec::new(),
            },
            port: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gives back the host and store, e.g. to restart against the same browser.
    pub fn into_parts(self) -> (H, S) {
        (self.host, self.store)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        self.workspace.encode()
    }

    /// Index of the visible group. Always valid once validation has run.
    pub fn active_index(&self) -> usize {
        self.workspace.active_index().unwrap_or(0)
    }

    fn ensure_ready(&self) -> Result<(), EngineError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(EngineError::NotReady)
        }
    }

    fn persist(&self) -> Result<(), EngineError> {
        self.store.save(&self.workspace.encode())?;
        Ok(())
    }

    fn notify(&mut self, event: UiEvent) {
        if let Some(port) = &self.port {
            if port.send(event).is_err() {
                debug!("UI port closed, dropping it");
                self.port = None;
            }
        }
    }

    /// Sends a message to the attached UI, if any.
    pub fn post(&mut self, event: UiEvent) {
        self.notify(event);
    }

    // --- startup ---

    /// Rebuilds the tree from the stored snapshot (or from the live tabs on
    /// first run), validates it against the host, persists it and marks the
    /// engine ready. Runs once; later calls are no-ops.
    pub async fn restore(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Ready => return Ok(()),
            EngineState::Restoring => return Err(EngineError::NotReady),
            EngineState::Uninitialized => {}
        }

        self.state = EngineState::Restoring;
        let result = self.restore_inner().await;
        self.state = match result {
            Ok(()) => EngineState::Ready,
            Err(_) => EngineState::Uninitialized,
        };
        result
    }

    async fn restore_inner(&mut self) -> Result<(), EngineError> {
        match self.store.load()? {
            None => self.build().await?,
            Some(snapshot) => self.restore_from(snapshot).await?,
        }
        self.validate().await?;
        info!(
            groups = self.workspace.len(),
            active = self.active_index(),
            "workspace restored"
        );
        Ok(())
    }

    /// First run: one default group holding every live tab in discovery order.
    async fn build(&mut self) -> Result<(), EngineError> {
        let mut group = Group::new(new_oid(), self.settings.default_group_name.clone());
        for tab in self.host.query_tabs().await? {
            let oid = new_oid();
            tag_tab(&self.host, tab.handle, &oid).await?;
            group.append(TabRef::new(oid, tab.handle));
        }
        if let Some(focused) = self.host.active_tab().await? {
            group.set_active(focused.handle);
        }
        info!(tabs = group.len(), "no snapshot found, built default group");
        self.workspace = Workspace::new(group);
        Ok(())
    }

    /// Later runs: decode the snapshot and re-resolve every tab's handle.
    /// Groups resolve concurrently.
    async fn restore_from(&mut self, snapshot: WorkspaceSnapshot) -> Result<(), EngineError> {
        let decoded = Workspace::decode(snapshot);
        let host = &self.host;
        let groups =
            try_join_all(decoded.groups.into_iter().map(|g| resolve_group(host, g))).await?;
        self.workspace = Workspace {
            active_group: decoded.active_group,
            groups,
        };
        debug!(groups = self.workspace.len(), "snapshot decoded");
        Ok(())
    }

    /// Repairs drift between the tree and the live tab set, then persists.
    ///
    /// Idempotent: with no host change in between, a second run writes the
    /// same snapshot.
    pub async fn validate(&mut self) -> Result<(), EngineError> {
        if self.workspace.is_empty() {
            warn!("no groups, creating a default group");
            let group = Group::new(new_oid(), self.settings.default_group_name.clone());
            self.workspace = Workspace::new(group);
        }
        if self.workspace.ensure_active() {
            warn!("active group pointer did not resolve, reset to first group");
        }
        let dropped = self.workspace.prune();
        if dropped > 0 {
            warn!(dropped, "dropped stale or duplicate tab references");
        }

        let active = self.active_index();
        let mut adopted = 0;
        for tab in self.host.query_tabs().await? {
            let tag = read_tag(&self.host, tab.handle).await?;
            if let Some((g, pos)) = self.workspace.find_tab(tab.handle) {
                let oid = &self.workspace.groups[g].tabs[pos].oid;
                if tag.as_ref() != Some(oid) {
                    tag_tab(&self.host, tab.handle, oid).await?;
                }
                continue;
            }
            let oid = new_oid();
            tag_tab(&self.host, tab.handle, &oid).await?;
            self.workspace.groups[active].append(TabRef::new(oid, tab.handle));
            adopted += 1;
        }
        if adopted > 0 {
            info!(adopted, "orphan tabs moved into the active group");
        }

        self.assert_visibility().await?;
        self.persist()
    }

    /// Shows the active group and hides every other group. Not a diff.
    async fn assert_visibility(&mut self) -> Result<(), EngineError> {
        let active = self.active_index();
        self.show_group(active).await?;
        for (i, group) in self.workspace.groups.iter().enumerate() {
            if i != active {
                self.host.hide_tabs(&group.handles()).await?;
            }
        }
        Ok(())
    }

    /// Reveals a group's tabs and focuses its active tab. An empty group gets
    /// a blank tab instead.
    async fn show_group(&mut self, index: usize) -> Result<(), EngineError> {
        let group = self.workspace.group(index)?;
        let (handles, focus) = (group.handles(), group.active_handle());
        if handles.is_empty() {
            self.open_placeholder(index).await?;
            return Ok(());
        }
        self.host.show_tabs(&handles).await?;
        if let Some(handle) = focus {
            self.host.update_tab(handle, TabUpdate::activate()).await?;
        }
        Ok(())
    }

    /// Opens a focused blank tab and tracks it in group `index` right away,
    /// so its `Created` event is a no-op whichever group is active by then.
    /// Returns the tab's handle and position.
    async fn open_placeholder(&mut self, index: usize) -> Result<(TabHandle, usize), EngineError> {
        let tab = self.host.create_tab(CreateTab::placeholder()).await?;
        let oid = new_oid();
        tag_tab(&self.host, tab.handle, &oid).await?;
        let position = self
            .workspace
            .group_mut(index)?
            .append(TabRef::new(oid, tab.handle));
        debug!(tab = %tab.handle, group = index, "blank tab opened");
        Ok((tab.handle, position))
    }

    // --- UI port ---

    /// Attaches the UI channel and tells it the engine is ready.
    pub fn attach_port(&mut self, port: UnboundedSender<UiEvent>) -> Result<(), EngineError> {
        self.persist()?;
        self.port = Some(port);
        self.notify(UiEvent::Ready);
        debug!("UI port attached");
        Ok(())
    }

    pub fn detach_port(&mut self) -> Result<(), EngineError> {
        self.persist()?;
        self.port = None;
        debug!("UI port detached");
        Ok(())
    }

    pub fn has_port(&self) -> bool {
        self.port.is_some()
    }

    /// Active index plus each group's name and tab handles in strip order.
    pub async fn info(&self) -> Result<WorkspaceInfo, EngineError> {
        self.ensure_ready()?;
        let mut groups = Vec::with_capacity(self.workspace.len());
        for group in &self.workspace.groups {
            let mut tabs: Vec<HostTab> = Vec::with_capacity(group.len());
            for handle in group.handles() {
                match self.host.get_tab(handle).await {
                    Ok(tab) => tabs.push(tab),
                    Err(HostError::TabNotFound(_)) => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            tabs.sort_by_key(|t| t.index);
            groups.push(GroupInfo {
                name: group.name.clone(),
                tabs: tabs.into_iter().map(|t| t.handle).collect(),
            });
        }
        Ok(WorkspaceInfo {
            active_index: self.active_index(),
            groups,
        })
    }

    // --- commands ---

    /// Appends an empty group and returns its index.
    pub async fn create_group(&mut self, name: Option<String>) -> Result<usize, EngineError> {
        self.ensure_ready()?;
        let name = name.unwrap_or_else(|| self.settings.new_group_name.clone());
        debug!(%name, "creating group");
        self.workspace.groups.push(Group::new(new_oid(), name));
        self.persist()?;
        Ok(self.workspace.len() - 1)
    }

    pub async fn rename_group(&mut self, index: usize, name: impl Into<String>) -> Result<(), EngineError> {
        self.ensure_ready()?;
        self.workspace.group_mut(index)?.name = name.into();
        self.persist()
    }

    /// Closes a group's tabs and drops it. Removing the active group first
    /// activates a neighbour; removing the last group leaves a fresh empty one.
    pub async fn remove_group(&mut self, index: usize) -> Result<(), EngineError> {
        self.ensure_ready()?;
        let was_active = self.workspace.active_index() == Some(index);
        let handles = {
            let group = self.workspace.group_mut(index)?;
            group.destroying = true;
            group.handles()
        };

        if was_active {
            if self.workspace.len() == 1 {
                let name = self.settings.default_group_name.clone();
                self.workspace.groups.push(Group::new(new_oid(), name));
            }
            let next = if index == 0 { 1 } else { 0 };
            self.activate_group_inner(next, true).await?;
        }

        self.host.remove_tabs(&handles).await?;
        let removed = self.workspace.groups.remove(index);
        info!(name = %removed.name, tabs = handles.len(), "group removed");
        self.persist()
    }

    pub async fn activate_group(&mut self, index: usize, fast: bool) -> Result<(), EngineError> {
        self.ensure_ready()?;
        self.activate_group_inner(index, fast).await
    }

    /// Shows the target group, then hides the previous one. Fast mode skips
    /// the hide; it is used when the previous group is being removed anyway.
    async fn activate_group_inner(&mut self, index: usize, fast: bool) -> Result<(), EngineError> {
        let target = self.workspace.group(index)?.oid.clone();
        let previous = self.workspace.active_index();
        if previous == Some(index) {
            return Ok(());
        }

        self.workspace.active_group = target;
        self.show_group(index).await?;
        if !fast {
            if let Some(prev) = previous {
                let handles = self.workspace.groups[prev].handles();
                self.host.hide_tabs(&handles).await?;
            }
        }
        debug!(from = ?previous, to = index, fast, "group activated");
        self.persist()
    }

    /// Reorders groups. The active group keeps its identity; its index follows it.
    pub async fn move_group(&mut self, from: usize, to: usize) -> Result<(), EngineError> {
        self.ensure_ready()?;
        self.workspace.move_group(from, to)?;
        self.persist()
    }

    /// Moves a tab to the end of another group, showing or hiding it to match
    /// the destination's visibility.
    pub async fn transfer_tab(&mut self, handle: TabHandle, from: usize, to: usize) -> Result<(), EngineError> {
        self.ensure_ready()?;
        self.workspace.group(to)?;
        let active = self.active_index();

        let (_, tab) = self
            .workspace
            .group_mut(from)?
            .detach(handle)
            .ok_or(EngineError::TabNotInGroup {
                tab: handle.0,
                group: from,
            })?;
        let position = self.workspace.group_mut(to)?.append(tab);
        self.host.update_tab(handle, TabUpdate::move_to(position)).await?;

        if to == active {
            self.host.show_tabs(&[handle]).await?;
        } else {
            // The focused tab cannot be hidden; hand focus to the source group first.
            if from == active && self.host.get_tab(handle).await?.active {
                self.show_group(from).await?;
            }
            self.host.hide_tabs(&[handle]).await?;
        }
        debug!(tab = %handle, from, to, "tab transferred");
        self.persist()
    }

    // --- host events ---

    pub async fn handle_event(&mut self, event: HostEvent) -> Result<(), EngineError> {
        match event {
            HostEvent::Activated(handle) => self.on_tab_activated(handle).await,
            HostEvent::Created(tab) => self.on_tab_created(tab).await,
            HostEvent::Removed(handle) => self.on_tab_removed(handle).await,
        }
    }

    /// Tracks the focused tab. Focusing a tab of a hidden group switches to that group.
    ///
    /// Events for a tab that has since lost focus are stale and only undo
    /// the reveal the host did when it focused a hidden group's tab.
    pub async fn on_tab_activated(&mut self, handle: TabHandle) -> Result<(), EngineError> {
        self.ensure_ready()?;
        let active = self.active_index();
        let focused = self.host.active_tab().await?.map(|t| t.handle);
        if focused != Some(handle) {
            if let Some((group, _)) = self.workspace.find_tab(handle) {
                if group != active {
                    self.host.hide_tabs(&[handle]).await?;
                }
            }
            debug!(tab = %handle, "stale activation ignored");
            return Ok(());
        }
        if !self.workspace.groups[active].set_active(handle) {
            if let Some(i) = self.workspace.groups.iter().position(|g| g.contains(handle)) {
                self.workspace.groups[i].set_active(handle);
                debug!(tab = %handle, group = i, "hidden tab focused, switching group");
                self.activate_group_inner(i, false).await?;
            }
        }
        self.persist()
    }

    /// New tabs join the visible group.
    pub async fn on_tab_created(&mut self, tab: HostTab) -> Result<(), EngineError> {
        self.ensure_ready()?;
        if self.workspace.is_tracked(tab.handle) {
            debug!(tab = %tab.handle, "created tab already tracked");
            return Ok(());
        }

        let index = self.active_index();
        let oid = new_oid();
        match tag_tab(&self.host, tab.handle, &oid).await {
            Ok(()) => {}
            Err(HostError::TabNotFound(_)) => {
                debug!(tab = %tab.handle, "created tab closed before it was tracked");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
        let position = self.workspace.groups[index].append(TabRef::new(oid, tab.handle));
        self.notify(UiEvent::Tab(TabNotice::Create {
            index,
            position,
            tab: tab.handle,
        }));
        self.persist()
    }

    /// Drops a closed tab. The visible group is never left without tabs
    /// unless it is being torn down: its replacement blank tab joins it here,
    /// before any queued focus change can switch groups.
    pub async fn on_tab_removed(&mut self, handle: TabHandle) -> Result<(), EngineError> {
        self.ensure_ready()?;
        let Some((index, _)) = self.workspace.find_tab(handle) else {
            debug!(tab = %handle, "removed tab was not tracked");
            return Ok(());
        };

        let active = self.active_index();
        let group = &mut self.workspace.groups[index];
        let was_last = group.len() == 1;
        let destroying = group.destroying;
        let Some((position, _)) = group.detach(handle) else {
            return Ok(());
        };

        self.notify(UiEvent::Tab(TabNotice::Remove { index, position }));
        if was_last && index == active && !destroying {
            debug!(group = index, "last tab closed, opening a blank tab");
            let (tab, position) = self.open_placeholder(index).await?;
            self.notify(UiEvent::Tab(TabNotice::Create { index, position, tab }));
        }
        self.persist()
    }
}

impl<S: SessionStore> WorkspaceManager<MemoryHost, S> {
    /// Feeds every event queued by the simulated host back into the engine,
    /// including events raised while handling earlier ones.
    pub async fn pump_events(&mut self) -> Result<usize, EngineError> {
        let mut handled = 0;
        loop {
            let events = self.host.drain_events();
            if events.is_empty() {
                return Ok(handled);
            }
            for event in events {
                self.handle_event(event).await?;
                handled += 1;
            }
        }
    }
}
