//! In-memory browser used by tests and the stdio harness.
//!
//! Tabs live in a single strip; every mutation queues the [`HostEvent`]s a
//! real browser would fire. Callers drain them with [`MemoryHost::drain_events`]
//! and feed them to the engine. Like a real browser, the focused tab cannot be
//! hidden: `hide_tabs` skips it.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{HostEvent, TabHost};
use crate::types::errors::HostError;
use crate::types::tab::{CreateTab, HostTab, TabHandle, TabUpdate};

#[derive(Debug, Clone)]
struct MemoryTab {
    handle: TabHandle,
    hidden: bool,
    values: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct HostState {
    tabs: Vec<MemoryTab>,
    active: Option<TabHandle>,
    next_handle: i64,
    events: VecDeque<HostEvent>,
}

impl HostState {
    fn position(&self, handle: TabHandle) -> Option<usize> {
        self.tabs.iter().position(|t| t.handle == handle)
    }

    fn describe(&self, index: usize) -> HostTab {
        let tab = &self.tabs[index];
        HostTab {
            handle: tab.handle,
            index,
            active: self.active == Some(tab.handle),
            hidden: tab.hidden,
        }
    }

    fn get(&self, handle: TabHandle) -> Result<HostTab, HostError> {
        self.position(handle)
            .map(|i| self.describe(i))
            .ok_or(HostError::TabNotFound(handle.0))
    }

    fn open(&mut self, props: CreateTab) -> HostTab {
        self.next_handle += 1;
        let tab = MemoryTab {
            handle: TabHandle(self.next_handle),
            hidden: false,
            values: HashMap::new(),
        };
        let handle = tab.handle;
        let index = props
            .index
            .unwrap_or(self.tabs.len())
            .min(self.tabs.len());
        self.tabs.insert(index, tab);
        self.events.push_back(HostEvent::Created(self.describe(index)));
        if props.active || self.active.is_none() {
            self.focus(handle);
        }
        self.describe(index)
    }

    fn focus(&mut self, handle: TabHandle) {
        if let Some(i) = self.position(handle) {
            self.tabs[i].hidden = false;
        }
        if self.active != Some(handle) {
            self.active = Some(handle);
            self.events.push_back(HostEvent::Activated(handle));
        }
    }

    fn close(&mut self, handle: TabHandle) {
        let Some(index) = self.position(handle) else {
            return;
        };
        self.tabs.remove(index);
        self.events.push_back(HostEvent::Removed(handle));

        if self.active == Some(handle) {
            self.active = None;
            // Prefer the nearest visible tab, to the right first.
            let visible = (index..self.tabs.len())
                .chain((0..index).rev())
                .find(|&i| !self.tabs[i].hidden);
            let next = visible
                .or_else(|| (!self.tabs.is_empty()).then(|| index.min(self.tabs.len() - 1)));
            if let Some(i) = next {
                let next_handle = self.tabs[i].handle;
                self.focus(next_handle);
            }
        }
    }
}

/// A simulated browser tab strip.
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host with `count` open tabs, the first one focused. No events are queued.
    pub fn with_tabs(count: usize) -> Self {
        let host = Self::new();
        {
            let mut state = host.lock_state();
            for _ in 0..count {
                state.open(CreateTab::default());
            }
            state.events.clear();
        }
        host
    }

    fn lock_state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn state(&self) -> Result<MutexGuard<'_, HostState>, HostError> {
        self.state
            .lock()
            .map_err(|e| HostError::Failed(format!("host state poisoned: {}", e)))
    }

    /// User action: open a new focused tab at the end of the strip.
    pub fn open_tab(&self) -> HostTab {
        self.lock_state().open(CreateTab {
            active: true,
            index: None,
        })
    }

    /// User action: close a tab.
    pub fn close_tab(&self, handle: TabHandle) {
        self.lock_state().close(handle);
    }

    /// User action: focus a tab, revealing it if hidden.
    pub fn activate_tab(&self, handle: TabHandle) {
        let mut state = self.lock_state();
        if state.position(handle).is_some() {
            state.focus(handle);
        }
    }

    /// Takes every queued event, oldest first.
    pub fn drain_events(&self) -> Vec<HostEvent> {
        self.lock_state().events.drain(..).collect()
    }

    /// Live handles in strip order.
    pub fn handles(&self) -> Vec<TabHandle> {
        self.lock_state().tabs.iter().map(|t| t.handle).collect()
    }

    pub fn tab(&self, handle: TabHandle) -> Option<HostTab> {
        self.lock_state().get(handle).ok()
    }

    pub fn is_hidden(&self, handle: TabHandle) -> bool {
        self.tab(handle).map(|t| t.hidden).unwrap_or(false)
    }

    pub fn focused(&self) -> Option<TabHandle> {
        self.lock_state().active
    }

    pub fn tab_value(&self, handle: TabHandle, key: &str) -> Option<String> {
        let state = self.lock_state();
        state
            .position(handle)
            .and_then(|i| state.tabs[i].values.get(key).cloned())
    }

    /// Drops a tab's stored values, as if its tag had been lost.
    pub fn clear_tab_values(&self, handle: TabHandle) {
        let mut state = self.lock_state();
        if let Some(i) = state.position(handle) {
            state.tabs[i].values.clear();
        }
    }

    /// Simulates a browser restart: every handle changes, tags survive, nothing is hidden.
    pub fn restart(&self) {
        let mut state = self.lock_state();
        let focused = state.active.and_then(|h| state.position(h));
        let offset = state.next_handle;
        for tab in &mut state.tabs {
            tab.handle = TabHandle(tab.handle.0 + offset);
            tab.hidden = false;
        }
        state.next_handle += offset;
        let active = focused.map(|i| state.tabs[i].handle);
        state.active = active;
        state.events.clear();
    }
}

#[async_trait]
impl TabHost for MemoryHost {
    async fn query_tabs(&self) -> Result<Vec<HostTab>, HostError> {
        let state = self.state()?;
        Ok((0..state.tabs.len()).map(|i| state.describe(i)).collect())
    }

    async fn get_tab(&self, handle: TabHandle) -> Result<HostTab, HostError> {
        self.state()?.get(handle)
    }

    async fn active_tab(&self) -> Result<Option<HostTab>, HostError> {
        let state = self.state()?;
        Ok(state.active.and_then(|h| state.get(h).ok()))
    }

    async fn create_tab(&self, props: CreateTab) -> Result<HostTab, HostError> {
        Ok(self.state()?.open(props))
    }

    async fn show_tabs(&self, handles: &[TabHandle]) -> Result<(), HostError> {
        let mut state = self.state()?;
        for &handle in handles {
            if let Some(i) = state.position(handle) {
                state.tabs[i].hidden = false;
            }
        }
        Ok(())
    }

    async fn hide_tabs(&self, handles: &[TabHandle]) -> Result<(), HostError> {
        let mut state = self.state()?;
        for &handle in handles {
            if state.active == Some(handle) {
                continue;
            }
            if let Some(i) = state.position(handle) {
                state.tabs[i].hidden = true;
            }
        }
        Ok(())
    }

    async fn remove_tabs(&self, handles: &[TabHandle]) -> Result<(), HostError> {
        let mut state = self.state()?;
        for &handle in handles {
            state.close(handle);
        }
        Ok(())
    }

    async fn update_tab(&self, handle: TabHandle, update: TabUpdate) -> Result<HostTab, HostError> {
        let mut state = self.state()?;
        let mut index = state
            .position(handle)
            .ok_or(HostError::TabNotFound(handle.0))?;
        if let Some(target) = update.index {
            let tab = state.tabs.remove(index);
            index = target.min(state.tabs.len());
            state.tabs.insert(index, tab);
        }
        if update.active == Some(true) {
            state.focus(handle);
        }
        Ok(state.describe(index))
    }

    async fn get_tab_value(&self, handle: TabHandle, key: &str) -> Result<Option<String>, HostError> {
        let state = self.state()?;
        let i = state
            .position(handle)
            .ok_or(HostError::TabNotFound(handle.0))?;
        Ok(state.tabs[i].values.get(key).cloned())
    }

    async fn set_tab_value(
        &self,
        handle: TabHandle,
        key: &str,
        value: &str,
    ) -> Result<(), HostError> {
        let mut state = self.state()?;
        let i = state
            .position(handle)
            .ok_or(HostError::TabNotFound(handle.0))?;
        state.tabs[i].values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
