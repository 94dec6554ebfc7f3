//! Property-based tests for snapshot persistence.
//!
//! A snapshot written by the engine must come back unchanged: through JSON,
//! through the SQLite store, and through a full engine restore against a host
//! whose tabs carry the matching tags.

use proptest::prelude::*;

use tabspaces::managers::session_manager::{MemorySessionStore, SessionStore, SqliteSessionStore};
use tabspaces::managers::workspace_manager::WorkspaceManager;
use tabspaces::platform::MemoryHost;
use tabspaces::services::identity::tag_tab;
use tabspaces::types::session::{GroupSnapshot, WorkspaceSnapshot};
use tabspaces::types::settings::EngineSettings;
use tabspaces::types::tab::{Oid, TabHandle};

/// Strategy: 1-4 groups with 0-4 tabs each. OIDs are unique across the tree,
/// every non-empty group names one of its tabs active, and the active group
/// is one of the groups.
fn arb_snapshot() -> impl Strategy<Value = WorkspaceSnapshot> {
    prop::collection::vec(("[A-Za-z ]{0,12}", 0..5usize, any::<prop::sample::Index>()), 1..5)
        .prop_flat_map(|groups| {
            let count = groups.len();
            (Just(groups), 0..count)
        })
        .prop_map(|(groups, active)| {
            let mut next_tab = 0;
            let groups: Vec<GroupSnapshot> = groups
                .into_iter()
                .enumerate()
                .map(|(g, (name, tab_count, pick))| {
                    let tabs: Vec<Oid> = (0..tab_count)
                        .map(|_| {
                            next_tab += 1;
                            Oid::new(format!("tab{}", next_tab))
                        })
                        .collect();
                    let active_tab_oid = if tabs.is_empty() {
                        None
                    } else {
                        Some(tabs[pick.index(tabs.len())].clone())
                    };
                    GroupSnapshot {
                        oid: Oid::new(format!("group{}", g)),
                        name,
                        active_tab_oid,
                        tabs,
                    }
                })
                .collect();
            WorkspaceSnapshot {
                active_group_oid: groups[active].oid.clone(),
                groups,
            }
        })
}

fn tab_total(snapshot: &WorkspaceSnapshot) -> usize {
    snapshot.groups.iter().map(|g| g.tabs.len()).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn snapshot_json_roundtrip(snapshot in arb_snapshot()) {
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: WorkspaceSnapshot = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, snapshot);
    }

    #[test]
    fn sqlite_store_roundtrip(snapshot in arb_snapshot()) {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        store.save(&snapshot).unwrap();
        prop_assert_eq!(store.load().unwrap(), Some(snapshot));
    }

    /// Restoring against a host that holds exactly the recorded tabs, tagged
    /// with their OIDs, reproduces the snapshot. An empty active group comes
    /// back holding the one blank tab opened to show it.
    #[test]
    fn engine_restore_reproduces_snapshot(snapshot in arb_snapshot()) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let mut restored = rt.block_on(async {
            let host = MemoryHost::with_tabs(tab_total(&snapshot));
            let oids = snapshot.groups.iter().flat_map(|g| g.tabs.iter());
            for (i, oid) in oids.enumerate() {
                tag_tab(&host, TabHandle(i as i64 + 1), oid).await.unwrap();
            }

            let store = MemorySessionStore::with_snapshot(&snapshot).unwrap();
            let mut engine = WorkspaceManager::new(host, store, EngineSettings::default());
            engine.restore().await.unwrap();
            engine.snapshot()
        });
        let active = snapshot
            .groups
            .iter()
            .position(|g| g.oid == snapshot.active_group_oid)
            .unwrap();
        if snapshot.groups[active].tabs.is_empty() {
            let group = &mut restored.groups[active];
            prop_assert_eq!(group.tabs.len(), 1);
            prop_assert_eq!(group.active_tab_oid.as_ref(), group.tabs.first());
            group.tabs.clear();
            group.active_tab_oid = None;
        }
        prop_assert_eq!(restored, snapshot);
    }
}
