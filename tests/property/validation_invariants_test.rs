//! Property-based tests for the engine's structural invariants.
//!
//! After any sequence of UI commands and simulated user actions, once the
//! host's events have been pumped:
//! - there is at least one group and the active pointer resolves,
//! - every live tab is tracked by exactly one group and nothing else is,
//! - no OID appears twice,
//! - every non-empty group's active tab is one of its members,
//! - validation changes nothing further.

use std::collections::HashSet;

use proptest::prelude::*;

use tabspaces::managers::session_manager::MemorySessionStore;
use tabspaces::managers::workspace_manager::WorkspaceManager;
use tabspaces::platform::MemoryHost;
use tabspaces::types::settings::EngineSettings;
use tabspaces::types::tab::TabHandle;

type Engine = WorkspaceManager<MemoryHost, MemorySessionStore>;

/// Operations applied to the engine. Indices are reduced modulo the current
/// number of groups or live tabs when applied.
#[derive(Debug, Clone)]
enum Op {
    OpenTab,
    CloseTab(usize),
    FocusTab(usize),
    CreateGroup,
    RemoveGroup(usize),
    ActivateGroup(usize),
    MoveGroup(usize, usize),
    TransferTab(usize, usize),
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(Op::OpenTab),
            2 => any::<usize>().prop_map(Op::CloseTab),
            2 => any::<usize>().prop_map(Op::FocusTab),
            2 => Just(Op::CreateGroup),
            1 => any::<usize>().prop_map(Op::RemoveGroup),
            2 => any::<usize>().prop_map(Op::ActivateGroup),
            1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::MoveGroup(a, b)),
            3 => (any::<usize>(), any::<usize>()).prop_map(|(t, g)| Op::TransferTab(t, g)),
        ],
        1..40,
    )
}

async fn apply(engine: &mut Engine, op: &Op) {
    let groups = engine.workspace().len();
    let live = engine.host().handles();
    match op {
        Op::OpenTab => {
            engine.host().open_tab();
        }
        Op::CloseTab(i) if !live.is_empty() => engine.host().close_tab(live[i % live.len()]),
        Op::FocusTab(i) if !live.is_empty() => engine.host().activate_tab(live[i % live.len()]),
        Op::CreateGroup => {
            engine.create_group(None).await.unwrap();
        }
        Op::RemoveGroup(i) => engine.remove_group(i % groups).await.unwrap(),
        Op::ActivateGroup(i) => engine.activate_group(i % groups, false).await.unwrap(),
        Op::MoveGroup(a, b) => engine.move_group(a % groups, b % groups).await.unwrap(),
        Op::TransferTab(t, g) if !live.is_empty() => {
            let handle = live[t % live.len()];
            let (from, _) = engine.workspace().find_tab(handle).unwrap();
            engine.transfer_tab(handle, from, g % groups).await.unwrap();
        }
        _ => {}
    }
    engine.pump_events().await.unwrap();
}

fn check_invariants(engine: &Engine) -> Result<(), TestCaseError> {
    let ws = engine.workspace();
    prop_assert!(!ws.is_empty());
    prop_assert!(ws.active_index().is_some());

    let mut tracked: Vec<TabHandle> = ws.groups.iter().flat_map(|g| g.handles()).collect();
    let total = tracked.len();
    tracked.sort();
    tracked.dedup();
    prop_assert_eq!(tracked.len(), total, "a tab is tracked twice");

    let mut live = engine.host().handles();
    live.sort();
    prop_assert_eq!(tracked, live);

    let oids: HashSet<_> = ws.recorded_oids();
    prop_assert_eq!(oids.len(), total, "an OID is recorded twice");

    for group in &ws.groups {
        match &group.active_tab {
            Some(oid) => prop_assert!(group.contains_oid(oid)),
            None => prop_assert!(group.is_empty()),
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn engine_invariants_hold(initial in 0..4usize, ops in arb_ops()) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let store = MemorySessionStore::new();
            let mut engine =
                WorkspaceManager::new(MemoryHost::with_tabs(initial), store.clone(), EngineSettings::default());
            engine.restore().await.unwrap();
            engine.pump_events().await.unwrap();
            check_invariants(&engine)?;

            for op in &ops {
                apply(&mut engine, op).await;
                check_invariants(&engine)?;
            }

            // Validation on a consistent tree is a fixed point.
            engine.validate().await.unwrap();
            let settled = engine.snapshot();
            engine.validate().await.unwrap();
            prop_assert_eq!(engine.snapshot(), settled);
            check_invariants(&engine)
        })?;
    }
}
