//! Message handling for the UI channel.
//!
//! [`handle_request`] maps a decoded [`UiRequest`] onto engine commands and
//! returns the acknowledgement the UI expects, if any. [`handle_line`] is the
//! stdio harness entry point: it also accepts simulated host actions.
//! Input that does not decode is logged and ignored.

use tracing::warn;

use crate::app::App;
use crate::managers::session_manager::SessionStore;
use crate::managers::workspace_manager::WorkspaceManager;
use crate::platform::{MemoryHost, TabHost};
use crate::types::errors::EngineError;
use crate::types::message::{
    GroupCommand, GroupVerb, HostAction, InboundLine, TabCommand, TabVerb, UiEvent, UiRequest,
};

/// Runs one UI request against the engine.
///
/// Returns `Ok(None)` for commands the UI does not wait on.
pub async fn handle_request<H: TabHost, S: SessionStore>(
    engine: &mut WorkspaceManager<H, S>,
    request: UiRequest,
) -> Result<Option<UiEvent>, EngineError> {
    match request {
        UiRequest::Info => Ok(Some(UiEvent::InfoResponse {
            info: engine.info().await?,
        })),
        UiRequest::Group(command) => match command {
            GroupCommand::Rename { index, name } => {
                engine.rename_group(index, name).await?;
                Ok(None)
            }
            GroupCommand::Create { name } => {
                engine.create_group(name).await?;
                Ok(Some(UiEvent::GroupResponse {
                    verb: GroupVerb::Create,
                }))
            }
            GroupCommand::Remove { index } => {
                engine.remove_group(index).await?;
                Ok(None)
            }
            GroupCommand::Activate { index } => {
                engine.activate_group(index, false).await?;
                Ok(None)
            }
            GroupCommand::Move {
                from_index,
                to_index,
            } => {
                engine.move_group(from_index, to_index).await?;
                Ok(Some(UiEvent::GroupResponse {
                    verb: GroupVerb::Move,
                }))
            }
        },
        UiRequest::Tab(TabCommand::Move {
            tab_id,
            from_group,
            to_group,
        }) => {
            engine.transfer_tab(tab_id, from_group, to_group).await?;
            Ok(Some(UiEvent::TabResponse { verb: TabVerb::Move }))
        }
    }
}

/// Decodes a UI message, logging and discarding anything unrecognised.
pub fn parse_request(line: &str) -> Option<UiRequest> {
    match serde_json::from_str(line) {
        Ok(request) => Some(request),
        Err(e) => {
            warn!(error = %e, line, "ignoring unrecognised UI message");
            None
        }
    }
}

/// Applies a simulated user action to the in-memory host.
pub fn apply_host_action(host: &MemoryHost, action: HostAction) {
    match action {
        HostAction::Open => {
            host.open_tab();
        }
        HostAction::Close { tab } => host.close_tab(tab),
        HostAction::Activate { tab } => host.activate_tab(tab),
    }
}

/// Handles one harness input line and returns the reply for the UI, if any.
///
/// Host actions are applied to the simulated host, then every event they
/// raise is pumped through the engine. Failures are logged, not returned.
pub async fn handle_line<S: SessionStore>(app: &App<S>, line: &str) -> Option<UiEvent> {
    let inbound: InboundLine = match serde_json::from_str(line) {
        Ok(inbound) => inbound,
        Err(e) => {
            warn!(error = %e, line, "ignoring unrecognised input line");
            return None;
        }
    };

    let mut engine = app.engine.lock().await;
    let result = match inbound {
        InboundLine::Ui { message } => handle_request(&mut *engine, message).await,
        InboundLine::Host { action } => {
            apply_host_action(engine.host(), action);
            engine.pump_events().await.map(|_| None)
        }
    };

    match result {
        Ok(reply) => {
            // Commands can raise host events too (placeholder tabs, focus changes).
            if let Err(e) = engine.pump_events().await {
                warn!(error = %e, "failed to settle host events");
            }
            reply
        }
        Err(e) => {
            warn!(error = %e, "command failed");
            None
        }
    }
}
