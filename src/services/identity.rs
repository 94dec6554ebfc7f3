//! Durable tab and group identity.
//!
//! Host tab handles only live as long as the browser session, so every tab
//! carries an [`Oid`] stored as a session-scoped tag on the host tab itself.
//! Restored tabs find their handle again through [`resolve_tab`].

use uuid::Uuid;

use crate::platform::TabHost;
use crate::types::errors::HostError;
use crate::types::tab::{Oid, TabHandle};

/// Name of the per-tab value holding a tab's OID.
pub const TAB_TAG_KEY: &str = "oid";

/// Returns a fresh identifier: a millisecond timestamp followed by random bits.
pub fn new_oid() -> Oid {
    Oid::new(Uuid::now_v7().simple().to_string())
}

/// Stores `oid` on the live tab so it survives engine reloads.
pub async fn tag_tab<H: TabHost + ?Sized>(
    host: &H,
    handle: TabHandle,
    oid: &Oid,
) -> Result<(), HostError> {
    host.set_tab_value(handle, TAB_TAG_KEY, oid.as_str()).await
}

/// Reads the OID stored on a live tab, if any.
pub async fn read_tag<H: TabHost + ?Sized>(
    host: &H,
    handle: TabHandle,
) -> Result<Option<Oid>, HostError> {
    Ok(host
        .get_tab_value(handle, TAB_TAG_KEY)
        .await?
        .map(Oid::from))
}

/// Finds the live tab tagged with `oid`.
///
/// Scans every live tab, so this is O(live tabs). Only used when a handle was
/// not carried over directly, e.g. right after restoring from a snapshot.
pub async fn resolve_tab<H: TabHost + ?Sized>(
    host: &H,
    oid: &Oid,
) -> Result<Option<TabHandle>, HostError> {
    for tab in host.query_tabs().await? {
        if read_tag(host, tab.handle).await?.as_ref() == Some(oid) {
            return Ok(Some(tab.handle));
        }
    }
    Ok(None)
}
