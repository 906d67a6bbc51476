use chrono::{DateTime, Utc};
use serde::Serialize;
use wsd_core::entities::SessionLock;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LockCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ReleaseResponse {
    session_id: String,
    released: bool,
}

#[derive(Debug, Serialize)]
struct LockStatusResponse {
    session_id: String,
    lock: Option<SessionLock>,
    valid: bool,
    expires_at: Option<DateTime<Utc>>,
}

/// Handle `wsd lock`.
pub async fn handle(action: &LockCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let store = ctx.store();
    match action {
        LockCommands::Acquire { session, holder } => {
            output(&store.acquire_lock(session, holder).await?, flags.format)
        }
        LockCommands::Heartbeat { session, holder } => {
            output(&store.heartbeat_lock(session, holder).await?, flags.format)
        }
        LockCommands::Release { session, holder } => {
            let released = store.release_lock(session, holder).await?;
            output(
                &ReleaseResponse {
                    session_id: session.clone(),
                    released,
                },
                flags.format,
            )
        }
        LockCommands::Status { session } => {
            let lock = store.current_lock(session).await?;
            let now = store.clock().now();
            output(
                &LockStatusResponse {
                    session_id: session.clone(),
                    valid: lock.as_ref().is_some_and(|l| l.is_valid_at(now)),
                    expires_at: lock.as_ref().map(SessionLock::expires_at),
                    lock,
                },
                flags.format,
            )
        }
    }
}
