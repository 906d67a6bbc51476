use wsd_core::entities::LockToken;
use wsd_db::error::LockError;
use wsd_db::service::WsdService;

/// The lease token `holder_id` currently has on `session_id`.
///
/// Each `wsd` invocation is a new process, so the token is rebuilt from
/// the stored lock. Lease validity is checked later by the engine.
pub async fn holder_token(
    store: &WsdService,
    session_id: &str,
    holder_id: &str,
) -> Result<LockToken, LockError> {
    match store.current_lock(session_id).await? {
        Some(lock) if lock.is_held_by(holder_id) => Ok(lock.token()),
        _ => Err(LockError::NotHolder {
            session_id: session_id.to_string(),
            holder_id: holder_id.to_string(),
        }),
    }
}
