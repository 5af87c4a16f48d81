//! Status workflow engine.
//!
//! One state machine shape serves complaints, lost-and-found cases, and
//! volunteer registrations: a closed status enum, admin-only transitions
//! in either direction, and a notification to the owner on every actual
//! transition. The source of record is the row store; no transition table
//! restricts which distinct statuses an admin may move between.

use crate::error::PortalError;
use crate::notify;
use crate::repo::{Record, Repo};
use crate::session::SessionCtx;
use crate::store::RowStore;
use serde::Serialize;
use serde_json::Map;
use std::sync::Arc;
use uuid::Uuid;

/// Entities that carry an admin-managed status.
pub trait StatusWorkflow: Record {
    type Status: Clone + PartialEq + std::fmt::Display + Serialize + Send;

    fn status(&self) -> Self::Status;

    /// The line shown in the owner's notification: a complaint or item
    /// title, or a volunteer's event name.
    fn headline(&self) -> &str;
}

/// Admin-only status transition with notification fan-out.
///
/// The owner notification is emitted at most once per transition: a write
/// that does not change the status is acknowledged without one. Emission
/// is awaited before the caller sees success, but it is best-effort — a
/// failed insert is logged and never rolls back or fails the transition.
pub async fn set_status<T: StatusWorkflow>(
    store: &Arc<dyn RowStore>,
    ctx: &SessionCtx,
    id: Uuid,
    to: T::Status,
) -> Result<T, PortalError> {
    ctx.require_admin()?;

    let repo = Repo::<T>::new(Arc::clone(store));
    let current = repo.get(id).await?;
    if current.status() == to {
        log::debug!("{} {} already at requested status", T::NOUN, id);
        return Ok(current);
    }

    let mut patch = Map::new();
    patch.insert("status".to_string(), serde_json::to_value(&to)?);
    let updated = repo.update(ctx, id, patch).await?;

    if let Err(e) = notify::status_changed(
        store,
        updated.owner_id(),
        T::NOUN,
        updated.headline(),
        &to.to_string(),
    )
    .await
    {
        log::warn!(
            "notification for {} {} status change was dropped: {}",
            T::NOUN,
            id,
            e
        );
    }

    Ok(updated)
}
