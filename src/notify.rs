//! Notification fan-out and recipient operations.
//!
//! Rows are created only by the workflow engine when an admin transitions
//! an entity's status. Everything else here is recipient-scoped: only the
//! recipient lists, reads, or deletes their notifications, with no admin
//! bypass.

use crate::error::PortalError;
use crate::model::notifications::{Notification, TABLE};
use crate::repo::{Confirm, Record, Repo};
use crate::session::SessionCtx;
use crate::store::{Order, RowFilter, RowStore};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

impl Record for Notification {
    const TABLE: &'static str = TABLE;
    const NOUN: &'static str = "notification";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.recipient_id
    }
}

/// Create the owner notification for a status transition.
pub async fn status_changed(
    store: &Arc<dyn RowStore>,
    recipient_id: Uuid,
    entity_label: &str,
    headline: &str,
    status: &str,
) -> Result<Notification, PortalError> {
    let message = format!("Your {} \"{}\" is now {}", entity_label, headline, status);
    create(store, recipient_id, message).await
}

/// Insert a notification row.
pub async fn create(
    store: &Arc<dyn RowStore>,
    recipient_id: Uuid,
    message: String,
) -> Result<Notification, PortalError> {
    Repo::<Notification>::new(Arc::clone(store))
        .insert(json!({
            "recipient_id": recipient_id,
            "message": message,
            "is_read": false,
        }))
        .await
}

/// Fetch the calling user's notifications, newest-first.
pub async fn for_recipient(
    store: &Arc<dyn RowStore>,
    ctx: &SessionCtx,
) -> Result<Vec<Notification>, PortalError> {
    let rows = store
        .select(
            TABLE,
            &RowFilter::new().eq("recipient_id", ctx.user_id()),
            Order::NewestFirst,
        )
        .await?;

    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(PortalError::from))
        .collect()
}

/// Count unread notifications for the calling user.
pub async fn count_unread(
    store: &Arc<dyn RowStore>,
    ctx: &SessionCtx,
) -> Result<u64, PortalError> {
    Ok(store
        .count(
            TABLE,
            &RowFilter::new()
                .eq("recipient_id", ctx.user_id())
                .eq("is_read", false),
        )
        .await?)
}

/// Mark one notification read. Recipient only.
pub async fn mark_read(
    store: &Arc<dyn RowStore>,
    ctx: &SessionCtx,
    id: Uuid,
) -> Result<Notification, PortalError> {
    let repo = Repo::<Notification>::new(Arc::clone(store));
    let current = repo.get(id).await?;
    ctx.require_ownership(current.recipient_id)?;

    let mut patch = Map::new();
    patch.insert("is_read".to_string(), Value::Bool(true));
    let row = store.update(TABLE, id, patch).await?;
    Ok(serde_json::from_value(row)?)
}

/// Mark every unread notification of the calling user read.
pub async fn mark_all_read(store: &Arc<dyn RowStore>, ctx: &SessionCtx) -> Result<(), PortalError> {
    let unread = store
        .select(
            TABLE,
            &RowFilter::new()
                .eq("recipient_id", ctx.user_id())
                .eq("is_read", false),
            Order::NewestFirst,
        )
        .await?;

    for row in unread {
        if let Some(id) = row.get("id").and_then(Value::as_str) {
            if let Ok(id) = Uuid::parse_str(id) {
                let mut patch = Map::new();
                patch.insert("is_read".to_string(), Value::Bool(true));
                store.update(TABLE, id, patch).await?;
            }
        }
    }
    Ok(())
}

/// Delete one notification. Recipient only; idempotent.
pub async fn delete(
    store: &Arc<dyn RowStore>,
    ctx: &SessionCtx,
    id: Uuid,
    _confirm: Confirm,
) -> Result<(), PortalError> {
    let repo = Repo::<Notification>::new(Arc::clone(store));
    match repo.get(id).await {
        Ok(current) => {
            ctx.require_ownership(current.recipient_id)?;
            Ok(store.delete(TABLE, id).await?)
        }
        Err(PortalError::NotFound(_)) => Ok(()),
        Err(e) => Err(e),
    }
}
