//! User repository: signup rows, role lookups, and admin user management.

use super::{Confirm, ListFilter, Record, Repo};
use crate::error::PortalError;
use crate::model::notifications;
use crate::model::users::{Role, User, TABLE};
use crate::session::{Identity, SessionCtx};
use crate::store::{Order, RowFilter, RowStore};
use serde_json::{json, Map};
use std::sync::Arc;
use uuid::Uuid;

impl Record for User {
    const TABLE: &'static str = TABLE;
    const NOUN: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }

    /// Users own their own row.
    fn owner_id(&self) -> Uuid {
        self.id
    }
}

pub struct UserRepo {
    repo: Repo<User>,
}

impl UserRepo {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            repo: Repo::new(store),
        }
    }

    /// Create the portal row for a freshly signed-up identity. Every new
    /// account starts with the `user` role; only an admin promotes.
    pub async fn create_at_signup(
        &self,
        identity: &Identity,
        username: &str,
    ) -> Result<User, PortalError> {
        if !validator::validate_email(&identity.email) {
            return Err(PortalError::Validation("invalid email address".to_string()));
        }

        self.repo
            .insert(json!({
                "auth_id": identity.auth_id,
                "username": username,
                "email": identity.email,
                "role": Role::User,
            }))
            .await
    }

    /// Role-gate lookup by external identity reference.
    pub async fn find_by_auth_id(&self, auth_id: Uuid) -> Result<Option<User>, PortalError> {
        let rows = self
            .repo
            .store()
            .select(
                TABLE,
                &RowFilter::new().eq("auth_id", auth_id),
                Order::NewestFirst,
            )
            .await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<User, PortalError> {
        self.repo.get(id).await
    }

    /// Admin view of every account, newest-first.
    pub async fn list(&self, ctx: &SessionCtx) -> Result<Vec<User>, PortalError> {
        ctx.require_admin()?;
        self.repo.list(&ListFilter::all()).await
    }

    /// Admin-only role mutation.
    pub async fn set_role(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        role: Role,
    ) -> Result<User, PortalError> {
        ctx.require_admin()?;

        let mut patch = Map::new();
        patch.insert("role".to_string(), serde_json::to_value(role)?);
        self.repo.update(ctx, id, patch).await
    }

    /// Admin-only account removal. Idempotent like every delete.
    ///
    /// Cascade policy: the account's notifications are removed with it;
    /// complaints, items, and volunteer registrations are kept with their
    /// owner id intact for audit.
    pub async fn delete_user(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        _confirm: Confirm,
    ) -> Result<(), PortalError> {
        ctx.require_admin()?;

        let store = self.repo.store();
        let orphaned = store
            .select(
                notifications::TABLE,
                &RowFilter::new().eq("recipient_id", id),
                Order::NewestFirst,
            )
            .await?;
        for row in orphaned {
            if let Some(note_id) = row.get("id").and_then(|v| v.as_str()) {
                if let Ok(note_id) = Uuid::parse_str(note_id) {
                    store.delete(notifications::TABLE, note_id).await?;
                }
            }
        }

        Ok(store.delete(TABLE, id).await?)
    }
}
