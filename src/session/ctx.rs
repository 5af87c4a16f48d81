//! Session context passed to every repository and workflow call.
//!
//! Replaces the ambient logged-in-user singleton with an explicit
//! parameter: a [`SessionCtx`] is built by [`gate`] at privileged-route
//! entry and handed down the call tree, so every capability check reads
//! from the argument, not from global state.

use crate::error::PortalError;
use crate::model::users::{Role, User};
use crate::repo::users::UserRepo;
use crate::session::{IdentityProvider, SessionToken};
use uuid::Uuid;

/// Capability context for a resolved portal user.
#[derive(Clone, Debug)]
pub struct SessionCtx {
    user: User,
}

impl SessionCtx {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Moderators carry the user capability set; only admins unlock the
    /// admin operations.
    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }

    /// Require the admin capability set. Returns () or Forbidden.
    pub fn require_admin(&self) -> Result<(), PortalError> {
        if !self.is_admin() {
            return Err(PortalError::Forbidden(
                "admin role required".to_string(),
            ));
        }
        Ok(())
    }

    /// Check if this session can modify a resource (owner or admin).
    pub fn can_modify(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.user.id == owner_id
    }

    /// Require ownership of a resource, with no admin bypass. Used for
    /// recipient-only operations such as marking a notification read.
    pub fn require_ownership(&self, owner_id: Uuid) -> Result<(), PortalError> {
        if self.user.id != owner_id {
            return Err(PortalError::Forbidden(
                "you don't own this resource".to_string(),
            ));
        }
        Ok(())
    }
}

/// Role gate: resolve a session token to a capability context.
///
/// Looks the caller up in the `users` table by external identity
/// reference. Re-run on every privileged entry rather than cached; a
/// vanished session or user row denies with `Unauthorized`.
pub async fn gate(
    identity: &dyn IdentityProvider,
    token: &SessionToken,
    users: &UserRepo,
) -> Result<SessionCtx, PortalError> {
    let account = identity
        .current_user(token)
        .await
        .ok_or(PortalError::Unauthorized)?;

    let user = users
        .find_by_auth_id(account.auth_id)
        .await?
        .ok_or(PortalError::Unauthorized)?;

    Ok(SessionCtx::new(user))
}
