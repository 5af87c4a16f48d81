//! Identity provider seam and the local credential backend.
//!
//! The portal consumes four identity operations: sign up, sign in, sign
//! out, and current-user lookup. [`LocalIdentity`] implements them in
//! process with argon2id password hashes and uuid session tokens; a hosted
//! identity service slots in behind the same trait.

pub mod ctx;

pub use ctx::{gate, SessionCtx};

use crate::app_config::SecurityConfig;
use crate::error::PortalError;
use crate::repo::users::UserRepo;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// An authenticated external identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Identity {
    pub auth_id: Uuid,
    pub email: String,
}

/// Opaque session token handed to the client at sign-in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SessionToken(Uuid);

/// Trait for identity backends.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, PortalError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionToken, PortalError>;

    async fn sign_out(&self, token: &SessionToken);

    /// Resolve a token to its identity, or None when the session is
    /// missing or expired.
    async fn current_user(&self, token: &SessionToken) -> Option<Identity>;
}

struct Account {
    auth_id: Uuid,
    password_hash: String,
}

struct SessionRecord {
    auth_id: Uuid,
    email: String,
    expires_at: NaiveDateTime,
}

/// In-process identity backend.
pub struct LocalIdentity {
    /// email -> credentials
    accounts: DashMap<String, Account>,
    sessions: DashMap<Uuid, SessionRecord>,
    session_ttl: Duration,
}

impl LocalIdentity {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            accounts: DashMap::new(),
            sessions: DashMap::new(),
            session_ttl: Duration::minutes(i64::from(security.session_timeout_minutes)),
        }
    }

    fn hash_password(password: &str) -> Result<String, PortalError> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PortalError::StoreUnavailable(format!("password hashing: {}", e)))?
            .to_string())
    }

    fn verify_password(password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                log::error!("Stored password hash failed to parse: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, PortalError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(PortalError::Validation(
                "email and password are required".to_string(),
            ));
        }
        if self.accounts.contains_key(&email) {
            return Err(PortalError::Validation(
                "email is already registered".to_string(),
            ));
        }

        let account = Account {
            auth_id: Uuid::new_v4(),
            password_hash: Self::hash_password(password)?,
        };
        let identity = Identity {
            auth_id: account.auth_id,
            email: email.clone(),
        };
        self.accounts.insert(email, account);

        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionToken, PortalError> {
        let email = email.trim().to_lowercase();
        let account = self.accounts.get(&email).ok_or(PortalError::Unauthorized)?;
        if !Self::verify_password(password, &account.password_hash) {
            return Err(PortalError::Unauthorized);
        }

        let token = Uuid::new_v4();
        self.sessions.insert(
            token,
            SessionRecord {
                auth_id: account.auth_id,
                email,
                expires_at: Utc::now().naive_utc() + self.session_ttl,
            },
        );

        Ok(SessionToken(token))
    }

    async fn sign_out(&self, token: &SessionToken) {
        self.sessions.remove(&token.0);
    }

    async fn current_user(&self, token: &SessionToken) -> Option<Identity> {
        let expired = match self.sessions.get(&token.0) {
            Some(session) => {
                if session.expires_at > Utc::now().naive_utc() {
                    return Some(Identity {
                        auth_id: session.auth_id,
                        email: session.email.clone(),
                    });
                }
                true
            }
            None => false,
        };

        if expired {
            self.sessions.remove(&token.0);
            log::debug!("Session token expired and was discarded");
        }
        None
    }
}

/// Sign an account up with the identity backend and create the matching
/// portal user row. New accounts always start with the `user` role.
pub async fn register(
    identity: &dyn IdentityProvider,
    users: &UserRepo,
    username: &str,
    email: &str,
    password: &str,
) -> Result<crate::model::users::User, PortalError> {
    if username.trim().is_empty() {
        return Err(PortalError::Validation("username is required".to_string()));
    }

    let account = identity.sign_up(email, password).await?;
    users.create_at_signup(&account, username.trim()).await
}
