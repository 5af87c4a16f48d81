//! Test fixtures for creating portal state
#![allow(dead_code)]

use khidmat::app_config::AppConfig;
use khidmat::blob::memory::MemoryBlobStore;
use khidmat::blob::{BlobStore, ImageUpload};
use khidmat::model::users::{Role, User};
use khidmat::model::volunteers::Campus;
use khidmat::repo::complaints::{ComplaintDraft, ComplaintRepo};
use khidmat::repo::lost_found::{ItemDraft, LostFoundRepo};
use khidmat::repo::users::UserRepo;
use khidmat::repo::volunteers::{VolunteerDraft, VolunteerRepo};
use khidmat::session::{self, gate, IdentityProvider, LocalIdentity, SessionCtx, SessionToken};
use khidmat::store::memory::MemoryStore;
use khidmat::store::RowStore;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// A fully wired portal over in-process backends.
pub struct TestPortal {
    pub config: AppConfig,
    pub store: Arc<dyn RowStore>,
    pub blob: Arc<MemoryBlobStore>,
    pub identity: LocalIdentity,
    pub users: UserRepo,
}

/// Build an isolated portal instance. Each test gets its own stores, so
/// tests never interfere with each other.
pub fn portal() -> TestPortal {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = AppConfig::default();
    let store: Arc<dyn RowStore> = Arc::new(MemoryStore::new());
    let blob = Arc::new(MemoryBlobStore::new(&config.storage.public_url));
    let identity = LocalIdentity::new(&config.security);
    let users = UserRepo::new(Arc::clone(&store));

    TestPortal {
        config,
        store,
        blob,
        identity,
        users,
    }
}

impl TestPortal {
    pub fn blob_store(&self) -> Arc<dyn BlobStore> {
        Arc::clone(&self.blob) as Arc<dyn BlobStore>
    }

    pub fn complaints(&self) -> ComplaintRepo {
        ComplaintRepo::new(Arc::clone(&self.store))
    }

    pub fn lost_found(&self) -> LostFoundRepo {
        LostFoundRepo::new(
            Arc::clone(&self.store),
            self.blob_store(),
            self.config.storage.clone(),
        )
    }

    pub fn volunteers(&self) -> VolunteerRepo {
        VolunteerRepo::new(
            Arc::clone(&self.store),
            self.blob_store(),
            self.config.storage.clone(),
        )
    }
}

/// Sign a user up and in, returning their row and a live session token.
pub async fn signed_up(portal: &TestPortal, username: &str) -> (User, SessionToken) {
    let email = format!("{}@example.com", username);
    let user = session::register(&portal.identity, &portal.users, username, &email, "password123")
        .await
        .expect("signup failed");
    let token = portal
        .identity
        .sign_in(&email, "password123")
        .await
        .expect("sign in failed");

    (user, token)
}

/// A gated session context for a fresh regular user.
pub async fn user_ctx(portal: &TestPortal, username: &str) -> SessionCtx {
    let (_, token) = signed_up(portal, username).await;
    gate(&portal.identity, &token, &portal.users)
        .await
        .expect("role gate denied a valid user")
}

/// A gated session context for a fresh admin.
///
/// The first admin cannot be promoted through the capability system
/// (role mutation is admin-only), so the role column is seeded directly
/// in the store, then the gate is run as usual.
pub async fn admin_ctx(portal: &TestPortal, username: &str) -> SessionCtx {
    let (user, token) = signed_up(portal, username).await;

    let mut patch = Map::new();
    patch.insert(
        "role".to_string(),
        serde_json::to_value(Role::Admin).expect("role serializes"),
    );
    portal
        .store
        .update(khidmat::model::users::TABLE, user.id, patch)
        .await
        .expect("failed to seed admin role");

    let ctx = gate(&portal.identity, &token, &portal.users)
        .await
        .expect("role gate denied the seeded admin");
    assert!(ctx.is_admin());
    ctx
}

pub fn complaint_draft(title: &str) -> ComplaintDraft {
    ComplaintDraft {
        title: title.to_string(),
        description: "Something is broken".to_string(),
        category: "General".to_string(),
    }
}

pub fn item_draft(title: &str, kind: khidmat::model::lost_found::ItemKind) -> ItemDraft {
    ItemDraft {
        title: title.to_string(),
        description: "Seen near the cafeteria".to_string(),
        kind,
    }
}

pub fn volunteer_draft(event: &str) -> VolunteerDraft {
    VolunteerDraft {
        full_name: "Ayesha Khan".to_string(),
        roll_no: "SMIT-0042".to_string(),
        campus: Campus::Gulshan,
        event: event.to_string(),
        availability: "weekends".to_string(),
        hours_available: 6,
    }
}

/// Arbitrary image payload of the given size.
pub fn image(len: usize) -> ImageUpload {
    ImageUpload::new("photo.png", vec![0u8; len])
}

pub fn row_id(row: &Value) -> Uuid {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("row has a uuid id")
}
