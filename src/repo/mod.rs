//! Entity repositories over the row store seam.
//!
//! [`Repo`] provides the contract shared by every entity: newest-first
//! listing, id lookup, owner-or-admin partial update, and idempotent
//! delete behind an explicit confirmation token. The per-entity modules
//! wrap it with validated drafts, initial statuses, and the image upload
//! flow.

pub mod complaints;
pub mod lost_found;
pub mod users;
pub mod volunteers;

use crate::blob::{BlobStore, ImageUpload};
use crate::error::PortalError;
use crate::session::SessionCtx;
use crate::store::{Order, RowFilter, RowStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;
use validator::ValidationError;

/// A row type stored in a named table with an owner.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    const TABLE: &'static str;
    /// Human noun used in error messages and notifications.
    const NOUN: &'static str;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
}

/// Confirmation token for destructive actions.
///
/// Deletion requires a human-in-the-loop gate: the caller constructs the
/// token only after its own confirmation step, so no code path deletes
/// as an automatic side effect.
#[derive(Debug)]
pub struct Confirm(());

impl Confirm {
    pub fn confirmed() -> Self {
        Confirm(())
    }
}

/// List scoping shared by every entity view.
#[derive(Clone, Debug, Default)]
pub struct ListFilter {
    pub owner: Option<Uuid>,
    pub status: Option<String>,
}

impl ListFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn owned_by(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub(crate) fn to_row_filter(&self) -> RowFilter {
        let mut filter = RowFilter::new();
        if let Some(owner) = self.owner {
            filter = filter.eq("owner_id", owner);
        }
        if let Some(status) = &self.status {
            filter = filter.eq("status", status);
        }
        filter
    }
}

/// Generic repository over one table.
pub struct Repo<T: Record> {
    store: Arc<dyn RowStore>,
    _marker: PhantomData<T>,
}

impl<T: Record> Clone for Repo<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T: Record> Repo<T> {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<dyn RowStore> {
        &self.store
    }

    /// Fetch rows newest-first. An error is distinct from an empty result;
    /// callers must not render a failed fetch as "no entries".
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<T>, PortalError> {
        let rows = self
            .store
            .select(T::TABLE, &filter.to_row_filter(), Order::NewestFirst)
            .await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(PortalError::from))
            .collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<T, PortalError> {
        let rows = self
            .store
            .select(T::TABLE, &RowFilter::new().eq("id", id), Order::NewestFirst)
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| PortalError::NotFound(format!("{} {}", T::NOUN, id)))?;
        Ok(serde_json::from_value(row)?)
    }

    /// Insert a row the entity module has already validated and stamped
    /// with its initial status. Id and creation instant are assigned by
    /// the store.
    pub(crate) async fn insert(&self, row: Value) -> Result<T, PortalError> {
        let stored = self.store.insert(T::TABLE, row).await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Partial update, permitted to the owner or an admin.
    pub async fn update(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<T, PortalError> {
        let current = self.get(id).await?;
        if !ctx.can_modify(current.owner_id()) {
            return Err(PortalError::Forbidden(format!(
                "not the owner of this {}",
                T::NOUN
            )));
        }

        let row = self.store.update(T::TABLE, id, patch).await?;
        Ok(serde_json::from_value(row)?)
    }

    /// Idempotent delete, permitted to the owner or an admin. Deleting an
    /// already-deleted id succeeds.
    pub async fn delete(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        _confirm: Confirm,
    ) -> Result<(), PortalError> {
        match self.get(id).await {
            Ok(current) => {
                if !ctx.can_modify(current.owner_id()) {
                    return Err(PortalError::Forbidden(format!(
                        "not the owner of this {}",
                        T::NOUN
                    )));
                }
                Ok(self.store.delete(T::TABLE, id).await?)
            }
            Err(PortalError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Validator hook: rejects blank (empty or whitespace-only) fields.
pub(crate) fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Upload an image and return its storage key.
///
/// Blocking step inside create/edit flows: the entity write must not
/// proceed until a key is obtained or the image was explicitly absent.
/// Oversized uploads are rejected before touching the blob store.
pub(crate) async fn upload_image(
    blob: &Arc<dyn BlobStore>,
    owner_id: Uuid,
    image: ImageUpload,
    max_bytes: usize,
) -> Result<String, PortalError> {
    if image.bytes.len() > max_bytes {
        return Err(PortalError::Validation(format!(
            "image exceeds the {} byte limit",
            max_bytes
        )));
    }

    let key = image.key_for(owner_id);
    blob.put(&key, image.bytes).await?;
    Ok(key)
}
