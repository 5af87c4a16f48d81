//! Lost-and-found repository: postings with photos, admin case workflow.

use super::{upload_image, Confirm, ListFilter, Record, Repo};
use crate::app_config::StorageConfig;
use crate::blob::{BlobStore, ImageUpload};
use crate::error::PortalError;
use crate::model::lost_found::{ItemKind, ItemStatus, LostFoundItem, TABLE};
use crate::session::SessionCtx;
use crate::store::RowStore;
use crate::workflow::{self, StatusWorkflow};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

impl Record for LostFoundItem {
    const TABLE: &'static str = TABLE;
    const NOUN: &'static str = "lost & found item";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl StatusWorkflow for LostFoundItem {
    type Status = ItemStatus;

    fn status(&self) -> ItemStatus {
        self.status
    }

    fn headline(&self) -> &str {
        &self.title
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ItemDraft {
    #[validate(custom = "crate::repo::non_blank")]
    pub title: String,
    #[validate(custom = "crate::repo::non_blank")]
    pub description: String,
    pub kind: ItemKind,
}

pub struct LostFoundRepo {
    repo: Repo<LostFoundItem>,
    blob: Arc<dyn BlobStore>,
    storage: StorageConfig,
}

impl LostFoundRepo {
    pub fn new(
        store: Arc<dyn RowStore>,
        blob: Arc<dyn BlobStore>,
        storage: StorageConfig,
    ) -> Self {
        Self {
            repo: Repo::new(store),
            blob,
            storage,
        }
    }

    /// Post a new item. The photo is required at creation and is uploaded
    /// before the row is written; the case starts `Pending`.
    pub async fn post(
        &self,
        ctx: &SessionCtx,
        draft: ItemDraft,
        image: ImageUpload,
    ) -> Result<LostFoundItem, PortalError> {
        draft.validate()?;

        let image_key = upload_image(
            &self.blob,
            ctx.user_id(),
            image,
            self.storage.max_image_bytes,
        )
        .await?;

        self.repo
            .insert(json!({
                "owner_id": ctx.user_id(),
                "title": draft.title.trim(),
                "description": draft.description.trim(),
                "kind": draft.kind,
                "image_key": image_key,
                "status": ItemStatus::INITIAL,
            }))
            .await
    }

    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<LostFoundItem>, PortalError> {
        self.repo.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<LostFoundItem, PortalError> {
        self.repo.get(id).await
    }

    /// Owner edit while the case is still `Pending`; admins anytime.
    /// A replacement photo is optional; when absent the existing key is
    /// kept.
    pub async fn edit(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        draft: ItemDraft,
        image: Option<ImageUpload>,
    ) -> Result<LostFoundItem, PortalError> {
        draft.validate()?;

        let current = self.repo.get(id).await?;
        if !ctx.is_admin() && current.status != ItemStatus::Pending {
            return Err(PortalError::Forbidden(
                "item case is already closed".to_string(),
            ));
        }

        let mut patch = Map::new();
        patch.insert("title".to_string(), Value::String(draft.title.trim().into()));
        patch.insert(
            "description".to_string(),
            Value::String(draft.description.trim().into()),
        );
        patch.insert("kind".to_string(), serde_json::to_value(draft.kind)?);
        if let Some(image) = image {
            let key = upload_image(
                &self.blob,
                ctx.user_id(),
                image,
                self.storage.max_image_bytes,
            )
            .await?;
            patch.insert("image_key".to_string(), Value::String(key));
        }

        self.repo.update(ctx, id, patch).await
    }

    /// Admin case transition, freely reversible between `Pending` and
    /// `Found`.
    pub async fn set_status(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        status: ItemStatus,
    ) -> Result<LostFoundItem, PortalError> {
        workflow::set_status::<LostFoundItem>(self.repo.store(), ctx, id, status).await
    }

    pub async fn delete(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        confirm: Confirm,
    ) -> Result<(), PortalError> {
        self.repo.delete(ctx, id, confirm).await
    }

    /// Public URL of the item photo, if one was stored.
    pub fn image_url(&self, item: &LostFoundItem) -> Option<String> {
        item.image_key.as_deref().map(|key| self.blob.public_url(key))
    }
}
