//! Volunteer repository: event registration with profile photos and the
//! admin approval workflow.

use super::{upload_image, Confirm, ListFilter, Record, Repo};
use crate::app_config::StorageConfig;
use crate::blob::{BlobStore, ImageUpload};
use crate::error::PortalError;
use crate::model::volunteers::{Campus, Volunteer, VolunteerStatus, TABLE};
use crate::session::SessionCtx;
use crate::store::RowStore;
use crate::workflow::{self, StatusWorkflow};
use serde::Deserialize;
use serde_json::{json, Map};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

impl Record for Volunteer {
    const TABLE: &'static str = TABLE;
    const NOUN: &'static str = "volunteer registration";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl StatusWorkflow for Volunteer {
    type Status = VolunteerStatus;

    fn status(&self) -> VolunteerStatus {
        self.status
    }

    fn headline(&self) -> &str {
        &self.event
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct VolunteerDraft {
    #[validate(custom = "crate::repo::non_blank")]
    pub full_name: String,
    #[validate(custom = "crate::repo::non_blank")]
    pub roll_no: String,
    pub campus: Campus,
    #[validate(custom = "crate::repo::non_blank")]
    pub event: String,
    #[validate(custom = "crate::repo::non_blank")]
    pub availability: String,
    #[validate(range(min = 1))]
    pub hours_available: u32,
}

pub struct VolunteerRepo {
    repo: Repo<Volunteer>,
    blob: Arc<dyn BlobStore>,
    storage: StorageConfig,
}

impl VolunteerRepo {
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

    /// Register the calling user as a volunteer. The profile photo is
    /// required on first registration and is uploaded before the row is
    /// written; approval starts `Pending`.
    pub async fn register(
        &self,
        ctx: &SessionCtx,
        draft: VolunteerDraft,
        profile_image: ImageUpload,
    ) -> Result<Volunteer, PortalError> {
        draft.validate()?;

        let image_key = upload_image(
            &self.blob,
            ctx.user_id(),
            profile_image,
            self.storage.max_image_bytes,
        )
        .await?;

        self.repo
            .insert(json!({
                "owner_id": ctx.user_id(),
                "full_name": draft.full_name.trim(),
                "roll_no": draft.roll_no.trim(),
                "campus": draft.campus,
                "event": draft.event.trim(),
                "availability": draft.availability.trim(),
                "hours_available": draft.hours_available,
                "profile_image_key": image_key,
                "status": VolunteerStatus::INITIAL,
            }))
            .await
    }

    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Volunteer>, PortalError> {
        self.repo.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Volunteer, PortalError> {
        self.repo.get(id).await
    }

    /// Owner edit while the registration is still `Pending`; admins
    /// anytime. A replacement photo is optional; the stored one is kept
    /// when none is supplied.
    pub async fn edit(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        draft: VolunteerDraft,
        profile_image: Option<ImageUpload>,
    ) -> Result<Volunteer, PortalError> {
        draft.validate()?;

        let current = self.repo.get(id).await?;
        if !ctx.is_admin() && current.status != VolunteerStatus::Pending {
            return Err(PortalError::Forbidden(
                "registration has already been reviewed".to_string(),
            ));
        }

        let mut patch = Map::new();
        patch.insert("full_name".to_string(), json!(draft.full_name.trim()));
        patch.insert("roll_no".to_string(), json!(draft.roll_no.trim()));
        patch.insert("campus".to_string(), serde_json::to_value(draft.campus)?);
        patch.insert("event".to_string(), json!(draft.event.trim()));
        patch.insert("availability".to_string(), json!(draft.availability.trim()));
        patch.insert("hours_available".to_string(), json!(draft.hours_available));
        if let Some(image) = profile_image {
            let key = upload_image(
                &self.blob,
                ctx.user_id(),
                image,
                self.storage.max_image_bytes,
            )
            .await?;
            patch.insert("profile_image_key".to_string(), json!(key));
        }

        self.repo.update(ctx, id, patch).await
    }

    /// Admin approval decision. Reversible: an admin may move a reviewed
    /// registration back to `Pending` or flip a decision.
    pub async fn set_status(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        status: VolunteerStatus,
    ) -> Result<Volunteer, PortalError> {
        workflow::set_status::<Volunteer>(self.repo.store(), ctx, id, status).await
    }

    pub async fn delete(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        confirm: Confirm,
    ) -> Result<(), PortalError> {
        self.repo.delete(ctx, id, confirm).await
    }

    /// Public URL of the profile photo, if one was stored.
    pub fn profile_image_url(&self, volunteer: &Volunteer) -> Option<String> {
        volunteer
            .profile_image_key
            .as_deref()
            .map(|key| self.blob.public_url(key))
    }
}
