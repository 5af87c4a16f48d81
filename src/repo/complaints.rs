//! Complaint repository: submission, owner edits, admin status workflow.

use super::{Confirm, ListFilter, Record, Repo};
use crate::error::PortalError;
use crate::model::complaints::{Complaint, ComplaintStatus, TABLE};
use crate::session::SessionCtx;
use crate::store::RowStore;
use crate::workflow::{self, StatusWorkflow};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

impl Record for Complaint {
    const TABLE: &'static str = TABLE;
    const NOUN: &'static str = "complaint";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl StatusWorkflow for Complaint {
    type Status = ComplaintStatus;

    fn status(&self) -> ComplaintStatus {
        self.status
    }

    fn headline(&self) -> &str {
        &self.title
    }
}

/// Fields the submitting user controls.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ComplaintDraft {
    #[validate(custom = "crate::repo::non_blank")]
    pub title: String,
    #[validate(custom = "crate::repo::non_blank")]
    pub description: String,
    /// Free-form, e.g. "Internet" or "Electricity".
    #[validate(custom = "crate::repo::non_blank")]
    pub category: String,
}

pub struct ComplaintRepo {
    repo: Repo<Complaint>,
}

impl ComplaintRepo {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            repo: Repo::new(store),
        }
    }

    /// Submit a new complaint for the calling user. Status starts at
    /// `Submitted`; id and creation instant are assigned by the store.
    pub async fn submit(
        &self,
        ctx: &SessionCtx,
        draft: ComplaintDraft,
    ) -> Result<Complaint, PortalError> {
        draft.validate()?;

        self.repo
            .insert(json!({
                "owner_id": ctx.user_id(),
                "title": draft.title.trim(),
                "description": draft.description.trim(),
                "category": draft.category.trim(),
                "status": ComplaintStatus::INITIAL,
            }))
            .await
    }

    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Complaint>, PortalError> {
        self.repo.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Complaint, PortalError> {
        self.repo.get(id).await
    }

    /// Owner edit of title/description/category. Owners may only edit
    /// while the complaint is still `Submitted`; once an admin has picked
    /// it up the content is locked to them. Admins may edit anytime.
    pub async fn edit(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        draft: ComplaintDraft,
    ) -> Result<Complaint, PortalError> {
        draft.validate()?;

        let current = self.repo.get(id).await?;
        if !ctx.is_admin() && current.status != ComplaintStatus::Submitted {
            return Err(PortalError::Forbidden(
                "complaint is already being processed".to_string(),
            ));
        }

        let mut patch = Map::new();
        patch.insert("title".to_string(), Value::String(draft.title.trim().into()));
        patch.insert(
            "description".to_string(),
            Value::String(draft.description.trim().into()),
        );
        patch.insert(
            "category".to_string(),
            Value::String(draft.category.trim().into()),
        );

        self.repo.update(ctx, id, patch).await
    }

    /// Admin status transition with notification fan-out.
    pub async fn set_status(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        status: ComplaintStatus,
    ) -> Result<Complaint, PortalError> {
        workflow::set_status::<Complaint>(self.repo.store(), ctx, id, status).await
    }

    pub async fn delete(
        &self,
        ctx: &SessionCtx,
        id: Uuid,
        confirm: Confirm,
    ) -> Result<(), PortalError> {
        self.repo.delete(ctx, id, confirm).await
    }
}
