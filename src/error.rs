//! Portal error taxonomy.
//!
//! Validation is checked locally before any remote call. Store and blob
//! failures surface to the initiating actor and the attempted mutation is
//! abandoned; local state is only refreshed after a confirmed round trip,
//! so no client-side rollback path exists.

use crate::blob::BlobError;
use crate::store::StoreError;

/// Errors surfaced by repository, workflow, and session operations.
#[derive(Debug)]
pub enum PortalError {
    /// A required field is blank or malformed. Raised before any store call.
    Validation(String),
    /// No session, or the session resolves to no portal user row.
    Unauthorized,
    /// The actor lacks the role or ownership the operation requires.
    Forbidden(String),
    /// The target row vanished.
    NotFound(String),
    /// The row store call failed or timed out.
    StoreUnavailable(String),
    /// The blob store failed during an image upload.
    Upload(String),
}

impl std::fmt::Display for PortalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortalError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            PortalError::Unauthorized => write!(f, "Unauthorized"),
            PortalError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            PortalError::NotFound(msg) => write!(f, "Not found: {}", msg),
            PortalError::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            PortalError::Upload(msg) => write!(f, "Upload failed: {}", msg),
        }
    }
}

impl std::error::Error for PortalError {}

impl From<StoreError> for PortalError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Missing(what) => PortalError::NotFound(what),
            StoreError::Backend(msg) => PortalError::StoreUnavailable(msg),
        }
    }
}

impl From<BlobError> for PortalError {
    fn from(e: BlobError) -> Self {
        PortalError::Upload(e.to_string())
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(e: serde_json::Error) -> Self {
        // A row that does not decode into its entity type is indistinguishable
        // from a broken backend as far as the caller is concerned.
        PortalError::StoreUnavailable(format!("row decode: {}", e))
    }
}

impl From<validator::ValidationErrors> for PortalError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = e.field_errors().keys().copied().collect();
        fields.sort_unstable();
        PortalError::Validation(format!("missing or invalid fields: {}", fields.join(", ")))
    }
}
