//! Complaint row for the `complaints` table.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TABLE: &str = "complaints";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: ComplaintStatus,
    pub created_at: NaiveDateTime,
}

/// Complaint workflow states. Serialized forms double as the display
/// strings used in notification messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Submitted,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub const INITIAL: ComplaintStatus = ComplaintStatus::Submitted;

    pub fn as_str(&self) -> &str {
        match self {
            Self::Submitted => "Submitted",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Submitted" => Some(Self::Submitted),
            "In Progress" => Some(Self::InProgress),
            "Resolved" => Some(Self::Resolved),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
