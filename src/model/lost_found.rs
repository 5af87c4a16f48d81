//! Lost-and-found posting row for the `lost_found_items` table.
//!
//! `kind` records whether the posting reports a lost or a found item;
//! `status` tracks whether the case is still open. The two are independent:
//! a posting of kind `Found` is itself marked status `Found` once the owner
//! has been reunited with it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TABLE: &str = "lost_found_items";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LostFoundItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub kind: ItemKind,
    /// Blob store key of the item photo.
    pub image_key: Option<String>,
    pub status: ItemStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Lost,
    Found,
}

impl ItemKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Lost => "Lost",
            Self::Found => "Found",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case state, freely reversible by an admin.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Pending,
    Found,
}

impl ItemStatus {
    pub const INITIAL: ItemStatus = ItemStatus::Pending;

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Found => "Found",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Found" => Some(Self::Found),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
