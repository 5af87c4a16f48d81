//! Notification row for the `notifications` table.
//!
//! Rows are produced exclusively as a side effect of an admin status
//! transition on a complaint, lost-and-found posting, or volunteer
//! registration. Only the recipient may mark them read or delete them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TABLE: &str = "notifications";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}
