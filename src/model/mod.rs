//! Entity row types, one file per table.

pub mod complaints;
pub mod lost_found;
pub mod notifications;
pub mod users;
pub mod volunteers;
