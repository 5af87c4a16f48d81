//! Khidmat: the data-sync and workflow core of a community service portal.
//!
//! Complaints, lost-and-found postings, volunteer registrations, and the
//! notifications produced by their admin workflows, backed by an opaque
//! row store with change subscriptions. The concrete backend (database,
//! blob host, identity service) sits behind the trait seams in [`store`],
//! [`blob`], and [`session`]; in-process backends ship for tests and
//! development.

pub mod app_config;
pub mod blob;
pub mod error;
pub mod live;
pub mod model;
pub mod notify;
pub mod repo;
pub mod session;
pub mod store;
pub mod workflow;
