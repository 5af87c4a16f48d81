//! Row store abstraction.
//!
//! The portal core never talks to a concrete database; every table access
//! goes through the [`RowStore`] trait. Rows travel as JSON objects so the
//! seam stays backend-agnostic. Backends:
//! - `memory`: in-process store used by tests and development.

pub mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Row store operation errors.
#[derive(Debug)]
pub enum StoreError {
    /// The target row does not exist.
    Missing(String),
    /// The backend call failed or timed out.
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Missing(msg) => write!(f, "Missing row: {}", msg),
            StoreError::Backend(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Conjunction of column equality terms, the only filter shape the portal
/// needs (owner scoping, status scoping, key lookups).
#[derive(Clone, Debug, Default)]
pub struct RowFilter {
    terms: Vec<(String, Value)>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality term. Non-serializable values never occur for the
    /// column types used here; they degrade to a null match.
    pub fn eq<V: serde::Serialize>(mut self, column: &str, value: V) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.terms.push((column.to_string(), value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether a row satisfies every term.
    pub fn matches(&self, row: &Value) -> bool {
        self.terms
            .iter()
            .all(|(column, expected)| row.get(column) == Some(expected))
    }
}

/// Sort order for `select`. Every portal list view reads newest-first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Order {
    NewestFirst,
    OldestFirst,
}

/// A single committed mutation, delivered to matching subscribers.
#[derive(Clone, Debug)]
pub struct ChangeEvent {
    pub table: String,
    pub op: ChangeOp,
    pub row_id: Uuid,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// Callback invoked for each change event matching a subscription.
pub type ChangeCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Handle for an open change subscription.
///
/// Unsubscribes exactly once: either explicitly via [`unsubscribe`] or when
/// the handle is dropped. There is no path that leaves the subscription
/// registered after the handle is gone.
///
/// [`unsubscribe`]: Subscription::unsubscribe
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Tear the subscription down deterministically.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Trait for row store backends.
///
/// `insert` assigns `id` and `created_at` server-side when the caller did
/// not provide them. `delete` is idempotent: removing an absent row is not
/// an error.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Fetch every row matching `filter`, sorted by `created_at` with row
    /// id as tie-break.
    async fn select(
        &self,
        table: &str,
        filter: &RowFilter,
        order: Order,
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert a row and return it as stored.
    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError>;

    /// Apply a partial update and return the updated row.
    async fn update(
        &self,
        table: &str,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Value, StoreError>;

    /// Remove a row. Succeeds whether or not the row existed.
    async fn delete(&self, table: &str, id: Uuid) -> Result<(), StoreError>;

    /// Count rows matching `filter`.
    async fn count(&self, table: &str, filter: &RowFilter) -> Result<u64, StoreError>;

    /// Register a change listener for a (table, filter) tuple. Every
    /// committed insert/update/delete whose row matches the filter invokes
    /// the callback once.
    fn subscribe_changes(
        &self,
        table: &str,
        filter: RowFilter,
        callback: ChangeCallback,
    ) -> Subscription;
}
