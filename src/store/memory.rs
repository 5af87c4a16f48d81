//! In-process row store backend.
//!
//! Serves as the backend for tests and development. Mutations notify
//! matching subscribers synchronously after the row guard is released, so
//! a callback is free to issue further store calls.

use super::{ChangeCallback, ChangeEvent, ChangeOp, Order, RowFilter, RowStore, StoreError, Subscription};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

struct Subscriber {
    table: String,
    filter: RowFilter,
    callback: ChangeCallback,
}

/// DashMap-backed row store.
pub struct MemoryStore {
    tables: DashMap<String, DashMap<Uuid, Value>>,
    subscribers: Arc<DashMap<u64, Subscriber>>,
    next_subscriber_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        log::info!("MemoryStore initialized");
        Self {
            tables: DashMap::new(),
            subscribers: Arc::new(DashMap::new()),
            next_subscriber_id: AtomicU64::new(0),
        }
    }

    fn created_at_of(row: &Value) -> NaiveDateTime {
        row.get("created_at")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(NaiveDateTime::MIN)
    }

    fn id_string_of(row: &Value) -> String {
        row.get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Deliver a committed mutation to every matching subscriber.
    /// `row` is the post-mutation row, or the removed row for deletes.
    /// For updates, `before` carries the pre-mutation row: a subscriber
    /// matching either side is notified, so a row leaving a filtered set
    /// still signals the views watching that set.
    fn notify(&self, table: &str, op: ChangeOp, before: Option<&Value>, row: &Value) {
        let row_id = row
            .get("id")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_else(Uuid::nil);

        let event = ChangeEvent {
            table: table.to_string(),
            op,
            row_id,
        };

        // Collect callbacks first so the registry is not locked while
        // subscriber code runs.
        let callbacks: Vec<ChangeCallback> = self
            .subscribers
            .iter()
            .filter(|entry| {
                entry.table == table
                    && (entry.filter.matches(row)
                        || before.is_some_and(|b| entry.filter.matches(b)))
            })
            .map(|entry| entry.callback.clone())
            .collect();

        log::debug!(
            "MemoryStore: {:?} on {} row {} -> {} subscriber(s)",
            op,
            table,
            row_id,
            callbacks.len()
        );

        for callback in callbacks {
            callback(&event);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select(
        &self,
        table: &str,
        filter: &RowFilter,
        order: Order,
    ) -> Result<Vec<Value>, StoreError> {
        let mut rows: Vec<Value> = match self.tables.get(table) {
            Some(rows) => rows
                .iter()
                .filter(|entry| filter.matches(entry.value()))
                .map(|entry| entry.value().clone())
                .collect(),
            None => Vec::new(),
        };

        rows.sort_by(|a, b| {
            let key_a = (Self::created_at_of(a), Self::id_string_of(a));
            let key_b = (Self::created_at_of(b), Self::id_string_of(b));
            match order {
                Order::NewestFirst => key_b.cmp(&key_a),
                Order::OldestFirst => key_a.cmp(&key_b),
            }
        });

        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        let mut fields = match row {
            Value::Object(fields) => fields,
            other => {
                return Err(StoreError::Backend(format!(
                    "insert into {} expects an object row, got {}",
                    table, other
                )))
            }
        };

        // Server-side assignment of identity and creation instant.
        let id = match fields.get("id").and_then(Value::as_str) {
            Some(s) => Uuid::parse_str(s)
                .map_err(|e| StoreError::Backend(format!("bad id on insert: {}", e)))?,
            None => {
                let id = Uuid::new_v4();
                fields.insert("id".to_string(), Value::String(id.to_string()));
                id
            }
        };
        if !fields.contains_key("created_at") {
            fields.insert(
                "created_at".to_string(),
                serde_json::to_value(Utc::now().naive_utc())
                    .map_err(|e| StoreError::Backend(e.to_string()))?,
            );
        }

        let stored = Value::Object(fields);
        self.tables
            .entry(table.to_string())
            .or_insert_with(DashMap::new)
            .insert(id, stored.clone());

        self.notify(table, ChangeOp::Insert, None, &stored);
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Value, StoreError> {
        let (before, updated) = {
            let rows = self
                .tables
                .get(table)
                .ok_or_else(|| StoreError::Missing(format!("{} row {}", table, id)))?;
            let mut row = rows
                .get_mut(&id)
                .ok_or_else(|| StoreError::Missing(format!("{} row {}", table, id)))?;

            let before = row.value().clone();
            if let Value::Object(fields) = row.value_mut() {
                for (column, value) in patch {
                    fields.insert(column, value);
                }
            }
            (before, row.value().clone())
        };

        self.notify(table, ChangeOp::Update, Some(&before), &updated);
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<(), StoreError> {
        let removed = self.tables.get(table).and_then(|rows| rows.remove(&id));

        // Idempotent: a second delete of the same id finds nothing and
        // reports success without an event.
        if let Some((_, row)) = removed {
            self.notify(table, ChangeOp::Delete, None, &row);
        }
        Ok(())
    }

    async fn count(&self, table: &str, filter: &RowFilter) -> Result<u64, StoreError> {
        let count = match self.tables.get(table) {
            Some(rows) => rows
                .iter()
                .filter(|entry| filter.matches(entry.value()))
                .count(),
            None => 0,
        };
        Ok(count as u64)
    }

    fn subscribe_changes(
        &self,
        table: &str,
        filter: RowFilter,
        callback: ChangeCallback,
    ) -> Subscription {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(
            id,
            Subscriber {
                table: table.to_string(),
                filter,
                callback,
            },
        );
        log::debug!("MemoryStore: subscriber {} opened on {}", id, table);

        let registry = Arc::clone(&self.subscribers);
        Subscription::new(move || {
            registry.remove(&id);
            log::debug!("MemoryStore: subscriber {} closed", id);
        })
    }
}
