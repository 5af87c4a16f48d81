//! Live view synchronizer.
//!
//! Keeps a client-held list consistent with the remote store without
//! polling: one seed fetch on activation, one change subscription for the
//! lifetime of the view, one wholesale re-fetch per observed change. Each
//! view owns its subscription and its list; concurrently open views over
//! the same table never share state.
//!
//! Lifetime discipline is enforced by construction: `activate` opens
//! exactly one subscription, and the handle is torn down exactly once —
//! on [`LiveView::deactivate`] or on drop. A deactivated view cannot
//! receive a stale re-seed because deactivation consumes it.

use crate::error::PortalError;
use crate::repo::{ListFilter, Record, Repo};
use crate::store::RowStore;
use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::StreamExt;
use std::sync::Arc;

/// A list of rows kept in sync with the store.
pub struct LiveView<T: Record> {
    repo: Repo<T>,
    filter: ListFilter,
    rows: Vec<T>,
    signals: UnboundedReceiver<()>,
    _subscription: crate::store::Subscription,
}

impl<T: Record> LiveView<T> {
    /// Open a view: subscribe to changes first, then seed. Subscribing
    /// before the seed fetch means a mutation landing between the two
    /// shows up as a pending signal instead of being lost.
    pub async fn activate(
        store: Arc<dyn RowStore>,
        filter: ListFilter,
    ) -> Result<Self, PortalError> {
        let (tx, signals) = mpsc::unbounded();
        let subscription = store.subscribe_changes(
            T::TABLE,
            filter.to_row_filter(),
            Arc::new(move |_event| {
                // Signal only; the re-seed happens on the view's own task.
                // A send after the receiver is gone means the view was
                // deactivated and the event is intentionally discarded.
                let _ = tx.unbounded_send(());
            }),
        );

        let repo = Repo::new(store);
        let rows = repo.list(&filter).await?;
        log::debug!(
            "LiveView on {} activated with {} row(s)",
            T::TABLE,
            rows.len()
        );

        Ok(Self {
            repo,
            filter,
            rows,
            signals,
            _subscription: subscription,
        })
    }

    /// The current snapshot, newest-first.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Apply pending change signals. Returns whether a re-seed happened.
    ///
    /// Signals are delivered at least once per remote mutation; a batch of
    /// pending signals coalesces into a single re-fetch, which preserves
    /// final-state equivalence. A signal racing a local mutation costs at
    /// worst one redundant re-fetch.
    pub async fn sync(&mut self) -> Result<bool, PortalError> {
        let mut pending = false;
        while let Ok(Some(())) = self.signals.try_next() {
            pending = true;
        }

        if pending {
            self.rows = self.repo.list(&self.filter).await?;
            log::debug!(
                "LiveView on {} re-seeded to {} row(s)",
                T::TABLE,
                self.rows.len()
            );
        }
        Ok(pending)
    }

    /// Wait for the next remote change, then re-seed. Returns the fresh
    /// snapshot, or None when the store side has gone away.
    pub async fn changed(&mut self) -> Result<Option<&[T]>, PortalError> {
        if self.signals.next().await.is_none() {
            return Ok(None);
        }
        // Coalesce anything else that queued behind the first signal.
        while let Ok(Some(())) = self.signals.try_next() {}

        self.rows = self.repo.list(&self.filter).await?;
        Ok(Some(&self.rows))
    }

    /// Tear the view down. Unsubscribes via the handle's drop; any event
    /// delivered after this point has no view to land on.
    pub fn deactivate(self) {
        log::debug!("LiveView on {} deactivated", T::TABLE);
    }
}
