// ── Feed subscription ──
//
// Change notification for consumers that follow the feed, e.g. the live
// watch printing alerts as they arrive.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;

use crate::model::{Alert, AlertId};

pub type AlertSnapshot = Arc<Vec<Arc<Alert>>>;

/// A subscription to the alert collection.
pub struct AlertStream {
    current: AlertSnapshot,
    receiver: watch::Receiver<AlertSnapshot>,
}

impl AlertStream {
    pub(crate) fn new(mut receiver: watch::Receiver<AlertSnapshot>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or at the last change seen.
    pub fn current(&self) -> &AlertSnapshot {
        &self.current
    }

    /// Wait for the next change. `None` once the feed is dropped.
    pub async fn changed(&mut self) -> Option<AlertSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Wait for the next change and return the alerts it added, in feed
    /// order. An alert counts as added when its id was not in the
    /// previous snapshot, so replace-loads report their new entries too.
    pub async fn arrivals(&mut self) -> Option<Vec<Arc<Alert>>> {
        let previous = Arc::clone(&self.current);
        let next = self.changed().await?;
        let known: HashSet<&AlertId> = previous.iter().map(|a| &a.id).collect();
        Some(
            next.iter()
                .filter(|a| !known.contains(&a.id))
                .cloned()
                .collect(),
        )
    }
}
