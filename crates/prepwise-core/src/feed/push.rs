// ── Push bridge ──
//
// Forwards `new-alert` events from a push subscription into the feed.
// Reconnection is the push channel's concern; this task only ends when
// cancelled or when the channel closes.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use prepwise_api::PushEvent;

use super::AlertFeed;

pub fn spawn_push_bridge(
    feed: Arc<AlertFeed>,
    mut events: broadcast::Receiver<Arc<PushEvent>>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Ok(event) => match event.as_ref() {
                        PushEvent::NewAlert(record) => {
                            feed.on_push(record.clone());
                        }
                        PushEvent::Other { event, .. } => {
                            debug!(event = %event, "ignoring push event");
                        }
                    },
                    Err(RecvError::Lagged(n)) => {
                        warn!(skipped = n, "push bridge lagged, alerts were dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        debug!("push bridge stopped");
    })
}
