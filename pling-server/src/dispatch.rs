use tokio::sync::RwLock;

use pling_common::{Notification, ServerEvent};

use crate::registry::{ConnectionHandle, ConnectionRegistry};

/// How a dispatch was delivered, for the ingress log line.
#[derive(Debug, PartialEq)]
pub enum Delivery {
    /// Delivered to the single handle registered for this identity.
    Targeted(String),
    /// Delivered to every live handle; carries how many accepted the send.
    Broadcast(usize),
}

/// Deliver a new notification to one registered identity, or to everyone.
///
/// A target that is not currently registered silently falls back to
/// broadcast. Delivery is best-effort; nothing is queued for offline
/// users. A handle that closed between lookup and send is skipped without
/// affecting delivery to the rest.
///
/// Handles are snapshot under the registry lock and the lock is released
/// before any send. A send can wait on a session's full outbound queue,
/// and a slow client must not hold up registrations or disconnects.
pub async fn dispatch(
    registry: &RwLock<ConnectionRegistry>,
    notification: &Notification,
    target: Option<&str>,
) -> Delivery {
    let (targeted, handles): (Option<(String, ConnectionHandle)>, Vec<ConnectionHandle>) = {
        let registry = registry.read().await;
        let targeted = target.and_then(|identity| {
            registry
                .lookup(identity)
                .map(|handle| (identity.to_string(), handle))
        });
        match targeted {
            Some(pair) => (Some(pair), Vec::new()),
            None => (None, registry.all_handles()),
        }
    };

    let event = ServerEvent::NewNotification {
        notification: notification.clone(),
    };

    if let Some((identity, handle)) = targeted {
        let _ = handle.send(event).await;
        return Delivery::Targeted(identity);
    }

    let mut delivered = 0;
    for handle in handles {
        if handle.send(event.clone()).await.is_ok() {
            delivered += 1;
        }
    }
    Delivery::Broadcast(delivered)
}
