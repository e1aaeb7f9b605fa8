use pling_common::ServerEvent;

use crate::registry::ConnectionHandle;
use crate::AppState;

/// Handle a session's request to mark a notification as read.
///
/// On success the requesting session, and only it, receives a
/// `notification_read` confirmation followed by the recomputed unread
/// count. An unknown id is a silent no-op toward the client; only the
/// server log records it.
pub async fn mark_as_read(state: &AppState, handle: &ConnectionHandle, notification_id: u64) {
    let updated = state.store.write().await.mark_read(notification_id);

    match updated {
        Some(notification) => {
            let unread = state.store.read().await.unread_count();
            let _ = handle
                .send(ServerEvent::NotificationRead {
                    notification_id: notification.id,
                })
                .await;
            let _ = handle.send(ServerEvent::UnreadCount { count: unread }).await;
        }
        None => {
            println!(
                "mark_as_read: unknown notification {} from client {}, ignoring",
                notification_id,
                handle.id()
            );
        }
    }
}
