use chrono::Utc;
use thiserror::Error;

use pling_common::Notification;

/// A required field was missing or empty. The message names the field and
/// is safe to echo back to the caller.
#[derive(Debug, Error, PartialEq)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// In-memory, insertion-ordered notification store.
///
/// Ids are assigned from an internal counter that only advances on a
/// successful append, so they are strictly increasing and dense from 1.
/// The record list is only ever appended to or flipped to read; it is
/// never reordered.
#[derive(Debug, Default)]
pub struct NotificationStore {
    notifications: Vec<Notification>,
    next_id: u64,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            notifications: Vec::new(),
            next_id: 1,
        }
    }

    /// Validate a title/message pair without touching the store.
    pub fn validate(title: &str, message: &str) -> Result<(), ValidationError> {
        if title.is_empty() {
            return Err(ValidationError("Title is required".to_string()));
        }
        if message.is_empty() {
            return Err(ValidationError("Message is required".to_string()));
        }
        Ok(())
    }

    /// Create and store a record with the next id, unread, stamped now.
    /// Rejects empty fields before any state changes, so a failed append
    /// never consumes an id.
    pub fn append(&mut self, title: &str, message: &str) -> Result<Notification, ValidationError> {
        Self::validate(title, message)?;

        let notification = Notification {
            id: self.next_id,
            title: title.to_string(),
            message: message.to_string(),
            read: false,
            created_at: Utc::now(),
        };
        self.next_id += 1;
        self.notifications.push(notification.clone());
        Ok(notification)
    }

    /// All records, oldest first. Used for history replay on register.
    pub fn list_all(&self) -> &[Notification] {
        &self.notifications
    }

    /// Flip a record to read. Idempotent; returns the updated record, or
    /// `None` if the id is unknown.
    pub fn mark_read(&mut self, id: u64) -> Option<Notification> {
        let notification = self.notifications.iter_mut().find(|n| n.id == id)?;
        notification.read = true;
        Some(notification.clone())
    }

    /// Count of unread records, recomputed from the record list each call.
    /// No incremental counter to drift out of sync.
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_increasing_from_one() {
        let mut store = NotificationStore::new();
        for expected in 1..=5u64 {
            let n = store.append("Title", "Body").unwrap();
            assert_eq!(n.id, expected);
        }
        let ids: Vec<u64> = store.list_all().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn append_rejects_empty_fields_without_consuming_ids() {
        let mut store = NotificationStore::new();
        assert_eq!(
            store.append("", "Body"),
            Err(ValidationError("Title is required".to_string()))
        );
        assert_eq!(
            store.append("Title", ""),
            Err(ValidationError("Message is required".to_string()))
        );
        assert!(store.list_all().is_empty());

        // A failed append must not leave a gap.
        assert_eq!(store.append("Title", "Body").unwrap().id, 1);
    }

    #[test]
    fn mark_read_is_idempotent() {
        let mut store = NotificationStore::new();
        let id = store.append("Title", "Body").unwrap().id;

        let first = store.mark_read(id).unwrap();
        assert!(first.read);
        let second = store.mark_read(id).unwrap();
        assert!(second.read);
    }

    #[test]
    fn mark_read_unknown_id_returns_none() {
        let mut store = NotificationStore::new();
        store.append("Title", "Body").unwrap();
        assert!(store.mark_read(99).is_none());
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn unread_count_matches_recount_after_every_mutation() {
        let mut store = NotificationStore::new();

        let recount =
            |store: &NotificationStore| store.list_all().iter().filter(|n| !n.read).count();

        for i in 0..4 {
            store.append(&format!("n{i}"), "body").unwrap();
            assert_eq!(store.unread_count(), recount(&store));
        }
        store.mark_read(2).unwrap();
        assert_eq!(store.unread_count(), recount(&store));
        assert_eq!(store.unread_count(), 3);

        store.mark_read(2).unwrap();
        assert_eq!(store.unread_count(), 3);

        store.mark_read(4).unwrap();
        assert_eq!(store.unread_count(), recount(&store));
        assert_eq!(store.unread_count(), 2);
    }
}
