use crate::models::email::Email;
use crate::models::inbox::Inbox;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    inboxes: HashMap<Uuid, Inbox>,
    /// Emails indexed directly by id; the owning inbox travels on the
    /// record, so cross-inbox lookup is a single map hit.
    emails: HashMap<i64, Email>,
    /// Per-inbox email ids in insertion order.
    by_inbox: HashMap<Uuid, Vec<i64>>,
}

/// Process-memory store for inboxes and their emails. Constructed once
/// and injected through application state; nothing survives a restart.
/// Interior locking keeps individual operations atomic under the
/// multi-threaded runtime.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    last_email_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Lock poisoning only happens if a writer panicked mid-operation;
    // the tables stay structurally valid, so recover the guard.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Allocates the next email id: the unix millisecond clock, bumped
    /// past the previous allocation so ids stay strictly increasing even
    /// when two emails land in the same millisecond.
    pub fn next_email_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last_email_id.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self.last_email_id.compare_exchange(
                prev,
                next,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    pub fn insert_inbox(&self, inbox: Inbox) {
        let mut tables = self.write();
        tables.by_inbox.entry(inbox.id).or_default();
        tables.inboxes.insert(inbox.id, inbox);
    }

    pub fn get_inbox(&self, id: Uuid) -> Option<Inbox> {
        self.read().inboxes.get(&id).cloned()
    }

    pub fn contains_inbox(&self, id: Uuid) -> bool {
        self.read().inboxes.contains_key(&id)
    }

    /// Mutates an inbox in place, returning the updated record.
    pub fn update_inbox<F>(&self, id: Uuid, apply: F) -> Option<Inbox>
    where
        F: FnOnce(&mut Inbox),
    {
        let mut tables = self.write();
        let inbox = tables.inboxes.get_mut(&id)?;
        apply(inbox);
        Some(inbox.clone())
    }

    pub fn append_email(&self, email: Email) {
        let mut tables = self.write();
        tables.by_inbox.entry(email.inbox_id).or_default().push(email.id);
        tables.emails.insert(email.id, email);
    }

    pub fn get_email(&self, id: i64) -> Option<Email> {
        self.read().emails.get(&id).cloned()
    }

    /// All emails for an inbox in insertion order, soft-deleted records
    /// included. Unknown inboxes yield an empty list.
    pub fn emails_for(&self, inbox_id: Uuid) -> Vec<Email> {
        let tables = self.read();
        tables
            .by_inbox
            .get(&inbox_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| tables.emails.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drops all of an inbox's emails from storage (used by address
    /// rotation, which starts the inbox over with a fresh seed).
    pub fn clear_emails(&self, inbox_id: Uuid) {
        let mut tables = self.write();
        let ids = tables.by_inbox.remove(&inbox_id).unwrap_or_default();
        for id in &ids {
            tables.emails.remove(id);
        }
        tables.by_inbox.insert(inbox_id, Vec::new());
    }

    /// Soft delete. Returns false only when the id is unknown; deleting
    /// an already-deleted email succeeds again.
    pub fn mark_deleted(&self, id: i64) -> bool {
        let mut tables = self.write();
        match tables.emails.get_mut(&id) {
            Some(email) => {
                email.deleted = true;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::email::Email;
    use chrono::Utc;

    fn inbox() -> Inbox {
        let now = Utc::now();
        Inbox {
            id: Uuid::new_v4(),
            email_address: "abc123defg@tempmail.org".to_string(),
            created_at: now,
            expires_at: now,
        }
    }

    fn email(store: &MemoryStore, inbox_id: Uuid, subject: &str) -> Email {
        Email {
            id: store.next_email_id(),
            inbox_id,
            from_address: "welcome@temp-mail.org".to_string(),
            subject: subject.to_string(),
            content: String::new(),
            received_at: Utc::now(),
            deleted: false,
            otp: None,
            otp_expires_at: None,
        }
    }

    #[test]
    fn email_ids_are_strictly_increasing() {
        let store = MemoryStore::new();
        let mut last = 0;
        for _ in 0..1000 {
            let id = store.next_email_id();
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn listing_preserves_insertion_order() {
        let store = MemoryStore::new();
        let ib = inbox();
        let id = ib.id;
        store.insert_inbox(ib);

        for subject in ["first", "second", "third"] {
            store.append_email(email(&store, id, subject));
        }

        let listed = store.emails_for(id);
        let subjects: Vec<&str> = listed.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, ["first", "second", "third"]);
    }

    #[test]
    fn unknown_inbox_lists_empty() {
        let store = MemoryStore::new();
        assert!(store.emails_for(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn soft_delete_keeps_the_record() {
        let store = MemoryStore::new();
        let ib = inbox();
        let id = ib.id;
        store.insert_inbox(ib);
        let e = email(&store, id, "doomed");
        let email_id = e.id;
        store.append_email(e);

        assert!(store.mark_deleted(email_id));
        // Still present in storage, just flagged.
        let stored = store.get_email(email_id).unwrap();
        assert!(stored.deleted);
        assert_eq!(store.emails_for(id).len(), 1);

        // Repeat deletes still report success.
        assert!(store.mark_deleted(email_id));
        assert!(!store.mark_deleted(email_id + 999_999));
    }

    #[test]
    fn clear_emails_removes_storage_for_the_inbox() {
        let store = MemoryStore::new();
        let ib = inbox();
        let id = ib.id;
        store.insert_inbox(ib);
        let e = email(&store, id, "gone after rotation");
        let email_id = e.id;
        store.append_email(e);

        store.clear_emails(id);
        assert!(store.emails_for(id).is_empty());
        assert!(store.get_email(email_id).is_none());
    }
}
