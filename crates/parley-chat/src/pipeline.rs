use chrono::Utc;
use tracing::debug;

use crate::classifier::ToxicityClassifier;
use crate::error::ChatError;
use crate::model::{Message, NewMessage};
use crate::store::MessageStore;

/// Orchestrates the send path (classify -> stamp -> persist) and the two
/// follow-up operations: receiver lookup and mark-as-read.
///
/// All operations are synchronous and blocking on the store; callers that
/// live on an async runtime wrap them in `spawn_blocking`.
pub struct MessagePipeline<S, C> {
    store: S,
    classifier: C,
}

impl<S, C> MessagePipeline<S, C>
where
    S: MessageStore,
    C: ToxicityClassifier,
{
    pub fn new(store: S, classifier: C) -> Self {
        Self { store, classifier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Accept a message: stamp `delivered = true`, `read = false`, compute
    /// the toxic flag from the content, timestamp it, and persist. Returns
    /// the stored record with its store-assigned id. Store failures
    /// propagate unchanged; there is no retry.
    pub fn send_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        content: Option<String>,
    ) -> Result<Message, ChatError> {
        let toxic = self.classifier.is_toxic(content.as_deref());

        let message = self.store.insert(NewMessage {
            sender_id,
            receiver_id,
            content,
            delivered: true,
            read: false,
            toxic,
            created_at: Utc::now(),
        })?;

        debug!(
            id = message.id,
            sender = sender_id,
            receiver = receiver_id,
            toxic,
            "message accepted"
        );
        Ok(message)
    }

    /// All messages addressed to `receiver_id`, in store-native order.
    /// An unknown receiver yields an empty vec, not an error.
    pub fn messages_for_receiver(&self, receiver_id: i64) -> Result<Vec<Message>, ChatError> {
        Ok(self.store.find_by_receiver(receiver_id)?)
    }

    /// Flip `read` to true on an existing message and persist the update.
    /// Idempotent: marking an already-read message leaves it read.
    ///
    /// This is a plain read-modify-write. Concurrent callers race and the
    /// last write wins; no isolation guarantee is made.
    pub fn mark_read(&self, id: i64) -> Result<Message, ChatError> {
        let mut message = self.store.find_by_id(id)?.ok_or(ChatError::NotFound)?;
        message.read = true;
        let updated = self.store.update(&message)?;
        debug!(id, "message marked read");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::anyhow;

    use super::*;
    use crate::classifier::KeywordClassifier;
    use crate::error::StoreError;

    /// In-memory store double. Tracks write counts so tests can assert
    /// that failed operations perform no writes.
    #[derive(Default)]
    struct MemoryStore {
        inner: Mutex<MemoryInner>,
    }

    #[derive(Default)]
    struct MemoryInner {
        rows: Vec<Message>,
        next_id: i64,
        writes: usize,
    }

    impl MemoryStore {
        fn writes(&self) -> usize {
            self.inner.lock().unwrap().writes
        }
    }

    impl MessageStore for MemoryStore {
        fn insert(&self, message: NewMessage) -> Result<Message, StoreError> {
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            inner.writes += 1;
            let stored = Message {
                id: inner.next_id,
                sender_id: message.sender_id,
                receiver_id: message.receiver_id,
                content: message.content,
                delivered: message.delivered,
                read: message.read,
                toxic: message.toxic,
                created_at: message.created_at,
            };
            inner.rows.push(stored.clone());
            Ok(stored)
        }

        fn update(&self, message: &Message) -> Result<Message, StoreError> {
            let mut inner = self.inner.lock().unwrap();
            inner.writes += 1;
            let row = inner
                .rows
                .iter_mut()
                .find(|m| m.id == message.id)
                .ok_or_else(|| StoreError(anyhow!("no row {}", message.id)))?;
            *row = message.clone();
            Ok(row.clone())
        }

        fn find_by_id(&self, id: i64) -> Result<Option<Message>, StoreError> {
            let inner = self.inner.lock().unwrap();
            Ok(inner.rows.iter().find(|m| m.id == id).cloned())
        }

        fn find_by_receiver(&self, receiver_id: i64) -> Result<Vec<Message>, StoreError> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .rows
                .iter()
                .filter(|m| m.receiver_id == receiver_id)
                .cloned()
                .collect())
        }
    }

    /// Store double whose every operation fails, for pass-through checks.
    struct BrokenStore;

    impl MessageStore for BrokenStore {
        fn insert(&self, _message: NewMessage) -> Result<Message, StoreError> {
            Err(StoreError(anyhow!("store down")))
        }

        fn update(&self, _message: &Message) -> Result<Message, StoreError> {
            Err(StoreError(anyhow!("store down")))
        }

        fn find_by_id(&self, _id: i64) -> Result<Option<Message>, StoreError> {
            Err(StoreError(anyhow!("store down")))
        }

        fn find_by_receiver(&self, _receiver_id: i64) -> Result<Vec<Message>, StoreError> {
            Err(StoreError(anyhow!("store down")))
        }
    }

    fn pipeline() -> MessagePipeline<MemoryStore, KeywordClassifier> {
        MessagePipeline::new(MemoryStore::default(), KeywordClassifier::default())
    }

    #[test]
    fn send_stamps_delivered_and_unread() {
        let p = pipeline();
        let msg = p
            .send_message(1, 2, Some("Good morning".into()))
            .unwrap();
        assert!(msg.delivered);
        assert!(!msg.read);
        assert!(!msg.toxic);
        assert!(msg.id > 0);
    }

    #[test]
    fn send_flags_toxic_content() {
        let p = pipeline();
        let msg = p.send_message(1, 2, Some("I hate this".into())).unwrap();
        assert!(msg.toxic);
        // Delivered regardless of content.
        assert!(msg.delivered);
    }

    #[test]
    fn send_without_content_is_not_toxic() {
        let p = pipeline();
        let msg = p.send_message(1, 2, None).unwrap();
        assert!(!msg.toxic);
        assert!(msg.delivered);
    }

    #[test]
    fn mark_read_flips_once_and_is_idempotent() {
        let p = pipeline();
        let sent = p.send_message(1, 2, Some("hello".into())).unwrap();
        assert!(!sent.read);

        let first = p.mark_read(sent.id).unwrap();
        assert!(first.read);

        let second = p.mark_read(sent.id).unwrap();
        assert!(second.read);
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn mark_read_unknown_id_is_not_found_and_writes_nothing() {
        let store = MemoryStore::default();
        let p = MessagePipeline::new(store, KeywordClassifier::default());

        let err = p.mark_read(42).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Message not found");
        assert_eq!(p.store().writes(), 0);
    }

    #[test]
    fn receiver_with_no_messages_gets_empty_vec() {
        let p = pipeline();
        let msgs = p.messages_for_receiver(99).unwrap();
        assert!(msgs.is_empty());
    }

    #[test]
    fn receiver_lookup_returns_all_with_toxicity_flags() {
        let p = pipeline();
        p.send_message(1, 7, Some("hi there".into())).unwrap();
        p.send_message(2, 7, Some("you are stupid".into())).unwrap();
        p.send_message(3, 7, Some("lunch?".into())).unwrap();
        // Different receiver, must not show up.
        p.send_message(1, 8, Some("other inbox".into())).unwrap();

        let msgs = p.messages_for_receiver(7).unwrap();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs.iter().filter(|m| m.toxic).count(), 1);
        assert!(msgs.iter().all(|m| m.receiver_id == 7));
    }

    #[test]
    fn store_failures_pass_through() {
        let p = MessagePipeline::new(BrokenStore, KeywordClassifier::default());

        assert!(matches!(
            p.send_message(1, 2, Some("hi".into())),
            Err(ChatError::Store(_))
        ));
        assert!(matches!(
            p.messages_for_receiver(1),
            Err(ChatError::Store(_))
        ));
        assert!(matches!(p.mark_read(1), Err(ChatError::Store(_))));
    }
}
