//! FIFO store of pending user questions.

use std::collections::{HashMap, VecDeque};

use liaison_common::{MessageId, UserId};

/// A question submitted by a user, waiting for an administrator's answer.
///
/// Owned exclusively by [`QuestionQueue`]; the engine hands out clones as
/// checkout snapshots.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PendingQuestion {
    pub id: MessageId,
    pub user_id: UserId,
    pub username: String,
    pub text: String,
}

/// FIFO queue of [`PendingQuestion`]s with O(1) removal by id.
///
/// Ownership and order are tracked separately: `remove` only touches the id
/// map, and ids left stale in the order deque are dropped the next time the
/// head is inspected. An id is never reused within a process.
#[derive(Debug, Default)]
pub struct QuestionQueue {
    entries: HashMap<MessageId, PendingQuestion>,
    order: VecDeque<MessageId>,
    next_id: u64,
}

impl QuestionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new question at the tail and return its id.
    pub fn enqueue(
        &mut self,
        user_id: UserId,
        username: impl Into<String>,
        text: impl Into<String>,
    ) -> MessageId {
        self.next_id += 1;
        let id = MessageId(self.next_id);
        self.entries.insert(id, PendingQuestion {
            id,
            user_id,
            username: username.into(),
            text: text.into(),
        });
        self.order.push_back(id);
        id
    }

    /// The oldest still-queued question, without removing it.
    pub fn peek_first(&mut self) -> Option<&PendingQuestion> {
        while let Some(id) = self.order.front() {
            if self.entries.contains_key(id) {
                break;
            }
            self.order.pop_front();
        }
        let id = *self.order.front()?;
        self.entries.get(&id)
    }

    /// Remove the question with `id`, wherever it sits in the queue.
    ///
    /// Returns whether it was still present. A second call for the same id
    /// is a no-op returning `false` — the answer flow removes speculatively
    /// and relies on this.
    pub fn remove(&mut self, id: MessageId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Whether `user_id` still has at least one question queued.
    pub fn has_question_from(&self, user_id: UserId) -> bool {
        self.entries.values().any(|q| q.user_id == user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_assigns_monotonic_ids() {
        let mut q = QuestionQueue::new();
        let a = q.enqueue(UserId(1), "alice", "first");
        let b = q.enqueue(UserId(2), "bob", "second");
        assert!(a < b);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn peek_returns_oldest() {
        let mut q = QuestionQueue::new();
        q.enqueue(UserId(1), "alice", "first");
        q.enqueue(UserId(2), "bob", "second");
        let head = q.peek_first().expect("queue is non-empty");
        assert_eq!(head.text, "first");
        assert_eq!(head.user_id, UserId(1));
    }

    #[test]
    fn peek_empty_returns_none() {
        let mut q = QuestionQueue::new();
        assert!(q.peek_first().is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut q = QuestionQueue::new();
        let id = q.enqueue(UserId(1), "alice", "only");
        assert!(q.remove(id));
        assert!(!q.remove(id));
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn fifo_survives_head_removal() {
        let mut q = QuestionQueue::new();
        let a = q.enqueue(UserId(1), "alice", "first");
        q.enqueue(UserId(2), "bob", "second");
        assert!(q.remove(a));
        let head = q.peek_first().expect("second question remains");
        assert_eq!(head.text, "second");
    }

    #[test]
    fn mid_queue_removal_keeps_order() {
        let mut q = QuestionQueue::new();
        q.enqueue(UserId(1), "alice", "first");
        let b = q.enqueue(UserId(2), "bob", "second");
        q.enqueue(UserId(3), "carol", "third");
        assert!(q.remove(b));
        assert_eq!(q.peek_first().map(|q| q.text.as_str()), Some("first"));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn has_question_from_tracks_removal() {
        let mut q = QuestionQueue::new();
        let id = q.enqueue(UserId(7), "g", "hello?");
        assert!(q.has_question_from(UserId(7)));
        q.remove(id);
        assert!(!q.has_question_from(UserId(7)));
    }
}
