//! Ordered set of administrators waiting for a chat assignment.

use std::collections::VecDeque;

use liaison_common::AdminId;

/// FIFO pool of idle admins who opted in to receive the next waiting user.
///
/// An admin is in at most one of {this pool, an active chat session} at any
/// time; the [`MatchingEngine`](crate::MatchingEngine) maintains that
/// exclusivity across its operations.
#[derive(Debug, Default)]
pub struct AdminAvailabilityPool {
    waiting: VecDeque<AdminId>,
}

impl AdminAvailabilityPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `admin` at the tail. No-op if already present.
    pub fn mark_available(&mut self, admin: AdminId) {
        if !self.contains(admin) {
            self.waiting.push_back(admin);
        }
    }

    /// Remove `admin`. No-op if absent.
    pub fn mark_unavailable(&mut self, admin: AdminId) {
        self.waiting.retain(|a| *a != admin);
    }

    /// Remove and return the admin who has waited longest.
    pub fn take_next_if_any(&mut self) -> Option<AdminId> {
        self.waiting.pop_front()
    }

    /// The admin who has waited longest, without removing them.
    pub fn peek_next(&self) -> Option<AdminId> {
        self.waiting.front().copied()
    }

    pub fn contains(&self, admin: AdminId) -> bool {
        self.waiting.iter().any(|a| *a == admin)
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_next_is_fifo() {
        let mut pool = AdminAvailabilityPool::new();
        pool.mark_available(AdminId(1));
        pool.mark_available(AdminId(2));
        assert_eq!(pool.take_next_if_any(), Some(AdminId(1)));
        assert_eq!(pool.take_next_if_any(), Some(AdminId(2)));
        assert_eq!(pool.take_next_if_any(), None);
    }

    #[test]
    fn mark_available_is_idempotent() {
        let mut pool = AdminAvailabilityPool::new();
        pool.mark_available(AdminId(1));
        pool.mark_available(AdminId(1));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn mark_unavailable_absent_is_noop() {
        let mut pool = AdminAvailabilityPool::new();
        pool.mark_available(AdminId(1));
        pool.mark_unavailable(AdminId(9));
        assert!(pool.contains(AdminId(1)));
    }

    #[test]
    fn reinsert_moves_to_tail() {
        let mut pool = AdminAvailabilityPool::new();
        pool.mark_available(AdminId(1));
        pool.mark_available(AdminId(2));
        pool.mark_unavailable(AdminId(1));
        pool.mark_available(AdminId(1));
        assert_eq!(pool.take_next_if_any(), Some(AdminId(2)));
        assert_eq!(pool.take_next_if_any(), Some(AdminId(1)));
    }
}
