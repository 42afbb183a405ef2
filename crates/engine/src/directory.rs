//! Bidirectional mapping between users and admins for live relay chats.

use std::collections::{HashMap, VecDeque};

use thiserror::Error;

use liaison_common::{AdminId, UserId};

/// Why a directory mutation was refused.
///
/// Exclusivity is enforced here, inside the store, rather than by call-site
/// discipline: callers that check first never see these, but a caller that
/// skips the check gets a named failure instead of corrupted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("user already has a session entry")]
    AlreadyInSession,

    #[error("user is in another session")]
    UserBusy,

    #[error("admin is in another session")]
    AdminBusy,

    #[error("user has no waiting entry")]
    NotWaiting,

    #[error("user has no session entry")]
    NoSession,
}

/// The two consistent views of all chat sessions, plus the FIFO order of
/// users still waiting for an admin.
///
/// Invariant: `user_to_admin[u] == Some(a)` iff `admin_to_user[a] == u`, and
/// the waiting deque contains exactly the users mapped to `None`, in the
/// order they queued.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    user_to_admin: HashMap<UserId, Option<AdminId>>,
    admin_to_user: HashMap<AdminId, UserId>,
    waiting: VecDeque<UserId>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a waiting session (admin = None) for `user`.
    pub fn queue_user(&mut self, user: UserId) -> Result<(), DirectoryError> {
        if self.user_to_admin.contains_key(&user) {
            return Err(DirectoryError::AlreadyInSession);
        }
        self.user_to_admin.insert(user, None);
        self.waiting.push_back(user);
        Ok(())
    }

    /// Establish a fresh active session between two currently-free parties.
    pub fn pair_user_with_admin(
        &mut self,
        user: UserId,
        admin: AdminId,
    ) -> Result<(), DirectoryError> {
        if self.user_to_admin.contains_key(&user) {
            return Err(DirectoryError::UserBusy);
        }
        if self.admin_to_user.contains_key(&admin) {
            return Err(DirectoryError::AdminBusy);
        }
        self.user_to_admin.insert(user, Some(admin));
        self.admin_to_user.insert(admin, user);
        Ok(())
    }

    /// Attach `admin` to an existing waiting entry, making it active.
    pub fn assign_waiting_user_to_admin(
        &mut self,
        user: UserId,
        admin: AdminId,
    ) -> Result<(), DirectoryError> {
        if !matches!(self.user_to_admin.get(&user), Some(None)) {
            return Err(DirectoryError::NotWaiting);
        }
        if self.admin_to_user.contains_key(&admin) {
            return Err(DirectoryError::AdminBusy);
        }
        self.user_to_admin.insert(user, Some(admin));
        self.admin_to_user.insert(admin, user);
        self.waiting.retain(|u| *u != user);
        Ok(())
    }

    /// The admin paired with `user`, if the session is active.
    ///
    /// `None` covers both "no session" and "waiting" — distinguish with
    /// [`is_waiting`](Self::is_waiting) or [`has_entry`](Self::has_entry).
    pub fn admin_for(&self, user: UserId) -> Option<AdminId> {
        self.user_to_admin.get(&user).copied().flatten()
    }

    pub fn user_for(&self, admin: AdminId) -> Option<UserId> {
        self.admin_to_user.get(&admin).copied()
    }

    /// Remove both directions of `user`'s session. Returns the admin that was
    /// paired, if any, so the caller can notify them.
    pub fn end_session(&mut self, user: UserId) -> Result<Option<AdminId>, DirectoryError> {
        let Some(admin) = self.user_to_admin.remove(&user) else {
            return Err(DirectoryError::NoSession);
        };
        match admin {
            Some(a) => {
                self.admin_to_user.remove(&a);
            },
            None => {
                self.waiting.retain(|u| *u != user);
            },
        }
        Ok(admin)
    }

    /// Whether `user` has a waiting (admin = None) entry.
    pub fn is_waiting(&self, user: UserId) -> bool {
        matches!(self.user_to_admin.get(&user), Some(None))
    }

    /// Whether `user` has any session entry, waiting or active.
    pub fn has_entry(&self, user: UserId) -> bool {
        self.user_to_admin.contains_key(&user)
    }

    /// The user who has been waiting longest.
    pub fn first_waiting(&self) -> Option<UserId> {
        self.waiting.front().copied()
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// 1-based position of `user` in the waiting order. Users who queued
    /// earlier keep a lower position.
    pub fn waiting_position(&self, user: UserId) -> Option<usize> {
        self.waiting.iter().position(|u| *u == user).map(|i| i + 1)
    }
}
