use thiserror::Error;

use crate::directory::DirectoryError;

/// A rejected engine operation.
///
/// Every variant is a recoverable, user-facing outcome — the `Display` text
/// is the notification sent back to whoever triggered the operation. None of
/// these indicate a fault: an out-of-state event always resolves to one of
/// them instead of crashing or partially mutating the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Reject {
    #[error("You are already in a chat or waiting for one.")]
    AlreadyConnected,

    #[error("That user is already in another chat.")]
    UserBusy,

    #[error("You are already in an active chat.")]
    AdminBusy,

    #[error("That user is no longer waiting for a chat.")]
    NotWaiting,

    #[error("There is no open chat for you.")]
    NoSession,

    #[error("You are not connected to a chat.")]
    NotInChat,

    #[error("You are not in chat waiting mode.")]
    NotInPool,

    #[error("There are no pending questions.")]
    NothingQueued,
}

impl From<DirectoryError> for Reject {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::AlreadyInSession => Self::AlreadyConnected,
            DirectoryError::UserBusy => Self::UserBusy,
            DirectoryError::AdminBusy => Self::AdminBusy,
            DirectoryError::NotWaiting => Self::NotWaiting,
            DirectoryError::NoSession => Self::NoSession,
        }
    }
}
