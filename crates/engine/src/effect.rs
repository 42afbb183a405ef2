use liaison_common::{AdminId, UserId};

/// Who an outbound notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    User(UserId),
    Admin(AdminId),
}

/// A single outbound notification produced by an engine operation.
///
/// Effects are data, not I/O: the transport delivers them once the engine
/// lock has been dropped. Delivery order among the effects of one event is
/// unspecified; each must be attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub recipient: Recipient,
    pub text: String,
}

impl Effect {
    pub fn to_user(user: UserId, text: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::User(user),
            text: text.into(),
        }
    }

    pub fn to_admin(admin: AdminId, text: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::Admin(admin),
            text: text.into(),
        }
    }
}
