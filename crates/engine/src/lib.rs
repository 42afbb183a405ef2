//! Session-matching and question-queue engine.
//!
//! Pairs end-users with available administrators for live relay chats and
//! keeps a FIFO queue of asynchronous questions that administrators answer
//! one at a time. The engine is a synchronous state machine: every inbound
//! event mutates the stores under one lock and returns the notifications to
//! deliver as plain data, so the transport can send them after the lock is
//! released.

pub mod directory;
pub mod effect;
pub mod engine;
pub mod error;
pub mod pool;
pub mod queue;

pub use {
    directory::{DirectoryError, SessionDirectory},
    effect::{Effect, Recipient},
    engine::{AdminCommand, AdminState, EngineConfig, MatchingEngine, UserCommand, UserState},
    error::Reject,
    pool::AdminAvailabilityPool,
    queue::{PendingQuestion, QuestionQueue},
};
