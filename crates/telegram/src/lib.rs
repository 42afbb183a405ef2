//! Telegram transport for liaison.
//!
//! Receives updates via long polling, routes them through the matching
//! engine behind its single lock, and delivers the returned effects once the
//! lock is dropped.

pub mod bot;
pub mod error;
pub mod handlers;
pub mod outbound;
pub mod state;

pub use {
    bot::start_polling,
    error::{Error, Result},
    state::{BotState, SharedState},
};
