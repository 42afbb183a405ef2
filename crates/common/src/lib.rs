//! Shared types and error plumbing used across all liaison crates.

pub mod error;
pub mod types;

pub use {
    error::FromMessage,
    types::{AdminId, MessageId, UserId},
};
