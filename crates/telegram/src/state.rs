use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use {liaison_config::LiaisonConfig, liaison_engine::MatchingEngine};

use crate::outbound::Outbound;

/// Shared runtime state for the bot.
pub struct BotState {
    pub config: LiaisonConfig,
    /// The matching engine behind the single global lock the concurrency
    /// model requires (std::sync::Mutex because every engine operation is a
    /// synchronous map mutation, never held across an `.await` point).
    pub engine: Mutex<MatchingEngine>,
    pub outbound: Outbound,
    pub cancel: CancellationToken,
}

pub type SharedState = Arc<BotState>;
