use std::sync::{Arc, Mutex};

use {
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, BotCommand, UpdateKind},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use {
    liaison_config::LiaisonConfig,
    liaison_engine::{EngineConfig, MatchingEngine},
};

use crate::{
    error::{Context, Result},
    handlers,
    outbound::Outbound,
    state::{BotState, SharedState},
};

/// Start the bot: verify credentials, register commands, and spawn the
/// polling loop. Processing continues until the returned token is cancelled.
pub async fn start_polling(config: LiaisonConfig) -> Result<CancellationToken> {
    // Client timeout above the long-polling timeout (30s) so the HTTP client
    // doesn't abort the request before Telegram responds.
    let client = teloxide::net::default_reqwest_settings()
        .timeout(std::time::Duration::from_secs(45))
        .build()
        .context("build telegram http client")?;
    let bot = Bot::with_client(config.telegram.token.expose_secret(), client);

    // Verify credentials.
    let me = bot.get_me().await.context("verify bot credentials")?;

    // Delete any existing webhook so long polling works.
    bot.delete_webhook()
        .send()
        .await
        .context("clear telegram webhook")?;

    // Register slash commands for autocomplete in Telegram clients.
    let commands = vec![
        BotCommand::new("start", "Greeting and quick help"),
        BotCommand::new("chat", "Chat with an administrator"),
        BotCommand::new("ask", "Leave a question for the administrators"),
        BotCommand::new("info", "About us"),
        BotCommand::new("lib", "Our library"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(
        username = ?me.username,
        admins = config.telegram.admin_ids.len(),
        "telegram bot connected (webhook cleared)"
    );

    let cancel = CancellationToken::new();
    let state: SharedState = Arc::new(BotState {
        engine: Mutex::new(MatchingEngine::new(engine_config(&config))),
        outbound: Outbound::new(bot.clone()),
        config,
        cancel: cancel.clone(),
    });

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        info!("starting telegram polling loop");
        let mut offset: i32 = 0;

        loop {
            if cancel_clone.is_cancelled() {
                info!("telegram polling stopped");
                break;
            }

            let result = bot
                .get_updates()
                .offset(offset)
                .timeout(30)
                .allowed_updates(vec![AllowedUpdate::Message])
                .await;

            match result {
                Ok(updates) => {
                    debug!(count = updates.len(), "got telegram updates");
                    for update in updates {
                        offset = update.id.as_offset();
                        match update.kind {
                            UpdateKind::Message(msg) => {
                                debug!(chat_id = msg.chat.id.0, "received telegram message");
                                handlers::handle_message(msg, &state).await;
                            },
                            other => {
                                debug!("ignoring non-message update: {other:?}");
                            },
                        }
                    }
                },
                Err(e) => {
                    // Another instance polling with the same token wins; stop
                    // instead of fighting over updates.
                    if matches!(&e, RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) {
                        warn!(
                            "telegram polling stopped: another instance is already running with \
                             this token"
                        );
                        cancel_clone.cancel();
                        break;
                    }

                    warn!(error = %e, "telegram getUpdates failed");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                },
            }
        }
    });

    Ok(cancel)
}

fn engine_config(config: &LiaisonConfig) -> EngineConfig {
    EngineConfig {
        auto_advance_on_answer: config.engine.auto_advance_on_answer,
        info_text: config.texts.info.clone(),
        library_text: config.texts.library.clone(),
    }
}
