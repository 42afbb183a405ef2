use std::{future::Future, time::Duration};

use {
    teloxide::{RequestError, prelude::*, types::ChatId},
    tracing::warn,
};

use {
    liaison_common::{AdminId, UserId},
    liaison_engine::{Effect, Recipient},
};

use crate::error::Result;

const RETRY_AFTER_MAX_RETRIES: usize = 4;

/// Outbound message sender.
///
/// Honors Telegram `RetryAfter` waits with a bounded number of retries;
/// any other failure is the caller's to log. The engine never re-attempts a
/// failed notification.
pub struct Outbound {
    bot: Bot,
}

impl Outbound {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Send one text message to a chat.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        run_telegram_request_with_retry(chat_id, "send message", || {
            let req = self.bot.send_message(ChatId(chat_id), text);
            async move { req.await }
        })
        .await?;
        Ok(())
    }

    /// Deliver a batch of engine effects, attempting each one.
    ///
    /// Called after the engine lock has been released. A failed send is
    /// logged and dropped — delivery guarantees are the transport's problem,
    /// not the engine's.
    pub async fn deliver(&self, effects: Vec<Effect>) {
        for effect in effects {
            let chat_id = match effect.recipient {
                Recipient::User(UserId(id)) => id,
                Recipient::Admin(AdminId(id)) => id,
            };
            if let Err(e) = self.send_text(chat_id, &effect.text).await {
                warn!(chat_id, error = %e, "failed to deliver notification");
            }
        }
    }
}

async fn run_telegram_request_with_retry<T, F, Fut>(
    chat_id: i64,
    operation: &'static str,
    mut request: F,
) -> std::result::Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RequestError>>,
{
    let mut retries = 0usize;

    loop {
        match request().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let Some(wait) = retry_after_duration(&err) else {
                    return Err(err);
                };

                if retries >= RETRY_AFTER_MAX_RETRIES {
                    warn!(
                        chat_id,
                        operation,
                        retries,
                        retry_after_secs = wait.as_secs(),
                        "telegram rate limit persisted after retries"
                    );
                    return Err(err);
                }

                retries += 1;
                warn!(
                    chat_id,
                    operation,
                    retries,
                    retry_after_secs = wait.as_secs(),
                    "telegram rate limited, waiting before retry"
                );
                tokio::time::sleep(wait).await;
            },
        }
    }
}

fn retry_after_duration(error: &RequestError) -> Option<Duration> {
    match error {
        RequestError::RetryAfter(wait) => Some(wait.duration()),
        _ => None,
    }
}
