use {
    teloxide::types::{MediaKind, Message, MessageKind},
    tracing::debug,
};

use {
    liaison_common::{AdminId, UserId},
    liaison_config::LiaisonConfig,
    liaison_engine::{AdminCommand, Effect, MatchingEngine, UserCommand},
};

use crate::state::SharedState;

/// Handle a single inbound Telegram message.
///
/// The engine lock is scoped to the dispatch block; effects are delivered
/// only after it is dropped, so a slow network send never stalls matching.
pub async fn handle_message(msg: Message, state: &SharedState) {
    let Some(text) = extract_text(&msg) else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
        return;
    };

    let chat_id = msg.chat.id.0;
    let username = msg
        .from
        .as_ref()
        .and_then(|u| u.username.clone())
        .unwrap_or_else(|| chat_id.to_string());

    let effects = {
        let mut engine = state.engine.lock().unwrap_or_else(|e| e.into_inner());
        dispatch(&mut engine, &state.config, chat_id, &username, &text)
    };

    state.outbound.deliver(effects).await;
}

/// Route one inbound text to the engine and return the notifications to send.
///
/// The configured admin set decides which surface handles the sender; the
/// same numeric id is an admin everywhere or a user everywhere.
fn dispatch(
    engine: &mut MatchingEngine,
    config: &LiaisonConfig,
    chat_id: i64,
    username: &str,
    text: &str,
) -> Vec<Effect> {
    if config.is_admin(chat_id) {
        let admin = AdminId(chat_id);
        match text {
            "/start" => vec![Effect::to_admin(admin, config.texts.greeting.clone())],
            "/chat" => engine.on_admin_command(admin, AdminCommand::RequestChat),
            "/ask" => engine.on_admin_command(admin, AdminCommand::CheckQuestions),
            "/info" => vec![Effect::to_admin(admin, config.texts.info.clone())],
            "/lib" => vec![Effect::to_admin(admin, config.texts.library.clone())],
            // /end, /leave and /done are matched inside the engine, ahead of
            // the state-based answer/relay dispatch.
            _ => engine.on_admin_text(admin, text),
        }
    } else {
        let user = UserId(chat_id);
        match text {
            "/start" => vec![Effect::to_user(user, config.texts.greeting.clone())],
            "/chat" => engine.on_user_command(user, UserCommand::StartChat),
            "/ask" => engine.on_user_command(user, UserCommand::AskQuestion),
            "/info" => engine.on_user_command(user, UserCommand::Info),
            "/lib" => engine.on_user_command(user, UserCommand::Library),
            _ => engine.on_user_text(user, username, text),
        }
    }
}

/// Extract plain text content from a message.
fn extract_text(msg: &Message) -> Option<String> {
    match &msg.kind {
        MessageKind::Common(common) => match &common.media_kind {
            MediaKind::Text(t) => Some(t.text.clone()),
            _ => None,
        },
        _ => None,
    }
}
